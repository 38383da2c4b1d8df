// src/services/dashboard_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        contract::{AmcType, ContractStatus, ContractView},
        dashboard::{DashboardSummary, ScheduledService, StatusCounts, TierDistribution},
    },
    services::{customer_service::CustomerService, schedule::renewal_alerts},
};

#[derive(Clone)]
pub struct DashboardService {
    customers: CustomerService,
}

impl DashboardService {
    pub fn new(customers: CustomerService) -> Self {
        Self { customers }
    }

    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let views = self.customers.snapshot(executor, user_id, today).await?;
        Ok(summarize(&views, today))
    }
}

/// Agrega a foto já derivada nos cards do painel.
pub fn summarize(views: &[ContractView], today: NaiveDate) -> DashboardSummary {
    let mut status_counts = StatusCounts::default();
    let mut tier_distribution = TierDistribution::default();

    for view in views {
        match view.customer.status {
            ContractStatus::Active => status_counts.active += 1,
            ContractStatus::Proposed => status_counts.proposed += 1,
            ContractStatus::Expired => status_counts.expired += 1,
            ContractStatus::Suspended => status_counts.suspended += 1,
            ContractStatus::Cancelled => status_counts.cancelled += 1,
        }
        match view.customer.amc_type {
            AmcType::A => tier_distribution.type_a += 1,
            AmcType::B => tier_distribution.type_b += 1,
            AmcType::C => tier_distribution.type_c += 1,
        }
    }

    let todays_services = views
        .iter()
        .filter(|v| v.next_service_date == Some(today))
        .map(|v| ScheduledService {
            customer_id: v.customer.id,
            company_name: v.customer.company_name.clone(),
            owner_name: v.customer.owner_name.clone(),
            city: v.customer.city.clone(),
            amc_type: v.customer.amc_type,
            status: v.customer.status,
        })
        .collect();

    DashboardSummary {
        as_of: today,
        status_counts,
        todays_services,
        renewal_alerts: renewal_alerts(views, today),
        tier_distribution,
    }
}
