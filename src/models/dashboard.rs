// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::contract::{AmcType, ContractStatus};

// 1. Contadores por status efetivo (os cards do topo)
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub active: usize,
    pub proposed: usize,
    pub expired: usize,
    pub suspended: usize,
    pub cancelled: usize,
}

// 2. Distribuição por plano
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierDistribution {
    pub type_a: usize,
    pub type_b: usize,
    pub type_c: usize,
}

// 3. Visitas programadas para hoje
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledService {
    pub customer_id: Uuid,
    pub company_name: String,
    pub owner_name: String,
    pub city: String,
    pub amc_type: AmcType,
    pub status: ContractStatus,
}

// 4. Alertas de renovação (janela de 7 dias)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewalAlert {
    pub customer_id: Uuid,
    pub company_name: String,
    pub owner_name: String,
    #[schema(value_type = String, format = Date)]
    pub amc_end_date: NaiveDate,
    pub days_remaining: i64,
    /// Faltam 3 dias ou menos
    pub urgent: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Data usada como "hoje" nos cálculos
    #[schema(value_type = String, format = Date)]
    pub as_of: NaiveDate,
    pub status_counts: StatusCounts,
    pub todays_services: Vec<ScheduledService>,
    pub renewal_alerts: Vec<RenewalAlert>,
    pub tier_distribution: TierDistribution,
}
