// src/db/service_visit_repo.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::service_visit::ServiceVisit};

#[derive(Clone, Default)]
pub struct ServiceVisitRepository;

impl ServiceVisitRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        serviced_on: NaiveDate,
        notes: Option<&str>,
    ) -> Result<ServiceVisit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, ServiceVisit>(
            r#"
            INSERT INTO service_visits (customer_id, user_id, serviced_on, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, customer_id, user_id, serviced_on, notes, created_at
            "#,
        )
        .bind(customer_id)
        .bind(user_id)
        .bind(serviced_on)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(visit)
    }

    /// Histórico de um cliente, mais recentes primeiro
    pub async fn list_for_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<ServiceVisit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, ServiceVisit>(
            r#"
            SELECT id, customer_id, user_id, serviced_on, notes, created_at
            FROM service_visits
            WHERE customer_id = $1 AND user_id = $2
            ORDER BY serviced_on DESC, created_at DESC
            "#,
        )
        .bind(customer_id)
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(visits)
    }

    /// Clientes que já receberam visita no dia
    pub async fn customers_serviced_on<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<HashSet<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT customer_id FROM service_visits WHERE user_id = $1 AND serviced_on = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(executor)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
