// src/models/service_visit.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Visita de manutenção registrada pelo técnico
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceVisit {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub serviced_on: NaiveDate,
    #[schema(example = "Replaced DVR power adapter")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogServicePayload {
    /// Padrão: hoje
    #[schema(value_type = Option<String>, format = Date, example = "2025-06-02")]
    pub serviced_on: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Notes must have at most 2000 characters"))]
    pub notes: Option<String>,
}
