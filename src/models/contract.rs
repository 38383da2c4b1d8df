// src/models/contract.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE amc_type do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "amc_type")]
pub enum AmcType {
    /// Premium: visita semanal
    A,
    /// Standard: visita mensal
    B,
    /// Basic: sob demanda
    C,
}

// Mapeia o CREATE TYPE contract_status do banco
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "contract_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[default]
    Proposed,
    Active,
    Expired,
    Suspended,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Proposed => "proposed",
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
            ContractStatus::Suspended => "suspended",
            ContractStatus::Cancelled => "cancelled",
        }
    }

    /// Ciclo de vida: proposed -> active -> {expired, suspended, cancelled}.
    /// Expired só volta a active pela renovação.
    pub fn can_transition_to(self, next: ContractStatus) -> bool {
        use ContractStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Proposed, Active)
                | (Proposed, Cancelled)
                | (Active, Expired)
                | (Active, Suspended)
                | (Active, Cancelled)
                | (Suspended, Active)
                | (Suspended, Cancelled)
        )
    }

    pub fn requires_invoice(self) -> bool {
        self != ContractStatus::Proposed
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- CLIENTE + CONTRATO (a linha do banco) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Sharma Textiles")]
    pub company_name: String,
    #[schema(example = "Rakesh Sharma")]
    pub owner_name: String,
    #[schema(example = "Pune")]
    pub city: String,
    pub address: String,
    #[schema(example = "9876543210")]
    pub phone_number: String,

    #[schema(value_type = String, format = Date, example = "2025-03-31")]
    pub amc_start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-03-31")]
    pub amc_end_date: NaiveDate,
    pub amc_type: AmcType,
    #[schema(value_type = f64, example = 12000.0)]
    pub amc_amount: Decimal,
    pub product_description: String,

    // Fatura: obrigatória fora do status "proposed"
    pub invoice_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub invoice_date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub invoice_amount: Option<Decimal>,

    pub status: ContractStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sub-registro de fatura, só existe quando os três campos estão presentes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub number: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

impl Customer {
    pub fn invoice(&self) -> Option<Invoice> {
        match (&self.invoice_number, self.invoice_date, self.invoice_amount) {
            (Some(number), Some(date), Some(amount)) => Some(Invoice {
                number: number.clone(),
                date,
                amount,
            }),
            _ => None,
        }
    }
}

// --- VISÃO DERIVADA (calculada a cada leitura, nunca persistida) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractView {
    // O status aqui já é o efetivo (active vencido vira expired)
    #[serde(flatten)]
    pub customer: Customer,

    #[schema(value_type = Option<String>, format = Date)]
    pub next_service_date: Option<NaiveDate>,

    /// Negativo quando o contrato já venceu
    pub days_until_expiry: i64,
}

// --- PAYLOADS ---

// Formulário completo do cliente (criação e edição).
// Regras que dependem de mais de um campo ficam no CustomerService.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(max = 200, message = "Company name must have at most 200 characters"))]
    #[schema(example = "Sharma Textiles")]
    pub company_name: String,

    #[validate(length(max = 200, message = "Owner name must have at most 200 characters"))]
    #[schema(example = "Rakesh Sharma")]
    pub owner_name: String,

    #[validate(length(max = 100, message = "City must have at most 100 characters"))]
    #[schema(example = "Pune")]
    pub city: String,

    #[validate(length(max = 500, message = "Address must have at most 500 characters"))]
    #[schema(example = "12 MG Road, Camp")]
    pub address: String,

    #[schema(example = "98765 43210")]
    pub phone_number: String,

    /// O fim é sempre calculado (início + 1 ano)
    #[schema(value_type = String, format = Date, example = "2025-03-31")]
    pub amc_start_date: NaiveDate,

    pub amc_type: AmcType,

    #[schema(value_type = f64, example = 12000.0)]
    pub amc_amount: Decimal,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Product description must have at most 5000 characters"))]
    #[schema(example = "8 x IP cameras, 1 x 16ch NVR")]
    pub product_description: String,

    #[schema(example = "INV-2025-041")]
    pub invoice_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-31")]
    pub invoice_date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>, example = 12000.0)]
    pub invoice_amount: Option<Decimal>,

    #[serde(default)]
    pub status: ContractStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewContractPayload {
    #[validate(length(max = 100, message = "Invoice number must have at most 100 characters"))]
    #[schema(example = "INV-2026-007")]
    pub invoice_number: String,
    #[schema(value_type = String, format = Date)]
    pub invoice_date: NaiveDate,
    #[schema(value_type = f64, example = 13000.0)]
    pub invoice_amount: Decimal,

    /// Novo valor do contrato; padrão: mantém o atual
    #[schema(value_type = Option<f64>)]
    pub amc_amount: Option<Decimal>,
    /// Troca de plano na renovação; padrão: mantém o atual
    pub amc_type: Option<AmcType>,
}

// --- FILTROS DA LISTAGEM ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerFilter {
    /// Busca em empresa, responsável e cidade (sem diferenciar maiúsculas)
    pub search: Option<String>,
    /// Status efetivo
    pub status: Option<ContractStatus>,
    pub amc_type: Option<AmcType>,
}

impl CustomerFilter {
    pub fn matches(&self, view: &ContractView) -> bool {
        let c = &view.customer;

        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                c.company_name.to_lowercase().contains(&term)
                    || c.owner_name.to_lowercase().contains(&term)
                    || c.city.to_lowercase().contains(&term)
            }
        };
        let matches_status = self.status.map_or(true, |s| c.status == s);
        let matches_type = self.amc_type.map_or(true, |t| c.amc_type == t);

        matches_search && matches_status && matches_type
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn customer(company: &str, amc_type: AmcType, start: NaiveDate, status: ContractStatus) -> Customer {
        let end = crate::services::schedule::contract_end_date(start).unwrap();
        Customer {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            company_name: company.to_string(),
            owner_name: "Owner".to_string(),
            city: "Pune".to_string(),
            address: "12 MG Road".to_string(),
            phone_number: "9876543210".to_string(),
            amc_start_date: start,
            amc_end_date: end,
            amc_type,
            amc_amount: Decimal::new(1200000, 2),
            product_description: String::new(),
            invoice_number: Some("INV-1".to_string()),
            invoice_date: Some(start),
            invoice_amount: Some(Decimal::new(1200000, 2)),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        use ContractStatus::*;

        assert!(Proposed.can_transition_to(Active));
        assert!(Proposed.can_transition_to(Cancelled));
        assert!(!Proposed.can_transition_to(Expired));
        assert!(Active.can_transition_to(Suspended));
        assert!(Suspended.can_transition_to(Active));
        assert!(!Expired.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Active));
        assert!(Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ContractStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
        let tier: AmcType = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(tier, AmcType::B);
    }

    #[test]
    fn invoice_requires_all_fields() {
        let mut c = customer("Acme", AmcType::A, date(2025, 1, 1), ContractStatus::Active);
        assert!(c.invoice().is_some());
        c.invoice_date = None;
        assert!(c.invoice().is_none());
    }

    #[test]
    fn filter_matches_search_status_and_type() {
        let view = ContractView {
            customer: customer("Sharma Textiles", AmcType::B, date(2025, 1, 1), ContractStatus::Active),
            next_service_date: None,
            days_until_expiry: 10,
        };

        let by_city = CustomerFilter { search: Some("  PUNE ".into()), ..Default::default() };
        assert!(by_city.matches(&view));

        let by_name = CustomerFilter { search: Some("textile".into()), ..Default::default() };
        assert!(by_name.matches(&view));

        let wrong_type = CustomerFilter { amc_type: Some(AmcType::A), ..Default::default() };
        assert!(!wrong_type.matches(&view));

        let wrong_status = CustomerFilter { status: Some(ContractStatus::Expired), ..Default::default() };
        assert!(!wrong_status.matches(&view));

        assert!(CustomerFilter::default().matches(&view));
    }
}
