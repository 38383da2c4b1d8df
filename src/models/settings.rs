// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Valores usados enquanto o usuário não configura o próprio perfil
pub const DEFAULT_COMPANY_NAME: &str = "MAX Digital & Services";
pub const DEFAULT_TAGLINE: &str = "CCTV Installation & Maintenance Services";
pub const DEFAULT_EMAIL: &str = "info@maxdigitalservices.com";
pub const DEFAULT_PHONE: &str = "+91 9876543210";
pub const DEFAULT_ADDRESS: &str = "123 Technology Street, Digital City, Tech State - 123456";
pub const DEFAULT_BANK_DETAILS: &str = "MAX Digital Services, Account No: 1234567890, IFSC: BANK0001234";
pub const DEFAULT_GST_NUMBER: &str = "29ABCDE1234F1Z5";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    #[schema(ignore)] // O dono vem do token
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    #[schema(example = "MAX Digital & Services")]
    pub company_name: Option<String>,
    pub tagline: Option<String>,
    #[schema(example = "info@maxdigitalservices.com")]
    pub email: Option<String>,
    #[schema(example = "+91 9876543210")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_details: Option<String>,
    #[schema(example = "29ABCDE1234F1Z5")]
    pub gst_number: Option<String>,
    /// Gera o QR Code de pagamento na proposta
    #[schema(example = "maxdigital@upi")]
    pub upi_id: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl BusinessProfile {
    pub fn with_defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            company_name: Some(DEFAULT_COMPANY_NAME.to_string()),
            tagline: Some(DEFAULT_TAGLINE.to_string()),
            email: Some(DEFAULT_EMAIL.to_string()),
            phone: Some(DEFAULT_PHONE.to_string()),
            address: Some(DEFAULT_ADDRESS.to_string()),
            bank_details: Some(DEFAULT_BANK_DETAILS.to_string()),
            gst_number: Some(DEFAULT_GST_NUMBER.to_string()),
            upi_id: None,
            updated_at: None,
        }
    }

    /// Aplica o PUT por cima do perfil atual: campo omitido mantém o valor que já tinha.
    pub fn merged_with(self, input: &UpdateBusinessProfileRequest) -> Self {
        Self {
            user_id: self.user_id,
            company_name: input.company_name.clone().or(self.company_name),
            tagline: input.tagline.clone().or(self.tagline),
            email: input.email.clone().or(self.email),
            phone: input.phone.clone().or(self.phone),
            address: input.address.clone().or(self.address),
            bank_details: input.bank_details.clone().or(self.bank_details),
            gst_number: input.gst_number.clone().or(self.gst_number),
            upi_id: input.upi_id.clone().or(self.upi_id),
            updated_at: self.updated_at,
        }
    }
}

// Atualização parcial: só os campos enviados mudam
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessProfileRequest {
    #[validate(length(min = 1, max = 200, message = "Company name must have 1 to 200 characters"))]
    #[schema(example = "MAX Digital & Services")]
    pub company_name: Option<String>,
    pub tagline: Option<String>,
    #[validate(email(message = "Invalid e-mail"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_details: Option<String>,
    #[validate(length(equal = 15, message = "GST number must have 15 characters"))]
    pub gst_number: Option<String>,
    #[validate(contains(pattern = "@", message = "UPI id must look like name@bank"))]
    pub upi_id: Option<String>,
}
