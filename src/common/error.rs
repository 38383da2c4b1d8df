// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use chrono::NaiveDate;

use crate::models::contract::ContractStatus;

// Tipo de erro único da aplicação. Os handlers devolvem Result<_, AppError>
// e o IntoResponse abaixo decide o status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition {
        from: ContractStatus,
        to: ContractStatus,
    },

    #[error("Contrato não está ativo ({0})")]
    ContractNotActive(ContractStatus),

    #[error("Renovação não permitida para contrato {0}")]
    RenewalNotAllowed(ContractStatus),

    #[error("Período atual vai até {0}; renovação só a partir desse dia")]
    RenewalTooEarly(NaiveDate),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidStatusTransition { from, to } => {
                let body = Json(json!({
                    "error": format!("A contract cannot move from '{}' to '{}'.", from, to),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::ContractNotActive(status) => {
                let body = Json(json!({
                    "error": format!("Services can only be logged for active contracts (current status: '{}').", status),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::RenewalNotAllowed(status) => {
                let body = Json(json!({
                    "error": format!("A '{}' contract cannot be renewed.", status),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::RenewalTooEarly(ends_on) => {
                let body = Json(json!({
                    "error": format!("The current term runs until {}. Renew on or after that day.", ends_on),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "This e-mail is already in use."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid e-mail or password."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Missing or invalid authentication token."),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found."),
            AppError::CustomerNotFound => (StatusCode::NOT_FOUND, "Customer not found."),

            // Todo o resto (banco, PDF, bcrypt...) vira 500.
            // O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Helper para montar um ValidationErrors de um campo só
pub fn field_error(field: &'static str, code: &'static str, message: &str) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new(code);
    err.message = Some(message.to_string().into());
    errors.add(field, err);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = AppError::ValidationError(field_error("city", "required", "City is required"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lifecycle_conflicts_map_to_409() {
        let err = AppError::InvalidStatusTransition {
            from: ContractStatus::Cancelled,
            to: ContractStatus::Active,
        };
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::ContractNotActive(ContractStatus::Proposed).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::RenewalNotAllowed(ContractStatus::Cancelled).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::RenewalTooEarly(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn not_found_and_auth_statuses() {
        assert_eq!(AppError::CustomerNotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::EmailAlreadyExists.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_are_masked() {
        let err = AppError::PdfError("boom".into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
