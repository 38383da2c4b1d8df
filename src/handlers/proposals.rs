// src/handlers/proposals.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    services::proposal_service::ProposalDocument,
};

// GET /api/customers/{id}/proposal
#[utoipa::path(
    get,
    path = "/api/customers/{id}/proposal",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Conteúdo da proposta comercial", body = ProposalDocument),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_proposal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProposalDocument>, AppError> {
    let proposal = app_state
        .proposal_service
        .get_proposal(&app_state.db_pool, user.id, id, app_state.clock.today())
        .await?;

    Ok(Json(proposal))
}

// GET /api/customers/{id}/proposal/pdf
#[utoipa::path(
    get,
    path = "/api/customers/{id}/proposal/pdf",
    tag = "Proposals",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Arquivo PDF", content_type = "application/pdf"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 500, description = "Falha ao gerar o PDF")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_proposal_pdf(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (proposal, pdf_bytes) = app_state
        .proposal_service
        .generate_proposal_pdf(&app_state.db_pool, user.id, id, app_state.clock.today())
        .await?;

    let disposition = format!("attachment; filename=\"{}.pdf\"", proposal.proposal_number);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf_bytes,
    ))
}
