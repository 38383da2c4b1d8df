// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        contract::{ContractView, CustomerFilter, CustomerPayload, RenewContractPayload},
        service_visit::{LogServicePayload, ServiceVisit},
    },
};

// =============================================================================
//  ÁREA 1: CADASTRO DE CLIENTES / CONTRATOS
// =============================================================================

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Contrato criado", body = ContractView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state
        .customer_service
        .create_customer(&app_state.db_pool, user.id, app_state.clock.today(), &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(CustomerFilter),
    responses(
        (status = 200, description = "Contratos do usuário, mais recentes primeiro", body = Vec<ContractView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<Vec<ContractView>>, AppError> {
    let views = app_state
        .customer_service
        .list_customers(&app_state.db_pool, user.id, app_state.clock.today(), &filter)
        .await?;

    Ok(Json(views))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Contrato", body = ContractView),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractView>, AppError> {
    let view = app_state
        .customer_service
        .get_customer(&app_state.db_pool, user.id, app_state.clock.today(), id)
        .await?;

    Ok(Json(view))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Contrato atualizado", body = ContractView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Transição de status não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<ContractView>, AppError> {
    let view = app_state
        .customer_service
        .update_customer(&app_state.db_pool, user.id, app_state.clock.today(), id, &payload)
        .await?;

    Ok(Json(view))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state
        .customer_service
        .delete_customer(&app_state.db_pool, user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/customers/{id}/renew
#[utoipa::path(
    post,
    path = "/api/customers/{id}/renew",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = RenewContractPayload,
    responses(
        (status = 200, description = "Contrato renovado por mais 12 meses", body = ContractView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Contrato não pode ser renovado no status atual ou antes do fim do período")
    ),
    security(("api_jwt" = []))
)]
pub async fn renew_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenewContractPayload>,
) -> Result<Json<ContractView>, AppError> {
    let view = app_state
        .customer_service
        .renew_contract(&app_state.db_pool, user.id, app_state.clock.today(), id, &payload)
        .await?;

    Ok(Json(view))
}

// =============================================================================
//  ÁREA 2: VISITAS DE MANUTENÇÃO
// =============================================================================

// POST /api/customers/{id}/services
#[utoipa::path(
    post,
    path = "/api/customers/{id}/services",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = LogServicePayload,
    responses(
        (status = 201, description = "Visita registrada", body = ServiceVisit),
        (status = 400, description = "Data inválida"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Contrato não está ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn log_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LogServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state
        .customer_service
        .log_service(&app_state.db_pool, user.id, app_state.clock.today(), id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(visit)))
}

// GET /api/customers/{id}/services
#[utoipa::path(
    get,
    path = "/api/customers/{id}/services",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Histórico de visitas, mais recentes primeiro", body = Vec<ServiceVisit>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ServiceVisit>>, AppError> {
    let visits = app_state
        .customer_service
        .list_services(&app_state.db_pool, user.id, id)
        .await?;

    Ok(Json(visits))
}
