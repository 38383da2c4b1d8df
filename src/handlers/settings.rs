// src/handlers/settings.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::settings::{BusinessProfile, UpdateBusinessProfileRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Perfil da empresa (padrões se ainda não configurado)", body = BusinessProfile)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<BusinessProfile>, AppError> {
    let profile = app_state
        .settings_repo
        .get_profile(&app_state.db_pool, user.id)
        .await?;

    Ok(Json(profile))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateBusinessProfileRequest,
    responses(
        (status = 200, description = "Perfil atualizado (campos omitidos mantêm o valor atual)", body = BusinessProfile),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateBusinessProfileRequest>,
) -> Result<Json<BusinessProfile>, AppError> {
    payload.validate()?;

    // Lê e grava na mesma transação: os campos omitidos vêm do perfil atual
    let mut tx = app_state.db_pool.begin().await?;

    let current = app_state.settings_repo.get_profile(&mut *tx, user.id).await?;
    let updated = app_state
        .settings_repo
        .upsert_profile(&mut *tx, &current.merged_with(&payload))
        .await?;

    tx.commit().await?;

    tracing::info!("⚙️ Perfil da empresa atualizado pelo usuário {}", user.id);

    Ok(Json(updated))
}
