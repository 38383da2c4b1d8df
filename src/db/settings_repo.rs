// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::BusinessProfile,
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_profile<'e, E>(&self, executor: E, user_id: Uuid) -> Result<BusinessProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Perfil ainda não configurado: devolve os valores padrão
        let profile = sqlx::query_as::<_, BusinessProfile>(
            r#"
            SELECT user_id, company_name, tagline, email, phone, address,
                   bank_details, gst_number, upi_id, updated_at
            FROM business_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(profile.unwrap_or_else(|| BusinessProfile::with_defaults(user_id)))
    }

    pub async fn upsert_profile<'e, E>(
        &self,
        executor: E,
        profile: &BusinessProfile,
    ) -> Result<BusinessProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let saved = sqlx::query_as::<_, BusinessProfile>(
            r#"
            INSERT INTO business_profiles (
                user_id, company_name, tagline, email, phone, address,
                bank_details, gst_number, upi_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id)
            DO UPDATE SET
                company_name = EXCLUDED.company_name,
                tagline = EXCLUDED.tagline,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                bank_details = EXCLUDED.bank_details,
                gst_number = EXCLUDED.gst_number,
                upi_id = EXCLUDED.upi_id,
                updated_at = NOW()
            RETURNING user_id, company_name, tagline, email, phone, address,
                      bank_details, gst_number, upi_id, updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.company_name)
        .bind(&profile.tagline)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(&profile.bank_details)
        .bind(&profile.gst_number)
        .bind(&profile.upi_id)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }
}
