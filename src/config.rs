// src/config.rs

use crate::{
    db::{CustomerRepository, ServiceVisitRepository, SettingsRepository, UserRepository},
    services::{auth::AuthService, CustomerService, DashboardService, ProposalService},
};
use anyhow::Context;
use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_EXPIRATION_DAYS: i64 = 7;
const DEFAULT_FONTS_DIR: &str = "./fonts";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub jwt_expiration_days: i64,
    pub fonts_dir: PathBuf,
    pub clock: BusinessClock,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lê as variáveis por uma função, para poder testar sem mexer no ambiente
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DATABASE_MAX_CONNECTIONS inválido")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let jwt_expiration_days: i64 = match lookup("JWT_EXPIRATION_DAYS") {
            Some(v) => v.parse().context("JWT_EXPIRATION_DAYS inválido")?,
            None => DEFAULT_JWT_EXPIRATION_DAYS,
        };
        anyhow::ensure!(jwt_expiration_days > 0, "JWT_EXPIRATION_DAYS deve ser positivo");

        let utc_offset_minutes: i32 = match lookup("BUSINESS_UTC_OFFSET_MINUTES") {
            Some(v) => v.parse().context("BUSINESS_UTC_OFFSET_MINUTES inválido")?,
            None => 0,
        };
        let clock = BusinessClock::from_minutes(utc_offset_minutes)?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            max_connections,
            jwt_expiration_days,
            fonts_dir: lookup("FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FONTS_DIR)),
            clock,
        })
    }
}

// =============================================================================
//  RELÓGIO DO NEGÓCIO
// =============================================================================

/// Define o "hoje" usado em todas as regras de agenda e vencimento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    pub fn from_minutes(minutes: i32) -> anyhow::Result<Self> {
        // FixedOffset só aceita menos de 24h
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .context("BUSINESS_UTC_OFFSET_MINUTES fora do intervalo")?;
        Ok(Self { offset })
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

// =============================================================================
//  ESTADO COMPARTILHADO
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub clock: BusinessClock,
    pub auth_service: AuthService,
    pub customer_service: CustomerService,
    pub dashboard_service: DashboardService,
    pub proposal_service: ProposalService,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            config.jwt_expiration_days,
        );

        let customer_service = CustomerService::new(CustomerRepository::new(), ServiceVisitRepository::new());
        let dashboard_service = DashboardService::new(customer_service.clone());
        let proposal_service = ProposalService::new(
            CustomerRepository::new(),
            SettingsRepository::new(),
            config.fonts_dir.clone(),
        );

        Self {
            db_pool,
            clock: config.clock,
            auth_service,
            customer_service,
            dashboard_service,
            proposal_service,
            settings_repo: SettingsRepository::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/amc"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.jwt_expiration_days, 7);
        assert_eq!(config.fonts_dir, PathBuf::from("./fonts"));
        assert_eq!(config.clock, BusinessClock::from_minutes(0).unwrap());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/amc"),
            ("JWT_SECRET", "secret"),
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("JWT_EXPIRATION_DAYS", "30"),
            ("FONTS_DIR", "/usr/share/fonts/roboto"),
            ("BUSINESS_UTC_OFFSET_MINUTES", "330"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.jwt_expiration_days, 30);
        assert_eq!(config.fonts_dir, PathBuf::from("/usr/share/fonts/roboto"));
        assert_eq!(config.clock, BusinessClock::from_minutes(330).unwrap());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/amc")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let base = [("DATABASE_URL", "postgres://db/amc"), ("JWT_SECRET", "s")];

        let mut bad_conn = base.to_vec();
        bad_conn.push(("DATABASE_MAX_CONNECTIONS", "many"));
        assert!(Config::from_lookup(lookup_from(&bad_conn)).is_err());

        let mut bad_offset = base.to_vec();
        bad_offset.push(("BUSINESS_UTC_OFFSET_MINUTES", "1440"));
        assert!(Config::from_lookup(lookup_from(&bad_offset)).is_err());

        let mut bad_ttl = base.to_vec();
        bad_ttl.push(("JWT_EXPIRATION_DAYS", "0"));
        assert!(Config::from_lookup(lookup_from(&bad_ttl)).is_err());
    }

    #[test]
    fn clock_follows_offset() {
        let utc = BusinessClock::from_minutes(0).unwrap();
        let ahead = BusinessClock::from_minutes(14 * 60).unwrap();
        let behind = BusinessClock::from_minutes(-12 * 60).unwrap();

        let diff_ahead = (ahead.today() - utc.today()).num_days();
        let diff_behind = (utc.today() - behind.today()).num_days();
        assert!((0..=1).contains(&diff_ahead));
        assert!((0..=1).contains(&diff_behind));
    }
}
