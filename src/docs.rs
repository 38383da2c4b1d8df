// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::renew_contract,

        // --- Services ---
        handlers::customers::log_service,
        handlers::customers::list_services,

        // --- Proposals ---
        handlers::proposals::get_proposal,
        handlers::proposals::download_proposal_pdf,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Contracts ---
            models::contract::AmcType,
            models::contract::ContractStatus,
            models::contract::Customer,
            models::contract::ContractView,
            models::contract::CustomerPayload,
            models::contract::RenewContractPayload,

            // --- Services ---
            models::service_visit::ServiceVisit,
            models::service_visit::LogServicePayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::StatusCounts,
            models::dashboard::TierDistribution,
            models::dashboard::ScheduledService,
            models::dashboard::RenewalAlert,

            // --- Proposals ---
            services::proposal_service::ProposalDocument,
            services::proposal_service::ProposalProvider,
            services::proposal_service::ProposalClient,
            services::proposal_service::ProposalContract,
            services::proposal_service::PlanDetails,
            services::proposal_service::PaymentDetails,

            // --- Settings ---
            models::settings::BusinessProfile,
            models::settings::UpdateBusinessProfileRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Customers", description = "Clientes e Contratos AMC"),
        (name = "Services", description = "Visitas de Manutenção"),
        (name = "Proposals", description = "Propostas Comerciais (JSON e PDF)"),
        (name = "Dashboard", description = "Indicadores da Carteira"),
        (name = "Settings", description = "Perfil da Empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/users/me",
            "/api/customers",
            "/api/customers/{id}",
            "/api/customers/{id}/renew",
            "/api/customers/{id}/services",
            "/api/customers/{id}/proposal",
            "/api/customers/{id}/proposal/pdf",
            "/api/dashboard",
            "/api/settings",
        ] {
            assert!(paths.contains(&expected), "faltando {}", expected);
        }
    }

    #[test]
    fn owner_ids_stay_out_of_schemas() {
        let components = ApiDoc::openapi().components.expect("components");

        for name in ["Customer", "ServiceVisit", "BusinessProfile"] {
            let schema = serde_json::to_value(&components.schemas[name]).unwrap();
            assert!(schema["properties"].get("userId").is_none(), "{} expõe userId", name);
        }

        let customer = serde_json::to_value(&components.schemas["Customer"]).unwrap();
        assert!(customer["properties"].get("companyName").is_some());
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
