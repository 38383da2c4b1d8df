pub mod user_repo;
pub use user_repo::UserRepository;
pub mod customer_repo;
pub use customer_repo::{CustomerRecord, CustomerRepository};
pub mod service_visit_repo;
pub use service_visit_repo::ServiceVisitRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
