// src/services/customer_service.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::{field_error, AppError},
    db::{CustomerRecord, CustomerRepository, ServiceVisitRepository},
    models::{
        contract::{
            ContractStatus, ContractView, Customer, CustomerFilter, CustomerPayload,
            RenewContractPayload,
        },
        service_visit::{LogServicePayload, ServiceVisit},
    },
    services::schedule::{contract_end_date, derive_view, effective_status},
};

const PHONE_DIGITS: usize = 10;

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    visits: ServiceVisitRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, visits: ServiceVisitRepository) -> Self {
        Self { repo, visits }
    }

    // =========================================================================
    //  1. LEITURA (sempre com status e agenda derivados)
    // =========================================================================

    /// Foto de todos os contratos do usuário, já derivados para `today`.
    pub async fn snapshot<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<ContractView>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só para ter uma leitura consistente
        let mut tx = executor.begin().await?;

        let serviced = self.visits.customers_serviced_on(&mut *tx, user_id, today).await?;
        let customers = self.repo.list(&mut *tx, user_id).await?;

        tx.commit().await?;

        Ok(derive_all(customers, today, &serviced))
    }

    pub async fn list_customers<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
        filter: &CustomerFilter,
    ) -> Result<Vec<ContractView>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let views = self.snapshot(executor, user_id, today).await?;
        Ok(views.into_iter().filter(|v| filter.matches(v)).collect())
    }

    pub async fn get_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
        id: Uuid,
    ) -> Result<ContractView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let customer = self
            .repo
            .find(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        let serviced = self.visits.customers_serviced_on(&mut *tx, user_id, today).await?;

        tx.commit().await?;

        Ok(derive_view(customer, today, serviced.contains(&id)))
    }

    // =========================================================================
    //  2. ESCRITA
    // =========================================================================

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
        payload: &CustomerPayload,
    ) -> Result<ContractView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = build_record(payload)?;
        let customer = self.repo.create(executor, user_id, &record).await?;

        tracing::info!(
            "📄 Contrato {} criado para '{}' (plano {:?}, {})",
            customer.id,
            customer.company_name,
            customer.amc_type,
            customer.status
        );

        Ok(derive_view(customer, today, false))
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
        id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<ContractView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let record = build_record(payload)?;

        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let from = check_transition(&current, record.status, today)?;

        let updated = self
            .repo
            .update(&mut *tx, user_id, id, &record)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        let serviced = self.visits.customers_serviced_on(&mut *tx, user_id, today).await?;

        tx.commit().await?;

        tracing::info!("✏️ Contrato {} atualizado ({} -> {})", id, from, updated.status);

        Ok(derive_view(updated, today, serviced.contains(&id)))
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, user_id, id).await? {
            return Err(AppError::CustomerNotFound);
        }

        tracing::info!("🗑️ Contrato {} removido", id);
        Ok(())
    }

    /// Renova por mais um ano a partir de hoje. Só vale a partir do último dia do período atual.
    pub async fn renew_contract<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
        id: Uuid,
        payload: &RenewContractPayload,
    ) -> Result<ContractView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let record = renewed_record(current, today, payload)?;
        let renewed = self
            .repo
            .update(&mut *tx, user_id, id, &record)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        let serviced = self.visits.customers_serviced_on(&mut *tx, user_id, today).await?;

        tx.commit().await?;

        tracing::info!(
            "🔁 Contrato {} renovado: {} até {}",
            id,
            renewed.amc_start_date,
            renewed.amc_end_date
        );

        Ok(derive_view(renewed, today, serviced.contains(&id)))
    }

    // =========================================================================
    //  3. VISITAS DE MANUTENÇÃO
    // =========================================================================

    pub async fn log_service<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
        id: Uuid,
        payload: &LogServicePayload,
    ) -> Result<ServiceVisit, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let mut tx = executor.begin().await?;

        let customer = self
            .repo
            .find(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let serviced_on = check_visit(&customer, today, payload.serviced_on)?;
        let notes = payload
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let visit = self
            .visits
            .create(&mut *tx, user_id, id, serviced_on, notes)
            .await?;

        tx.commit().await?;

        tracing::info!("🔧 Visita registrada para {} em {}", customer.company_name, serviced_on);

        Ok(visit)
    }

    pub async fn list_services<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<ServiceVisit>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.repo
            .find(&mut *tx, user_id, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        let visits = self.visits.list_for_customer(&mut *tx, user_id, id).await?;

        tx.commit().await?;

        Ok(visits)
    }
}

// =============================================================================
//  REGRAS (funções puras)
// =============================================================================

fn derive_all(customers: Vec<Customer>, today: NaiveDate, serviced: &HashSet<Uuid>) -> Vec<ContractView> {
    customers
        .into_iter()
        .map(|c| {
            let serviced_today = serviced.contains(&c.id);
            derive_view(c, today, serviced_today)
        })
        .collect()
}

fn add_error(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: &str) {
    let mut err = ValidationError::new(code);
    err.message = Some(message.to_string().into());
    errors.add(field, err);
}

fn require_text(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        add_error(errors, field, "required", message);
    }
}

pub fn phone_is_valid(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == PHONE_DIGITS
}

/// Valida o formulário e devolve o registro normalizado.
/// Fatura obrigatória fora de "proposed"; em "proposed" ela é descartada.
pub fn build_record(payload: &CustomerPayload) -> Result<CustomerRecord, AppError> {
    let mut errors = match payload.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(e) => e,
    };

    require_text(&mut errors, "company_name", &payload.company_name, "Company name is required");
    require_text(&mut errors, "owner_name", &payload.owner_name, "Owner name is required");
    require_text(&mut errors, "city", &payload.city, "City is required");
    require_text(&mut errors, "address", &payload.address, "Address is required");

    if payload.phone_number.trim().is_empty() {
        add_error(&mut errors, "phone_number", "required", "Phone number is required");
    } else if !phone_is_valid(&payload.phone_number) {
        add_error(&mut errors, "phone_number", "invalid_phone", "Please enter a valid 10-digit phone number");
    }

    if payload.amc_amount <= Decimal::ZERO {
        add_error(&mut errors, "amc_amount", "must_be_positive", "AMC amount must be greater than 0");
    }

    let amc_end_date = contract_end_date(payload.amc_start_date);
    if amc_end_date.is_none() {
        add_error(&mut errors, "amc_start_date", "invalid_date", "AMC start date is out of range");
    }

    let status = payload.status;
    if status.requires_invoice() {
        let number = payload.invoice_number.as_deref().unwrap_or_default();
        require_text(&mut errors, "invoice_number", number, "Invoice number is required");
        if payload.invoice_date.is_none() {
            add_error(&mut errors, "invoice_date", "required", "Invoice date is required");
        }
        if payload.invoice_amount.map_or(true, |a| a <= Decimal::ZERO) {
            add_error(&mut errors, "invoice_amount", "must_be_positive", "Invoice amount must be greater than 0");
        }
    }

    let amc_end_date = match amc_end_date {
        Some(end) if errors.errors().is_empty() => end,
        _ => return Err(errors.into()),
    };

    let keep_invoice = status.requires_invoice();
    Ok(CustomerRecord {
        company_name: payload.company_name.trim().to_string(),
        owner_name: payload.owner_name.trim().to_string(),
        city: payload.city.trim().to_string(),
        address: payload.address.trim().to_string(),
        phone_number: payload.phone_number.trim().to_string(),
        amc_start_date: payload.amc_start_date,
        amc_end_date,
        amc_type: payload.amc_type,
        amc_amount: payload.amc_amount,
        product_description: payload.product_description.trim().to_string(),
        invoice_number: payload
            .invoice_number
            .as_deref()
            .map(|n| n.trim().to_string())
            .filter(|_| keep_invoice),
        invoice_date: payload.invoice_date.filter(|_| keep_invoice),
        invoice_amount: payload.invoice_amount.filter(|_| keep_invoice),
        status,
    })
}

/// Ciclo de vida: a transição parte do status efetivo (active vencido é expired).
/// Devolve esse status de origem.
pub fn check_transition(current: &Customer, target: ContractStatus, today: NaiveDate) -> Result<ContractStatus, AppError> {
    let from = effective_status(current.status, current.amc_end_date, today);
    if !from.can_transition_to(target) {
        return Err(AppError::InvalidStatusTransition { from, to: target });
    }
    Ok(from)
}

/// Novo período de um ano começando hoje.
/// Um contrato ativo só renova no último dia do período pago, para não
/// cortar as visitas que ainda faltam.
pub fn renewed_record(
    current: Customer,
    today: NaiveDate,
    payload: &RenewContractPayload,
) -> Result<CustomerRecord, AppError> {
    let status = effective_status(current.status, current.amc_end_date, today);
    if !matches!(status, ContractStatus::Active | ContractStatus::Expired) {
        return Err(AppError::RenewalNotAllowed(status));
    }
    if current.amc_end_date > today {
        return Err(AppError::RenewalTooEarly(current.amc_end_date));
    }

    let mut errors = match payload.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(e) => e,
    };
    require_text(&mut errors, "invoice_number", &payload.invoice_number, "Invoice number is required");
    if payload.invoice_amount <= Decimal::ZERO {
        add_error(&mut errors, "invoice_amount", "must_be_positive", "Invoice amount must be greater than 0");
    }
    if payload.amc_amount.is_some_and(|a| a <= Decimal::ZERO) {
        add_error(&mut errors, "amc_amount", "must_be_positive", "AMC amount must be greater than 0");
    }
    if !errors.errors().is_empty() {
        return Err(errors.into());
    }

    let start = today;
    let end = contract_end_date(start).ok_or_else(|| {
        AppError::ValidationError(field_error("amc_start_date", "invalid_date", "Renewal date is out of range"))
    })?;

    let mut record = CustomerRecord::from(current);
    record.amc_start_date = start;
    record.amc_end_date = end;
    record.amc_type = payload.amc_type.unwrap_or(record.amc_type);
    record.amc_amount = payload.amc_amount.unwrap_or(record.amc_amount);
    record.invoice_number = Some(payload.invoice_number.trim().to_string());
    record.invoice_date = Some(payload.invoice_date);
    record.invoice_amount = Some(payload.invoice_amount);
    record.status = ContractStatus::Active;

    Ok(record)
}

/// Data da visita: padrão hoje, nunca no futuro nem antes do início.
pub fn check_visit(customer: &Customer, today: NaiveDate, requested: Option<NaiveDate>) -> Result<NaiveDate, AppError> {
    let status = effective_status(customer.status, customer.amc_end_date, today);
    if status != ContractStatus::Active {
        return Err(AppError::ContractNotActive(status));
    }

    let serviced_on = requested.unwrap_or(today);
    if serviced_on > today {
        return Err(field_error("serviced_on", "future_date", "Service date cannot be in the future").into());
    }
    if serviced_on < customer.amc_start_date {
        return Err(field_error("serviced_on", "before_start", "Service date is before the contract start").into());
    }

    Ok(serviced_on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::{
        fixtures::{customer, date},
        AmcType,
    };

    fn payload(status: ContractStatus) -> CustomerPayload {
        CustomerPayload {
            company_name: "  Sharma Textiles ".into(),
            owner_name: "Rakesh Sharma".into(),
            city: "Pune".into(),
            address: "12 MG Road".into(),
            phone_number: "(987) 654-3210".into(),
            amc_start_date: date(2025, 3, 31),
            amc_type: AmcType::B,
            amc_amount: Decimal::new(12000, 0),
            product_description: String::new(),
            invoice_number: Some("INV-1".into()),
            invoice_date: Some(date(2025, 3, 31)),
            invoice_amount: Some(Decimal::new(12000, 0)),
            status,
        }
    }

    fn field_codes(err: AppError) -> Vec<String> {
        match err {
            AppError::ValidationError(errors) => {
                let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                fields
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn builds_normalized_record() {
        let record = build_record(&payload(ContractStatus::Active)).unwrap();
        assert_eq!(record.company_name, "Sharma Textiles");
        assert_eq!(record.amc_end_date, date(2026, 3, 31));
        assert_eq!(record.invoice_number.as_deref(), Some("INV-1"));
    }

    #[test]
    fn proposed_contract_drops_invoice() {
        let mut p = payload(ContractStatus::Proposed);
        p.invoice_date = None;
        let record = build_record(&p).unwrap();
        assert_eq!(record.invoice_number, None);
        assert_eq!(record.invoice_date, None);
        assert_eq!(record.invoice_amount, None);
    }

    #[test]
    fn invoice_required_outside_proposed() {
        let mut p = payload(ContractStatus::Active);
        p.invoice_number = Some("   ".into());
        p.invoice_date = None;
        p.invoice_amount = Some(Decimal::ZERO);

        let fields = field_codes(build_record(&p).unwrap_err());
        assert_eq!(fields, vec!["invoice_amount", "invoice_date", "invoice_number"]);
    }

    #[test]
    fn required_fields_and_phone() {
        let mut p = payload(ContractStatus::Proposed);
        p.company_name = " ".into();
        p.city = String::new();
        p.phone_number = "12345".into();
        p.amc_amount = Decimal::ZERO;

        let fields = field_codes(build_record(&p).unwrap_err());
        assert_eq!(fields, vec!["amc_amount", "city", "company_name", "phone_number"]);
    }

    #[test]
    fn phone_digits_are_counted_after_stripping() {
        assert!(phone_is_valid("98765 43210"));
        assert!(phone_is_valid("+(987)-654-3210"));
        assert!(!phone_is_valid("+91 98765 43210"));
        assert!(!phone_is_valid("987654321"));
    }

    fn renew_payload() -> RenewContractPayload {
        RenewContractPayload {
            invoice_number: "INV-2".into(),
            invoice_date: date(2026, 3, 25),
            invoice_amount: Decimal::new(13000, 0),
            amc_amount: Some(Decimal::new(13000, 0)),
            amc_type: None,
        }
    }

    fn apply(mut c: Customer, record: CustomerRecord) -> Customer {
        c.amc_start_date = record.amc_start_date;
        c.amc_end_date = record.amc_end_date;
        c.amc_type = record.amc_type;
        c.status = record.status;
        c
    }

    #[test]
    fn renewal_waits_for_the_paid_term_to_end() {
        let current = customer("Acme", AmcType::A, date(2025, 3, 31), ContractStatus::Active);
        let today = date(2026, 3, 25);

        let err = renewed_record(current.clone(), today, &renew_payload()).unwrap_err();
        assert!(matches!(err, AppError::RenewalTooEarly(end) if end == date(2026, 3, 31)));

        // O período atual segue intacto: agenda e visitas continuam
        assert_eq!(derive_view(current.clone(), today, false).next_service_date, Some(date(2026, 3, 30)));
        assert_eq!(check_visit(&current, today, None).unwrap(), today);
    }

    #[test]
    fn renewal_on_last_day_keeps_service_running() {
        let current = customer("Acme", AmcType::A, date(2025, 3, 31), ContractStatus::Active);
        let today = date(2026, 3, 31);

        let record = renewed_record(current.clone(), today, &renew_payload()).unwrap();
        assert_eq!(record.amc_start_date, today);
        assert_eq!(record.amc_end_date, date(2027, 3, 31));
        assert_eq!(record.status, ContractStatus::Active);
        assert_eq!(record.amc_type, AmcType::A);
        assert_eq!(record.invoice_number.as_deref(), Some("INV-2"));
        assert_eq!(record.amc_amount, Decimal::new(13000, 0));

        let renewed = apply(current, record);
        assert_eq!(check_visit(&renewed, today, None).unwrap(), today);
        assert_eq!(derive_view(renewed.clone(), today, false).next_service_date, Some(today));
        // Visita já feita hoje: a próxima é na semana seguinte
        assert_eq!(derive_view(renewed, today, true).next_service_date, Some(date(2026, 4, 7)));
    }

    #[test]
    fn expired_renewal_starts_today() {
        let current = customer("Acme", AmcType::B, date(2024, 1, 10), ContractStatus::Active);
        let mut p = renew_payload();
        p.amc_type = Some(AmcType::C);
        let record = renewed_record(current, date(2025, 2, 1), &p).unwrap();

        assert_eq!(record.amc_start_date, date(2025, 2, 1));
        assert_eq!(record.amc_end_date, date(2026, 2, 1));
        assert_eq!(record.amc_type, AmcType::C);
    }

    #[test]
    fn cancelled_and_proposed_cannot_renew() {
        for status in [ContractStatus::Cancelled, ContractStatus::Proposed, ContractStatus::Suspended] {
            let current = customer("Acme", AmcType::B, date(2025, 1, 10), status);
            let err = renewed_record(current, date(2025, 2, 1), &renew_payload()).unwrap_err();
            assert!(matches!(err, AppError::RenewalNotAllowed(s) if s == status));
        }
    }

    #[test]
    fn lifecycle_uses_effective_status() {
        // Gravado como active, mas venceu em 10/01/2025
        let lapsed = customer("Acme", AmcType::B, date(2024, 1, 10), ContractStatus::Active);
        let today = date(2025, 2, 1);

        let err = check_transition(&lapsed, ContractStatus::Active, today).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStatusTransition { from: ContractStatus::Expired, to: ContractStatus::Active }
        ));
        assert_eq!(check_transition(&lapsed, ContractStatus::Expired, today).unwrap(), ContractStatus::Expired);
        assert!(check_transition(&lapsed, ContractStatus::Suspended, today).is_err());

        // Dentro do período o mesmo contrato ainda é active
        let running_day = date(2024, 6, 1);
        assert_eq!(check_transition(&lapsed, ContractStatus::Active, running_day).unwrap(), ContractStatus::Active);
        assert_eq!(check_transition(&lapsed, ContractStatus::Suspended, running_day).unwrap(), ContractStatus::Active);
    }

    #[test]
    fn visit_date_rules() {
        let c = customer("Acme", AmcType::A, date(2025, 1, 6), ContractStatus::Active);
        let today = date(2025, 3, 17);

        assert_eq!(check_visit(&c, today, None).unwrap(), today);
        assert_eq!(check_visit(&c, today, Some(date(2025, 3, 10))).unwrap(), date(2025, 3, 10));
        assert_eq!(field_codes(check_visit(&c, today, Some(date(2025, 3, 18))).unwrap_err()), vec!["serviced_on"]);
        assert_eq!(field_codes(check_visit(&c, today, Some(date(2025, 1, 5))).unwrap_err()), vec!["serviced_on"]);
    }

    #[test]
    fn visits_need_an_active_contract() {
        let expired = customer("Acme", AmcType::A, date(2023, 1, 6), ContractStatus::Active);
        let err = check_visit(&expired, date(2025, 3, 17), None).unwrap_err();
        assert!(matches!(err, AppError::ContractNotActive(ContractStatus::Expired)));

        let proposed = customer("Acme", AmcType::A, date(2025, 1, 6), ContractStatus::Proposed);
        assert!(check_visit(&proposed, date(2025, 3, 17), None).is_err());
    }

    #[test]
    fn derive_all_marks_serviced_customers() {
        let today = date(2025, 3, 17); // segunda
        let a = customer("A", AmcType::A, date(2025, 1, 6), ContractStatus::Active);
        let b = customer("B", AmcType::A, date(2025, 1, 6), ContractStatus::Active);
        let serviced: HashSet<Uuid> = [a.id].into_iter().collect();

        let views = derive_all(vec![a, b], today, &serviced);
        assert_eq!(views[0].next_service_date, Some(date(2025, 3, 24)));
        assert_eq!(views[1].next_service_date, Some(today));
    }
}
