// src/db/customer_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::contract::{AmcType, ContractStatus, Customer},
};

const CUSTOMER_COLUMNS: &str = r#"
    id, user_id, company_name, owner_name, city, address, phone_number,
    amc_start_date, amc_end_date, amc_type, amc_amount, product_description,
    invoice_number, invoice_date, invoice_amount, status,
    created_at, updated_at
"#;

/// Dados já validados e normalizados, prontos para gravar.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub company_name: String,
    pub owner_name: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
    pub amc_start_date: NaiveDate,
    pub amc_end_date: NaiveDate,
    pub amc_type: AmcType,
    pub amc_amount: Decimal,
    pub product_description: String,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_amount: Option<Decimal>,
    pub status: ContractStatus,
}

impl From<Customer> for CustomerRecord {
    fn from(c: Customer) -> Self {
        Self {
            company_name: c.company_name,
            owner_name: c.owner_name,
            city: c.city,
            address: c.address,
            phone_number: c.phone_number,
            amc_start_date: c.amc_start_date,
            amc_end_date: c.amc_end_date,
            amc_type: c.amc_type,
            amc_amount: c.amc_amount,
            product_description: c.product_description,
            invoice_number: c.invoice_number,
            invoice_date: c.invoice_date,
            invoice_amount: c.invoice_amount,
            status: c.status,
        }
    }
}

// Sem pool próprio: quem chama decide se é pool, conexão ou transação.
#[derive(Clone, Default)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        record: &CustomerRecord,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO customers (
                user_id, company_name, owner_name, city, address, phone_number,
                amc_start_date, amc_end_date, amc_type, amc_amount, product_description,
                invoice_number, invoice_date, invoice_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .bind(&record.company_name)
            .bind(&record.owner_name)
            .bind(&record.city)
            .bind(&record.address)
            .bind(&record.phone_number)
            .bind(record.amc_start_date)
            .bind(record.amc_end_date)
            .bind(record.amc_type)
            .bind(record.amc_amount)
            .bind(&record.product_description)
            .bind(&record.invoice_number)
            .bind(record.invoice_date)
            .bind(record.invoice_amount)
            .bind(record.status)
            .fetch_one(executor)
            .await?;

        Ok(customer)
    }

    /// Todos os clientes do usuário, mais recentes primeiro
    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        Ok(customers)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND user_id = $2");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(customer)
    }

    /// Substitui o registro inteiro (o formulário sempre manda tudo)
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
        record: &CustomerRecord,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE customers SET
                company_name = $3,
                owner_name = $4,
                city = $5,
                address = $6,
                phone_number = $7,
                amc_start_date = $8,
                amc_end_date = $9,
                amc_type = $10,
                amc_amount = $11,
                product_description = $12,
                invoice_number = $13,
                invoice_date = $14,
                invoice_amount = $15,
                status = $16,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&record.company_name)
            .bind(&record.owner_name)
            .bind(&record.city)
            .bind(&record.address)
            .bind(&record.phone_number)
            .bind(record.amc_start_date)
            .bind(record.amc_end_date)
            .bind(record.amc_type)
            .bind(record.amc_amount)
            .bind(&record.product_description)
            .bind(&record.invoice_number)
            .bind(record.invoice_date)
            .bind(record.invoice_amount)
            .bind(record.status)
            .fetch_optional(executor)
            .await?;

        Ok(customer)
    }

    /// Retorna `false` se não havia nada para apagar
    pub async fn delete<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
