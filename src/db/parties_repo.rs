// src/db/parties_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::parties::{Customer, Operator, Supplier},
};

#[derive(Clone)]
pub struct PartiesRepository {
    pool: PgPool,
}

impl PartiesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Fornecedores
    // ---

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        name: &str,
        tax_id: &str,
        phone: &str,
        email: &str,
        address: &str,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, tax_id, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(tax_id)
        .bind(phone)
        .bind(email)
        .bind(address)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::TaxIdAlreadyExists(tax_id.to_string());
                }
            }
            e.into()
        })
    }

    /// Fornecedores ativos, com busca opcional por nome ou CNPJ.
    pub async fn get_all_suppliers<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = search.map(|s| format!("%{}%", s));
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT * FROM suppliers
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR name ILIKE $1 OR tax_id ILIKE $1)
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(executor)
        .await?;
        Ok(suppliers)
    }

    pub async fn get_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(supplier)
    }

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        tax_id: &str,
        phone: &str,
        email: &str,
        address: &str,
        is_active: bool,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $2, tax_id = $3, phone = $4, email = $5, address = $6, is_active = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(tax_id)
        .bind(phone)
        .bind(email)
        .bind(address)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::TaxIdAlreadyExists(tax_id.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn delete_supplier<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Clientes
    // ---

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        name: &str,
        tax_id: &str,
        phone: &str,
        email: Option<&str>,
        address: &str,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, tax_id, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(tax_id)
        .bind(phone)
        .bind(email)
        .bind(address)
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    /// Clientes ativos, com busca opcional por nome ou CPF/CNPJ.
    pub async fn get_all_customers<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = search.map(|s| format!("%{}%", s));
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR name ILIKE $1 OR tax_id ILIKE $1)
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(executor)
        .await?;
        Ok(customers)
    }

    pub async fn get_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        tax_id: &str,
        phone: &str,
        email: Option<&str>,
        address: &str,
        is_active: bool,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, tax_id = $3, phone = $4, email = $5, address = $6, is_active = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(tax_id)
        .bind(phone)
        .bind(email)
        .bind(address)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Operadores
    // ---

    pub async fn create_operator<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Operator, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let operator =
            sqlx::query_as::<_, Operator>("INSERT INTO operators (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(executor)
                .await?;
        Ok(operator)
    }

    pub async fn get_all_operators<'e, E>(&self, executor: E) -> Result<Vec<Operator>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let operators = sqlx::query_as::<_, Operator>(
            "SELECT * FROM operators WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(operators)
    }

    pub async fn get_operator<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Operator>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let operator = sqlx::query_as::<_, Operator>("SELECT * FROM operators WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(operator)
    }
}
