// src/db/sales_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Payment, PaymentMethod, Sale, SaleItem, SaleStatus},
};

/// Filtros da listagem de vendas.
#[derive(Debug, Default, Clone)]
pub struct SaleFilter {
    pub status: Option<SaleStatus>,
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Formas de Pagamento
    // ---

    pub async fn create_payment_method<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        receipt_term_days: i32,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (name, description, receipt_term_days)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(receipt_term_days)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::MethodNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn get_all_payment_methods<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(methods)
    }

    pub async fn get_payment_method<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let method =
            sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(method)
    }

    pub async fn update_payment_method<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        receipt_term_days: i32,
        is_active: bool,
    ) -> Result<Option<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentMethod>(
            r#"
            UPDATE payment_methods
            SET name = $2, description = $3, receipt_term_days = $4, is_active = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(receipt_term_days)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::MethodNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn delete_payment_method<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Numeração
    // ---

    /// Maior número de venda já emitido com o prefixo padrão. A ordenação
    /// lexicográfica bate com a numérica porque o sufixo tem largura fixa.
    pub async fn max_sale_number<'e, E>(
        &self,
        executor: E,
        prefix: &str,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT number FROM sales WHERE number LIKE $1 || '%' ORDER BY number DESC LIMIT 1",
        )
        .bind(prefix)
        .fetch_optional(executor)
        .await?;
        Ok(number)
    }

    pub async fn sale_number_exists<'e, E>(
        &self,
        executor: E,
        number: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sales WHERE number = $1)",
        )
        .bind(number)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    // ---
    // Vendas
    // ---

    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        number: &str,
        customer_id: Option<Uuid>,
        payment_method_id: Option<Uuid>,
        operator_id: Uuid,
        status: SaleStatus,
        note: Option<&str>,
        sold_at: Option<DateTime<Utc>>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (number, customer_id, payment_method_id, operator_id, status, note, sold_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now()))
            RETURNING *
            "#,
        )
        .bind(number)
        .bind(customer_id)
        .bind(payment_method_id)
        .bind(operator_id)
        .bind(status)
        .bind(note)
        .bind(sold_at)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    pub async fn get_sale<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    /// Lock de linha para registrar pagamentos e cancelar sem corrida entre
    /// requisições simultâneas sobre a mesma venda.
    pub async fn get_sale_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        filter: &SaleFilter,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE ($1::sale_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::date IS NULL OR sold_at::date >= $3)
              AND ($4::date IS NULL OR sold_at::date <= $4)
            ORDER BY sold_at DESC
            "#,
        )
        .bind(filter.status)
        .bind(filter.customer_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(executor)
        .await?;
        Ok(sales)
    }

    pub async fn update_sale_header<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        customer_id: Option<Uuid>,
        payment_method_id: Option<Uuid>,
        note: Option<&str>,
        sold_at: DateTime<Utc>,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET customer_id = $2, payment_method_id = $3, note = $4, sold_at = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .bind(payment_method_id)
        .bind(note)
        .bind(sold_at)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    pub async fn set_sale_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: SaleStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE sales SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // Itens
    // ---

    pub async fn insert_sale_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_sale_items<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = $1 ORDER BY created_at ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Total da venda (soma dos itens). Zero quando não há itens.
    pub async fn sum_items_value<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantity * unit_price), 0) FROM sale_items WHERE sale_id = $1",
        )
        .bind(sale_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // ---
    // Pagamentos
    // ---

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        payment_method_id: Uuid,
        operator_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (sale_id, payment_method_id, operator_id, amount, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(payment_method_id)
        .bind(operator_id)
        .bind(amount)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn get_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE sale_id = $1 ORDER BY paid_at ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn delete_payment_row<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Total já recebido pela venda. Zero quando não há pagamentos.
    pub async fn sum_payments<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE sale_id = $1",
        )
        .bind(sale_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
