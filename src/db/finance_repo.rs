// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Receivable, ReceivablePayment, ReceivableStatus},
};

/// Filtros da listagem de títulos.
#[derive(Debug, Default, Clone)]
pub struct ReceivableFilter {
    pub status: Option<ReceivableStatus>,
    pub customer_id: Option<Uuid>,
    pub only_overdue: bool,
}

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Títulos a receber
    // ---

    pub async fn insert_receivable<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        sale_id: Option<Uuid>,
        operator_id: Uuid,
        total: Decimal,
        due_date: NaiveDate,
        note: Option<&str>,
    ) -> Result<Receivable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // paid nasce zerado; o status default OPEN bate com for_amounts(total, 0)
        let receivable = sqlx::query_as::<_, Receivable>(
            r#"
            INSERT INTO receivables (customer_id, sale_id, operator_id, total, due_date, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(sale_id)
        .bind(operator_id)
        .bind(total)
        .bind(due_date)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(receivable)
    }

    /// Espelha os totais de uma venda no título ligado a ela. Cria o título
    /// na primeira vez e atualiza nas seguintes (o UNIQUE em sale_id garante
    /// um título por venda).
    pub async fn upsert_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        customer_id: Uuid,
        operator_id: Uuid,
        total: Decimal,
        paid: Decimal,
        status: ReceivableStatus,
        due_date: NaiveDate,
    ) -> Result<Receivable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable = sqlx::query_as::<_, Receivable>(
            r#"
            INSERT INTO receivables (customer_id, sale_id, operator_id, total, paid, status, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (sale_id)
            DO UPDATE SET
                customer_id = EXCLUDED.customer_id,
                total = EXCLUDED.total,
                paid = EXCLUDED.paid,
                status = EXCLUDED.status,
                due_date = EXCLUDED.due_date
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(sale_id)
        .bind(operator_id)
        .bind(total)
        .bind(paid)
        .bind(status)
        .bind(due_date)
        .fetch_one(executor)
        .await?;
        Ok(receivable)
    }

    pub async fn get_receivable<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Receivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable = sqlx::query_as::<_, Receivable>("SELECT * FROM receivables WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(receivable)
    }

    pub async fn get_receivable_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Receivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable =
            sqlx::query_as::<_, Receivable>("SELECT * FROM receivables WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(receivable)
    }

    pub async fn get_by_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Option<Receivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable =
            sqlx::query_as::<_, Receivable>("SELECT * FROM receivables WHERE sale_id = $1")
                .bind(sale_id)
                .fetch_optional(executor)
                .await?;
        Ok(receivable)
    }

    pub async fn update_amounts<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        paid: Decimal,
        status: ReceivableStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE receivables SET paid = $2, status = $3 WHERE id = $1")
            .bind(id)
            .bind(paid)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_receivable<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM receivables WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_receivables<'e, E>(
        &self,
        executor: E,
        filter: &ReceivableFilter,
    ) -> Result<Vec<Receivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivables = sqlx::query_as::<_, Receivable>(
            r#"
            SELECT * FROM receivables
            WHERE ($1::receivable_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND (NOT $3::boolean OR (due_date < CURRENT_DATE AND status <> 'SETTLED'))
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(filter.status)
        .bind(filter.customer_id)
        .bind(filter.only_overdue)
        .fetch_all(executor)
        .await?;
        Ok(receivables)
    }

    /// Saldo pendente somado dos títulos em aberto (cards do dashboard).
    pub async fn sum_open_balance<'e, E>(&self, executor: E) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total - paid), 0)
            FROM receivables
            WHERE status IN ('OPEN', 'PARTIAL')
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    /// Número da venda ligada a um título (para a tela de detalhe).
    pub async fn get_sale_number<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>("SELECT number FROM sales WHERE id = $1")
            .bind(sale_id)
            .fetch_optional(executor)
            .await?;
        Ok(number)
    }

    // ---
    // Pagamentos de títulos avulsos
    // ---

    pub async fn insert_receivable_payment<'e, E>(
        &self,
        executor: E,
        receivable_id: Uuid,
        payment_method_id: Uuid,
        operator_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<ReceivablePayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, ReceivablePayment>(
            r#"
            INSERT INTO receivable_payments (receivable_id, payment_method_id, operator_id, amount, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(receivable_id)
        .bind(payment_method_id)
        .bind(operator_id)
        .bind(amount)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn list_receivable_payments<'e, E>(
        &self,
        executor: E,
        receivable_id: Uuid,
    ) -> Result<Vec<ReceivablePayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, ReceivablePayment>(
            "SELECT * FROM receivable_payments WHERE receivable_id = $1 ORDER BY paid_at ASC",
        )
        .bind(receivable_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }
}
