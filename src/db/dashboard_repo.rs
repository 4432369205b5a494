// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, MovementKindTotals, TopProductEntry},
        inventory::{Product, StockMovement},
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo Geral (snapshot consistente: tudo na mesma transação)
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        open_receivables: Decimal,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A. Produtos ativos
        let total_products = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE is_active = TRUE",
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Produtos no alerta de reposição
        let low_stock_products = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE is_active = TRUE AND current_quantity <= minimum_stock
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Valor imobilizado em estoque (quantidade x custo)
        let stock_value = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(current_quantity * cost_price), 0)
            FROM products
            WHERE is_active = TRUE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            total_products,
            low_stock_products,
            stock_value,
            open_receivables,
        })
    }

    // 2. Últimas movimentações
    pub async fn get_recent_movements<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements ORDER BY moved_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    // 3. Produtos abaixo do mínimo (lista curta dos cards)
    pub async fn get_low_stock_products<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = TRUE AND current_quantity <= minimum_stock
            ORDER BY current_quantity ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    // 4. Movimentações dos últimos 7 dias, por tipo
    pub async fn get_week_movements<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<MovementKindTotals>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, MovementKindTotals>(
            r#"
            SELECT
                kind,
                COUNT(*) AS movement_count,
                SUM(quantity)::bigint AS total_quantity,
                SUM(quantity * COALESCE(unit_price, 0)) AS total_value
            FROM stock_movements
            WHERE moved_at >= now() - INTERVAL '7 days'
            GROUP BY kind
            ORDER BY kind
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(totals)
    }

    // 5. Top produtos mais movimentados na semana
    pub async fn get_top_products<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<TopProductEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, TopProductEntry>(
            r#"
            SELECT
                p.name AS product_name,
                COUNT(*) AS movement_count
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            WHERE m.moved_at >= now() - INTERVAL '7 days'
            GROUP BY p.id, p.name
            ORDER BY movement_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }
}
