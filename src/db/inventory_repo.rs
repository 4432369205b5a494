// src/db/inventory_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::MovementKindTotals,
        inventory::{Category, MovementKind, Product, StockMovement},
    },
};

/// Filtros da listagem de movimentações (datas inclusivas).
#[derive(Debug, Default, Clone)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub kind: Option<MovementKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Categorias
    // ---

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(category)
    }

    pub async fn get_all_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(categories)
    }

    pub async fn get_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn delete_category<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Produtos
    // ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        category_id: Uuid,
        code: &str,
        name: &str,
        sale_price: Decimal,
        cost_price: Decimal,
        minimum_stock: i32,
        current_quantity: i32,
        unit: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (category_id, code, name, sale_price, cost_price, minimum_stock, current_quantity, unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(category_id)
        .bind(code)
        .bind(name)
        .bind(sale_price)
        .bind(cost_price)
        .bind(minimum_stock)
        .bind(current_quantity)
        .bind(unit)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::CodeAlreadyExists(code.to_string());
                }
            }
            e.into()
        })
    }

    /// Lista produtos ativos, com busca opcional por nome/código e filtro de
    /// categoria (a tela de catálogo da loja).
    pub async fn get_all_products<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = search.map(|s| format!("%{}%", s));
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .bind(category_id)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn get_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Busca com lock de linha. Toda mutação de saldo passa por aqui para a
    /// leitura e a escrita da quantidade ficarem na mesma transação.
    pub async fn get_product_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        category_id: Uuid,
        code: &str,
        name: &str,
        sale_price: Decimal,
        cost_price: Decimal,
        minimum_stock: i32,
        unit: &str,
        is_active: bool,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $2, code = $3, name = $4, sale_price = $5,
                cost_price = $6, minimum_stock = $7, unit = $8, is_active = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(category_id)
        .bind(code)
        .bind(name)
        .bind(sale_price)
        .bind(cost_price)
        .bind(minimum_stock)
        .bind(unit)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::CodeAlreadyExists(code.to_string());
                }
            }
            e.into()
        })
    }

    /// Grava o novo saldo calculado pelo service. A quantidade nunca é
    /// alterada por fora (o CHECK do banco segura qualquer escorregada).
    pub async fn set_product_quantity<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quantity: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE products SET current_quantity = $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Movimentações (livro-razão)
    // ---

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        kind: MovementKind,
        quantity: i32,
        unit_price: Option<Decimal>,
        payment_method_id: Option<Uuid>,
        sale_id: Option<Uuid>,
        operator_id: Uuid,
        note: Option<&str>,
        moved_at: Option<DateTime<Utc>>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (product_id, kind, quantity, unit_price, payment_method_id, sale_id, operator_id, note, moved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, now()))
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(kind)
        .bind(quantity)
        .bind(unit_price)
        .bind(payment_method_id)
        .bind(sale_id)
        .bind(operator_id)
        .bind(note)
        .bind(moved_at)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    pub async fn get_movement<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement =
            sqlx::query_as::<_, StockMovement>("SELECT * FROM stock_movements WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(movement)
    }

    pub async fn delete_movement_row<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Remove as saídas geradas por uma venda (estorno do cancelamento).
    pub async fn delete_movements_by_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM stock_movements WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::movement_kind IS NULL OR kind = $2)
              AND ($3::date IS NULL OR moved_at::date >= $3)
              AND ($4::date IS NULL OR moved_at::date <= $4)
            ORDER BY moved_at DESC
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.kind)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    /// Totais por tipo sobre o mesmo recorte da listagem (quantidade e valor,
    /// contando o valor apenas quando a movimentação tem preço unitário).
    pub async fn movement_totals<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
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
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::movement_kind IS NULL OR kind = $2)
              AND ($3::date IS NULL OR moved_at::date >= $3)
              AND ($4::date IS NULL OR moved_at::date <= $4)
            GROUP BY kind
            ORDER BY kind
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.kind)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(executor)
        .await?;
        Ok(totals)
    }
}
