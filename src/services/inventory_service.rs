// src/services/inventory_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::inventory_repo::{InventoryRepository, MovementFilter},
    models::{
        dashboard::MovementKindTotals,
        inventory::{Category, MovementKind, Product, StockMovement},
    },
};

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository) -> Self {
        Self { repo }
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
        self.repo.create_category(executor, name, description).await
    }

    pub async fn get_all_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_categories(executor).await
    }

    pub async fn get_category<'e, E>(&self, executor: E, id: Uuid) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_category(executor, id)
            .await?
            .ok_or(AppError::NotFound("Categoria"))
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_category(executor, id, name, description)
            .await?
            .ok_or(AppError::NotFound("Categoria"))
    }

    pub async fn delete_category<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.repo.delete_category(executor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Categoria"))
        }
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
        initial_quantity: i32,
        unit: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.repo
            .get_category(&mut *tx, category_id)
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;

        let product = self
            .repo
            .create_product(
                &mut *tx,
                category_id,
                code,
                name,
                sale_price,
                cost_price,
                minimum_stock,
                initial_quantity,
                unit,
            )
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn get_all_products<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_products(executor, search, category_id).await
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_product(executor, id)
            .await?
            .ok_or(AppError::NotFound("Produto"))
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
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_product(
                executor,
                id,
                category_id,
                code,
                name,
                sale_price,
                cost_price,
                minimum_stock,
                unit,
                is_active,
            )
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.repo.delete_product(executor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Produto"))
        }
    }

    // ---
    // Movimentações
    // ---

    /// Registra uma movimentação manual e aplica o efeito no saldo do
    /// produto, tudo na mesma transação. Saída sem saldo falha sem gravar
    /// nada. O saldo novo vem da regra pura em MovementKind.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        kind: MovementKind,
        quantity: i32,
        unit_price: Option<Decimal>,
        payment_method_id: Option<Uuid>,
        note: Option<&str>,
        operator_id: Uuid,
        moved_at: Option<DateTime<Utc>>,
    ) -> Result<(StockMovement, Product), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut product = self
            .repo
            .get_product_for_update(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        let new_quantity = kind
            .resulting_quantity(product.current_quantity, quantity)
            .ok_or_else(|| {
                AppError::InsufficientStock(format!(
                    "{} (disponível {}, solicitado {})",
                    product.code, product.current_quantity, quantity
                ))
            })?;

        self.repo
            .set_product_quantity(&mut *tx, product.id, new_quantity)
            .await?;

        let movement = self
            .repo
            .insert_movement(
                &mut *tx,
                product_id,
                kind,
                quantity,
                unit_price,
                payment_method_id,
                None, // movimentação manual não pertence a venda
                operator_id,
                note,
                moved_at,
            )
            .await?;

        tx.commit().await?;

        product.current_quantity = new_quantity;
        Ok((movement, product))
    }

    /// Estorna e remove uma movimentação: saída devolve ao estoque, entrada
    /// retira. Movimentações geradas por venda só caem junto com o
    /// cancelamento da venda (correlação via sale_id).
    pub async fn delete_movement<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let movement = self
            .repo
            .get_movement(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Movimentação"))?;

        if movement.sale_id.is_some() {
            return Err(AppError::MovementBoundToSale);
        }

        let product = self
            .repo
            .get_product_for_update(&mut *tx, movement.product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        let new_quantity = movement
            .kind
            .reversed_quantity(product.current_quantity, movement.quantity)
            .ok_or_else(|| {
                AppError::InsufficientStock(format!(
                    "estornar a entrada deixaria {} com saldo negativo",
                    product.code
                ))
            })?;

        if new_quantity != product.current_quantity {
            self.repo
                .set_product_quantity(&mut *tx, product.id, new_quantity)
                .await?;
        }

        self.repo.delete_movement_row(&mut *tx, movement.id).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_movement<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_movement(executor, id)
            .await?
            .ok_or(AppError::NotFound("Movimentação"))
    }

    /// Listagem filtrada + totais por tipo sobre o mesmo recorte.
    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        filter: &MovementFilter,
    ) -> Result<(Vec<StockMovement>, Vec<MovementKindTotals>), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let movements = self.repo.list_movements(&mut *tx, filter).await?;
        let totals = self.repo.movement_totals(&mut *tx, filter).await?;
        tx.commit().await?;
        Ok((movements, totals))
    }
}
