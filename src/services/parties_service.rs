// src/services/parties_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PartiesRepository,
    models::parties::{Customer, Operator, Supplier},
};

// Cadastros puros: o service só traduz "não achou" em erro de domínio.

#[derive(Clone)]
pub struct PartiesService {
    repo: PartiesRepository,
}

impl PartiesService {
    pub fn new(repo: PartiesRepository) -> Self {
        Self { repo }
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
        self.repo
            .create_supplier(executor, name, tax_id, phone, email, address)
            .await
    }

    pub async fn get_all_suppliers<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_suppliers(executor, search).await
    }

    pub async fn get_supplier<'e, E>(&self, executor: E, id: Uuid) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_supplier(executor, id)
            .await?
            .ok_or(AppError::NotFound("Fornecedor"))
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
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_supplier(executor, id, name, tax_id, phone, email, address, is_active)
            .await?
            .ok_or(AppError::NotFound("Fornecedor"))
    }

    pub async fn delete_supplier<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.repo.delete_supplier(executor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Fornecedor"))
        }
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
        self.repo
            .create_customer(executor, name, tax_id, phone, email, address)
            .await
    }

    pub async fn get_all_customers<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_customers(executor, search).await
    }

    pub async fn get_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_customer(executor, id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
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
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_customer(executor, id, name, tax_id, phone, email, address, is_active)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.repo.delete_customer(executor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Cliente"))
        }
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
        self.repo.create_operator(executor, name).await
    }

    pub async fn get_all_operators<'e, E>(&self, executor: E) -> Result<Vec<Operator>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_operators(executor).await
    }
}
