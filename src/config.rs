// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        DashboardRepository, FinanceRepository, InventoryRepository, PartiesRepository,
        SalesRepository,
    },
    services::{
        DashboardService, FinanceService, InventoryService, PartiesService, SalesService,
    },
};

// O estado compartilhado, acessível em toda a aplicação.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub inventory_service: InventoryService,
    pub parties_service: PartiesService,
    pub sales_service: SalesService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let parties_repo = PartiesRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let inventory_service = InventoryService::new(inventory_repo.clone());
        let parties_service = PartiesService::new(parties_repo.clone());
        let finance_service = FinanceService::new(finance_repo.clone(), parties_repo.clone());
        let sales_service = SalesService::new(
            sales_repo,
            inventory_repo,
            parties_repo,
            finance_service.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo, finance_repo);

        Ok(Self {
            db_pool,
            inventory_service,
            parties_service,
            sales_service,
            finance_service,
            dashboard_service,
        })
    }
}
