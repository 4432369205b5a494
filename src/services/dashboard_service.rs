// src/services/dashboard_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{DashboardRepository, FinanceRepository},
    models::dashboard::DashboardReport,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    finance_repo: FinanceRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, finance_repo: FinanceRepository) -> Self {
        Self { repo, finance_repo }
    }

    /// Monta o painel inteiro em uma transação (snapshot consistente).
    pub async fn get_report<'e, E>(&self, executor: E) -> Result<DashboardReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let open_receivables = self.finance_repo.sum_open_balance(&mut *tx).await?;
        let summary = self.repo.get_summary(&mut *tx, open_receivables).await?;
        let recent_movements = self.repo.get_recent_movements(&mut *tx, 10).await?;
        let low_stock_list = self.repo.get_low_stock_products(&mut *tx, 5).await?;
        let week_movements = self.repo.get_week_movements(&mut *tx).await?;
        let top_products = self.repo.get_top_products(&mut *tx, 5).await?;

        tx.commit().await?;

        Ok(DashboardReport {
            summary,
            recent_movements,
            low_stock_list,
            week_movements,
            top_products,
        })
    }
}
