pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod parties_repo;
pub use parties_repo::PartiesRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
