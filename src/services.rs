pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod parties_service;
pub use parties_service::PartiesService;
pub mod sales_service;
pub use sales_service::SalesService;
pub mod finance_service;
pub use finance_service::FinanceService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
