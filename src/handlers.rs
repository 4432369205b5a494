pub mod inventory;
pub mod parties;
pub mod sales;
pub mod finance;
pub mod dashboard;
