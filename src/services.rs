pub mod cash_register_service;
pub mod finance_service;
pub mod titles_service;

pub use cash_register_service::CashRegisterService;
pub use finance_service::FinanceService;
pub use titles_service::TitlesService;
