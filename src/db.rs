pub mod cash_register_repo;
pub mod finance_repo;
pub mod titles_repo;

pub use cash_register_repo::CashRegisterRepository;
pub use finance_repo::FinanceRepository;
pub use titles_repo::TitlesRepository;
