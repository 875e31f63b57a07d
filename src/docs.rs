// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Finance (contas e razão) ---
        handlers::finance::create_account,
        handlers::finance::list_accounts,
        handlers::finance::deactivate_account,
        handlers::finance::post_movement,
        handlers::finance::transfer,
        handlers::finance::get_statement,

        // --- Caixa ---
        handlers::cash_register::open,
        handlers::cash_register::close,
        handlers::cash_register::register_movement,
        handlers::cash_register::list_movements,
        handlers::cash_register::get_current_open,
        handlers::cash_register::get_history,
        handlers::cash_register::get_summary,

        // --- Títulos (a pagar / a receber) ---
        handlers::titles::create_category,
        handlers::titles::list_categories,
        handlers::titles::create_plan,
        handlers::titles::register_payment,
        handlers::titles::cancel,
        handlers::titles::list_titles,
        handlers::titles::get_summary,
        handlers::titles::get_title,
        handlers::titles::list_payments,
    ),
    components(
        schemas(
            // --- Finance ---
            models::finance::AccountType,
            models::finance::MovementDirection,
            models::finance::MovementSource,
            models::finance::PaymentMethod,
            models::finance::BankAccount,
            models::finance::Movement,
            models::finance::StatementSummary,
            models::finance::AccountStatement,
            models::finance::TransferResult,
            handlers::finance::CreateAccountPayload,
            handlers::finance::PostMovementPayload,
            handlers::finance::TransferPayload,

            // --- Caixa ---
            models::cash_register::RegisterStatus,
            models::cash_register::CashMovementKind,
            models::cash_register::CashRegister,
            models::cash_register::CashRegisterMovement,
            models::cash_register::ShiftTotals,
            models::cash_register::CashRegisterSummary,
            handlers::cash_register::OpenRegisterPayload,
            handlers::cash_register::CloseRegisterPayload,
            handlers::cash_register::RegisterMovementPayload,

            // --- Títulos ---
            models::titles::TitleKind,
            models::titles::TitleStatus,
            models::titles::FinancialCategory,
            models::titles::FinancialTitle,
            models::titles::TitlePayment,
            models::titles::TitlesKindSummary,
            models::titles::CategoryBreakdownEntry,
            models::titles::TitlesSummary,
            models::titles::PaymentReceipt,
            handlers::titles::CreateCategoryPayload,
            handlers::titles::InstallmentPayload,
            handlers::titles::CreatePlanPayload,
            handlers::titles::RegisterPaymentPayload,
        )
    ),
    tags(
        (name = "Finance", description = "Contas bancárias, movimentos e extrato"),
        (name = "CashRegister", description = "Abertura, operação e fechamento de caixa"),
        (name = "Titles", description = "Contas a pagar e a receber, parceladas")
    ),
    info(
        title = "Gestor Financeiro",
        description = "Núcleo financeiro do back-office: razão de contas, caixa e títulos.",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
