// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::finance::{
        AccountStatement, AccountType, BankAccount, Movement, MovementDirection, MovementSource,
        PaymentMethod, StatementFilter, TransferResult,
    },
};

// =============================================================================
//  ÁREA 1: CONTAS BANCÁRIAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Conta Principal")]
    pub name: String,

    pub account_type: AccountType,

    #[serde(default)]
    #[schema(example = "1000.00")]
    pub initial_balance: Decimal,

    // Ignorado para contas que não são cartão
    #[schema(example = "5000.00")]
    pub credit_limit: Option<Decimal>,

    #[serde(default)]
    #[schema(example = false)]
    pub is_favorite: bool,
}

// POST /api/finance/accounts
#[utoipa::path(
    post,
    path = "/api/finance/accounts",
    tag = "Finance",
    request_body = CreateAccountPayload,
    responses(
        (status = 201, description = "Conta criada", body = BankAccount),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreateAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let account = app_state
        .finance_service
        .create_account(
            &app_state.db_pool,
            tenant.0,
            &payload.name,
            payload.account_type,
            payload.initial_balance,
            payload.credit_limit,
            payload.is_favorite,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub active_only: bool,
}

// GET /api/finance/accounts
#[utoipa::path(
    get,
    path = "/api/finance/accounts",
    tag = "Finance",
    responses(
        (status = 200, description = "Lista de contas", body = Vec<BankAccount>)
    ),
    params(
        ListAccountsQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ListAccountsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let accounts = app_state
        .finance_service
        .list_accounts(&app_state.db_pool, tenant.0, query.active_only)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(accounts)))
}

// DELETE /api/finance/accounts/{id}
// Contas nunca somem de verdade: o histórico de movimentos continua válido.
#[utoipa::path(
    delete,
    path = "/api/finance/accounts/{id}",
    tag = "Finance",
    responses(
        (status = 200, description = "Conta desativada", body = BankAccount),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn deactivate_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let account = app_state
        .finance_service
        .deactivate_account(&app_state.db_pool, tenant.0, account_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(account)))
}

// =============================================================================
//  ÁREA 2: MOVIMENTOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMovementPayload {
    pub direction: MovementDirection,

    #[schema(example = "150.00")]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Venda balcão")]
    pub description: String,

    pub source: MovementSource,

    pub method: Option<PaymentMethod>,

    // Ausente = agora
    pub occurred_at: Option<DateTime<Utc>>,
}

// POST /api/finance/accounts/{id}/movements
#[utoipa::path(
    post,
    path = "/api/finance/accounts/{id}/movements",
    tag = "Finance",
    request_body = PostMovementPayload,
    responses(
        (status = 201, description = "Movimento lançado", body = Movement),
        (status = 404, description = "Conta não encontrada"),
        (status = 422, description = "Valor inválido ou conta inativa")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn post_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<PostMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .finance_service
        .post_movement(
            &app_state.db_pool,
            tenant.0,
            account_id,
            payload.direction,
            payload.amount,
            &payload.description,
            payload.source,
            payload.method,
            payload.occurred_at,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// =============================================================================
//  ÁREA 3: TRANSFERÊNCIAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,

    #[schema(example = "250.00")]
    pub amount: Decimal,
}

// POST /api/finance/transfers
#[utoipa::path(
    post,
    path = "/api/finance/transfers",
    tag = "Finance",
    request_body = TransferPayload,
    responses(
        (status = 201, description = "Transferência efetuada", body = TransferResult),
        (status = 404, description = "Conta não encontrada"),
        (status = 422, description = "Valor inválido")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn transfer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<TransferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.from_account_id == payload.to_account_id {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Origem e destino da transferência devem ser contas diferentes.",
        ));
    }

    let result = app_state
        .finance_service
        .transfer(
            &app_state.db_pool,
            tenant.0,
            payload.from_account_id,
            payload.to_account_id,
            payload.amount,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(result)))
}

// =============================================================================
//  ÁREA 4: EXTRATO
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatementQuery {
    // Datas de calendário; o dia final entra inteiro no período
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,

    // Busca livre na descrição
    pub search: Option<String>,

    pub direction: Option<MovementDirection>,
    pub source: Option<MovementSource>,
    pub method: Option<PaymentMethod>,
}

// GET /api/finance/accounts/{id}/statement
#[utoipa::path(
    get,
    path = "/api/finance/accounts/{id}/statement",
    tag = "Finance",
    responses(
        (status = 200, description = "Extrato da conta", body = AccountStatement),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        StatementQuery,
        ("id" = Uuid, Path, description = "ID da conta"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_statement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(account_id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = StatementFilter {
        start: query
            .start
            .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        // Fim exclusivo: começo do dia seguinte
        end: query
            .end
            .map(|d| (d + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()),
        search: query.search,
        direction: query.direction,
        source: query.source,
        method: query.method,
    };

    let statement = app_state
        .finance_service
        .get_statement(&app_state.db_pool, tenant.0, account_id, filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(statement)))
}
