// src/handlers/titles.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{
        finance::PaymentMethod,
        titles::{
            FinancialCategory, FinancialTitle, InstallmentInput, NewInstallmentPlan,
            PaymentReceipt, TitleFilter, TitleKind, TitlePayment, TitleStatus, TitlesSummary,
        },
    },
};

// =============================================================================
//  ÁREA 1: CATEGORIAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Venda de Serviços")]
    pub name: String,

    pub kind: TitleKind,
}

// POST /api/titles/categories
#[utoipa::path(
    post,
    path = "/api/titles/categories",
    tag = "Titles",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = FinancialCategory),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .titles_service
        .create_category(&app_state.db_pool, tenant.0, &payload.name, payload.kind)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/titles/categories
#[utoipa::path(
    get,
    path = "/api/titles/categories",
    tag = "Titles",
    responses(
        (status = 200, description = "Lista de categorias", body = Vec<FinancialCategory>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .titles_service
        .list_categories(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(categories)))
}

// =============================================================================
//  ÁREA 2: PLANOS DE PARCELAMENTO
// =============================================================================

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPayload {
    #[schema(example = 1)]
    pub number: i32,

    #[schema(example = "100.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-09-30")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Compra de insumos NF 4412")]
    pub description: String,

    pub kind: TitleKind,

    #[schema(example = "300.00")]
    pub total_amount: Decimal,

    // Cliente ou fornecedor, conforme o kind
    pub counterpart_id: Option<Uuid>,

    pub category_id: Option<Uuid>,

    pub notes: Option<String>,

    // A soma das parcelas precisa fechar com totalAmount (tolerância 0.01)
    #[validate(length(min = 1, message = "required"))]
    pub installments: Vec<InstallmentPayload>,
}

// POST /api/titles
#[utoipa::path(
    post,
    path = "/api/titles",
    tag = "Titles",
    request_body = CreatePlanPayload,
    responses(
        (status = 201, description = "Títulos criados (um por parcela)", body = Vec<FinancialTitle>),
        (status = 422, description = "Soma das parcelas não fecha com o total")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = NewInstallmentPlan {
        description: payload.description,
        kind: payload.kind,
        total_amount: payload.total_amount,
        counterpart_id: payload.counterpart_id,
        category_id: payload.category_id,
        notes: payload.notes,
        installments: payload
            .installments
            .into_iter()
            .map(|i| InstallmentInput {
                number: i.number,
                amount: i.amount,
                due_date: i.due_date,
            })
            .collect(),
    };

    let titles = app_state
        .titles_service
        .create_plan(&app_state.db_pool, tenant.0, plan)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(titles)))
}

// =============================================================================
//  ÁREA 3: BAIXAS E CANCELAMENTO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentPayload {
    #[schema(example = "100.00")]
    pub amount: Decimal,

    // Ausente = agora
    pub paid_at: Option<DateTime<Utc>>,

    // Conta onde o dinheiro entra/sai
    pub bank_account_id: Uuid,

    pub method: PaymentMethod,

    pub notes: Option<String>,
}

// POST /api/titles/{id}/payments
#[utoipa::path(
    post,
    path = "/api/titles/{id}/payments",
    tag = "Titles",
    request_body = RegisterPaymentPayload,
    responses(
        (status = 201, description = "Baixa registrada", body = PaymentReceipt),
        (status = 404, description = "Título não encontrado"),
        (status = 422, description = "Valor inválido, título cancelado ou pagamento acima do saldo")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do título"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn register_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(title_id): Path<Uuid>,
    Json(payload): Json<RegisterPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let receipt = app_state
        .titles_service
        .register_payment(
            &app_state.db_pool,
            tenant.0,
            title_id,
            payload.amount,
            payload.paid_at,
            payload.bank_account_id,
            payload.method,
            payload.notes.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

// POST /api/titles/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/titles/{id}/cancel",
    tag = "Titles",
    responses(
        (status = 200, description = "Título cancelado", body = FinancialTitle),
        (status = 404, description = "Título não encontrado"),
        (status = 422, description = "Título não está em aberto")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do título"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn cancel(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(title_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let title = app_state
        .titles_service
        .cancel(&app_state.db_pool, tenant.0, title_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(title)))
}

// =============================================================================
//  ÁREA 4: CONSULTAS
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTitlesQuery {
    pub kind: Option<TitleKind>,
    pub status: Option<TitleStatus>,
    pub category_id: Option<Uuid>,
    pub counterpart_id: Option<Uuid>,
    pub due_start: Option<NaiveDate>,
    pub due_end: Option<NaiveDate>,

    #[serde(default)]
    pub overdue_only: bool,
}

// GET /api/titles
#[utoipa::path(
    get,
    path = "/api/titles",
    tag = "Titles",
    responses(
        (status = 200, description = "Lista de títulos", body = Vec<FinancialTitle>)
    ),
    params(
        ListTitlesQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_titles(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ListTitlesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = TitleFilter {
        kind: query.kind,
        status: query.status,
        category_id: query.category_id,
        counterpart_id: query.counterpart_id,
        due_start: query.due_start,
        due_end: query.due_end,
        overdue_only: query.overdue_only,
    };

    let titles = app_state
        .titles_service
        .list(&app_state.db_pool, tenant.0, filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(titles)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    // Janela de "vence em breve", em dias
    pub due_soon_days: Option<i32>,
}

// GET /api/titles/summary
#[utoipa::path(
    get,
    path = "/api/titles/summary",
    tag = "Titles",
    responses(
        (status = 200, description = "Resumo de contas a pagar/receber", body = TitlesSummary)
    ),
    params(
        SummaryQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let due_soon_days = query.due_soon_days.unwrap_or(7).max(0);

    let summary = app_state
        .titles_service
        .get_summary(&app_state.db_pool, tenant.0, due_soon_days)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/titles/{id}
#[utoipa::path(
    get,
    path = "/api/titles/{id}",
    tag = "Titles",
    responses(
        (status = 200, description = "Título", body = FinancialTitle),
        (status = 404, description = "Título não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do título"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_title(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(title_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let title = app_state
        .titles_service
        .get_title(&app_state.db_pool, tenant.0, title_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(title)))
}

// GET /api/titles/{id}/payments
#[utoipa::path(
    get,
    path = "/api/titles/{id}/payments",
    tag = "Titles",
    responses(
        (status = 200, description = "Baixas do título", body = Vec<TitlePayment>),
        (status = 404, description = "Título não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do título"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(title_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    // 404 para título inexistente, mesmo sem baixas
    app_state
        .titles_service
        .get_title(&app_state.db_pool, tenant.0, title_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let payments = app_state
        .titles_service
        .list_payments(&app_state.db_pool, tenant.0, title_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payments)))
}
