// src/handlers/cash_register.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::cash_register::{
        CashMovementKind, CashRegister, CashRegisterMovement, CashRegisterSummary,
    },
};

// =============================================================================
//  ÁREA 1: ABERTURA / FECHAMENTO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenRegisterPayload {
    pub bank_account_id: Uuid,

    // Contagem de gaveta na abertura; não gera movimento no razão
    #[schema(example = "100.00")]
    pub initial_balance: Decimal,

    pub opened_by: Uuid,
}

// POST /api/cash-register/open
#[utoipa::path(
    post,
    path = "/api/cash-register/open",
    tag = "CashRegister",
    request_body = OpenRegisterPayload,
    responses(
        (status = 201, description = "Caixa aberto", body = CashRegister),
        (status = 409, description = "Já existe caixa aberto"),
        (status = 422, description = "Conta inativa ou valor inválido")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn open(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<OpenRegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let register = app_state
        .cash_register_service
        .open(
            &app_state.db_pool,
            tenant.0,
            payload.bank_account_id,
            payload.initial_balance,
            payload.opened_by,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(register)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseRegisterPayload {
    // Quanto foi contado fisicamente na gaveta
    #[schema(example = "230.00")]
    pub actual_balance: Decimal,

    pub closed_by: Uuid,

    #[schema(example = "Fechamento do turno da tarde")]
    pub notes: Option<String>,
}

// POST /api/cash-register/{id}/close
#[utoipa::path(
    post,
    path = "/api/cash-register/{id}/close",
    tag = "CashRegister",
    request_body = CloseRegisterPayload,
    responses(
        (status = 200, description = "Caixa fechado (diferença registrada, se houver)", body = CashRegister),
        (status = 404, description = "Caixa não encontrado"),
        (status = 422, description = "Caixa não está aberto")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do caixa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn close(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(register_id): Path<Uuid>,
    Json(payload): Json<CloseRegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let register = app_state
        .cash_register_service
        .close(
            &app_state.db_pool,
            tenant.0,
            register_id,
            payload.actual_balance,
            payload.closed_by,
            payload.notes.as_deref(),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(register)))
}

// =============================================================================
//  ÁREA 2: MOVIMENTAÇÕES (sangria / suprimento)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMovementPayload {
    pub kind: CashMovementKind,

    #[schema(example = "50.00")]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Troco para o caixa da tarde")]
    pub reason: String,

    pub created_by: Uuid,
}

// POST /api/cash-register/{id}/movements
#[utoipa::path(
    post,
    path = "/api/cash-register/{id}/movements",
    tag = "CashRegister",
    request_body = RegisterMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = CashRegisterMovement),
        (status = 404, description = "Caixa não encontrado"),
        (status = 422, description = "Caixa fechado, valor ou motivo inválido")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do caixa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn register_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(register_id): Path<Uuid>,
    Json(payload): Json<RegisterMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .cash_register_service
        .register_movement(
            &app_state.db_pool,
            tenant.0,
            register_id,
            payload.kind,
            payload.amount,
            &payload.reason,
            payload.created_by,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// GET /api/cash-register/{id}/movements
#[utoipa::path(
    get,
    path = "/api/cash-register/{id}/movements",
    tag = "CashRegister",
    responses(
        (status = 200, description = "Movimentações do turno", body = Vec<CashRegisterMovement>),
        (status = 404, description = "Caixa não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do caixa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(register_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movements = app_state
        .cash_register_service
        .list_movements(&app_state.db_pool, tenant.0, register_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movements)))
}

// =============================================================================
//  ÁREA 3: CONSULTAS
// =============================================================================

// GET /api/cash-register/current
// Sem caixa aberto responde 200 com null: é estado normal, não erro.
#[utoipa::path(
    get,
    path = "/api/cash-register/current",
    tag = "CashRegister",
    responses(
        (status = 200, description = "Caixa aberto atual (ou null)", body = Option<CashRegister>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_current_open(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let register = app_state
        .cash_register_service
        .get_current_open(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(register)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    pub opened_from: Option<NaiveDate>,
    pub opened_until: Option<NaiveDate>,
}

// GET /api/cash-register/history
#[utoipa::path(
    get,
    path = "/api/cash-register/history",
    tag = "CashRegister",
    responses(
        (status = 200, description = "Histórico de turnos", body = Vec<CashRegister>)
    ),
    params(
        HistoryQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let registers = app_state
        .cash_register_service
        .get_history(
            &app_state.db_pool,
            tenant.0,
            query.opened_from,
            query.opened_until,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(registers)))
}

// GET /api/cash-register/{id}/summary
#[utoipa::path(
    get,
    path = "/api/cash-register/{id}/summary",
    tag = "CashRegister",
    responses(
        (status = 200, description = "Resumo do turno", body = CashRegisterSummary),
        (status = 404, description = "Caixa não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do caixa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(register_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .cash_register_service
        .get_summary(&app_state.db_pool, tenant.0, register_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
