// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
// Toda falha vira uma variante tipada; nada é engolido em silêncio.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Regras do núcleo financeiro ---
    #[error("Valor deve ser maior que zero")]
    InvalidAmount,

    #[error("Conta bancária inativa")]
    AccountInactive,

    #[error("Já existe um caixa aberto")]
    ShiftAlreadyOpen,

    #[error("O caixa não está aberto")]
    ShiftNotOpen,

    #[error("Motivo da movimentação é obrigatório")]
    MissingReason,

    #[error("Soma das parcelas não fecha com o total")]
    InstallmentSumMismatch,

    #[error("Pagamento maior que o saldo devedor")]
    OverpaymentRejected,

    #[error("Título cancelado não aceita pagamentos")]
    ObligationCancelled,

    #[error("Registro não encontrado")]
    NotFound,

    // Único erro seguro de repetir: a operação inteira pode ser reenviada.
    #[error("Conflito de concorrência")]
    ConcurrentModification,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    // Falhas de serialização/deadlock do Postgres são conflito de
    // concorrência para o chamador, não erro interno.
    fn is_concurrency_conflict(err: &sqlx::Error) -> bool {
        err.as_database_error()
            .and_then(|db| db.code())
            .map(|code| code == "40001" || code == "40P01")
            .unwrap_or(false)
    }

    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::InvalidAmount => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_amount"),
            AppError::AccountInactive => (StatusCode::UNPROCESSABLE_ENTITY, "account_inactive"),
            AppError::ShiftAlreadyOpen => (StatusCode::CONFLICT, "shift_already_open"),
            AppError::ShiftNotOpen => (StatusCode::UNPROCESSABLE_ENTITY, "shift_not_open"),
            AppError::MissingReason => (StatusCode::UNPROCESSABLE_ENTITY, "missing_reason"),
            AppError::InstallmentSumMismatch => {
                (StatusCode::UNPROCESSABLE_ENTITY, "installment_sum_mismatch")
            }
            AppError::OverpaymentRejected => {
                (StatusCode::UNPROCESSABLE_ENTITY, "overpayment_rejected")
            }
            AppError::ObligationCancelled => {
                (StatusCode::UNPROCESSABLE_ENTITY, "obligation_cancelled")
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::ConcurrentModification => {
                (StatusCode::CONFLICT, "concurrent_modification")
            }
            AppError::DatabaseError(e) if Self::is_concurrency_conflict(e) => {
                (StatusCode::CONFLICT, "concurrent_modification")
            }
            AppError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzindo a mensagem
    /// conforme o Accept-Language da requisição.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        // Validação retorna todos os detalhes de campo.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            return ApiError {
                status: StatusCode::BAD_REQUEST,
                message: i18n.message(&locale.0, "validation_error"),
                details: Some(json!(details)),
            };
        }

        let (status, key) = self.status_and_key();

        // O tracing loga a mensagem detalhada; o cliente recebe a genérica.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro interno do servidor: {:?}", self);
        }

        ApiError {
            status,
            message: i18n.message(&locale.0, key),
            details: None,
        }
    }
}

// O erro já no formato de resposta: status + mensagem traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({ "error": self.message, "details": details })),
            None => Json(json!({ "error": self.message })),
        };
        (self.status, body).into_response()
    }
}
