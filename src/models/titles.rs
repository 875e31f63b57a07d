// src/models/titles.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::finance::PaymentMethod;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "title_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleKind {
    Receivable, // A Receber
    Payable,    // A Pagar
}

// "Vencido" não é status: é derivado da data de vencimento na consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "title_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleStatus {
    Pending,   // Aberto
    Partial,   // Pago Parcialmente
    Paid,      // Quitado
    Cancelled, // Cancelado
}

impl TitleStatus {
    /// Recalcula o status após um pagamento. Exige 0 <= paid <= original;
    /// a quitação usa igualdade exata para não mascarar pagamento a maior.
    pub fn recompute(paid: Decimal, original: Decimal) -> TitleStatus {
        if paid == original {
            TitleStatus::Paid
        } else if paid > Decimal::ZERO {
            TitleStatus::Partial
        } else {
            TitleStatus::Pending
        }
    }

    /// Títulos quitados ou cancelados não contam como em aberto.
    pub fn is_open(&self) -> bool {
        matches!(self, TitleStatus::Pending | TitleStatus::Partial)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialCategory {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Venda de Serviços")]
    pub name: String,

    pub kind: TitleKind,

    #[schema(example = true)]
    pub is_active: bool,
}

// Um título é uma parcela de uma obrigação. Parcelas da mesma venda/compra
// compartilham o mesmo plan_id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTitle {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub plan_id: Uuid,

    #[schema(example = 1)]
    pub installment_number: i32,

    #[schema(example = 3)]
    pub installment_count: i32,

    #[schema(example = "Pagamento Fornecedor XYZ (1/3)")]
    pub description: String,

    pub kind: TitleKind,

    pub status: TitleStatus,

    // Cliente ou fornecedor, conforme o kind
    pub counterpart_id: Option<Uuid>,

    pub category_id: Option<Uuid>,

    // Valores
    #[schema(example = "500.00")]
    pub amount_original: Decimal,

    // Nunca diminui até a quitação
    #[schema(example = "200.00")]
    pub amount_paid: Decimal,

    // Quanto falta pagar (original - pago)
    #[schema(example = "300.00")]
    pub amount_balance: Decimal,

    // Vencimento é data de calendário, sem hora, para não sofrer
    // deslocamento de fuso na classificação de vencidos.
    #[schema(value_type = String, format = Date, example = "2026-09-30")]
    pub due_date: NaiveDate,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FinancialTitle {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.due_date < today
    }

    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }
}

// Baixa (total ou parcial) de um título. Imutável.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitlePayment {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub title_id: Uuid,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    pub paid_at: DateTime<Utc>,

    pub method: PaymentMethod,

    // Conta onde o dinheiro entrou/saiu (gera o movimento no razão)
    pub bank_account_id: Uuid,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

// --- Parcelamento ---

/// Tolerância de arredondamento entre a soma das parcelas e o total.
pub fn installment_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Valida que a soma das parcelas fecha com o total da obrigação.
/// Divergência acima da tolerância é erro do usuário, nunca corrigida
/// silenciosamente.
pub fn installments_match_total(total: Decimal, amounts: &[Decimal]) -> bool {
    let soma: Decimal = amounts.iter().copied().sum();
    (soma - total).abs() <= installment_tolerance()
}

// --- Criação de plano / filtros / resultado de pagamento ---

#[derive(Debug, Clone)]
pub struct InstallmentInput {
    pub number: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewInstallmentPlan {
    pub description: String,
    pub kind: TitleKind,
    pub total_amount: Decimal,
    pub counterpart_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub notes: Option<String>,
    pub installments: Vec<InstallmentInput>,
}

#[derive(Debug, Default, Clone)]
pub struct TitleFilter {
    pub kind: Option<TitleKind>,
    pub status: Option<TitleStatus>,
    pub category_id: Option<Uuid>,
    pub counterpart_id: Option<Uuid>,
    pub due_start: Option<NaiveDate>,
    pub due_end: Option<NaiveDate>,
    pub overdue_only: bool,
}

// Resultado da baixa: título atualizado + recibo + movimento gerado no razão.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub title: FinancialTitle,
    pub payment: TitlePayment,
    pub movement: crate::models::finance::Movement,
}

// --- Resumo ---

// Agregado por kind, calculado na consulta (vencido = due_date < hoje).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitlesKindSummary {
    #[schema(example = "1200.00")]
    pub open_total: Decimal,
    pub open_count: i64,

    #[schema(example = "300.00")]
    pub overdue_total: Decimal,
    pub overdue_count: i64,

    #[schema(example = "450.00")]
    pub due_soon_total: Decimal,
    pub due_soon_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownEntry {
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub kind: TitleKind,

    #[schema(example = "750.00")]
    pub open_total: Decimal,
    pub open_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitlesSummary {
    pub receivable: TitlesKindSummary,
    pub payable: TitlesKindSummary,
    pub categories: Vec<CategoryBreakdownEntry>,

    // Janela usada no cálculo de "vence em breve"
    #[schema(example = 7)]
    pub due_soon_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn title(status: TitleStatus, due_date: NaiveDate) -> FinancialTitle {
        FinancialTitle {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            installment_number: 1,
            installment_count: 1,
            description: "teste".to_string(),
            kind: TitleKind::Receivable,
            status,
            counterpart_id: None,
            category_id: None,
            amount_original: dec!(100.00),
            amount_paid: dec!(0),
            amount_balance: dec!(100.00),
            due_date,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn parcelas_fecham_com_o_total() {
        assert!(installments_match_total(
            dec!(300.00),
            &[dec!(100.00), dec!(100.00), dec!(100.00)]
        ));
    }

    #[test]
    fn parcelas_divergentes_sao_rejeitadas() {
        assert!(!installments_match_total(
            dec!(300.00),
            &[dec!(100.00), dec!(100.00), dec!(50.00)]
        ));
    }

    #[test]
    fn tolerancia_de_um_centavo() {
        // 3x 33.33 = 99.99 para um total de 100.00: diferença de 0.01, aceita
        assert!(installments_match_total(
            dec!(100.00),
            &[dec!(33.33), dec!(33.33), dec!(33.33)]
        ));

        // 0.02 de diferença já estoura a tolerância
        assert!(!installments_match_total(
            dec!(100.00),
            &[dec!(33.33), dec!(33.33), dec!(33.32)]
        ));
    }

    #[test]
    fn recalculo_de_status_apos_pagamento() {
        assert_eq!(
            TitleStatus::recompute(dec!(0), dec!(100.00)),
            TitleStatus::Pending
        );
        assert_eq!(
            TitleStatus::recompute(dec!(40.00), dec!(100.00)),
            TitleStatus::Partial
        );
        // Quitação exige igualdade exata
        assert_eq!(
            TitleStatus::recompute(dec!(100.00), dec!(100.00)),
            TitleStatus::Paid
        );
    }

    #[test]
    fn vencido_usa_data_de_calendario() {
        let hoje = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let ontem = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        let pendente = title(TitleStatus::Pending, ontem);
        assert!(pendente.is_overdue(hoje));
        assert_eq!(pendente.days_overdue(hoje), 1);

        // Vence hoje ainda não está vencido
        let vence_hoje = title(TitleStatus::Pending, hoje);
        assert!(!vence_hoje.is_overdue(hoje));
        assert_eq!(vence_hoje.days_overdue(hoje), 0);
    }

    #[test]
    fn quitado_ou_cancelado_nunca_vencido() {
        let hoje = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let ontem = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        assert!(!title(TitleStatus::Paid, ontem).is_overdue(hoje));
        assert!(!title(TitleStatus::Cancelled, ontem).is_overdue(hoje));
    }
}
