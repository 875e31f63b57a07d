// src/models/cash_register.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "register_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegisterStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cash_movement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashMovementKind {
    Sangria,    // Retirada de dinheiro do caixa
    Suprimento, // Reforço de dinheiro no caixa
}

// --- Structs ---

// Uma sessão de caixa: aberta uma única vez, fechada uma única vez.
// Depois de CLOSED nenhum campo muda mais.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashRegister {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub bank_account_id: Uuid,

    pub status: RegisterStatus,

    pub opened_by: Uuid,

    pub opened_at: DateTime<Utc>,

    // Valor contado na gaveta na abertura (não gera movimento no razão)
    #[schema(example = "100.00")]
    pub initial_balance: Decimal,

    pub closed_by: Option<Uuid>,

    pub closed_at: Option<DateTime<Utc>>,

    // Preenchidos apenas no fechamento
    #[schema(example = "230.00")]
    pub expected_balance: Option<Decimal>,

    #[schema(example = "230.00")]
    pub actual_balance: Option<Decimal>,

    // actual - expected; diferente de zero é alerta de conferência, não erro
    #[schema(example = "0.00")]
    pub difference: Option<Decimal>,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashRegisterMovement {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub cash_register_id: Uuid,

    pub kind: CashMovementKind,

    #[schema(example = "50.00")]
    pub amount: Decimal,

    #[schema(example = "Troco para o caixa da tarde")]
    pub reason: String,

    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
}

// --- Fechamento / Resumo ---

// Totais apurados dentro da janela do turno (abertura até fechamento, ou
// até "agora" enquanto aberto).
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTotals {
    pub movement_count: i64,

    #[schema(example = "50.00")]
    pub total_suprimento: Decimal,

    #[schema(example = "0.00")]
    pub total_sangria: Decimal,

    pub sales_count: i64,

    #[schema(example = "80.00")]
    pub total_sales: Decimal,
}

impl ShiftTotals {
    /// Saldo que deveria estar na gaveta: abertura + suprimentos
    /// - sangrias + vendas recebidas na conta do caixa dentro do turno.
    pub fn expected_balance(&self, initial_balance: Decimal) -> Decimal {
        initial_balance + self.total_suprimento - self.total_sangria + self.total_sales
    }
}

/// Diferença de conferência no fechamento (contado - esperado).
pub fn reconciliation_difference(actual: Decimal, expected: Decimal) -> Decimal {
    actual - expected
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashRegisterSummary {
    pub register: CashRegister,

    #[serde(flatten)]
    pub totals: ShiftTotals,

    #[schema(example = "230.00")]
    pub expected_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn saldo_esperado_soma_suprimento_e_vendas() {
        // Abre com 100, suprimento de 50, uma venda de 80 na conta do caixa
        let totals = ShiftTotals {
            movement_count: 1,
            total_suprimento: dec!(50.00),
            total_sangria: dec!(0),
            sales_count: 1,
            total_sales: dec!(80.00),
        };

        assert_eq!(totals.expected_balance(dec!(100.00)), dec!(230.00));
    }

    #[test]
    fn sangria_reduz_o_saldo_esperado() {
        let totals = ShiftTotals {
            movement_count: 2,
            total_suprimento: dec!(20.00),
            total_sangria: dec!(70.00),
            sales_count: 0,
            total_sales: dec!(0),
        };

        assert_eq!(totals.expected_balance(dec!(100.00)), dec!(50.00));
    }

    #[test]
    fn diferenca_zero_quando_contagem_bate() {
        assert_eq!(reconciliation_difference(dec!(230.00), dec!(230.00)), dec!(0.00));
    }

    #[test]
    fn diferenca_positiva_quando_sobra_dinheiro() {
        // Sobra de caixa: contou 10 a mais que o esperado
        assert_eq!(reconciliation_difference(dec!(240.00), dec!(230.00)), dec!(10.00));
    }

    #[test]
    fn diferenca_negativa_quando_falta_dinheiro() {
        assert_eq!(reconciliation_difference(dec!(220.00), dec!(230.00)), dec!(-10.00));
    }
}
