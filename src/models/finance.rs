// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Bank,   // Conta corrente / poupança
    Card,   // Cartão (possui limite de crédito)
    Wallet, // Carteira digital / dinheiro físico
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_direction", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDirection {
    In,  // Entrada
    Out, // Saída
}

impl MovementDirection {
    /// Valor com sinal: entradas somam, saídas subtraem.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            MovementDirection::In => amount,
            MovementDirection::Out => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementSource {
    Sale,         // Recebimento de venda
    Purchase,     // Pagamento de compra
    Refund,       // Estorno
    Manual,       // Lançamento manual
    CashRegister, // Sangria / Suprimento do caixa
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Dinheiro,
    CartaoCredito,
    CartaoDebito,
    Boleto,
    Transferencia,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Conta Principal")]
    pub name: String,

    pub account_type: AccountType,

    #[schema(example = "1000.00")]
    pub initial_balance: Decimal,

    // Saldo corrente: derivado do log de movimentos, nunca editado direto.
    #[schema(example = "1500.50")]
    pub current_balance: Decimal,

    // Só faz sentido para CARD
    #[schema(example = "5000.00")]
    pub credit_limit: Option<Decimal>,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(example = false)]
    pub is_favorite: bool,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub account_id: Uuid,

    pub direction: MovementDirection,

    #[schema(example = "150.00")]
    pub amount: Decimal,

    #[schema(example = "Venda Pedido #1024")]
    pub description: String,

    pub source: MovementSource,

    pub method: Option<PaymentMethod>,

    pub occurred_at: DateTime<Utc>,

    // Snapshot do saldo da conta logo após este movimento.
    #[schema(example = "1650.00")]
    pub balance_after: Decimal,

    pub created_at: Option<DateTime<Utc>>,
}

// --- Extrato ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummary {
    #[schema(example = "500.00")]
    pub total_in: Decimal,

    #[schema(example = "200.00")]
    pub total_out: Decimal,

    // Saldo no início do período consultado
    #[schema(example = "0.00")]
    pub opening_balance: Decimal,

    // Saldo atual da conta (não limitado ao período)
    #[schema(example = "300.00")]
    pub current_balance: Decimal,
}

impl StatementSummary {
    /// Agrega os totais do período a partir dos movimentos já filtrados.
    pub fn build(
        opening_balance: Decimal,
        current_balance: Decimal,
        movements: &[Movement],
    ) -> Self {
        let mut total_in = Decimal::ZERO;
        let mut total_out = Decimal::ZERO;

        for m in movements {
            match m.direction {
                MovementDirection::In => total_in += m.amount,
                MovementDirection::Out => total_out += m.amount,
            }
        }

        Self {
            total_in,
            total_out,
            opening_balance,
            current_balance,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatement {
    pub account: BankAccount,
    pub movements: Vec<Movement>,
    pub summary: StatementSummary,
}

// Filtros do extrato: tudo é projeção de leitura sobre o log, nada vira
// estado separado.
#[derive(Debug, Default, Clone)]
pub struct StatementFilter {
    pub start: Option<DateTime<Utc>>,
    // Limite superior exclusivo
    pub end: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub direction: Option<MovementDirection>,
    pub source: Option<MovementSource>,
    pub method: Option<PaymentMethod>,
}

// --- Transferência ---

// Um OUT na origem e um IN no destino, aplicados na mesma transação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub out_movement: Movement,
    pub in_movement: Movement,
}

// --- Replay do log (invariante de saldo) ---

/// Reaplica o log de movimentos a partir do saldo inicial da conta.
/// `current_balance` deve ser sempre igual a este resultado.
pub fn replay_balance(initial_balance: Decimal, movements: &[Movement]) -> Decimal {
    movements
        .iter()
        .fold(initial_balance, |saldo, m| saldo + m.direction.signed(m.amount))
}

/// Confere cada snapshot `balance_after` contra o replay do log.
/// Espera os movimentos em ordem crescente de `occurred_at`.
pub fn replay_matches_snapshots(initial_balance: Decimal, movements: &[Movement]) -> bool {
    let mut saldo = initial_balance;
    for m in movements {
        saldo += m.direction.signed(m.amount);
        if m.balance_after != saldo {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(direction: MovementDirection, amount: Decimal, balance_after: Decimal) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            direction,
            amount,
            description: "teste".to_string(),
            source: MovementSource::Manual,
            method: None,
            occurred_at: Utc::now(),
            balance_after,
            created_at: None,
        }
    }

    #[test]
    fn replay_reproduz_saldo_atual() {
        // 0 -> +500 (venda) -> -200 (compra)
        let movs = vec![
            movement(MovementDirection::In, dec!(500.00), dec!(500.00)),
            movement(MovementDirection::Out, dec!(200.00), dec!(300.00)),
        ];

        assert_eq!(replay_balance(dec!(0), &movs), dec!(300.00));
        assert!(replay_matches_snapshots(dec!(0), &movs));
    }

    #[test]
    fn replay_detecta_snapshot_corrompido() {
        let movs = vec![
            movement(MovementDirection::In, dec!(100.00), dec!(100.00)),
            // Snapshot errado de propósito: deveria ser 150.00
            movement(MovementDirection::In, dec!(50.00), dec!(140.00)),
        ];

        assert!(!replay_matches_snapshots(dec!(0), &movs));
    }

    #[test]
    fn replay_permite_saldo_negativo() {
        // Saldo negativo não é barrado no razão (transferências pendentes etc.)
        let movs = vec![movement(MovementDirection::Out, dec!(50.00), dec!(-50.00))];

        assert_eq!(replay_balance(dec!(0), &movs), dec!(-50.00));
        assert!(replay_matches_snapshots(dec!(0), &movs));
    }

    #[test]
    fn extrato_agrega_entradas_e_saidas() {
        let movs = vec![
            movement(MovementDirection::In, dec!(500.00), dec!(500.00)),
            movement(MovementDirection::Out, dec!(200.00), dec!(300.00)),
        ];

        let summary = StatementSummary::build(dec!(0), dec!(300.00), &movs);

        assert_eq!(summary.total_in, dec!(500.00));
        assert_eq!(summary.total_out, dec!(200.00));
        assert_eq!(summary.opening_balance, dec!(0));
        assert_eq!(summary.current_balance, dec!(300.00));
    }

    #[test]
    fn sinal_do_movimento() {
        assert_eq!(MovementDirection::In.signed(dec!(10)), dec!(10));
        assert_eq!(MovementDirection::Out.signed(dec!(10)), dec!(-10));
    }
}
