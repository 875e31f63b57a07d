// src/db/cash_register_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::cash_register::{CashMovementKind, CashRegister, CashRegisterMovement, ShiftTotals},
};

// Nome do índice parcial que garante um único caixa aberto por loja.
const OPEN_REGISTER_CONSTRAINT: &str = "ux_cash_registers_tenant_open";

#[derive(Clone)]
pub struct CashRegisterRepository {
    pool: PgPool,
}

impl CashRegisterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TURNOS
    // =========================================================================

    pub async fn insert_register<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        bank_account_id: Uuid,
        initial_balance: Decimal,
        opened_by: Uuid,
    ) -> Result<CashRegister, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // A unicidade de caixa aberto é do banco (índice parcial): duas
        // aberturas concorrentes nunca passam, mesmo que ambas tenham visto
        // "nenhum caixa aberto".
        let register = sqlx::query_as::<_, CashRegister>(
            r#"
            INSERT INTO cash_registers
                (tenant_id, bank_account_id, status, opened_by, opened_at, initial_balance)
            VALUES ($1, $2, 'OPEN', $3, NOW(), $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(bank_account_id)
        .bind(opened_by)
        .bind(initial_balance)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.constraint() == Some(OPEN_REGISTER_CONSTRAINT) {
                    return AppError::ShiftAlreadyOpen;
                }
            }
            AppError::DatabaseError(e)
        })?;

        Ok(register)
    }

    pub async fn get_register<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
    ) -> Result<CashRegister, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let register = sqlx::query_as::<_, CashRegister>(
            "SELECT * FROM cash_registers WHERE id = $1 AND tenant_id = $2",
        )
        .bind(register_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        register.ok_or(AppError::NotFound)
    }

    // Tranca o turno: movimentação e fechamento concorrentes não se atropelam.
    pub async fn get_register_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
    ) -> Result<CashRegister, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let register = sqlx::query_as::<_, CashRegister>(
            "SELECT * FROM cash_registers WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(register_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        register.ok_or(AppError::NotFound)
    }

    pub async fn get_open_register<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Option<CashRegister>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let register = sqlx::query_as::<_, CashRegister>(
            "SELECT * FROM cash_registers WHERE tenant_id = $1 AND status = 'OPEN'",
        )
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        Ok(register)
    }

    pub async fn close_register<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
        expected_balance: Decimal,
        actual_balance: Decimal,
        difference: Decimal,
        closed_by: Uuid,
        notes: Option<&str>,
    ) -> Result<CashRegister, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O WHERE status = 'OPEN' é o guarda final: turno fechado é terminal.
        let register = sqlx::query_as::<_, CashRegister>(
            r#"
            UPDATE cash_registers
            SET status = 'CLOSED',
                closed_by = $1,
                closed_at = NOW(),
                expected_balance = $2,
                actual_balance = $3,
                difference = $4,
                notes = $5
            WHERE id = $6 AND tenant_id = $7 AND status = 'OPEN'
            RETURNING *
            "#,
        )
        .bind(closed_by)
        .bind(expected_balance)
        .bind(actual_balance)
        .bind(difference)
        .bind(notes)
        .bind(register_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        register.ok_or(AppError::ShiftNotOpen)
    }

    pub async fn list_registers<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        opened_from: Option<NaiveDate>,
        opened_until: Option<NaiveDate>,
    ) -> Result<Vec<CashRegister>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT * FROM cash_registers WHERE tenant_id = ",
        );
        qb.push_bind(tenant_id);

        if let Some(from) = opened_from {
            qb.push(" AND opened_at::date >= ");
            qb.push_bind(from);
        }
        if let Some(until) = opened_until {
            qb.push(" AND opened_at::date <= ");
            qb.push_bind(until);
        }

        qb.push(" ORDER BY opened_at DESC");

        let registers = qb
            .build_query_as::<CashRegister>()
            .fetch_all(executor)
            .await?;

        Ok(registers)
    }

    // =========================================================================
    //  MOVIMENTAÇÕES DO TURNO (sangria / suprimento)
    // =========================================================================

    pub async fn insert_cash_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        cash_register_id: Uuid,
        kind: CashMovementKind,
        amount: Decimal,
        reason: &str,
        created_by: Uuid,
    ) -> Result<CashRegisterMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, CashRegisterMovement>(
            r#"
            INSERT INTO cash_register_movements
                (tenant_id, cash_register_id, kind, amount, reason, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(cash_register_id)
        .bind(kind)
        .bind(amount)
        .bind(reason)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    pub async fn list_cash_movements<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        cash_register_id: Uuid,
    ) -> Result<Vec<CashRegisterMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, CashRegisterMovement>(
            r#"
            SELECT * FROM cash_register_movements
            WHERE tenant_id = $1 AND cash_register_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(cash_register_id)
        .fetch_all(executor)
        .await?;

        Ok(movements)
    }

    // =========================================================================
    //  APURAÇÃO DA JANELA DO TURNO
    // =========================================================================

    /// Totais do turno, apurados na hora (nunca mantidos em contador): as
    /// vendas entram pela janela [opened_at, closed_at ou agora] da conta
    /// vinculada ao caixa. Recebe a conexão da transação em andamento para
    /// que a apuração e o fechamento enxerguem o mesmo snapshot.
    pub async fn shift_totals(
        &self,
        conn: &mut sqlx::PgConnection,
        tenant_id: Uuid,
        register: &CashRegister,
    ) -> Result<ShiftTotals, AppError> {
        let (movement_count, total_suprimento, total_sangria) =
            sqlx::query_as::<_, (i64, Decimal, Decimal)>(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(amount) FILTER (WHERE kind = 'SUPRIMENTO'), 0),
                    COALESCE(SUM(amount) FILTER (WHERE kind = 'SANGRIA'), 0)
                FROM cash_register_movements
                WHERE tenant_id = $1 AND cash_register_id = $2
                "#,
            )
            .bind(tenant_id)
            .bind(register.id)
            .fetch_one(&mut *conn)
            .await?;

        let (sales_count, total_sales) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(amount), 0)
            FROM movements
            WHERE tenant_id = $1
              AND account_id = $2
              AND direction = 'IN'
              AND source = 'SALE'
              AND occurred_at >= $3
              AND occurred_at <= COALESCE($4, NOW())
            "#,
        )
        .bind(tenant_id)
        .bind(register.bank_account_id)
        .bind(register.opened_at)
        .bind(register.closed_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(ShiftTotals {
            movement_count,
            total_suprimento,
            total_sangria,
            sales_count,
            total_sales,
        })
    }
}
