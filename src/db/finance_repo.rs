// src/db/finance_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{
        AccountType, BankAccount, Movement, MovementDirection, MovementSource, PaymentMethod,
        StatementFilter,
    },
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        account_type: AccountType,
        initial_balance: Decimal,
        credit_limit: Option<Decimal>,
        is_favorite: bool,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O saldo corrente nasce igual ao saldo inicial
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            INSERT INTO bank_accounts
                (tenant_id, name, account_type, initial_balance, current_balance, credit_limit, is_favorite)
            VALUES ($1, $2, $3, $4, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(account_type)
        .bind(initial_balance)
        .bind(credit_limit)
        .bind(is_favorite)
        .fetch_one(executor)
        .await?;

        Ok(account)
    }

    pub async fn get_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE id = $1 AND tenant_id = $2",
        )
        .bind(account_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        account.ok_or(AppError::NotFound)
    }

    // Tranca a linha da conta: serializa os lançamentos concorrentes contra
    // o mesmo saldo (os snapshots balance_after formam uma ordem total).
    pub async fn get_account_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(account_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        account.ok_or(AppError::NotFound)
    }

    pub async fn get_all_accounts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT * FROM bank_accounts WHERE tenant_id = ",
        );
        qb.push_bind(tenant_id);

        if active_only {
            qb.push(" AND is_active = TRUE");
        }

        qb.push(" ORDER BY is_favorite DESC, name ASC");

        let accounts = qb.build_query_as::<BankAccount>().fetch_all(executor).await?;

        Ok(accounts)
    }

    // Contas com movimentos nunca são apagadas: só desativadas.
    pub async fn deactivate_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts
            SET is_active = FALSE
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(account_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        account.ok_or(AppError::NotFound)
    }

    pub async fn update_account_balance<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
        new_balance: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE bank_accounts SET current_balance = $1 WHERE id = $2 AND tenant_id = $3")
            .bind(new_balance)
            .bind(account_id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    // =========================================================================
    //  MOVIMENTOS (log append-only)
    // =========================================================================

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
        direction: MovementDirection,
        amount: Decimal,
        description: &str,
        source: MovementSource,
        method: Option<PaymentMethod>,
        occurred_at: DateTime<Utc>,
        balance_after: Decimal,
    ) -> Result<Movement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements
                (tenant_id, account_id, direction, amount, description, source, method, occurred_at, balance_after)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(account_id)
        .bind(direction)
        .bind(amount)
        .bind(description)
        .bind(source)
        .bind(method)
        .bind(occurred_at)
        .bind(balance_after)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    /// Saldo líquido dos movimentos anteriores ao instante dado (para o
    /// saldo de abertura do extrato).
    pub async fn net_movements_before<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let net = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(CASE WHEN direction = 'IN' THEN amount ELSE -amount END), 0)
            FROM movements
            WHERE tenant_id = $1 AND account_id = $2 AND occurred_at < $3
            "#,
        )
        .bind(tenant_id)
        .bind(account_id)
        .bind(before)
        .fetch_one(executor)
        .await?;

        Ok(net)
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
        filter: &StatementFilter,
    ) -> Result<Vec<Movement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT * FROM movements WHERE tenant_id = ",
        );
        qb.push_bind(tenant_id);
        qb.push(" AND account_id = ");
        qb.push_bind(account_id);

        if let Some(start) = filter.start {
            qb.push(" AND occurred_at >= ");
            qb.push_bind(start);
        }
        if let Some(end) = filter.end {
            qb.push(" AND occurred_at < ");
            qb.push_bind(end);
        }
        if let Some(search) = &filter.search {
            qb.push(" AND description ILIKE ");
            qb.push_bind(format!("%{}%", search));
        }
        if let Some(direction) = filter.direction {
            qb.push(" AND direction = ");
            qb.push_bind(direction);
        }
        if let Some(source) = filter.source {
            qb.push(" AND source = ");
            qb.push_bind(source);
        }
        if let Some(method) = filter.method {
            qb.push(" AND method = ");
            qb.push_bind(method);
        }

        qb.push(" ORDER BY occurred_at DESC");

        let movements = qb.build_query_as::<Movement>().fetch_all(executor).await?;

        Ok(movements)
    }
}
