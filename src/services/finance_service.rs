// src/services/finance_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{
        AccountStatement, AccountType, BankAccount, Movement, MovementDirection, MovementSource,
        PaymentMethod, StatementFilter, StatementSummary, TransferResult,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  CONTAS
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
        // Limite de crédito só existe para cartão
        let credit_limit = match account_type {
            AccountType::Card => credit_limit,
            _ => None,
        };

        self.repo
            .create_account(
                executor,
                tenant_id,
                name,
                account_type,
                initial_balance,
                credit_limit,
                is_favorite,
            )
            .await
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
        self.repo.get_account(executor, tenant_id, account_id).await
    }

    pub async fn list_accounts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_accounts(executor, tenant_id, active_only).await
    }

    pub async fn deactivate_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.deactivate_account(executor, tenant_id, account_id).await
    }

    // =========================================================================
    //  MOVIMENTOS
    // =========================================================================

    /// Lança um movimento dentro de uma transação já aberta. Este é o ÚNICO
    /// caminho que muda o saldo de uma conta: tranca a linha, calcula o
    /// snapshot e grava log + saldo juntos.
    ///
    /// Saldo insuficiente não é barrado aqui: conta pode ficar negativa
    /// (transferências pendentes etc.); quem precisa de piso confere antes.
    pub async fn post_movement_in_tx(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        account_id: Uuid,
        direction: MovementDirection,
        amount: Decimal,
        description: &str,
        source: MovementSource,
        method: Option<PaymentMethod>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Movement, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let account = self
            .repo
            .get_account_for_update(&mut *conn, tenant_id, account_id)
            .await?;

        if !account.is_active {
            return Err(AppError::AccountInactive);
        }

        let balance_after = account.current_balance + direction.signed(amount);

        let movement = self
            .repo
            .insert_movement(
                &mut *conn,
                tenant_id,
                account_id,
                direction,
                amount,
                description,
                source,
                method,
                occurred_at,
                balance_after,
            )
            .await?;

        self.repo
            .update_account_balance(&mut *conn, tenant_id, account_id, balance_after)
            .await?;

        Ok(movement)
    }

    pub async fn post_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
        direction: MovementDirection,
        amount: Decimal,
        description: &str,
        source: MovementSource,
        method: Option<PaymentMethod>,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<Movement, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let movement = self
            .post_movement_in_tx(
                &mut tx,
                tenant_id,
                account_id,
                direction,
                amount,
                description,
                source,
                method,
                occurred_at.unwrap_or_else(Utc::now),
            )
            .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Transferência entre contas: um OUT na origem e um IN no destino, os
    /// dois dentro da mesma transação (ou aplica ambos ou nenhum).
    pub async fn transfer<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount: Decimal,
    ) -> Result<TransferResult, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = executor.begin().await?;

        // Os nomes entram na descrição dos movimentos
        let from = self.repo.get_account(&mut *tx, tenant_id, from_account_id).await?;
        let to = self.repo.get_account(&mut *tx, tenant_id, to_account_id).await?;

        let occurred_at = Utc::now();

        let out_movement = self
            .post_movement_in_tx(
                &mut tx,
                tenant_id,
                from_account_id,
                MovementDirection::Out,
                amount,
                &format!("Transferência para {}", to.name),
                MovementSource::Manual,
                Some(PaymentMethod::Transferencia),
                occurred_at,
            )
            .await?;

        let in_movement = self
            .post_movement_in_tx(
                &mut tx,
                tenant_id,
                to_account_id,
                MovementDirection::In,
                amount,
                &format!("Transferência de {}", from.name),
                MovementSource::Manual,
                Some(PaymentMethod::Transferencia),
                occurred_at,
            )
            .await?;

        tx.commit().await?;

        Ok(TransferResult {
            out_movement,
            in_movement,
        })
    }

    // =========================================================================
    //  EXTRATO
    // =========================================================================

    pub async fn get_statement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        account_id: Uuid,
        filter: StatementFilter,
    ) -> Result<AccountStatement, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        // Transação de leitura: conta, movimentos e saldo de abertura saem
        // do mesmo snapshot.
        let mut tx = executor.begin().await?;

        let account = self.repo.get_account(&mut *tx, tenant_id, account_id).await?;

        let movements = self
            .repo
            .list_movements(&mut *tx, tenant_id, account_id, &filter)
            .await?;

        // Saldo de abertura: inicial + líquido dos movimentos anteriores ao
        // início do período. Sem período, é o próprio saldo inicial.
        let opening_balance = match filter.start {
            Some(start) => {
                account.initial_balance
                    + self
                        .repo
                        .net_movements_before(&mut *tx, tenant_id, account_id, start)
                        .await?
            }
            None => account.initial_balance,
        };

        tx.commit().await?;

        let summary =
            StatementSummary::build(opening_balance, account.current_balance, &movements);

        Ok(AccountStatement {
            account,
            movements,
            summary,
        })
    }
}
