// src/services/cash_register_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CashRegisterRepository,
    models::{
        cash_register::{
            reconciliation_difference, CashMovementKind, CashRegister, CashRegisterMovement,
            CashRegisterSummary, RegisterStatus,
        },
        finance::{MovementDirection, MovementSource, PaymentMethod},
    },
    services::finance_service::FinanceService,
};

#[derive(Clone)]
pub struct CashRegisterService {
    repo: CashRegisterRepository,
    finance_service: FinanceService,
}

impl CashRegisterService {
    pub fn new(repo: CashRegisterRepository, finance_service: FinanceService) -> Self {
        Self {
            repo,
            finance_service,
        }
    }

    /// Abre o turno de caixa. O saldo inicial é contagem de gaveta, não
    /// transferência: nenhum movimento é lançado no razão aqui.
    pub async fn open<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        bank_account_id: Uuid,
        initial_balance: Decimal,
        opened_by: Uuid,
    ) -> Result<CashRegister, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        if initial_balance < Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = executor.begin().await?;

        // Conta precisa existir e estar ativa
        let account = self
            .finance_service
            .get_account(&mut *tx, tenant_id, bank_account_id)
            .await?;
        if !account.is_active {
            return Err(AppError::AccountInactive);
        }

        // Pré-checagem para mensagem amigável; a corrida de verdade morre
        // no índice parcial durante o INSERT.
        if self.repo.get_open_register(&mut *tx, tenant_id).await?.is_some() {
            return Err(AppError::ShiftAlreadyOpen);
        }

        let register = self
            .repo
            .insert_register(&mut *tx, tenant_id, bank_account_id, initial_balance, opened_by)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Caixa {} aberto na conta {} com saldo inicial {}",
            register.id,
            bank_account_id,
            initial_balance
        );

        Ok(register)
    }

    /// Sangria/suprimento durante o turno. O movimento do caixa e o
    /// movimento espelho no razão da conta entram na mesma transação.
    pub async fn register_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
        kind: CashMovementKind,
        amount: Decimal,
        reason: &str,
        created_by: Uuid,
    ) -> Result<CashRegisterMovement, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::MissingReason);
        }

        let mut tx = executor.begin().await?;

        let register = self
            .repo
            .get_register_for_update(&mut *tx, tenant_id, register_id)
            .await?;
        if register.status != RegisterStatus::Open {
            return Err(AppError::ShiftNotOpen);
        }

        let movement = self
            .repo
            .insert_cash_movement(
                &mut *tx,
                tenant_id,
                register_id,
                kind,
                amount,
                reason,
                created_by,
            )
            .await?;

        // Espelho no razão: suprimento entra, sangria sai
        let (direction, label) = match kind {
            CashMovementKind::Suprimento => (MovementDirection::In, "Suprimento de caixa"),
            CashMovementKind::Sangria => (MovementDirection::Out, "Sangria de caixa"),
        };

        self.finance_service
            .post_movement_in_tx(
                &mut tx,
                tenant_id,
                register.bank_account_id,
                direction,
                amount,
                &format!("{}: {}", label, reason),
                MovementSource::CashRegister,
                Some(PaymentMethod::Dinheiro),
                Utc::now(),
            )
            .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Fecha o turno. O saldo esperado é apurado agora, direto do razão e
    /// das movimentações (nada de contador incremental): abertura
    /// + suprimentos - sangrias + vendas da janela. Diferença na contagem é
    /// dado registrado, não erro.
    pub async fn close<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
        actual_balance: Decimal,
        closed_by: Uuid,
        notes: Option<&str>,
    ) -> Result<CashRegister, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        if actual_balance < Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = executor.begin().await?;

        let register = self
            .repo
            .get_register_for_update(&mut *tx, tenant_id, register_id)
            .await?;
        if register.status != RegisterStatus::Open {
            return Err(AppError::ShiftNotOpen);
        }

        let totals = self.repo.shift_totals(&mut tx, tenant_id, &register).await?;
        let expected_balance = totals.expected_balance(register.initial_balance);
        let difference = reconciliation_difference(actual_balance, expected_balance);

        let closed = self
            .repo
            .close_register(
                &mut *tx,
                tenant_id,
                register_id,
                expected_balance,
                actual_balance,
                difference,
                closed_by,
                notes,
            )
            .await?;

        tx.commit().await?;

        if difference != Decimal::ZERO {
            // Sobra/falta de caixa: vai para conferência, operação segue válida
            tracing::warn!(
                "Caixa {} fechado com diferença {} (esperado {}, contado {})",
                register_id,
                difference,
                expected_balance,
                actual_balance
            );
        } else {
            tracing::info!("Caixa {} fechado sem diferença", register_id);
        }

        Ok(closed)
    }

    pub async fn get_current_open<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Option<CashRegister>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_open_register(executor, tenant_id).await
    }

    pub async fn get_history<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        opened_from: Option<NaiveDate>,
        opened_until: Option<NaiveDate>,
    ) -> Result<Vec<CashRegister>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_registers(executor, tenant_id, opened_from, opened_until)
            .await
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
    ) -> Result<Vec<CashRegisterMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_cash_movements(executor, tenant_id, register_id)
            .await
    }

    /// Resumo do turno (aberto ou fechado). Para turno aberto a janela de
    /// vendas vai até "agora".
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        register_id: Uuid,
    ) -> Result<CashRegisterSummary, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let register = self.repo.get_register(&mut *tx, tenant_id, register_id).await?;
        let totals = self.repo.shift_totals(&mut tx, tenant_id, &register).await?;

        tx.commit().await?;

        let expected_balance = totals.expected_balance(register.initial_balance);

        Ok(CashRegisterSummary {
            register,
            totals,
            expected_balance,
        })
    }
}
