// src/services/titles_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TitlesRepository,
    models::{
        finance::{MovementDirection, MovementSource, PaymentMethod},
        titles::{
            installments_match_total, FinancialCategory, FinancialTitle, NewInstallmentPlan,
            PaymentReceipt, TitleFilter, TitleKind, TitleStatus, TitlesSummary,
        },
    },
    services::finance_service::FinanceService,
};

#[derive(Clone)]
pub struct TitlesService {
    repo: TitlesRepository,
    finance_service: FinanceService,
}

impl TitlesService {
    pub fn new(repo: TitlesRepository, finance_service: FinanceService) -> Self {
        Self {
            repo,
            finance_service,
        }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        kind: TitleKind,
    ) -> Result<FinancialCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_category(executor, tenant_id, name, kind).await
    }

    pub async fn list_categories<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<FinancialCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_all_categories(executor, tenant_id).await
    }

    // =========================================================================
    //  PLANOS DE PARCELAMENTO
    // =========================================================================

    /// Divide uma obrigação em N parcelas datadas. A soma das parcelas tem
    /// que fechar com o total (tolerância de centavo); divergência é erro do
    /// usuário, nunca é corrigida por baixo dos panos.
    pub async fn create_plan<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        plan: NewInstallmentPlan,
    ) -> Result<Vec<FinancialTitle>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        if plan.total_amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }
        if plan.installments.is_empty() {
            return Err(AppError::InstallmentSumMismatch);
        }
        if plan.installments.iter().any(|i| i.amount <= Decimal::ZERO) {
            return Err(AppError::InvalidAmount);
        }

        let amounts: Vec<Decimal> = plan.installments.iter().map(|i| i.amount).collect();
        if !installments_match_total(plan.total_amount, &amounts) {
            return Err(AppError::InstallmentSumMismatch);
        }

        let mut tx = executor.begin().await?;

        let plan_id = Uuid::new_v4();
        let count = plan.installments.len() as i32;
        let mut titles = Vec::with_capacity(plan.installments.len());

        for installment in &plan.installments {
            // Parcela única fica com a descrição limpa; parcelado ganha (n/N)
            let description = if count > 1 {
                format!("{} ({}/{})", plan.description, installment.number, count)
            } else {
                plan.description.clone()
            };

            let title = self
                .repo
                .insert_title(
                    &mut *tx,
                    tenant_id,
                    plan_id,
                    installment.number,
                    count,
                    &description,
                    plan.kind,
                    plan.counterpart_id,
                    plan.category_id,
                    installment.amount,
                    installment.due_date,
                    plan.notes.as_deref(),
                )
                .await?;

            titles.push(title);
        }

        tx.commit().await?;

        Ok(titles)
    }

    // =========================================================================
    //  BAIXAS
    // =========================================================================

    /// Baixa total ou parcial de um título. Atualização do saldo devedor,
    /// recibo e movimento no razão entram na mesma transação.
    pub async fn register_payment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
        amount: Decimal,
        paid_at: Option<DateTime<Utc>>,
        bank_account_id: Uuid,
        method: PaymentMethod,
        notes: Option<&str>,
    ) -> Result<PaymentReceipt, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = executor.begin().await?;

        let title = self
            .repo
            .get_title_for_update(&mut *tx, tenant_id, title_id)
            .await?;

        if title.status == TitleStatus::Cancelled {
            return Err(AppError::ObligationCancelled);
        }
        // Título quitado tem saldo devedor zero: qualquer valor cai aqui.
        if amount > title.amount_balance {
            return Err(AppError::OverpaymentRejected);
        }

        let amount_paid = title.amount_paid + amount;
        let amount_balance = title.amount_original - amount_paid;
        let status = TitleStatus::recompute(amount_paid, title.amount_original);

        let updated = self
            .repo
            .apply_payment_to_title(
                &mut *tx,
                tenant_id,
                title_id,
                amount_paid,
                amount_balance,
                status,
            )
            .await?;

        let paid_at = paid_at.unwrap_or_else(Utc::now);

        let payment = self
            .repo
            .insert_payment(
                &mut *tx,
                tenant_id,
                title_id,
                amount,
                paid_at,
                method,
                bank_account_id,
                notes,
            )
            .await?;

        // Receber entra, pagar sai
        let (direction, source, label) = match title.kind {
            TitleKind::Receivable => (MovementDirection::In, MovementSource::Sale, "Recebimento"),
            TitleKind::Payable => (MovementDirection::Out, MovementSource::Purchase, "Pagamento"),
        };

        let movement = self
            .finance_service
            .post_movement_in_tx(
                &mut tx,
                tenant_id,
                bank_account_id,
                direction,
                amount,
                &format!("{}: {}", label, title.description),
                source,
                Some(method),
                paid_at,
            )
            .await?;

        tx.commit().await?;

        Ok(PaymentReceipt {
            title: updated,
            payment,
            movement,
        })
    }

    /// Cancela um título em aberto (PENDING ou PARTIAL). Cancelado é
    /// terminal: não aceita baixa nem novo cancelamento.
    pub async fn cancel<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Garante 404 para id inexistente antes do guarda de status
        self.repo.get_title_for_update(&mut *tx, tenant_id, title_id).await?;

        let cancelled = self.repo.cancel_title(&mut *tx, tenant_id, title_id).await?;

        tx.commit().await?;

        Ok(cancelled)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn get_title<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_title(executor, tenant_id, title_id).await
    }

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<Vec<crate::models::titles::TitlePayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_payments(executor, tenant_id, title_id).await
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: TitleFilter,
    ) -> Result<Vec<FinancialTitle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_titles(executor, tenant_id, &filter).await
    }

    /// Resumo geral de contas a pagar/receber. "Vencido" e "vence em breve"
    /// são calculados na consulta contra a data corrente.
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        due_soon_days: i32,
    ) -> Result<TitlesSummary, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let receivable = self
            .repo
            .kind_summary(&mut *tx, tenant_id, TitleKind::Receivable, due_soon_days)
            .await?;
        let payable = self
            .repo
            .kind_summary(&mut *tx, tenant_id, TitleKind::Payable, due_soon_days)
            .await?;
        let categories = self.repo.category_breakdown(&mut *tx, tenant_id).await?;

        tx.commit().await?;

        Ok(TitlesSummary {
            receivable,
            payable,
            categories,
            due_soon_days: due_soon_days as i64,
        })
    }
}
