// src/db/titles_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        finance::PaymentMethod,
        titles::{
            CategoryBreakdownEntry, FinancialCategory, FinancialTitle, TitleFilter, TitleKind,
            TitlePayment, TitleStatus, TitlesKindSummary,
        },
    },
};

#[derive(Clone)]
pub struct TitlesRepository {
    pool: PgPool,
}

impl TitlesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS (Plano de Contas)
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
        let category = sqlx::query_as::<_, FinancialCategory>(
            r#"
            INSERT INTO financial_categories (tenant_id, name, kind)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(kind)
        .fetch_one(executor)
        .await?;

        Ok(category)
    }

    pub async fn get_all_categories<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<FinancialCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, FinancialCategory>(
            "SELECT * FROM financial_categories WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(categories)
    }

    // =========================================================================
    //  TÍTULOS (Contas a Pagar / Receber, parcelados)
    // =========================================================================

    pub async fn insert_title<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        plan_id: Uuid,
        installment_number: i32,
        installment_count: i32,
        description: &str,
        kind: TitleKind,
        counterpart_id: Option<Uuid>,
        category_id: Option<Uuid>,
        amount: Decimal,
        due_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // No início, amount_balance (o que falta pagar) é igual ao original
        let title = sqlx::query_as::<_, FinancialTitle>(
            r#"
            INSERT INTO financial_titles (
                tenant_id, plan_id, installment_number, installment_count,
                description, kind, counterpart_id, category_id,
                amount_original, amount_paid, amount_balance, due_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(plan_id)
        .bind(installment_number)
        .bind(installment_count)
        .bind(description)
        .bind(kind)
        .bind(counterpart_id)
        .bind(category_id)
        .bind(amount)
        .bind(due_date)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(title)
    }

    pub async fn get_title<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title = sqlx::query_as::<_, FinancialTitle>(
            "SELECT * FROM financial_titles WHERE id = $1 AND tenant_id = $2",
        )
        .bind(title_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        title.ok_or(AppError::NotFound)
    }

    // Tranca o título: baixas concorrentes são serializadas e o saldo
    // devedor nunca fica negativo.
    pub async fn get_title_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title = sqlx::query_as::<_, FinancialTitle>(
            "SELECT * FROM financial_titles WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(title_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        title.ok_or(AppError::NotFound)
    }

    pub async fn apply_payment_to_title<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
        amount_paid: Decimal,
        amount_balance: Decimal,
        status: TitleStatus,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title = sqlx::query_as::<_, FinancialTitle>(
            r#"
            UPDATE financial_titles
            SET amount_paid = $1, amount_balance = $2, status = $3, updated_at = NOW()
            WHERE id = $4 AND tenant_id = $5
            RETURNING *
            "#,
        )
        .bind(amount_paid)
        .bind(amount_balance)
        .bind(status)
        .bind(title_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        title.ok_or(AppError::NotFound)
    }

    pub async fn cancel_title<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Só títulos em aberto podem ser cancelados; o WHERE é o guarda final.
        let title = sqlx::query_as::<_, FinancialTitle>(
            r#"
            UPDATE financial_titles
            SET status = 'CANCELLED', updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND status IN ('PENDING', 'PARTIAL')
            RETURNING *
            "#,
        )
        .bind(title_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        title.ok_or(AppError::ObligationCancelled)
    }

    pub async fn list_titles<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &TitleFilter,
    ) -> Result<Vec<FinancialTitle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT * FROM financial_titles WHERE tenant_id = ",
        );
        qb.push_bind(tenant_id);

        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ");
            qb.push_bind(kind);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(category_id);
        }
        if let Some(counterpart_id) = filter.counterpart_id {
            qb.push(" AND counterpart_id = ");
            qb.push_bind(counterpart_id);
        }
        if let Some(due_start) = filter.due_start {
            qb.push(" AND due_date >= ");
            qb.push_bind(due_start);
        }
        if let Some(due_end) = filter.due_end {
            qb.push(" AND due_date <= ");
            qb.push_bind(due_end);
        }
        if filter.overdue_only {
            // Vencido é derivado da data, comparado dia a dia no banco
            qb.push(" AND status IN ('PENDING', 'PARTIAL') AND due_date < CURRENT_DATE");
        }

        qb.push(" ORDER BY due_date ASC, installment_number ASC");

        let titles = qb
            .build_query_as::<FinancialTitle>()
            .fetch_all(executor)
            .await?;

        Ok(titles)
    }

    // =========================================================================
    //  PAGAMENTOS
    // =========================================================================

    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
        amount: Decimal,
        paid_at: DateTime<Utc>,
        method: PaymentMethod,
        bank_account_id: Uuid,
        notes: Option<&str>,
    ) -> Result<TitlePayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, TitlePayment>(
            r#"
            INSERT INTO title_payments
                (tenant_id, title_id, amount, paid_at, method, bank_account_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(title_id)
        .bind(amount)
        .bind(paid_at)
        .bind(method)
        .bind(bank_account_id)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    pub async fn list_payments<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        title_id: Uuid,
    ) -> Result<Vec<TitlePayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, TitlePayment>(
            r#"
            SELECT * FROM title_payments
            WHERE tenant_id = $1 AND title_id = $2
            ORDER BY paid_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(title_id)
        .fetch_all(executor)
        .await?;

        Ok(payments)
    }

    // =========================================================================
    //  RESUMOS
    // =========================================================================

    /// Agregado por kind. Vencido e "vence em breve" saem de CURRENT_DATE na
    /// própria consulta, nunca de uma coluna gravada.
    pub async fn kind_summary<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: TitleKind,
        due_soon_days: i32,
    ) -> Result<TitlesKindSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summary = sqlx::query_as::<_, TitlesKindSummary>(
            r#"
            SELECT
                COALESCE(SUM(amount_balance) FILTER (WHERE status IN ('PENDING', 'PARTIAL')), 0)
                    AS open_total,
                COUNT(*) FILTER (WHERE status IN ('PENDING', 'PARTIAL'))
                    AS open_count,
                COALESCE(SUM(amount_balance) FILTER (
                    WHERE status IN ('PENDING', 'PARTIAL') AND due_date < CURRENT_DATE), 0)
                    AS overdue_total,
                COUNT(*) FILTER (
                    WHERE status IN ('PENDING', 'PARTIAL') AND due_date < CURRENT_DATE)
                    AS overdue_count,
                COALESCE(SUM(amount_balance) FILTER (
                    WHERE status IN ('PENDING', 'PARTIAL')
                      AND due_date >= CURRENT_DATE
                      AND due_date <= CURRENT_DATE + $3::int), 0)
                    AS due_soon_total,
                COUNT(*) FILTER (
                    WHERE status IN ('PENDING', 'PARTIAL')
                      AND due_date >= CURRENT_DATE
                      AND due_date <= CURRENT_DATE + $3::int)
                    AS due_soon_count
            FROM financial_titles
            WHERE tenant_id = $1 AND kind = $2
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(due_soon_days)
        .fetch_one(executor)
        .await?;

        Ok(summary)
    }

    pub async fn category_breakdown<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<CategoryBreakdownEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, CategoryBreakdownEntry>(
            r#"
            SELECT
                t.category_id,
                c.name AS category_name,
                t.kind,
                COALESCE(SUM(t.amount_balance), 0) AS open_total,
                COUNT(*) AS open_count
            FROM financial_titles t
            LEFT JOIN financial_categories c ON c.id = t.category_id
            WHERE t.tenant_id = $1 AND t.status IN ('PENDING', 'PARTIAL')
            GROUP BY t.category_id, c.name, t.kind
            ORDER BY open_total DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }
}
