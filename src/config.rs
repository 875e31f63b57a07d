// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{CashRegisterRepository, FinanceRepository, TitlesRepository},
    services::{CashRegisterService, FinanceService, TitlesService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub finance_service: FinanceService,
    pub cash_register_service: CashRegisterService,
    pub titles_service: TitlesService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        // O FinanceService é a folha: caixa e títulos lançam movimentos
        // através dele, nunca o contrário.
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let finance_service = FinanceService::new(finance_repo);

        let cash_register_repo = CashRegisterRepository::new(db_pool.clone());
        let cash_register_service =
            CashRegisterService::new(cash_register_repo, finance_service.clone());

        let titles_repo = TitlesRepository::new(db_pool.clone());
        let titles_service = TitlesService::new(titles_repo, finance_service.clone());

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            finance_service,
            cash_register_service,
            titles_service,
        })
    }
}
