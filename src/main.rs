//src/main.rs

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Contas bancárias, movimentos, transferências e extrato
    let finance_routes = Router::new()
        .route(
            "/accounts",
            post(handlers::finance::create_account).get(handlers::finance::list_accounts),
        )
        .route("/accounts/{id}", delete(handlers::finance::deactivate_account))
        .route(
            "/accounts/{id}/movements",
            post(handlers::finance::post_movement),
        )
        .route(
            "/accounts/{id}/statement",
            get(handlers::finance::get_statement),
        )
        .route("/transfers", post(handlers::finance::transfer));

    // Ciclo de vida do caixa
    let cash_register_routes = Router::new()
        .route("/open", post(handlers::cash_register::open))
        .route("/current", get(handlers::cash_register::get_current_open))
        .route("/history", get(handlers::cash_register::get_history))
        .route(
            "/{id}/movements",
            post(handlers::cash_register::register_movement)
                .get(handlers::cash_register::list_movements),
        )
        .route("/{id}/close", post(handlers::cash_register::close))
        .route("/{id}/summary", get(handlers::cash_register::get_summary));

    // Contas a pagar / a receber
    let titles_routes = Router::new()
        .route(
            "/",
            post(handlers::titles::create_plan).get(handlers::titles::list_titles),
        )
        .route("/summary", get(handlers::titles::get_summary))
        .route(
            "/categories",
            post(handlers::titles::create_category).get(handlers::titles::list_categories),
        )
        .route("/{id}", get(handlers::titles::get_title))
        .route(
            "/{id}/payments",
            post(handlers::titles::register_payment).get(handlers::titles::list_payments),
        )
        .route("/{id}/cancel", post(handlers::titles::cancel));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/finance", finance_routes)
        .nest("/api/cash-register", cash_register_routes)
        .nest("/api/titles", titles_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
