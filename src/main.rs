//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;


use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "elevates_backend=info,tower_http=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let (Some(email), Some(password)) = (&app_state.config.admin_email, &app_state.config.admin_password) {
        app_state.auth_service.seed_admin(email, password).await?;
    }

    let addr = app_state.config.bind_addr.clone();
    let app = build_router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    // Tudo que é do RH fica atrás do auth_guard
    let hr_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/companies"
               ,post(handlers::companies::create_company)
               .get(handlers::companies::list_companies)
        )
        .route("/api/companies/{company_id}"
               ,get(handlers::companies::get_company)
               .put(handlers::companies::rename_company)
               .delete(handlers::companies::delete_company)
        )
        // Gerentes
        .route("/api/companies/{company_id}/managers"
               ,post(handlers::people::create_manager)
               .get(handlers::people::list_managers)
        )
        .route("/api/companies/{company_id}/managers/{manager_id}"
               ,put(handlers::people::rename_manager)
               .delete(handlers::people::delete_manager)
        )
        // Colaboradores
        .route("/api/companies/{company_id}/employees"
               ,post(handlers::people::create_employee)
               .get(handlers::people::list_employees)
        )
        .route("/api/companies/{company_id}/employees/{employee_id}"
               ,get(handlers::people::get_employee)
               .put(handlers::people::update_employee)
               .delete(handlers::people::delete_employee)
        )
        // KPIs
        .route("/api/companies/{company_id}/employees/{employee_id}/kpis"
               ,post(handlers::kpis::create_kpi)
               .get(handlers::kpis::list_kpis)
        )
        .route("/api/companies/{company_id}/employees/{employee_id}/kpis/{kpi_id}"
               ,put(handlers::kpis::update_kpi)
               .delete(handlers::kpis::delete_kpi)
        )
        // Rodadas
        .route("/api/companies/{company_id}/rounds"
               ,post(handlers::rounds::open_round)
               .get(handlers::rounds::list_rounds)
        )
        .route("/api/companies/{company_id}/rounds/{round_id}", get(handlers::rounds::get_round))
        .route("/api/companies/{company_id}/rounds/{round_id}/name", put(handlers::rounds::rename_round))
        .route("/api/companies/{company_id}/rounds/{round_id}/close", post(handlers::rounds::close_round))
        // Avaliações
        .route("/api/companies/{company_id}/evaluations/{evaluation_id}", get(handlers::evaluations::get_evaluation))
        .route("/api/companies/{company_id}/evaluations/{evaluation_id}/scores", put(handlers::evaluations::hr_adjust))
        .route("/api/companies/{company_id}/evaluations/{evaluation_id}/publish", post(handlers::evaluations::publish_evaluation))
        .route("/api/companies/{company_id}/evaluations/{evaluation_id}/cancel", post(handlers::evaluations::cancel_evaluation))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas públicas: login e os links compartilháveis (o token é a credencial)
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/evaluate/{token}"
               ,get(handlers::public::get_manager_form)
               .post(handlers::public::submit_manager_form)
        )
        .route("/api/scores/{token}", get(handlers::public::get_employee_results));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(hr_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
