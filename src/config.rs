// src/config.rs

use crate::{
    db::{EvaluationRepository, KpiRepository, OrgRepository, RoundRepository, UserRepository},
    services::{
        access_service::AccessService, auth::AuthService, evaluation_service::EvaluationService,
        kpi_service::KpiService, org_service::OrgService, round_service::RoundService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

// Configuração lida do ambiente (.env incluído) uma única vez na inicialização
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub public_base_url: String,
    pub db_max_connections: u32,
    // Seed opcional do admin do RH (só quando os dois estão definidos)
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            db_max_connections,
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub org_service: OrgService,
    pub kpi_service: KpiService,
    pub round_service: RoundService,
    pub evaluation_service: EvaluationService,
    pub access_service: AccessService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let org_repo = OrgRepository::new(db_pool.clone());
        let kpi_repo = KpiRepository::new(db_pool.clone());
        let round_repo = RoundRepository::new(db_pool.clone());
        let evaluation_repo = EvaluationRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone());
        let round_service = RoundService::new(
            round_repo.clone(),
            evaluation_repo.clone(),
            org_repo.clone(),
            db_pool.clone(),
        );
        let org_service = OrgService::new(org_repo.clone(), round_service.clone(), db_pool.clone());
        let kpi_service = KpiService::new(kpi_repo.clone(), org_repo, db_pool.clone());
        let evaluation_service = EvaluationService::new(
            evaluation_repo.clone(),
            round_repo,
            kpi_repo,
            db_pool.clone(),
            config.public_base_url.clone(),
        );
        let access_service = AccessService::new(evaluation_repo, evaluation_service.clone(), db_pool.clone());

        Self {
            db_pool,
            config,
            auth_service,
            org_service,
            kpi_service,
            round_service,
            evaluation_service,
            access_service,
        }
    }
}
