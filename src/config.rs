// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{ClientRepository, ReportRepository, UserRepository},
    services::{
        auth::AuthService, client_service::ClientService, document_service::DocumentService,
        report_service::ReportService, user_service::UserService,
    },
};

const DEFAULT_TOKEN_MINUTES: i64 = 1440;
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_FONTS_DIR: &str = "./fonts";
const DEFAULT_FONT_FAMILY: &str = "Roboto";

/// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub server_addr: String,
    pub pdf_fonts_dir: String,
    pub pdf_font_family: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let token_ttl_minutes = match lookup("JWT_EXPIRATION_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .with_context(|| format!("JWT_EXPIRATION_MINUTES inválido: {raw}"))?,
            None => DEFAULT_TOKEN_MINUTES,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl_minutes,
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            pdf_fonts_dir: lookup("PDF_FONTS_DIR").unwrap_or_else(|| DEFAULT_FONTS_DIR.to_string()),
            pdf_font_family: lookup("PDF_FONT_FAMILY")
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub client_service: ClientService,
    pub report_service: ReportService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, settings: &Settings) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            settings.jwt_secret.clone(),
            chrono::Duration::minutes(settings.token_ttl_minutes),
            db_pool.clone(),
        );
        let user_service =
            UserService::new(user_repo.clone(), client_repo.clone(), report_repo.clone());
        let client_service = ClientService::new(client_repo.clone(), db_pool.clone());
        let report_service =
            ReportService::new(report_repo, client_repo, user_repo, db_pool.clone());
        let document_service = DocumentService::new(
            report_service.clone(),
            settings.pdf_fonts_dir.clone(),
            settings.pdf_font_family.clone(),
        );

        Self {
            db_pool,
            auth_service,
            user_service,
            client_service,
            report_service,
            document_service,
        }
    }
}
