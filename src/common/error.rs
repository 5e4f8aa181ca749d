use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("CNPJ já existe")]
    CnpjAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Senha atual incorreta")]
    IncorrectPassword,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Superior não encontrado")]
    SupervisorNotFound,

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Relatório não encontrado")]
    ReportNotFound,

    #[error("Responsável pela inspeção não encontrado")]
    InspectorNotFound,

    #[error("Item de checklist não encontrado")]
    ChecklistItemNotFound,

    #[error("Relatório já finalizado")]
    ReportAlreadyFinalized,

    #[error("Relatório concluído não pode voltar para em andamento")]
    ReportStatusRegression,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(#[from] genpdf::error::Error),
}

impl AppError {
    /// Status HTTP correspondente a cada variante.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::IncorrectPassword
            | AppError::ReportAlreadyFinalized
            | AppError::ReportStatusRegression => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound
            | AppError::SupervisorNotFound
            | AppError::ClientNotFound
            | AppError::ReportNotFound
            | AppError::InspectorNotFound
            | AppError::ChecklistItemNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::CnpjAlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "Um ou mais campos são inválidos.",
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.",
            AppError::CnpjAlreadyExists => "CNPJ já cadastrado.",
            AppError::InvalidCredentials => "E-mail ou senha incorretos.",
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.",
            AppError::IncorrectPassword => "Senha atual incorreta.",
            AppError::UserNotFound => "Usuário não encontrado.",
            AppError::SupervisorNotFound => "Superior informado não encontrado.",
            AppError::ClientNotFound => "Cliente não encontrado.",
            AppError::ReportNotFound => "Relatório não encontrado.",
            AppError::InspectorNotFound => "Responsável pela inspeção não encontrado.",
            AppError::ChecklistItemNotFound => "Item de checklist não encontrado.",
            AppError::ReportAlreadyFinalized => "Relatório já está finalizado.",
            AppError::ReportStatusRegression => {
                "Um relatório concluído não pode voltar para em andamento."
            }
            _ => "Ocorreu um erro inesperado.",
        }
    }
}

/// Traduz violação de unicidade do Postgres no erro de domínio informado.
pub fn map_unique_violation(e: sqlx::Error, on_conflict: AppError) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_conflict;
        }
    }
    AppError::DatabaseError(e)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": self.public_message(),
                "details": details,
            }));
            return (status, body).into_response();
        }

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let mut response = (status, Json(json!({ "error": self.public_message() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
