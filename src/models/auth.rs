// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Perfis de acesso. Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Chefe,
    #[default]
    Operador,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ana Souza")]
    pub nome: String,
    #[schema(example = "ana@bpa.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub senha_hash: String,

    pub role: UserRole,
    pub superior_id: Option<i32>,
    pub criado_em: DateTime<Utc>,
}

// Versão resumida usada nas listagens de usuários
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct UserSimplified {
    pub id: i32,
    pub nome: String,
    pub email: String,
    pub role: UserRole,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, max = 255, message = "O nome deve ter entre 3 e 255 caracteres."))]
    #[schema(example = "Ana Souza")]
    pub nome: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ana@bpa.com")]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "A senha deve ter entre 6 e 72 caracteres."))]
    pub senha: String,
    pub superior_id: Option<i32>,
}

// Login via JSON (usado pelo frontend)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub senha: String,
}

// Login via formulário OAuth2 (username = e-mail)
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// Atualização do próprio perfil
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 3, max = 255, message = "O nome deve ter entre 3 e 255 caracteres."))]
    pub nome: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub senha_atual: Option<String>,
    #[validate(length(min = 6, max = 72, message = "A senha deve ter entre 6 e 72 caracteres."))]
    pub senha_nova: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForgotPasswordQuery {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (e-mail do usuário)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_payload_accepts_minimal_body() {
        let payload: RegisterUserPayload = serde_json::from_str(
            r#"{"nome": "Ana Souza", "email": "ana@bpa.com", "senha": "segredo1"}"#,
        )
        .unwrap();
        assert!(payload.superior_id.is_none());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn register_payload_ignores_requested_role() {
        // Papel não vem do cliente: o campo é descartado
        let payload: RegisterUserPayload = serde_json::from_str(
            r#"{"nome": "Ana Souza", "email": "ana@bpa.com", "senha": "segredo1", "role": "admin"}"#,
        )
        .unwrap();
        assert_eq!(payload.email, "ana@bpa.com");
        assert_eq!(UserRole::default(), UserRole::Operador);
    }

    #[test]
    fn register_payload_rejects_bad_email_and_short_password() {
        let payload = RegisterUserPayload {
            nome: "Ana Souza".into(),
            email: "nao-e-email".into(),
            senha: "123".into(),
            superior_id: None,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("senha"));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            nome: "Ana".into(),
            email: "ana@bpa.com".into(),
            senha_hash: "$2b$12$hash".into(),
            role: UserRole::Admin,
            superior_id: None,
            criado_em: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("senha_hash").is_none());
        assert_eq!(value["role"], "admin");
    }
}
