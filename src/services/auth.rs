// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, RegisterUserPayload, UpdateProfilePayload, User, UserRole},
};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "Se o email existir no sistema, você receberá instruções para redefinir sua senha";

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: Duration,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl: Duration, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, token_ttl, pool }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<User, AppError> {
        if self.user_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(&payload.senha).await?;

        // 2. Valida o superior e cria o usuário na mesma transação
        let mut tx = self.pool.begin().await?;

        if let Some(superior_id) = payload.superior_id {
            if !self.user_repo.exists(&mut *tx, superior_id).await? {
                return Err(AppError::SupervisorNotFound); // drop do tx faz rollback
            }
        }

        let new_user = self.user_repo
            .create_user(
                &mut *tx,
                &payload.nome,
                &payload.email,
                &hashed_password,
                // Auto-registro sempre entra como operador
                UserRole::default(),
                payload.superior_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Usuário {} registrado (id {}).", new_user.email, new_user.id);
        Ok(new_user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.senha_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user.email)
    }

    /// Valida assinatura e expiração e resolve o usuário dono do token.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        // Usuário removido ou e-mail trocado: o token deixa de valer
        self.user_repo
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn update_profile(
        &self,
        user: &User,
        payload: &UpdateProfilePayload,
    ) -> Result<User, AppError> {
        let nome = payload.nome.clone().unwrap_or_else(|| user.nome.clone());

        let email = match &payload.email {
            Some(email) if email != &user.email => {
                if self.user_repo.find_by_email(email).await?.is_some() {
                    return Err(AppError::EmailAlreadyExists);
                }
                email.clone()
            }
            _ => user.email.clone(),
        };

        // Troca de senha exige a senha atual
        let senha_hash = match &payload.senha_nova {
            Some(nova) => {
                let atual = payload.senha_atual.as_deref().ok_or(AppError::IncorrectPassword)?;
                if !verify_password(atual, &user.senha_hash).await? {
                    return Err(AppError::IncorrectPassword);
                }
                hash_password(nova).await?
            }
            None => user.senha_hash.clone(),
        };

        let updated = self.user_repo
            .update_profile(&self.pool, user.id, &nome, &email, &senha_hash)
            .await?;

        tracing::info!("✏️ Perfil do usuário {} atualizado.", updated.id);
        Ok(updated)
    }

    /// Não revela se o e-mail existe e não envia nada.
    pub async fn forgot_password(&self, email: &str) -> Result<&'static str, AppError> {
        let user = self.user_repo.find_by_email(email).await?;
        // TODO: gerar token de recuperação e enviar por e-mail quando houver SMTP configurado
        tracing::info!(conta_existe = user.is_some(), "🔑 Pedido de recuperação de senha recebido.");
        Ok(FORGOT_PASSWORD_MESSAGE)
    }

    fn create_token(&self, email: &str) -> Result<String, AppError> {
        encode_token(&self.jwt_secret, email, self.token_ttl, Utc::now())
    }
}

fn encode_token(secret: &str, email: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, AppError> {
    let expires_at = now + ttl;

    let claims = Claims {
        sub: email.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

// bcrypt é pesado: roda em um thread separado
async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn token_round_trip_keeps_email_subject() {
        let token = encode_token(SECRET, "ana@bpa.com", Duration::minutes(30), Utc::now()).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "ana@bpa.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(3);
        let token = encode_token(SECRET, "ana@bpa.com", Duration::hours(1), issued).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_token("outro-segredo", "ana@bpa.com", Duration::hours(1), Utc::now()).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(matches!(decode_token(SECRET, "nao.e.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("senha123").await.unwrap();
        assert!(verify_password("senha123", &hashed).await.unwrap());
        assert!(!verify_password("senha124", &hashed).await.unwrap());
    }

    fn service(pool: PgPool) -> AuthService {
        AuthService::new(UserRepository::new(pool.clone()), SECRET.into(), Duration::hours(1), pool)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn self_registration_always_creates_operator(pool: PgPool) {
        let payload: RegisterUserPayload = serde_json::from_str(
            r#"{"nome": "Ana Souza", "email": "ana@bpa.com", "senha": "segredo1", "role": "admin"}"#,
        )
        .unwrap();

        let user = service(pool).register_user(&payload).await.unwrap();
        assert_eq!(user.role, UserRole::Operador);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn unknown_supervisor_is_not_found(pool: PgPool) {
        let payload = RegisterUserPayload {
            nome: "Ana Souza".into(),
            email: "ana@bpa.com".into(),
            senha: "segredo1".into(),
            superior_id: Some(9999),
        };

        let err = service(pool.clone()).register_user(&payload).await.unwrap_err();
        assert!(matches!(err, AppError::SupervisorNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);

        // Nada foi gravado
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
