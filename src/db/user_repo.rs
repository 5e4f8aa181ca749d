// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::{map_unique_violation, AppError},
    models::auth::{User, UserRole, UserSimplified},
};

const USER_COLUMNS: &str = "id, nome, email, senha_hash, role, superior_id, criado_em";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        nome: &str,
        email: &str,
        senha_hash: &str,
        role: UserRole,
        superior_id: Option<i32>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (nome, email, senha_hash, role, superior_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(nome)
        .bind(email)
        .bind(senha_hash)
        .bind(role)
        .bind(superior_id)
        .fetch_one(executor)
        .await
        // Converte erro de violação de chave única em um erro mais amigável
        .map_err(|e| map_unique_violation(e, AppError::EmailAlreadyExists))
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: i32,
        nome: &str,
        email: &str,
        senha_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET nome = $2, email = $3, senha_hash = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(nome)
        .bind(email)
        .bind(senha_hash)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, AppError::EmailAlreadyExists))?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<UserSimplified>, AppError> {
        let users = sqlx::query_as::<_, UserSimplified>(
            "SELECT id, nome, email, role FROM users ORDER BY nome ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Subordinados diretos mais o próprio usuário (apenas um nível).
    pub async fn list_direct_team(&self, user_id: i32) -> Result<Vec<UserSimplified>, AppError> {
        let users = sqlx::query_as::<_, UserSimplified>(
            r#"
            SELECT id, nome, email, role
            FROM users
            WHERE superior_id = $1 OR id = $1
            ORDER BY nome ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
