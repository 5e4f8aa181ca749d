// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::{map_unique_violation, AppError},
    models::client::{
        Client, ClientCollaborators, ClientResponsible, ClientSummary, CollaboratorsPayload,
        CreateClientPayload, ResponsiblePayload,
    },
};

const CLIENT_COLUMNS: &str = r#"
    id, status, nome_fantasia, categoria, razao_social, cnpj,
    inscricao_estadual, inscricao_municipal, email, site_instagram,
    telefone_contato_1, telefone_contato_2, endereco, numero, bairro,
    complemento, cidade, estado, cep, logo_url, criado_em, atualizado_em
"#;

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTE
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    /// Mesma busca, mas trava a linha até o fim da transação.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: i32,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    /// Há outro cliente (diferente de `except_id`) com este CNPJ?
    pub async fn cnpj_taken<'e, E>(
        &self,
        executor: E,
        cnpj: &str,
        except_id: Option<i32>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM clients
                WHERE cnpj = $1 AND ($2::int IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(cnpj)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    pub async fn insert_client<'e, E>(
        &self,
        executor: E,
        payload: &CreateClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (
                status, nome_fantasia, categoria, razao_social, cnpj,
                inscricao_estadual, inscricao_municipal, email, site_instagram,
                telefone_contato_1, telefone_contato_2, endereco, numero, bairro,
                complemento, cidade, estado, cep, logo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(payload.status)
        .bind(&payload.nome_fantasia)
        .bind(payload.categoria)
        .bind(&payload.razao_social)
        .bind(&payload.cnpj)
        .bind(&payload.inscricao_estadual)
        .bind(&payload.inscricao_municipal)
        .bind(&payload.email)
        .bind(&payload.site_instagram)
        .bind(&payload.telefone_contato_1)
        .bind(&payload.telefone_contato_2)
        .bind(&payload.endereco)
        .bind(&payload.numero)
        .bind(&payload.bairro)
        .bind(&payload.complemento)
        .bind(&payload.cidade)
        .bind(&payload.estado)
        .bind(&payload.cep)
        .bind(&payload.logo_url)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, AppError::CnpjAlreadyExists))
    }

    /// Grava todos os campos escalares do cliente já mesclado.
    pub async fn save_client<'e, E>(&self, executor: E, client: &Client) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients SET
                status = $2, nome_fantasia = $3, categoria = $4, razao_social = $5, cnpj = $6,
                inscricao_estadual = $7, inscricao_municipal = $8, email = $9, site_instagram = $10,
                telefone_contato_1 = $11, telefone_contato_2 = $12, endereco = $13, numero = $14,
                bairro = $15, complemento = $16, cidade = $17, estado = $18, cep = $19,
                logo_url = $20, atualizado_em = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(client.id)
        .bind(client.status)
        .bind(&client.nome_fantasia)
        .bind(client.categoria)
        .bind(&client.razao_social)
        .bind(&client.cnpj)
        .bind(&client.inscricao_estadual)
        .bind(&client.inscricao_municipal)
        .bind(&client.email)
        .bind(&client.site_instagram)
        .bind(&client.telefone_contato_1)
        .bind(&client.telefone_contato_2)
        .bind(&client.endereco)
        .bind(&client.numero)
        .bind(&client.bairro)
        .bind(&client.complemento)
        .bind(&client.cidade)
        .bind(&client.estado)
        .bind(&client.cep)
        .bind(&client.logo_url)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, AppError::CnpjAlreadyExists))
    }

    /// Remove o cliente; o banco remove em cascata responsáveis,
    /// colaboradores e relatórios. Retorna false se não existia.
    pub async fn delete_client<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Listagem paginada com busca por nome fantasia ou CNPJ (case-insensitive)
    pub async fn list_clients(
        &self,
        search: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ClientSummary>, AppError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let clients = sqlx::query_as::<_, ClientSummary>(
            r#"
            SELECT id, status, nome_fantasia, categoria, cnpj, logo_url
            FROM clients
            WHERE $1::text IS NULL OR nome_fantasia ILIKE $1 OR cnpj ILIKE $1
            ORDER BY nome_fantasia ASC, id ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(pattern)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn count_clients(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // =========================================================================
    //  RESPONSÁVEIS
    // =========================================================================

    pub async fn insert_responsible<'e, E>(
        &self,
        executor: E,
        cliente_id: i32,
        payload: &ResponsiblePayload,
    ) -> Result<ClientResponsible, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let responsible = sqlx::query_as::<_, ClientResponsible>(
            r#"
            INSERT INTO client_responsibles (cliente_id, tipo, nome_completo, email, telefone, cpf)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, cliente_id, tipo, nome_completo, email, telefone, cpf
            "#,
        )
        .bind(cliente_id)
        .bind(payload.tipo)
        .bind(&payload.nome_completo)
        .bind(&payload.email)
        .bind(&payload.telefone)
        .bind(&payload.cpf)
        .fetch_one(executor)
        .await?;
        Ok(responsible)
    }

    pub async fn delete_responsibles<'e, E>(&self, executor: E, cliente_id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM client_responsibles WHERE cliente_id = $1")
            .bind(cliente_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_responsibles<'e, E>(
        &self,
        executor: E,
        cliente_id: i32,
    ) -> Result<Vec<ClientResponsible>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let responsibles = sqlx::query_as::<_, ClientResponsible>(
            r#"
            SELECT id, cliente_id, tipo, nome_completo, email, telefone, cpf
            FROM client_responsibles
            WHERE cliente_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(cliente_id)
        .fetch_all(executor)
        .await?;
        Ok(responsibles)
    }

    // =========================================================================
    //  COLABORADORES (no máximo um registro por cliente)
    // =========================================================================

    /// Atualiza se existir, senão cria.
    pub async fn upsert_collaborators<'e, E>(
        &self,
        executor: E,
        cliente_id: i32,
        payload: &CollaboratorsPayload,
    ) -> Result<ClientCollaborators, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collaborators = sqlx::query_as::<_, ClientCollaborators>(
            r#"
            INSERT INTO client_collaborators (
                cliente_id, numero_total_colaboradores, numero_manipuladores_alimentos
            )
            VALUES ($1, $2, $3)
            ON CONFLICT (cliente_id) DO UPDATE SET
                numero_total_colaboradores = EXCLUDED.numero_total_colaboradores,
                numero_manipuladores_alimentos = EXCLUDED.numero_manipuladores_alimentos
            RETURNING id, cliente_id, numero_total_colaboradores, numero_manipuladores_alimentos
            "#,
        )
        .bind(cliente_id)
        .bind(payload.numero_total_colaboradores)
        .bind(payload.numero_manipuladores_alimentos)
        .fetch_one(executor)
        .await?;
        Ok(collaborators)
    }

    pub async fn find_collaborators<'e, E>(
        &self,
        executor: E,
        cliente_id: i32,
    ) -> Result<Option<ClientCollaborators>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let collaborators = sqlx::query_as::<_, ClientCollaborators>(
            r#"
            SELECT id, cliente_id, numero_total_colaboradores, numero_manipuladores_alimentos
            FROM client_collaborators
            WHERE cliente_id = $1
            "#,
        )
        .bind(cliente_id)
        .fetch_optional(executor)
        .await?;
        Ok(collaborators)
    }
}
