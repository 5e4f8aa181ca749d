// src/services/client_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::client::{
        ClientDetail, ClientSummary, CreateClientPayload, ListClientsQuery, UpdateClientPayload,
    },
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    pool: PgPool,
}

impl ClientService {
    pub fn new(repo: ClientRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Cria o cliente com responsáveis e colaboradores em uma única transação.
    pub async fn create_client(&self, payload: &CreateClientPayload) -> Result<ClientDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.repo.cnpj_taken(&mut *tx, &payload.cnpj, None).await? {
            return Err(AppError::CnpjAlreadyExists);
        }

        let client = self.repo.insert_client(&mut *tx, payload).await?;

        let mut responsaveis = Vec::with_capacity(payload.responsaveis.len());
        for responsible in &payload.responsaveis {
            responsaveis.push(self.repo.insert_responsible(&mut *tx, client.id, responsible).await?);
        }

        let colaboradores_info = match &payload.colaboradores_info {
            Some(info) => Some(self.repo.upsert_collaborators(&mut *tx, client.id, info).await?),
            None => None,
        };

        tx.commit().await?;

        tracing::info!("🏪 Cliente {} ({}) criado.", client.id, client.cnpj);
        Ok(ClientDetail { client, responsaveis, colaboradores_info })
    }

    pub async fn get_client(&self, id: i32) -> Result<ClientDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ClientNotFound)?;
        let responsaveis = self.repo.list_responsibles(&mut *tx, id).await?;
        let colaboradores_info = self.repo.find_collaborators(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(ClientDetail { client, responsaveis, colaboradores_info })
    }

    pub async fn list_clients(&self, query: &ListClientsQuery) -> Result<Vec<ClientSummary>, AppError> {
        self.repo
            .list_clients(query.search.as_deref(), query.skip, query.limit)
            .await
    }

    /// Atualização parcial. Responsáveis enviados substituem todos os
    /// existentes; colaboradores são atualizados ou criados.
    pub async fn update_client(
        &self,
        id: i32,
        payload: &UpdateClientPayload,
    ) -> Result<ClientDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut client = self.repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        if let Some(cnpj) = &payload.cnpj {
            if cnpj != &client.cnpj && self.repo.cnpj_taken(&mut *tx, cnpj, Some(id)).await? {
                return Err(AppError::CnpjAlreadyExists);
            }
        }

        client.apply_update(payload);
        let client = self.repo.save_client(&mut *tx, &client).await?;

        if let Some(new_responsibles) = &payload.responsaveis {
            let removed = self.repo.delete_responsibles(&mut *tx, id).await?;
            for responsible in new_responsibles {
                self.repo.insert_responsible(&mut *tx, id, responsible).await?;
            }
            tracing::debug!(
                "Responsáveis do cliente {} substituídos ({} removidos, {} inseridos).",
                id,
                removed,
                new_responsibles.len()
            );
        }

        if let Some(info) = &payload.colaboradores_info {
            self.repo.upsert_collaborators(&mut *tx, id, info).await?;
        }

        let responsaveis = self.repo.list_responsibles(&mut *tx, id).await?;
        let colaboradores_info = self.repo.find_collaborators(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(ClientDetail { client, responsaveis, colaboradores_info })
    }

    /// Responsáveis, colaboradores e relatórios caem em cascata.
    pub async fn delete_client(&self, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.repo.delete_client(&mut *tx, id).await? {
            return Err(AppError::ClientNotFound);
        }

        tx.commit().await?;

        tracing::info!("🗑️ Cliente {} removido.", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn service(pool: PgPool) -> ClientService {
        ClientService::new(ClientRepository::new(pool.clone()), pool)
    }

    fn payload(cnpj: &str) -> CreateClientPayload {
        serde_json::from_value(serde_json::json!({
            "status": "ativo",
            "nome_fantasia": "Padaria Central",
            "categoria": "padaria_confeitaria",
            "razao_social": "Padaria Central LTDA",
            "cnpj": cnpj,
            "email": "contato@central.com",
            "cidade": "Campinas",
            "responsaveis": [
                { "tipo": "responsavel_tecnico", "nome_completo": "Maria Lima" }
            ]
        }))
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn duplicate_cnpj_is_a_conflict(pool: PgPool) {
        let service = service(pool);
        service.create_client(&payload("12.345.678/0001-99")).await.unwrap();

        let err = service.create_client(&payload("12.345.678/0001-99")).await.unwrap_err();
        assert!(matches!(err, AppError::CnpjAlreadyExists));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn null_in_update_clears_stored_value(pool: PgPool) {
        let service = service(pool);
        let created = service.create_client(&payload("11.222.333/0001-44")).await.unwrap();

        let update: UpdateClientPayload = serde_json::from_str(r#"{"email": null}"#).unwrap();
        service.update_client(created.client.id, &update).await.unwrap();

        let stored = service.get_client(created.client.id).await.unwrap();
        assert!(stored.client.email.is_none());
        assert_eq!(stored.client.cidade.as_deref(), Some("Campinas"));
        // Sem `responsaveis` no payload, a lista fica intacta
        assert_eq!(stored.responsaveis.len(), 1);
    }
}
