// src/services/report_service.rs

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::{ClientRepository, ReportRepository, UserRepository},
    models::{
        auth::User,
        client::Client,
        report::{
            CalendarQuery, CategoryWithItems, ChecklistCategory, ChecklistItem, ClientBrief,
            CreateReportPayload, ListReportsQuery, Report, ReportDetail, ReportSummary,
            UpdateChecklistItemPayload, UpdateReportPayload,
        },
    },
};

/// Tudo o que o PDF precisa, já carregado.
#[derive(Debug, Clone)]
pub struct ReportExport {
    pub report: Report,
    pub client: Option<Client>,
    pub inspector: Option<User>,
    pub categories: Vec<CategoryWithItems>,
}

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    client_repo: ClientRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl ReportService {
    pub fn new(
        repo: ReportRepository,
        client_repo: ClientRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, client_repo, user_repo, pool }
    }

    /// Relatório + categorias + itens em uma única transação.
    /// As ordens vêm do chamador e são gravadas como estão.
    pub async fn create_report(&self, payload: &CreateReportPayload) -> Result<ReportDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.client_repo.exists(&mut *tx, payload.cliente_id).await? {
            return Err(AppError::ClientNotFound);
        }
        if !self.user_repo.exists(&mut *tx, payload.responsavel_inspecao_id).await? {
            return Err(AppError::InspectorNotFound);
        }

        let report = self.repo.insert_report(&mut *tx, payload).await?;

        let mut categories = Vec::with_capacity(payload.categorias.len());
        let mut items = Vec::new();
        for category_payload in &payload.categorias {
            let category = self.repo.insert_category(&mut *tx, report.id, category_payload).await?;
            for item_payload in &category_payload.itens {
                items.push(self.repo.insert_item(&mut *tx, category.id, item_payload).await?);
            }
            categories.push(category);
        }

        let mut detail = self.load_detail(&mut *tx, report).await?;
        detail.categorias = assemble_checklist(categories, items);

        tx.commit().await?;

        tracing::info!(
            "📋 Relatório {} criado para o cliente {} ({} categorias).",
            detail.report.id,
            detail.report.cliente_id,
            detail.categorias.len()
        );
        Ok(detail)
    }

    pub async fn get_report(&self, id: i32) -> Result<ReportDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let report = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        let mut detail = self.load_detail(&mut *tx, report).await?;
        let categories = self.repo.list_categories(&mut *tx, id).await?;
        let items = self.repo.list_items_for_report(&mut *tx, id).await?;
        detail.categorias = assemble_checklist(categories, items);

        tx.commit().await?;
        Ok(detail)
    }

    pub async fn list_reports(&self, query: &ListReportsQuery) -> Result<Vec<ReportSummary>, AppError> {
        let rows = self.repo
            .list_reports(query.cliente_id, query.status_filter, query.skip, query.limit)
            .await?;
        Ok(rows.into_iter().map(ReportSummary::from).collect())
    }

    pub async fn calendar(&self, query: &CalendarQuery) -> Result<Vec<ReportSummary>, AppError> {
        let rows = self.repo.list_by_schedule_month(query.mes, query.ano).await?;
        Ok(rows.into_iter().map(ReportSummary::from).collect())
    }

    pub async fn update_report(
        &self,
        id: i32,
        payload: &UpdateReportPayload,
    ) -> Result<ReportDetail, AppError> {
        self.mutate_report(id, |report| report.apply_update(payload, Utc::now()))
            .await
    }

    /// Encerra o relatório. Falha se já estiver concluído.
    pub async fn finalize_report(&self, id: i32) -> Result<ReportDetail, AppError> {
        let detail = self.mutate_report(id, |report| report.finalize(Utc::now())).await?;
        tracing::info!("✅ Relatório {} finalizado.", id);
        Ok(detail)
    }

    pub async fn delete_report(&self, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.repo.delete_report(&mut *tx, id).await? {
            return Err(AppError::ReportNotFound);
        }

        tx.commit().await?;
        tracing::info!("🗑️ Relatório {} removido.", id);
        Ok(())
    }

    pub async fn update_checklist_item(
        &self,
        item_id: i32,
        payload: &UpdateChecklistItemPayload,
    ) -> Result<ChecklistItem, AppError> {
        self.repo
            .update_item(item_id, payload)
            .await?
            .ok_or(AppError::ChecklistItemNotFound)
    }

    /// Carrega relatório, cliente, responsável e checklist para o PDF.
    pub async fn load_for_export(&self, id: i32) -> Result<ReportExport, AppError> {
        let mut tx = self.pool.begin().await?;

        let report = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::ReportNotFound)?;
        let client = self.client_repo.find_by_id(&mut *tx, report.cliente_id).await?;
        let categories = self.repo.list_categories(&mut *tx, id).await?;
        let items = self.repo.list_items_for_report(&mut *tx, id).await?;

        tx.commit().await?;

        let inspector = self.user_repo.find_by_id(report.responsavel_inspecao_id).await?;

        Ok(ReportExport {
            report,
            client,
            inspector,
            categories: assemble_checklist(categories, items),
        })
    }

    // Lê com FOR UPDATE, aplica a transição e grava, tudo na mesma transação
    async fn mutate_report<F>(&self, id: i32, change: F) -> Result<ReportDetail, AppError>
    where
        F: FnOnce(&mut Report) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let mut report = self.repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        change(&mut report)?;

        let report = self.repo.save_report(&mut *tx, &report).await?;
        let mut detail = self.load_detail(&mut *tx, report).await?;
        let categories = self.repo.list_categories(&mut *tx, id).await?;
        let items = self.repo.list_items_for_report(&mut *tx, id).await?;
        detail.categorias = assemble_checklist(categories, items);

        tx.commit().await?;
        Ok(detail)
    }

    async fn load_detail<'e, E>(&self, executor: E, report: Report) -> Result<ReportDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = self.client_repo.find_by_id(executor, report.cliente_id).await?;

        Ok(ReportDetail {
            cliente: client.map(|c| ClientBrief { nome_fantasia: c.nome_fantasia }),
            report,
            categorias: Vec::new(),
        })
    }
}

/// Monta a árvore categoria → itens. Categorias e itens são ordenados
/// pelo campo `ordem`; a ordenação é estável, então empates preservam a
/// sequência de entrada.
pub fn assemble_checklist(
    mut categories: Vec<ChecklistCategory>,
    items: Vec<ChecklistItem>,
) -> Vec<CategoryWithItems> {
    let mut by_category: HashMap<i32, Vec<ChecklistItem>> = HashMap::new();
    for item in items {
        by_category.entry(item.categoria_id).or_default().push(item);
    }

    categories.sort_by_key(|c| c.ordem);

    categories
        .into_iter()
        .map(|category| {
            let mut itens = by_category.remove(&category.id).unwrap_or_default();
            itens.sort_by_key(|i| i.ordem);
            CategoryWithItems { category, itens }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, ordem: i32) -> ChecklistCategory {
        ChecklistCategory { id, relatorio_id: 1, nome: format!("Categoria {id}"), ordem }
    }

    fn item(id: i32, categoria_id: i32, ordem: i32) -> ChecklistItem {
        ChecklistItem {
            id,
            categoria_id,
            codigo: format!("{categoria_id}.{id}"),
            descricao: "Critério".into(),
            resposta: None,
            observacoes: None,
            ordem,
        }
    }

    #[test]
    fn checklist_is_ordered_by_explicit_order() {
        let categories = vec![category(1, 3), category(2, 1), category(3, 2)];
        let items = vec![item(10, 1, 2), item(11, 1, 1), item(12, 2, 5), item(13, 2, 4)];

        let tree = assemble_checklist(categories, items);

        let category_ids: Vec<i32> = tree.iter().map(|c| c.category.id).collect();
        assert_eq!(category_ids, vec![2, 3, 1]);

        let first_items: Vec<i32> = tree[0].itens.iter().map(|i| i.id).collect();
        assert_eq!(first_items, vec![13, 12]);
        assert!(tree[1].itens.is_empty());
        let last_items: Vec<i32> = tree[2].itens.iter().map(|i| i.id).collect();
        assert_eq!(last_items, vec![11, 10]);
    }

    #[test]
    fn equal_order_values_keep_insertion_sequence() {
        let categories = vec![category(5, 1), category(6, 1), category(7, 1)];
        let items = vec![item(20, 5, 2), item(21, 5, 2), item(22, 5, 1)];

        let tree = assemble_checklist(categories, items);

        let category_ids: Vec<i32> = tree.iter().map(|c| c.category.id).collect();
        assert_eq!(category_ids, vec![5, 6, 7]);
        let item_ids: Vec<i32> = tree[0].itens.iter().map(|i| i.id).collect();
        assert_eq!(item_ids, vec![22, 20, 21]);
    }

    #[test]
    fn items_of_unknown_categories_are_dropped() {
        let tree = assemble_checklist(vec![category(1, 1)], vec![item(1, 99, 1)]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].itens.is_empty());
    }

    // --- Com banco ---

    async fn seed_client_and_inspector(pool: &PgPool) -> (i32, i32) {
        let cliente_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO clients (status, nome_fantasia, categoria, razao_social, cnpj)
            VALUES ('ativo', 'Mercado Bom Preço', 'mercado', 'Bom Preço LTDA', '98.765.432/0001-10')
            RETURNING id
            "#,
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let inspector = UserRepository::new(pool.clone())
            .create_user(pool, "Ana Souza", "ana@bpa.com", "$2b$12$hash", Default::default(), None)
            .await
            .unwrap();

        (cliente_id, inspector.id)
    }

    fn service(pool: PgPool) -> ReportService {
        ReportService::new(
            ReportRepository::new(pool.clone()),
            ClientRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            pool,
        )
    }

    fn create_payload(cliente_id: i32, inspector_id: i32, with_checklist: bool) -> CreateReportPayload {
        let categorias = if with_checklist {
            serde_json::json!([
                { "nome": "Higiene", "ordem": 1, "itens": [
                    { "codigo": "1.1", "descricao": "Pias limpas", "ordem": 1, "resposta": "conforme" }
                ]}
            ])
        } else {
            serde_json::json!([])
        };

        serde_json::from_value(serde_json::json!({
            "descricao": "Inspeção de rotina",
            "cliente_id": cliente_id,
            "responsavel_inspecao_id": inspector_id,
            "categorias": categorias,
        }))
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn second_finalize_fails_and_keeps_timestamp(pool: PgPool) {
        let (cliente_id, inspector_id) = seed_client_and_inspector(&pool).await;
        let service = service(pool);
        let created = service
            .create_report(&create_payload(cliente_id, inspector_id, true))
            .await
            .unwrap();
        let id = created.report.id;

        let first = service.finalize_report(id).await.unwrap();
        let finalizado_em = first.report.finalizado_em;
        assert!(finalizado_em.is_some());

        let err = service.finalize_report(id).await.unwrap_err();
        assert!(matches!(err, AppError::ReportAlreadyFinalized));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let stored = service.get_report(id).await.unwrap();
        assert_eq!(stored.report.finalizado_em, finalizado_em);
        assert_eq!(stored.categorias.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn export_loads_relations_and_empty_checklist(pool: PgPool) {
        let (cliente_id, inspector_id) = seed_client_and_inspector(&pool).await;
        let service = service(pool);
        let created = service
            .create_report(&create_payload(cliente_id, inspector_id, false))
            .await
            .unwrap();

        let export = service.load_for_export(created.report.id).await.unwrap();
        assert!(export.categories.is_empty());
        assert_eq!(export.client.map(|c| c.cnpj).as_deref(), Some("98.765.432/0001-10"));
        assert_eq!(export.inspector.map(|u| u.nome).as_deref(), Some("Ana Souza"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn null_update_clears_schedule(pool: PgPool) {
        let (cliente_id, inspector_id) = seed_client_and_inspector(&pool).await;
        let service = service(pool);
        let mut payload = create_payload(cliente_id, inspector_id, false);
        payload.categoria = Some("Rotina".into());
        payload.data_agendada = Some(Utc::now());
        let created = service.create_report(&payload).await.unwrap();

        let update: UpdateReportPayload =
            serde_json::from_str(r#"{"categoria": null, "data_agendada": null}"#).unwrap();
        let updated = service.update_report(created.report.id, &update).await.unwrap();

        assert!(updated.report.categoria.is_none());
        assert!(updated.report.data_agendada.is_none());
    }
}
