// src/db/report_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::report::{
        ChecklistCategory, ChecklistItem, CreateChecklistCategoryPayload,
        CreateChecklistItemPayload, CreateReportPayload, Report, ReportListRow, ReportStatus,
        UpdateChecklistItemPayload,
    },
};

const REPORT_COLUMNS: &str = r#"
    id, descricao, cliente_id, categoria, responsavel_inspecao_id,
    status, data_agendada, criado_em, finalizado_em
"#;

const REPORT_LIST_SELECT: &str = r#"
    SELECT r.id, r.descricao, r.cliente_id, c.nome_fantasia AS cliente_nome_fantasia,
           r.status, r.criado_em, r.data_agendada
    FROM reports r
    LEFT JOIN clients c ON c.id = r.cliente_id
"#;

const ITEM_COLUMNS: &str =
    "id, categoria_id, codigo, descricao, resposta, observacoes, ordem";

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  RELATÓRIO
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Report>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(report)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: i32,
    ) -> Result<Option<Report>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(report)
    }

    pub async fn insert_report<'e, E>(
        &self,
        executor: E,
        payload: &CreateReportPayload,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (descricao, cliente_id, categoria, responsavel_inspecao_id, data_agendada)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(&payload.descricao)
        .bind(payload.cliente_id)
        .bind(&payload.categoria)
        .bind(payload.responsavel_inspecao_id)
        .bind(payload.data_agendada)
        .fetch_one(executor)
        .await?;
        Ok(report)
    }

    /// Grava os campos mutáveis de um relatório já mesclado.
    pub async fn save_report<'e, E>(&self, executor: E, report: &Report) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports SET
                descricao = $2, categoria = $3, status = $4,
                data_agendada = $5, finalizado_em = $6
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report.id)
        .bind(&report.descricao)
        .bind(&report.categoria)
        .bind(report.status)
        .bind(report.data_agendada)
        .bind(report.finalizado_em)
        .fetch_one(executor)
        .await?;
        Ok(saved)
    }

    /// Categorias e itens caem em cascata.
    pub async fn delete_report<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_reports(
        &self,
        cliente_id: Option<i32>,
        status: Option<ReportStatus>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ReportListRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportListRow>(&format!(
            r#"
            {REPORT_LIST_SELECT}
            WHERE ($1::int IS NULL OR r.cliente_id = $1)
              AND ($2::report_status IS NULL OR r.status = $2)
            ORDER BY r.criado_em DESC, r.id DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(cliente_id)
        .bind(status)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Relatórios cuja data agendada cai no mês/ano informado.
    pub async fn list_by_schedule_month(
        &self,
        mes: i32,
        ano: i32,
    ) -> Result<Vec<ReportListRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportListRow>(&format!(
            r#"
            {REPORT_LIST_SELECT}
            WHERE EXTRACT(MONTH FROM r.data_agendada)::int = $1
              AND EXTRACT(YEAR FROM r.data_agendada)::int = $2
            ORDER BY r.data_agendada ASC, r.id ASC
            "#
        ))
        .bind(mes)
        .bind(ano)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_reports(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // =========================================================================
    //  CHECKLIST
    // =========================================================================

    pub async fn insert_category<'e, E>(
        &self,
        executor: E,
        relatorio_id: i32,
        payload: &CreateChecklistCategoryPayload,
    ) -> Result<ChecklistCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, ChecklistCategory>(
            r#"
            INSERT INTO checklist_categories (relatorio_id, nome, ordem)
            VALUES ($1, $2, $3)
            RETURNING id, relatorio_id, nome, ordem
            "#,
        )
        .bind(relatorio_id)
        .bind(&payload.nome)
        .bind(payload.ordem)
        .fetch_one(executor)
        .await?;
        Ok(category)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        categoria_id: i32,
        payload: &CreateChecklistItemPayload,
    ) -> Result<ChecklistItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            INSERT INTO checklist_items (categoria_id, codigo, descricao, resposta, observacoes, ordem)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(categoria_id)
        .bind(&payload.codigo)
        .bind(&payload.descricao)
        .bind(payload.resposta)
        .bind(&payload.observacoes)
        .bind(payload.ordem)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    // Ordem explícita; empates ficam na ordem de inserção (id)
    pub async fn list_categories<'e, E>(
        &self,
        executor: E,
        relatorio_id: i32,
    ) -> Result<Vec<ChecklistCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, ChecklistCategory>(
            r#"
            SELECT id, relatorio_id, nome, ordem
            FROM checklist_categories
            WHERE relatorio_id = $1
            ORDER BY ordem ASC, id ASC
            "#,
        )
        .bind(relatorio_id)
        .fetch_all(executor)
        .await?;
        Ok(categories)
    }

    pub async fn list_items_for_report<'e, E>(
        &self,
        executor: E,
        relatorio_id: i32,
    ) -> Result<Vec<ChecklistItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT i.id, i.categoria_id, i.codigo, i.descricao, i.resposta, i.observacoes, i.ordem
            FROM checklist_items i
            JOIN checklist_categories c ON c.id = i.categoria_id
            WHERE c.relatorio_id = $1
            ORDER BY i.ordem ASC, i.id ASC
            "#,
        )
        .bind(relatorio_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Campos ausentes não são alterados. None se o item não existe.
    pub async fn update_item(
        &self,
        id: i32,
        payload: &UpdateChecklistItemPayload,
    ) -> Result<Option<ChecklistItem>, AppError> {
        let item = sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            UPDATE checklist_items SET
                resposta = COALESCE($2, resposta),
                observacoes = COALESCE($3, observacoes)
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.resposta)
        .bind(&payload.observacoes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }
}
