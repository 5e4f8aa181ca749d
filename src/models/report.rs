// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{error::AppError, serde_utils::double_option};
use crate::models::client::default_limit;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    EmAndamento,
    Concluido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "checklist_response", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChecklistResponse {
    Conforme,
    NaoConforme,
    Na,
}

// --- ENTIDADES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Report {
    pub id: i32,
    #[schema(example = "Inspeção semestral")]
    pub descricao: String,
    pub cliente_id: i32,
    pub categoria: Option<String>,
    pub responsavel_inspecao_id: i32,
    pub status: ReportStatus,
    pub data_agendada: Option<DateTime<Utc>>,
    pub criado_em: DateTime<Utc>,
    // Preenchido se e somente se status == Concluido
    pub finalizado_em: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ChecklistCategory {
    pub id: i32,
    pub relatorio_id: i32,
    #[schema(example = "Edificação, Instalações e Transporte")]
    pub nome: String,
    pub ordem: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ChecklistItem {
    pub id: i32,
    pub categoria_id: i32,
    #[schema(example = "1.1.1")]
    pub codigo: String,
    pub descricao: String,
    pub resposta: Option<ChecklistResponse>,
    pub observacoes: Option<String>,
    pub ordem: i32,
}

// --- RESPOSTAS ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientBrief {
    pub nome_fantasia: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: ChecklistCategory,
    pub itens: Vec<ChecklistItem>,
}

// Relatório com a árvore completa de categorias e itens
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub cliente: Option<ClientBrief>,
    pub categorias: Vec<CategoryWithItems>,
}

// Linha do banco para as listagens (JOIN com clients)
#[derive(Debug, Clone, FromRow)]
pub struct ReportListRow {
    pub id: i32,
    pub descricao: String,
    pub cliente_id: i32,
    pub cliente_nome_fantasia: Option<String>,
    pub status: ReportStatus,
    pub criado_em: DateTime<Utc>,
    pub data_agendada: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportSummary {
    pub id: i32,
    pub descricao: String,
    pub cliente_id: i32,
    pub cliente: Option<ClientBrief>,
    pub status: ReportStatus,
    pub criado_em: DateTime<Utc>,
    pub data_agendada: Option<DateTime<Utc>>,
}

impl From<ReportListRow> for ReportSummary {
    fn from(row: ReportListRow) -> Self {
        Self {
            id: row.id,
            descricao: row.descricao,
            cliente_id: row.cliente_id,
            cliente: row
                .cliente_nome_fantasia
                .map(|nome_fantasia| ClientBrief { nome_fantasia }),
            status: row.status,
            criado_em: row.criado_em,
            data_agendada: row.data_agendada,
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateChecklistItemPayload {
    #[validate(length(min = 1, max = 20, message = "O código deve ter entre 1 e 20 caracteres."))]
    #[schema(example = "1.1.1")]
    pub codigo: String,
    pub descricao: String,
    pub resposta: Option<ChecklistResponse>,
    pub observacoes: Option<String>,
    #[validate(range(min = 1, message = "A ordem deve ser maior ou igual a 1."))]
    pub ordem: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateChecklistCategoryPayload {
    #[validate(length(min = 1, max = 255, message = "O nome da categoria é obrigatório."))]
    pub nome: String,
    #[validate(range(min = 1, message = "A ordem deve ser maior ou igual a 1."))]
    pub ordem: i32,
    #[serde(default)]
    #[validate(nested)]
    pub itens: Vec<CreateChecklistItemPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReportPayload {
    #[validate(length(min = 1, max = 255, message = "A descrição deve ter entre 1 e 255 caracteres."))]
    pub descricao: String,
    pub cliente_id: i32,
    #[validate(length(max = 100, message = "A categoria deve ter no máximo 100 caracteres."))]
    pub categoria: Option<String>,
    pub responsavel_inspecao_id: i32,
    pub data_agendada: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub categorias: Vec<CreateChecklistCategoryPayload>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReportPayload {
    #[validate(length(min = 1, max = 255, message = "A descrição deve ter entre 1 e 255 caracteres."))]
    pub descricao: Option<String>,
    #[validate(length(max = 100, message = "A categoria deve ter no máximo 100 caracteres."))]
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub categoria: Option<Option<String>>,
    pub status: Option<ReportStatus>,
    // `null` remove o agendamento
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub data_agendada: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateChecklistItemPayload {
    pub resposta: Option<ChecklistResponse>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReportsQuery {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip não pode ser negativo."))]
    pub skip: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit deve estar entre 1 e 100."))]
    pub limit: i64,
    /// Filtrar por cliente
    pub cliente_id: Option<i32>,
    /// Filtrar por status
    pub status_filter: Option<ReportStatus>,
}

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Mês (1-12)
    #[validate(range(min = 1, max = 12, message = "mes deve estar entre 1 e 12."))]
    pub mes: i32,
    /// Ano
    #[validate(range(min = 2000, max = 2100, message = "ano deve estar entre 2000 e 2100."))]
    pub ano: i32,
}

// --- TRANSIÇÕES DE STATUS ---

impl Report {
    pub fn is_concluded(&self) -> bool {
        self.status == ReportStatus::Concluido
    }

    /// Atualização parcial. Concluir por aqui só carimba `finalizado_em`
    /// se ainda não houver data; voltar para em andamento é recusado.
    pub fn apply_update(
        &mut self,
        payload: &UpdateReportPayload,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.is_concluded() && payload.status == Some(ReportStatus::EmAndamento) {
            return Err(AppError::ReportStatusRegression);
        }

        if let Some(descricao) = &payload.descricao {
            self.descricao = descricao.clone();
        }
        if let Some(categoria) = &payload.categoria {
            self.categoria.clone_from(categoria);
        }
        if let Some(data_agendada) = payload.data_agendada {
            self.data_agendada = data_agendada;
        }
        if let Some(status) = payload.status {
            self.status = status;
        }

        if self.is_concluded() && self.finalizado_em.is_none() {
            self.finalizado_em = Some(now);
        }

        Ok(())
    }

    /// Encerramento explícito: falha se já concluído.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.is_concluded() {
            return Err(AppError::ReportAlreadyFinalized);
        }
        self.status = ReportStatus::Concluido;
        self.finalizado_em = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open_report() -> Report {
        Report {
            id: 1,
            descricao: "Inspeção inicial".into(),
            cliente_id: 10,
            categoria: None,
            responsavel_inspecao_id: 3,
            status: ReportStatus::EmAndamento,
            data_agendada: None,
            criado_em: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            finalizado_em: None,
        }
    }

    #[test]
    fn finalize_stamps_completion_once() {
        let mut report = open_report();
        let first = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();

        report.finalize(first).unwrap();
        assert_eq!(report.status, ReportStatus::Concluido);
        assert_eq!(report.finalizado_em, Some(first));

        let second = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let err = report.finalize(second).unwrap_err();
        assert!(matches!(err, AppError::ReportAlreadyFinalized));
        assert_eq!(report.finalizado_em, Some(first));
    }

    #[test]
    fn update_to_concluded_sets_completion_only_if_missing() {
        let mut report = open_report();
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let payload = UpdateReportPayload {
            status: Some(ReportStatus::Concluido),
            ..Default::default()
        };

        report.apply_update(&payload, now).unwrap();
        assert_eq!(report.finalizado_em, Some(now));

        let later = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        report.apply_update(&payload, later).unwrap();
        assert_eq!(report.finalizado_em, Some(now));
    }

    #[test]
    fn update_without_status_leaves_completion_empty() {
        let mut report = open_report();
        let payload = UpdateReportPayload {
            descricao: Some("Nova descrição".into()),
            categoria: Some(Some("Rotina".into())),
            ..Default::default()
        };

        report.apply_update(&payload, Utc::now()).unwrap();
        assert_eq!(report.descricao, "Nova descrição");
        assert_eq!(report.categoria.as_deref(), Some("Rotina"));
        assert_eq!(report.status, ReportStatus::EmAndamento);
        assert!(report.finalizado_em.is_none());
    }

    #[test]
    fn null_clears_category_and_schedule() {
        let mut report = open_report();
        report.categoria = Some("Rotina".into());
        report.data_agendada = Some(Utc.with_ymd_and_hms(2025, 3, 10, 13, 0, 0).unwrap());

        let keep: UpdateReportPayload =
            serde_json::from_str(r#"{"descricao": "Revisita"}"#).unwrap();
        report.apply_update(&keep, Utc::now()).unwrap();
        assert_eq!(report.categoria.as_deref(), Some("Rotina"));
        assert!(report.data_agendada.is_some());

        let clear: UpdateReportPayload =
            serde_json::from_str(r#"{"categoria": null, "data_agendada": null}"#).unwrap();
        assert!(clear.validate().is_ok());
        report.apply_update(&clear, Utc::now()).unwrap();
        assert!(report.categoria.is_none());
        assert!(report.data_agendada.is_none());
        assert_eq!(report.descricao, "Revisita");
    }

    #[test]
    fn concluded_report_cannot_be_reopened() {
        let mut report = open_report();
        report.finalize(Utc::now()).unwrap();

        let payload = UpdateReportPayload {
            status: Some(ReportStatus::EmAndamento),
            ..Default::default()
        };
        let err = report.apply_update(&payload, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::ReportStatusRegression));
        assert!(report.is_concluded());
        assert!(report.finalizado_em.is_some());
    }

    #[test]
    fn checklist_payload_requires_positive_order() {
        let payload: CreateReportPayload = serde_json::from_value(serde_json::json!({
            "descricao": "Visita",
            "cliente_id": 1,
            "responsavel_inspecao_id": 2,
            "categorias": [
                { "nome": "Higiene", "ordem": 0, "itens": [
                    { "codigo": "1.1", "descricao": "Pias limpas", "ordem": 1 }
                ]}
            ]
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn response_enum_matches_wire_names() {
        assert_eq!(
            serde_json::to_value(ChecklistResponse::NaoConforme).unwrap(),
            "nao_conforme"
        );
        assert_eq!(serde_json::to_value(ReportStatus::EmAndamento).unwrap(), "em_andamento");
    }
}
