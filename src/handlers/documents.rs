// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    services::document_service::report_pdf_filename,
};

// GET /reports/{id}/pdf
#[utoipa::path(
    get,
    path = "/reports/{id}/pdf",
    tag = "Reports",
    params(("id" = i32, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "PDF do relatório", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Relatório não encontrado"),
        (status = 500, description = "Falha ao gerar o PDF")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_report_pdf(
    State(app_state): State<AppState>,
    Path(report_id): Path<i32>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.document_service.generate_report_pdf(report_id).await?;

    // Força o download no navegador
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", report_pdf_filename(report_id, Utc::now())),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
