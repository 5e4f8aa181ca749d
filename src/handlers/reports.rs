// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::report::{
        CalendarQuery, ChecklistItem, CreateReportPayload, ListReportsQuery, ReportDetail,
        ReportSummary, UpdateChecklistItemPayload, UpdateReportPayload,
    },
};

// POST /reports/
#[utoipa::path(
    post,
    path = "/reports/",
    tag = "Reports",
    request_body = CreateReportPayload,
    responses(
        (status = 201, description = "Relatório criado com o checklist", body = ReportDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente ou responsável não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let report = app_state.report_service.create_report(&payload).await?;

    Ok((StatusCode::CREATED, Json(report)))
}

// GET /reports/?skip&limit&cliente_id&status_filter
#[utoipa::path(
    get,
    path = "/reports/",
    tag = "Reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Relatórios, mais recentes primeiro", body = [ReportSummary]),
        (status = 400, description = "Filtros inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Vec<ReportSummary>>, AppError> {
    query.validate()?;

    let reports = app_state.report_service.list_reports(&query).await?;

    Ok(Json(reports))
}

// GET /reports/agenda/calendario?mes&ano
#[utoipa::path(
    get,
    path = "/reports/agenda/calendario",
    tag = "Reports",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Relatórios agendados no mês, por data", body = [ReportSummary]),
        (status = 400, description = "Mês ou ano inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn calendar(
    State(app_state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<ReportSummary>>, AppError> {
    query.validate()?;

    let reports = app_state.report_service.calendar(&query).await?;

    Ok(Json(reports))
}

// GET /reports/{id}
#[utoipa::path(
    get,
    path = "/reports/{id}",
    tag = "Reports",
    params(("id" = i32, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Relatório com categorias e itens", body = ReportDetail),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReportDetail>, AppError> {
    let report = app_state.report_service.get_report(id).await?;
    Ok(Json(report))
}

// PUT /reports/{id}
#[utoipa::path(
    put,
    path = "/reports/{id}",
    tag = "Reports",
    params(("id" = i32, Path, description = "ID do relatório")),
    request_body = UpdateReportPayload,
    responses(
        (status = 200, description = "Relatório atualizado", body = ReportDetail),
        (status = 400, description = "Dados inválidos ou retorno de status"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_report(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReportPayload>,
) -> Result<Json<ReportDetail>, AppError> {
    payload.validate()?;

    let report = app_state.report_service.update_report(id, &payload).await?;

    Ok(Json(report))
}

// DELETE /reports/{id}
#[utoipa::path(
    delete,
    path = "/reports/{id}",
    tag = "Reports",
    params(("id" = i32, Path, description = "ID do relatório")),
    responses(
        (status = 204, description = "Relatório removido"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_report(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.report_service.delete_report(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /reports/{id}/finalizar
#[utoipa::path(
    post,
    path = "/reports/{id}/finalizar",
    tag = "Reports",
    params(("id" = i32, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Relatório finalizado", body = ReportDetail),
        (status = 400, description = "Relatório já finalizado"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn finalize_report(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReportDetail>, AppError> {
    let report = app_state.report_service.finalize_report(id).await?;
    Ok(Json(report))
}

// PUT /reports/items/{id}
#[utoipa::path(
    put,
    path = "/reports/items/{id}",
    tag = "Reports",
    params(("id" = i32, Path, description = "ID do item de checklist")),
    request_body = UpdateChecklistItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = ChecklistItem),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_checklist_item(
    State(app_state): State<AppState>,
    Path(item_id): Path<i32>,
    Json(payload): Json<UpdateChecklistItemPayload>,
) -> Result<Json<ChecklistItem>, AppError> {
    let item = app_state.report_service.update_checklist_item(item_id, &payload).await?;
    Ok(Json(item))
}
