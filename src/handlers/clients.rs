// src/handlers/clients.rs

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
    models::client::{
        ClientDetail, ClientSummary, CreateClientPayload, ListClientsQuery, UpdateClientPayload,
    },
};

// POST /clients/
#[utoipa::path(
    post,
    path = "/clients/",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = ClientDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "CNPJ já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.client_service.create_client(&payload).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /clients/?skip&limit&search
#[utoipa::path(
    get,
    path = "/clients/",
    tag = "Clients",
    params(ListClientsQuery),
    responses(
        (status = 200, description = "Clientes por nome fantasia", body = [ClientSummary]),
        (status = 400, description = "Paginação inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Result<Json<Vec<ClientSummary>>, AppError> {
    query.validate()?;

    let clients = app_state.client_service.list_clients(&query).await?;

    Ok(Json(clients))
}

// GET /clients/{id}
#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = i32, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com responsáveis e colaboradores", body = ClientDetail),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClientDetail>, AppError> {
    let client = app_state.client_service.get_client(id).await?;
    Ok(Json(client))
}

// PUT /clients/{id}
#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = i32, Path, description = "ID do cliente")),
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = ClientDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "CNPJ já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<Json<ClientDetail>, AppError> {
    payload.validate()?;

    let client = app_state.client_service.update_client(id, &payload).await?;

    Ok(Json(client))
}

// DELETE /clients/{id}
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "Clients",
    params(("id" = i32, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.client_service.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
