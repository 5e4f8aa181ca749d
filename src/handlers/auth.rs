// src/handlers/auth.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{
            ForgotPasswordQuery, LoginForm, LoginUserPayload, MessageResponse, RegisterUserPayload,
            TokenResponse, UpdateProfilePayload, User, UserSimplified,
        },
        dashboard::DashboardStats,
    },
};

// POST /auth/register
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário registrado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Superior não encontrado"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.register_user(&payload).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// POST /auth/login (formulário OAuth2)
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token de acesso", body = TokenResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = app_state.auth_service.login_user(&form.username, &form.password).await?;

    Ok(Json(TokenResponse::bearer(token)))
}

// POST /auth/login-json
#[utoipa::path(
    post,
    path = "/auth/login-json",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token de acesso", body = TokenResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login_json(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let token = app_state.auth_service.login_user(&payload.email, &payload.senha).await?;

    Ok(Json(TokenResponse::bearer(token)))
}

// POST /auth/forgot-password?email=
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "Auth",
    params(ForgotPasswordQuery),
    responses(
        (status = 200, description = "Mensagem genérica", body = MessageResponse),
        (status = 400, description = "E-mail inválido")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Query(query): Query<ForgotPasswordQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    query.validate()?;

    let message = app_state.auth_service.forgot_password(&query.email).await?;

    Ok(Json(MessageResponse { message: message.to_string() }))
}

// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /auth/me
#[utoipa::path(
    put,
    path = "/auth/me",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "Dados inválidos ou senha atual incorreta"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;

    let updated = app_state.auth_service.update_profile(&user, &payload).await?;

    Ok(Json(updated))
}

// GET /auth/users
#[utoipa::path(
    get,
    path = "/auth/users",
    tag = "Users",
    responses(
        (status = 200, description = "Todos os usuários, por nome", body = [UserSimplified])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<UserSimplified>>, AppError> {
    let users = app_state.user_service.list_users().await?;
    Ok(Json(users))
}

// GET /auth/users/subordinados
#[utoipa::path(
    get,
    path = "/auth/users/subordinados",
    tag = "Users",
    responses(
        (status = 200, description = "Subordinados diretos e o próprio usuário", body = [UserSimplified])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_subordinates(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<UserSimplified>>, AppError> {
    let team = app_state.user_service.list_subordinates(&user).await?;
    Ok(Json(team))
}

// GET /auth/dashboard-stats
#[utoipa::path(
    get,
    path = "/auth/dashboard-stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais para o painel", body = DashboardStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = app_state.user_service.dashboard_stats(&user).await?;
    Ok(Json(stats))
}
