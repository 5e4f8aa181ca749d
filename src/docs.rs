// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "BPA Digital API", description = "Inspeções de Boas Práticas de Alimentação"),
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::login_json,
        handlers::auth::forgot_password,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,
        handlers::auth::list_users,
        handlers::auth::list_subordinates,

        // --- Dashboard ---
        handlers::auth::dashboard_stats,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Reports ---
        handlers::reports::create_report,
        handlers::reports::list_reports,
        handlers::reports::calendar,
        handlers::reports::get_report,
        handlers::reports::update_report,
        handlers::reports::delete_report,
        handlers::reports::finalize_report,
        handlers::reports::update_checklist_item,
        handlers::documents::export_report_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::UserSimplified,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::LoginForm,
            models::auth::UpdateProfilePayload,
            models::auth::MessageResponse,
            models::auth::TokenResponse,

            // --- Dashboard ---
            models::dashboard::DashboardStats,

            // --- Clients ---
            models::client::ClientStatus,
            models::client::ClientCategory,
            models::client::ResponsibleType,
            models::client::Client,
            models::client::ClientResponsible,
            models::client::ClientCollaborators,
            models::client::ClientDetail,
            models::client::ClientSummary,
            models::client::ResponsiblePayload,
            models::client::CollaboratorsPayload,
            models::client::CreateClientPayload,
            models::client::UpdateClientPayload,

            // --- Reports ---
            models::report::ReportStatus,
            models::report::ChecklistResponse,
            models::report::Report,
            models::report::ChecklistCategory,
            models::report::ChecklistItem,
            models::report::ClientBrief,
            models::report::CategoryWithItems,
            models::report::ReportDetail,
            models::report::ReportSummary,
            models::report::CreateChecklistItemPayload,
            models::report::CreateChecklistCategoryPayload,
            models::report::CreateReportPayload,
            models::report::UpdateReportPayload,
            models::report::UpdateChecklistItemPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Equipe"),
        (name = "Dashboard", description = "Indicadores do Painel"),
        (name = "Clients", description = "Estabelecimentos Inspecionados"),
        (name = "Reports", description = "Relatórios de Inspeção, Checklist e PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
