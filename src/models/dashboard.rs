// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Cards do topo do dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = "Ana Souza")]
    pub user_name: String,
    pub total_clients: i64,
    pub total_reports: i64,
}
