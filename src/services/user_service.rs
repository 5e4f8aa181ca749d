// src/services/user_service.rs

use crate::{
    common::error::AppError,
    db::{ClientRepository, ReportRepository, UserRepository},
    models::{
        auth::{User, UserSimplified},
        dashboard::DashboardStats,
    },
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    client_repo: ClientRepository,
    report_repo: ReportRepository,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        client_repo: ClientRepository,
        report_repo: ReportRepository,
    ) -> Self {
        Self { user_repo, client_repo, report_repo }
    }

    pub async fn list_users(&self) -> Result<Vec<UserSimplified>, AppError> {
        self.user_repo.list_all().await
    }

    /// Equipe direta: quem tem `superior_id` igual ao usuário, mais ele mesmo.
    /// Não desce para subordinados dos subordinados.
    pub async fn list_subordinates(&self, user: &User) -> Result<Vec<UserSimplified>, AppError> {
        self.user_repo.list_direct_team(user.id).await
    }

    pub async fn dashboard_stats(&self, user: &User) -> Result<DashboardStats, AppError> {
        let total_clients = self.client_repo.count_clients().await?;
        let total_reports = self.report_repo.count_reports().await?;

        Ok(DashboardStats {
            user_name: user.nome.clone(),
            total_clients,
            total_reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    use crate::models::auth::UserRole;

    async fn user(pool: &PgPool, nome: &str, role: UserRole, superior_id: Option<i32>) -> User {
        let email = format!("{}@bpa.com", nome.to_lowercase().replace(' ', "."));
        UserRepository::new(pool.clone())
            .create_user(pool, nome, &email, "$2b$12$hash", role, superior_id)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn subordinates_are_direct_reports_plus_self(pool: PgPool) {
        let diretora = user(&pool, "Ana Diretora", UserRole::Admin, None).await;
        let chefe = user(&pool, "Bruno Chefe", UserRole::Chefe, Some(diretora.id)).await;
        let carla = user(&pool, "Carla Operadora", UserRole::Operador, Some(chefe.id)).await;
        user(&pool, "Diego Operador", UserRole::Operador, Some(chefe.id)).await;
        // Subordinada da Carla: fora da equipe direta do chefe
        user(&pool, "Eva Estagiaria", UserRole::Operador, Some(carla.id)).await;

        let service = UserService::new(
            UserRepository::new(pool.clone()),
            ClientRepository::new(pool.clone()),
            ReportRepository::new(pool.clone()),
        );
        let team = service.list_subordinates(&chefe).await.unwrap();

        let nomes: Vec<&str> = team.iter().map(|u| u.nome.as_str()).collect();
        assert_eq!(nomes, ["Bruno Chefe", "Carla Operadora", "Diego Operador"]);
    }
}
