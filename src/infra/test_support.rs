//! Unit of Work over mocked repositories for service tests.

use async_trait::async_trait;
use std::sync::Arc;

use super::repositories::{
    CaseRepository, DashboardRepository, MockCaseRepository, MockDashboardRepository,
    MockUserRepository, UserRepository,
};
use super::{TransactionContext, UnitOfWork};
use crate::errors::{AppError, AppResult};

/// Repositories without expectations panic when called, so each test only
/// configures the one it exercises.
pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    cases: Arc<MockCaseRepository>,
    dashboard: Arc<MockDashboardRepository>,
}

impl Default for TestUnitOfWork {
    fn default() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            cases: Arc::new(MockCaseRepository::new()),
            dashboard: Arc::new(MockDashboardRepository::new()),
        }
    }
}

impl TestUnitOfWork {
    pub fn with_users(repo: MockUserRepository) -> Self {
        Self {
            users: Arc::new(repo),
            ..Default::default()
        }
    }

    pub fn with_cases(repo: MockCaseRepository) -> Self {
        Self {
            cases: Arc::new(repo),
            ..Default::default()
        }
    }

    pub fn with_dashboard(repo: MockDashboardRepository) -> Self {
        Self {
            dashboard: Arc::new(repo),
            ..Default::default()
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn cases(&self) -> Arc<dyn CaseRepository> {
        self.cases.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardRepository> {
        self.dashboard.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // A TransactionContext needs a live connection.
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

/// Rows and log inspection for services running on a real [`Persistence`]
/// over sea-orm's mock connection, where transactions do begin and commit.
///
/// [`Persistence`]: super::Persistence
#[cfg(test)]
pub mod mock_db {
    use chrono::NaiveDateTime;
    use sea_orm::DatabaseConnection;

    use crate::infra::repositories::entities::{role, user};

    pub fn user_row(id: i32, password_hash: &str, rol_id: Option<i32>) -> user::Model {
        user::Model {
            id,
            nombre: Some("Laura Gómez".into()),
            usuario: "lgomez".into(),
            correo: "lgomez@juzgado.gov.co".into(),
            contrasena: password_hash.into(),
            rol_id,
            administrador: false,
            activo: true,
            fecha_registro: NaiveDateTime::default(),
        }
    }

    pub fn role_row(id: i32, name: &str) -> role::Model {
        role::Model {
            id,
            nombre_rol: name.into(),
            descripcion: None,
            fecha_creacion: NaiveDateTime::default(),
        }
    }

    /// SQL of every statement issued so far, in order, including the
    /// `BEGIN` and `COMMIT` of each transaction.
    pub fn statements(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| stmt.sql.clone())
            .collect()
    }

    /// Index of the first statement starting with `prefix`.
    pub fn position(statements: &[String], prefix: &str) -> Option<usize> {
        statements.iter().position(|sql| sql.starts_with(prefix))
    }
}
