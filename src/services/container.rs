//! Service Container - Wires every service over one shared Unit of Work.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CaseAggregator, CaseService, DashboardReporter, DashboardService,
    UserManager, UserService,
};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn cases(&self) -> Arc<dyn CaseService>;

    fn dashboard(&self) -> Arc<dyn DashboardService>;

    fn users(&self) -> Arc<dyn UserService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    case_service: Arc<dyn CaseService>,
    dashboard_service: Arc<dyn DashboardService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Assemble a container from already-built services (tests use fakes).
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        case_service: Arc<dyn CaseService>,
        dashboard_service: Arc<dyn DashboardService>,
        user_service: Arc<dyn UserService>,
    ) -> Self {
        Self {
            auth_service,
            case_service,
            dashboard_service,
            user_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let timeout = config.query_timeout;
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            case_service: Arc::new(CaseAggregator::new(uow.clone(), timeout)),
            dashboard_service: Arc::new(DashboardReporter::new(uow.clone(), timeout)),
            user_service: Arc::new(UserManager::new(uow, timeout)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn cases(&self) -> Arc<dyn CaseService> {
        self.case_service.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardService> {
        self.dashboard_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
