//! Application state - the context object every route is built from.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, LoginThrottle};
use crate::services::{
    AuthService, CaseService, DashboardService, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub case_service: Arc<dyn CaseService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    pub user_service: Arc<dyn UserService>,
    /// Failed-login accounting shared by every request
    pub login_throttle: Arc<LoginThrottle>,
    /// Connection pool, used by the health check
    pub database: Arc<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the production services over a connected database.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config.clone());
        Self::new(&container, database, config)
    }

    /// Build state from any container, e.g. one holding fake services.
    pub fn new(services: &dyn ServiceContainer, database: Arc<Database>, config: Config) -> Self {
        Self {
            auth_service: services.auth(),
            case_service: services.cases(),
            dashboard_service: services.dashboard(),
            user_service: services.users(),
            login_throttle: Arc::new(LoginThrottle::default()),
            database,
            config: Arc::new(config),
        }
    }
}
