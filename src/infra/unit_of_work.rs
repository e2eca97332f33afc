//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-row writes atomically: the
//! transaction commits when the closure succeeds and rolls back on any
//! error, so a user row is never left without its role link.

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use std::sync::Arc;

use super::repositories::{
    user_repository as users, CaseRepository, CaseStore, DashboardRepository, DashboardStore,
    NewUser, UserChanges, UserRepository, UserStore,
};
use crate::domain::{Role, User};
use crate::errors::{AppResult, ResultExt};

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Tests implement it by hand around mocked repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get case repository
    fn cases(&self) -> Arc<dyn CaseRepository>;

    /// Get dashboard repository
    fn dashboard(&self) -> Arc<dyn DashboardRepository>;

    /// Execute a closure within a read-committed transaction.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    case_repo: Arc<CaseStore>,
    dashboard_repo: Arc<DashboardStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            case_repo: Arc::new(CaseStore::new(db.clone())),
            dashboard_repo: Arc::new(DashboardStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn cases(&self) -> Arc<dyn CaseRepository> {
        self.case_repo.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardRepository> {
        self.dashboard_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .context("beginning transaction")?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.context("committing transaction")?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user writes.
///
/// Borrows the transaction so it outlives every operation issued through it.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Insert a user and link its role.
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        users::insert_user(self.txn, new_user).await
    }

    /// Apply changes, including role set or clear.
    pub async fn update(&self, id: i32, changes: UserChanges) -> AppResult<User> {
        users::update_user(self.txn, id, changes).await
    }

    /// Set one role on many accounts; returns the number updated.
    pub async fn assign_role(&self, ids: &[i32], role: Role) -> AppResult<u64> {
        users::assign_role(self.txn, ids, role).await
    }

    /// Replace the stored credential.
    pub async fn set_password_hash(&self, id: i32, hash: String) -> AppResult<()> {
        users::set_password_hash(self.txn, id, hash).await
    }
}

/// Simpler API for executing transactional operations.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
