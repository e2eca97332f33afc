//! Dashboard service - Landing metrics over the whole case store.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{
    DASHBOARD_RECENT_CASES, DASHBOARD_TOP_OWNERS, DASHBOARD_TOP_TYPES, OWNER_NONE_LABEL,
    STATUS_NONE_LABEL, TYPE_NONE_LABEL,
};
use crate::domain::{rank_counts, rank_statuses, DashboardMetrics};
use crate::errors::AppResult;
use crate::infra::{bounded, UnitOfWork};

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn metrics(&self) -> AppResult<DashboardMetrics>;
}

/// Concrete implementation of DashboardService using Unit of Work.
pub struct DashboardReporter<U: UnitOfWork> {
    uow: Arc<U>,
    query_timeout: Duration,
}

impl<U: UnitOfWork> DashboardReporter<U> {
    pub fn new(uow: Arc<U>, query_timeout: Duration) -> Self {
        Self { uow, query_timeout }
    }
}

#[async_trait]
impl<U: UnitOfWork> DashboardService for DashboardReporter<U> {
    async fn metrics(&self) -> AppResult<DashboardMetrics> {
        let repo = self.uow.dashboard();
        let limit = self.query_timeout;

        // Independent aggregates; the first failure aborts the rest.
        let (totals, by_status, by_owner, by_type, recent_cases) = tokio::try_join!(
            bounded(limit, "counting case tables", repo.table_totals()),
            bounded(limit, "grouping cases by status", repo.count_by_status()),
            bounded(
                limit,
                "grouping cases by owner",
                repo.count_by_owner(DASHBOARD_TOP_OWNERS)
            ),
            bounded(
                limit,
                "grouping cases by request type",
                repo.count_by_type(DASHBOARD_TOP_TYPES)
            ),
            bounded(
                limit,
                "loading recent cases",
                repo.recent_cases(DASHBOARD_RECENT_CASES)
            ),
        )?;

        let mut cases_by_owner = rank_counts(by_owner, OWNER_NONE_LABEL);
        cases_by_owner.truncate(DASHBOARD_TOP_OWNERS as usize);
        let mut cases_by_type = rank_counts(by_type, TYPE_NONE_LABEL);
        cases_by_type.truncate(DASHBOARD_TOP_TYPES as usize);

        Ok(DashboardMetrics {
            total_cases: totals.cases,
            total_filings: totals.filings,
            total_docket_entries: totals.docket_entries,
            total_status_events: totals.status_events,
            cases_by_status: rank_statuses(by_status, STATUS_NONE_LABEL),
            cases_by_owner,
            cases_by_type,
            recent_cases,
        })
    }
}
