//! Case service - Search, filter and party-name lookups over case records.
//!
//! Every lookup fetches the matching cases first, slices out the requested
//! page, then loads the sub-records of exactly those cases in one batch and
//! groups them in memory.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MIN_PARTY_NAME_LENGTH;
use crate::domain::{
    AssignedCases, AssignmentStats, Case, CaseRecord, Role, SearchSummary, StatusQuery,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{bounded, UnitOfWork};
use crate::types::{paginate, Paginated, PaginationParams};

/// One page of case-number matches.
#[derive(Debug, Clone)]
pub struct CaseNumberMatches {
    pub page: Paginated<CaseRecord>,
    /// Present when more than one case matched
    pub summary: Option<SearchSummary>,
}

/// Case service trait for dependency injection.
#[async_trait]
pub trait CaseService: Send + Sync {
    /// Cases whose full or short number equals `query`, ignoring spaces.
    /// An empty result is not an error.
    async fn search_by_case_number(
        &self,
        query: &str,
        params: &PaginationParams,
    ) -> AppResult<CaseNumberMatches>;

    /// Page of the cases matching a status query.
    async fn filter_by_status(
        &self,
        query: &StatusQuery,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>>;

    /// Page of cases whose plaintiff or defendant contains `name`.
    async fn search_by_party_name(
        &self,
        name: &str,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>>;

    /// Cases assigned to `role`, with per-status counts over all of them.
    async fn assigned_cases(
        &self,
        role: Option<Role>,
        params: &PaginationParams,
    ) -> AppResult<AssignedCases>;
}

/// Strip every whitespace character so `2024 - 00123` matches `2024-00123`.
pub fn normalize_case_number(query: &str) -> String {
    query.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Concrete implementation of CaseService using Unit of Work.
pub struct CaseAggregator<U: UnitOfWork> {
    uow: Arc<U>,
    query_timeout: Duration,
}

impl<U: UnitOfWork> CaseAggregator<U> {
    pub fn new(uow: Arc<U>, query_timeout: Duration) -> Self {
        Self { uow, query_timeout }
    }

    /// Batch-load sub-records for `cases` and assemble them in order.
    async fn with_sub_records(&self, cases: Vec<Case>) -> AppResult<Vec<CaseRecord>> {
        if cases.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = cases.iter().map(|c| c.id).collect();
        let repo = self.uow.cases();
        let sub_records = bounded(
            self.query_timeout,
            "loading case sub-records",
            repo.load_sub_records(&ids),
        )
        .await?;

        Ok(sub_records.assemble_all(cases))
    }

    /// Slice one page out of an ordered match list and load only its
    /// sub-records.
    async fn page_of(
        &self,
        cases: Vec<Case>,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>> {
        let page = paginate(cases, params.page, params.per_page);
        let records = self.with_sub_records(page.data).await?;
        Ok(Paginated {
            data: records,
            meta: page.meta,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> CaseService for CaseAggregator<U> {
    async fn search_by_case_number(
        &self,
        query: &str,
        params: &PaginationParams,
    ) -> AppResult<CaseNumberMatches> {
        let number = normalize_case_number(query);
        if number.is_empty() {
            return Err(AppError::validation("Case number must not be empty"));
        }

        let repo = self.uow.cases();
        let cases = bounded(
            self.query_timeout,
            "searching cases by number",
            repo.find_by_case_number(&number),
        )
        .await?;
        tracing::debug!(%number, matches = cases.len(), "Case number search");

        let summary = if cases.len() > 1 {
            let ids: Vec<i32> = cases.iter().map(|c| c.id).collect();
            let totals = bounded(
                self.query_timeout,
                "counting case sub-records",
                repo.count_sub_records(&ids),
            )
            .await?;
            Some(SearchSummary::from_totals(cases.len(), totals))
        } else {
            None
        };

        Ok(CaseNumberMatches {
            page: self.page_of(cases, params).await?,
            summary,
        })
    }

    async fn filter_by_status(
        &self,
        query: &StatusQuery,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>> {
        let repo = self.uow.cases();
        let cases = bounded(
            self.query_timeout,
            "filtering cases by status",
            repo.find_by_status(query),
        )
        .await?;
        tracing::debug!(filter = ?query.filter, limit = query.limit, matches = cases.len(), "Status filter");

        self.page_of(cases, params).await
    }

    async fn search_by_party_name(
        &self,
        name: &str,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>> {
        let name = name.trim();
        if name.chars().count() < MIN_PARTY_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "Name must be at least {} characters",
                MIN_PARTY_NAME_LENGTH
            )));
        }

        let repo = self.uow.cases();
        let (cases, total) = bounded(
            self.query_timeout,
            "searching cases by party name",
            repo.find_by_party_name(name, params.page(), params.limit()),
        )
        .await?;

        let records = self.with_sub_records(cases).await?;
        Ok(Paginated::new(records, params.page(), params.limit(), total))
    }

    async fn assigned_cases(
        &self,
        role: Option<Role>,
        params: &PaginationParams,
    ) -> AppResult<AssignedCases> {
        let Some(role) = role else {
            return Ok(AssignedCases {
                role: None,
                page: Paginated::new(Vec::new(), params.page(), params.limit(), 0),
                stats: AssignmentStats::default(),
            });
        };

        let repo = self.uow.cases();
        let owner = role.as_str();
        let ((cases, total), counts) = tokio::try_join!(
            bounded(
                self.query_timeout,
                "loading assigned cases",
                repo.find_by_owner(owner, params.page(), params.limit()),
            ),
            bounded(
                self.query_timeout,
                "counting assigned cases",
                repo.status_counts_for_owner(owner),
            ),
        )?;
        tracing::debug!(%role, total, "Assigned cases");

        let records = self.with_sub_records(cases).await?;
        Ok(AssignedCases {
            role: Some(role),
            page: Paginated::new(records, params.page(), params.limit(), total),
            stats: AssignmentStats::from_counts(&counts),
        })
    }
}
