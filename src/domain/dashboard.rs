//! Landing dashboard metrics.

use serde::Serialize;
use utoipa::ToSchema;

use super::case::Case;
use crate::config::STATUS_WORKFLOW_ORDER;

/// One bucket of a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LabelCount {
    #[schema(example = "ACTIVO PENDIENTE")]
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub total_cases: u64,
    pub total_filings: u64,
    pub total_docket_entries: u64,
    pub total_status_events: u64,
    /// Workflow statuses first in workflow order, then the rest by count
    pub cases_by_status: Vec<LabelCount>,
    /// Busiest owners first
    pub cases_by_owner: Vec<LabelCount>,
    /// Most common request types first
    pub cases_by_type: Vec<LabelCount>,
    /// Most recent intake first
    pub recent_cases: Vec<Case>,
}

/// Turn raw grouped rows into labelled buckets, largest first.
///
/// Null and blank groups are merged under `none_label`. Equal counts are
/// ordered by label so the output is stable.
pub fn rank_counts(rows: Vec<(Option<String>, i64)>, none_label: &str) -> Vec<LabelCount> {
    let mut merged: Vec<LabelCount> = Vec::with_capacity(rows.len());

    for (label, count) in rows {
        let label = label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| none_label.to_string());
        let count = count.max(0) as u64;

        match merged.iter_mut().find(|b| b.label == label) {
            Some(bucket) => bucket.count += count,
            None => merged.push(LabelCount { label, count }),
        }
    }

    merged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    merged
}

/// Status buckets for the dashboard chart: the statuses of
/// [`STATUS_WORKFLOW_ORDER`] lead in that order, compared without regard to
/// case, and every other status follows by count.
pub fn rank_statuses(rows: Vec<(Option<String>, i64)>, none_label: &str) -> Vec<LabelCount> {
    let workflow_position = |label: &str| {
        let label = label.to_uppercase();
        STATUS_WORKFLOW_ORDER
            .iter()
            .position(|status| *status == label)
            .unwrap_or(STATUS_WORKFLOW_ORDER.len())
    };

    let mut ranked = rank_counts(rows, none_label);
    // Stable, so statuses outside the workflow keep their count order.
    ranked.sort_by_key(|bucket| workflow_position(&bucket.label));
    ranked
}
