//! Workload of one role: the cases whose `responsable` is the role name.

use serde::Serialize;
use utoipa::ToSchema;

use super::{CaseRecord, Role, StatusFilter};
use crate::config::STATUS_UNKNOWN;
use crate::types::Paginated;

/// Per-status counts over every case assigned to a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct AssignmentStats {
    pub total: u64,
    /// Status starting with `ACTIVO`
    pub activos: u64,
    /// Status starting with `INACTIVO`
    pub inactivos: u64,
    /// Status containing `PENDIENTE`
    pub pendientes: u64,
    /// Description equal to `SALIO`
    pub salieron: u64,
    /// No status, or the unknown marker
    pub sin_informacion: u64,
    /// Share of active cases, one decimal
    pub porcentaje_activos: f64,
}

impl AssignmentStats {
    /// Fold `(status, description, count)` groups with the same vocabulary
    /// the status filter uses.
    pub fn from_counts(rows: &[(Option<String>, Option<String>, i64)]) -> Self {
        let active = StatusFilter::StartsWith("ACTIVO".into());
        let inactive = StatusFilter::StartsWith("INACTIVO".into());
        let pending = StatusFilter::Contains("PENDIENTE".into());
        let left = StatusFilter::DetailExact("SALIO".into());
        let unknown = StatusFilter::Exact(STATUS_UNKNOWN.into());

        let mut stats = Self::default();
        for (status, detail, count) in rows {
            let count = (*count).max(0) as u64;
            let (status, detail) = (status.as_deref(), detail.as_deref());
            let tally = |filter: &StatusFilter| if filter.matches(status, detail) { count } else { 0 };

            stats.total += count;
            stats.activos += tally(&active);
            stats.inactivos += tally(&inactive);
            stats.pendientes += tally(&pending);
            stats.salieron += tally(&left);
            if status.map_or(true, |s| s.trim().is_empty()) || unknown.matches(status, detail) {
                stats.sin_informacion += count;
            }
        }

        if stats.total > 0 {
            let share = stats.activos as f64 * 100.0 / stats.total as f64;
            stats.porcentaje_activos = (share * 10.0).round() / 10.0;
        }
        stats
    }
}

/// The caller's assigned cases. `role` is `None` for accounts without one,
/// in which case nothing is assigned.
#[derive(Debug, Clone)]
pub struct AssignedCases {
    pub role: Option<Role>,
    pub page: Paginated<CaseRecord>,
    pub stats: AssignmentStats,
}
