//! Case aggregate: a case ("expediente") with its filings, docket entries and
//! status events, plus the values derived from them.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::STATUS_UNKNOWN;

/// Case row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Case {
    pub id: i32,
    /// Full case number ("radicado completo")
    #[schema(example = "05001400300220240012300")]
    pub case_number_full: Option<String>,
    /// Short case number ("radicado corto")
    #[schema(example = "2024-00123")]
    pub case_number_short: Option<String>,
    pub plaintiff: Option<String>,
    pub defendant: Option<String>,
    /// Raw status code recorded on the case
    #[schema(example = "ACTIVO PENDIENTE")]
    pub status: Option<String>,
    /// Free-text status description
    pub status_detail: Option<String>,
    /// Responsible clerk
    pub owner: Option<String>,
    pub location: Option<String>,
    pub request_type: Option<String>,
    pub origin_court: Option<String>,
    pub observations: Option<String>,
    pub intake_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

/// Filing ("actuación").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Filing {
    pub id: i32,
    pub case_id: i32,
    pub number: Option<i32>,
    pub origin_type: Option<String>,
    pub description: Option<String>,
    pub source_file: Option<String>,
    /// Absent on legacy records
    pub occurred_on: Option<NaiveDate>,
}

/// Docket entry ("ingreso").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DocketEntry {
    pub id: i32,
    pub case_id: i32,
    pub intake_date: Option<NaiveDate>,
    pub observations: Option<String>,
    pub request: Option<String>,
    /// Denormalized list of related dates, kept as recorded
    pub secondary_dates: Option<String>,
    pub filing_id: Option<i32>,
    pub location: Option<String>,
    pub status_order_date: Option<NaiveDate>,
    pub origin_court: Option<String>,
}

/// Status event ("estado").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusEvent {
    pub id: i32,
    pub case_id: i32,
    pub status_date: Option<NaiveDate>,
    pub order_date: Option<NaiveDate>,
    /// Classification code ("clase")
    pub classification: Option<String>,
    pub annotation: Option<String>,
    pub observations: Option<String>,
    pub filing_id: Option<i32>,
    pub docket_entry_id: Option<i32>,
    pub plaintiff: Option<String>,
    pub defendant: Option<String>,
}

/// Where a case's displayed status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    LatestStatusEvent,
    CaseRecord,
    Unknown,
}

/// Priority order used to resolve the displayed status. The first source that
/// yields a non-blank value wins; when none does the status is
/// [`STATUS_UNKNOWN`].
pub const CURRENT_STATUS_FALLBACKS: [StatusSource; 2] =
    [StatusSource::LatestStatusEvent, StatusSource::CaseRecord];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedStatus {
    pub value: String,
    pub source: StatusSource,
}

/// Where a case's latest filing date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Filing,
    StatusEvent,
    DocketEntry,
    CaseIntake,
}

/// Priority order used to resolve the latest filing date.
pub const LATEST_DATE_FALLBACKS: [DateSource; 4] = [
    DateSource::Filing,
    DateSource::StatusEvent,
    DateSource::DocketEntry,
    DateSource::CaseIntake,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

/// Sub-record counts for one case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CaseStats {
    pub filings: usize,
    pub docket_entries: usize,
    pub status_events: usize,
}

/// A case with its sub-records, each list ordered most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CaseRecord {
    #[serde(flatten)]
    pub case: Case,
    pub filings: Vec<Filing>,
    pub docket_entries: Vec<DocketEntry>,
    pub status_events: Vec<StatusEvent>,
    #[serde(rename = "estadisticas")]
    pub stats: CaseStats,
    pub current_status: ResolvedStatus,
    pub latest_filing_date: Option<ResolvedDate>,
    pub oldest_pending_intake: Option<NaiveDate>,
}

impl CaseRecord {
    /// Assemble the aggregate, sorting sub-records and resolving derived
    /// values.
    pub fn assemble(
        case: Case,
        mut filings: Vec<Filing>,
        mut docket_entries: Vec<DocketEntry>,
        mut status_events: Vec<StatusEvent>,
    ) -> Self {
        sort_recent_first(&mut filings, |f| (f.occurred_on, f.id));
        sort_recent_first(&mut docket_entries, |d| (d.intake_date, d.id));
        sort_recent_first(&mut status_events, |s| (s.status_date, s.id));

        let stats = CaseStats {
            filings: filings.len(),
            docket_entries: docket_entries.len(),
            status_events: status_events.len(),
        };
        let current_status = resolve_status(&case, &status_events);
        let latest_filing_date = resolve_latest_date(&case, &filings, &docket_entries, &status_events);
        let oldest_pending_intake = oldest_pending_intake(&case, &docket_entries, &status_events);

        Self {
            case,
            filings,
            docket_entries,
            status_events,
            stats,
            current_status,
            latest_filing_date,
            oldest_pending_intake,
        }
    }
}

/// Sub-records fetched in bulk for a batch of cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseSubRecords {
    pub filings: Vec<Filing>,
    pub docket_entries: Vec<DocketEntry>,
    pub status_events: Vec<StatusEvent>,
}

impl CaseSubRecords {
    /// Distribute the batch over its cases, keeping the order of `cases`.
    /// Rows whose case is not in `cases` are dropped.
    pub fn assemble_all(self, cases: Vec<Case>) -> Vec<CaseRecord> {
        let mut filings = group_by_case(self.filings, |f| f.case_id);
        let mut entries = group_by_case(self.docket_entries, |d| d.case_id);
        let mut events = group_by_case(self.status_events, |s| s.case_id);

        cases
            .into_iter()
            .map(|case| {
                let id = case.id;
                CaseRecord::assemble(
                    case,
                    filings.remove(&id).unwrap_or_default(),
                    entries.remove(&id).unwrap_or_default(),
                    events.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }
}

fn group_by_case<T>(rows: Vec<T>, case_id: impl Fn(&T) -> i32) -> HashMap<i32, Vec<T>> {
    let mut grouped: HashMap<i32, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(case_id(&row)).or_default().push(row);
    }
    grouped
}

/// Totals across several cases returned by one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SearchSummary {
    pub cases: usize,
    pub docket_entries: usize,
    pub status_events: usize,
}

impl SearchSummary {
    /// `totals` are sub-record counts summed over all `cases` matches, not
    /// only the page being shown.
    pub fn from_totals(cases: usize, totals: CaseStats) -> Self {
        Self {
            cases,
            docket_entries: totals.docket_entries,
            status_events: totals.status_events,
        }
    }
}

/// Descending by date, undated records last, ties broken by id descending.
fn sort_recent_first<T>(items: &mut [T], key: impl Fn(&T) -> (Option<NaiveDate>, i32)) {
    // `None < Some(_)`, so comparing b against a also pushes undated rows last.
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// `events` must already be ordered most recent first.
pub fn resolve_status(case: &Case, events: &[StatusEvent]) -> ResolvedStatus {
    CURRENT_STATUS_FALLBACKS
        .iter()
        .find_map(|source| {
            let value = match source {
                StatusSource::LatestStatusEvent => {
                    events.first().and_then(|e| non_blank(e.classification.as_ref()))
                }
                StatusSource::CaseRecord => non_blank(case.status.as_ref()),
                StatusSource::Unknown => None,
            };
            value.map(|v| ResolvedStatus {
                value: v.to_string(),
                source: *source,
            })
        })
        .unwrap_or_else(|| ResolvedStatus {
            value: STATUS_UNKNOWN.to_string(),
            source: StatusSource::Unknown,
        })
}

pub fn resolve_latest_date(
    case: &Case,
    filings: &[Filing],
    docket_entries: &[DocketEntry],
    status_events: &[StatusEvent],
) -> Option<ResolvedDate> {
    LATEST_DATE_FALLBACKS.iter().find_map(|source| {
        let date = match source {
            DateSource::Filing => filings.iter().filter_map(|f| f.occurred_on).max(),
            DateSource::StatusEvent => status_events.iter().filter_map(|s| s.status_date).max(),
            DateSource::DocketEntry => docket_entries.iter().filter_map(|d| d.intake_date).max(),
            DateSource::CaseIntake => case.intake_date,
        };
        date.map(|date| ResolvedDate {
            date,
            source: *source,
        })
    })
}

/// Oldest docket-entry date not yet answered by a status event dated on or
/// after it. Falls back to the case intake date when there are no dated
/// entries at all.
pub fn oldest_pending_intake(
    case: &Case,
    docket_entries: &[DocketEntry],
    status_events: &[StatusEvent],
) -> Option<NaiveDate> {
    let intake_dates: Vec<NaiveDate> = docket_entries.iter().filter_map(|d| d.intake_date).collect();
    if intake_dates.is_empty() {
        return case.intake_date;
    }

    let latest_status = status_events.iter().filter_map(|s| s.status_date).max();
    intake_dates
        .into_iter()
        .filter(|intake| latest_status.map_or(true, |status| status < *intake))
        .min()
}
