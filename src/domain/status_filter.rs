//! Status filter vocabulary and query options for listing cases by status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{DEFAULT_STATUS_FILTER_LIMIT, MAX_STATUS_FILTER_LIMIT};
use crate::errors::{AppError, AppResult};

/// How a status query is matched against a case. Every comparison is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// Status starts with the word (`ACTIVO` matches `ACTIVO PENDIENTE`)
    StartsWith(String),
    /// Status contains the word anywhere
    Contains(String),
    /// Status equals the value
    Exact(String),
    /// Status description equals the value
    DetailExact(String),
}

impl StatusFilter {
    /// Parse the user-facing vocabulary.
    ///
    /// | input | match |
    /// |---|---|
    /// | `ACTIVO`, `INACTIVO` | status starting with the word |
    /// | `PENDIENTE` | status containing the word |
    /// | `ACTIVO_PENDIENTE`, `INACTIVO_RESUELTO` | exact spaced value |
    /// | `SALIO`, `SALIÓ` | description equal to `SALIO` |
    /// | `SIN_DATOS`, `SIN_FECHA` | exact `SIN_DATOS` |
    /// | anything else | exact |
    pub fn parse(raw: &str) -> AppResult<Self> {
        let value = raw.trim().to_uppercase();
        if value.is_empty() {
            return Err(AppError::validation("Status filter must not be empty"));
        }

        let filter = match value.as_str() {
            "ACTIVO" | "INACTIVO" => StatusFilter::StartsWith(value),
            "PENDIENTE" => StatusFilter::Contains(value),
            "ACTIVO_PENDIENTE" | "INACTIVO_RESUELTO" => {
                StatusFilter::Exact(value.replace('_', " "))
            }
            "SALIO" | "SALIÓ" => StatusFilter::DetailExact("SALIO".to_string()),
            "SIN_DATOS" | "SIN_FECHA" => StatusFilter::Exact("SIN_DATOS".to_string()),
            _ => StatusFilter::Exact(value),
        };
        Ok(filter)
    }

    /// In-memory form of the predicate the repository pushes to storage.
    pub fn matches(&self, status: Option<&str>, detail: Option<&str>) -> bool {
        let upper = |v: Option<&str>| v.map(|s| s.trim().to_uppercase());
        match self {
            StatusFilter::StartsWith(word) => {
                upper(status).is_some_and(|s| s.starts_with(word.as_str()))
            }
            StatusFilter::Contains(word) => upper(status).is_some_and(|s| s.contains(word.as_str())),
            StatusFilter::Exact(value) => upper(status).as_deref() == Some(value.as_str()),
            StatusFilter::DetailExact(value) => upper(detail).as_deref() == Some(value.as_str()),
        }
    }
}

/// Intake date ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ASC")]
    Asc,
    #[default]
    #[serde(alias = "DESC")]
    Desc,
}

/// Which sub-record dates a date range applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    /// Docket-entry intake dates
    #[default]
    Ingreso,
    /// Status-event dates
    Estado,
    /// Either of the above
    Ambas,
}

/// Inclusive date restriction; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub field: DateField,
}

impl DateRange {
    /// `None` when both bounds are open.
    pub fn new(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        field: DateField,
    ) -> AppResult<Option<Self>> {
        match (from, to) {
            (None, None) => Ok(None),
            (Some(f), Some(t)) if f > t => Err(AppError::validation(
                "fecha_desde must not be after fecha_hasta",
            )),
            _ => Ok(Some(Self { from, to, field })),
        }
    }
}

/// Fully validated input for a status listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    pub filter: StatusFilter,
    pub limit: u64,
    pub order: SortOrder,
    pub date_range: Option<DateRange>,
}

impl StatusQuery {
    pub fn new(
        raw_status: &str,
        limit: Option<i64>,
        order: SortOrder,
        date_range: Option<DateRange>,
    ) -> AppResult<Self> {
        Ok(Self {
            filter: StatusFilter::parse(raw_status)?,
            limit: normalize_limit(limit),
            order,
            date_range,
        })
    }
}

/// Missing limit uses the default; others are clamped to `1..=MAX`.
fn normalize_limit(limit: Option<i64>) -> u64 {
    match limit {
        None => DEFAULT_STATUS_FILTER_LIMIT,
        Some(l) => (l.max(1) as u64).min(MAX_STATUS_FILTER_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!(
            StatusFilter::parse("activo").unwrap(),
            StatusFilter::StartsWith("ACTIVO".into())
        );
        assert_eq!(
            StatusFilter::parse("PENDIENTE").unwrap(),
            StatusFilter::Contains("PENDIENTE".into())
        );
        assert_eq!(
            StatusFilter::parse("activo_pendiente").unwrap(),
            StatusFilter::Exact("ACTIVO PENDIENTE".into())
        );
        assert_eq!(
            StatusFilter::parse("Salió").unwrap(),
            StatusFilter::DetailExact("SALIO".into())
        );
        assert_eq!(
            StatusFilter::parse("SIN_FECHA").unwrap(),
            StatusFilter::Exact("SIN_DATOS".into())
        );
        assert_eq!(
            StatusFilter::parse(" archivado ").unwrap(),
            StatusFilter::Exact("ARCHIVADO".into())
        );
    }

    #[test]
    fn test_blank_filter_rejected() {
        assert!(matches!(
            StatusFilter::parse("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_activo_does_not_match_inactivo() {
        let filter = StatusFilter::parse("ACTIVO").unwrap();

        assert!(filter.matches(Some("ACTIVO"), None));
        assert!(filter.matches(Some("activo pendiente"), None));
        assert!(!filter.matches(Some("INACTIVO RESUELTO"), None));
        assert!(!filter.matches(None, None));
    }

    #[test]
    fn test_detail_filter_ignores_status() {
        let filter = StatusFilter::parse("SALIO").unwrap();

        assert!(filter.matches(Some("INACTIVO"), Some("salio")));
        assert!(!filter.matches(Some("SALIO"), None));
    }

    #[test]
    fn test_limit_normalization() {
        assert_eq!(normalize_limit(None), DEFAULT_STATUS_FILTER_LIMIT);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(50)), 50);
        assert_eq!(normalize_limit(Some(1_000_000)), MAX_STATUS_FILTER_LIMIT);
    }

    #[test]
    fn test_date_range_validation() {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();

        assert_eq!(DateRange::new(None, None, DateField::Ambas).unwrap(), None);
        assert!(DateRange::new(Some(d(1)), None, DateField::Ingreso)
            .unwrap()
            .is_some());
        assert!(DateRange::new(Some(d(5)), Some(d(1)), DateField::Estado).is_err());
    }

    #[test]
    fn test_date_field_defaults_to_intake_dates() {
        assert_eq!(DateField::default(), DateField::Ingreso);

        let field: DateField = serde_json::from_str("\"ambas\"").unwrap();
        assert_eq!(field, DateField::Ambas);
    }

    #[test]
    fn test_sort_order_deserializes_both_cases() {
        let asc: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        let desc: SortOrder = serde_json::from_str("\"DESC\"").unwrap();

        assert_eq!(asc, SortOrder::Asc);
        assert_eq!(desc, SortOrder::Desc);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
