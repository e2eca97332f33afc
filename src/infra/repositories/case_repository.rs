//! Case repository: lookups over `expediente` and batch loading of its
//! sub-records.

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Func, NullOrdering, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use super::entities::{case, docket_entry, filing, status_event};
use crate::domain::{
    Case, CaseStats, CaseSubRecords, DateField, DateRange, SortOrder, StatusFilter, StatusQuery,
};
use crate::errors::{AppResult, ResultExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Case repository trait for dependency injection.
///
/// Lookups that match nothing return empty collections. Storage failures
/// are returned as errors carrying the operation that failed.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Cases whose full or short number equals `number` once spaces are
    /// removed from both sides.
    async fn find_by_case_number(&self, number: &str) -> AppResult<Vec<Case>>;

    /// Cases matching a status query, limit and order applied in storage.
    async fn find_by_status(&self, query: &StatusQuery) -> AppResult<Vec<Case>>;

    /// One page of cases whose plaintiff or defendant contains `name`, with
    /// the total number of matches.
    async fn find_by_party_name(
        &self,
        name: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<Case>, u64)>;

    /// Filings, docket entries and status events of every listed case, one
    /// query per table.
    async fn load_sub_records(&self, case_ids: &[i32]) -> AppResult<CaseSubRecords>;

    /// Sub-record counts summed over the listed cases, without loading rows.
    async fn count_sub_records(&self, case_ids: &[i32]) -> AppResult<CaseStats>;

    /// One page of the cases whose `responsable` equals `owner`, with the
    /// total number of matches.
    async fn find_by_owner(
        &self,
        owner: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<Case>, u64)>;

    /// `(estado, estado_adicional, count)` over every case of `owner`.
    async fn status_counts_for_owner(&self, owner: &str) -> AppResult<OwnerStatusCounts>;
}

/// Raw `(estado, estado_adicional, count)` rows.
pub type OwnerStatusCounts = Vec<(Option<String>, Option<String>, i64)>;

/// Concrete implementation of CaseRepository
pub struct CaseStore {
    db: DatabaseConnection,
}

impl CaseStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CaseRepository for CaseStore {
    async fn find_by_case_number(&self, number: &str) -> AppResult<Vec<Case>> {
        let models = case_number_select(number)
            .all(&self.db)
            .await
            .context("searching cases by number")?;

        Ok(models.into_iter().map(Case::from).collect())
    }

    async fn find_by_status(&self, query: &StatusQuery) -> AppResult<Vec<Case>> {
        let models = status_select(query)
            .all(&self.db)
            .await
            .context("filtering cases by status")?;

        Ok(models.into_iter().map(Case::from).collect())
    }

    async fn find_by_party_name(
        &self,
        name: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<Case>, u64)> {
        let paginator = party_name_select(name).paginate(&self.db, page_size);
        let total = paginator
            .num_items()
            .await
            .context("counting cases by party name")?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .context("searching cases by party name")?;

        Ok((models.into_iter().map(Case::from).collect(), total))
    }

    async fn load_sub_records(&self, case_ids: &[i32]) -> AppResult<CaseSubRecords> {
        if case_ids.is_empty() {
            return Ok(CaseSubRecords::default());
        }
        let (filings, docket_entries, status_events) = tokio::try_join!(
            async {
                filing::Entity::find()
                    .filter(filing::Column::ExpedienteId.is_in(case_ids.iter().copied()))
                    .all(&self.db)
                    .await
                    .context("loading filings")
            },
            async {
                docket_entry::Entity::find()
                    .filter(docket_entry::Column::ExpedienteId.is_in(case_ids.iter().copied()))
                    .all(&self.db)
                    .await
                    .context("loading docket entries")
            },
            async {
                status_event::Entity::find()
                    .filter(status_event::Column::ExpedienteId.is_in(case_ids.iter().copied()))
                    .all(&self.db)
                    .await
                    .context("loading status events")
            },
        )?;

        Ok(CaseSubRecords {
            filings: filings.into_iter().map(Into::into).collect(),
            docket_entries: docket_entries.into_iter().map(Into::into).collect(),
            status_events: status_events.into_iter().map(Into::into).collect(),
        })
    }

    async fn count_sub_records(&self, case_ids: &[i32]) -> AppResult<CaseStats> {
        if case_ids.is_empty() {
            return Ok(CaseStats::default());
        }
        let ids = || case_ids.iter().copied();
        let (filings, docket_entries, status_events) = tokio::try_join!(
            async {
                filing::Entity::find()
                    .filter(filing::Column::ExpedienteId.is_in(ids()))
                    .count(&self.db)
                    .await
                    .context("counting filings")
            },
            async {
                docket_entry::Entity::find()
                    .filter(docket_entry::Column::ExpedienteId.is_in(ids()))
                    .count(&self.db)
                    .await
                    .context("counting docket entries")
            },
            async {
                status_event::Entity::find()
                    .filter(status_event::Column::ExpedienteId.is_in(ids()))
                    .count(&self.db)
                    .await
                    .context("counting status events")
            },
        )?;

        Ok(CaseStats {
            filings: filings as usize,
            docket_entries: docket_entries as usize,
            status_events: status_events as usize,
        })
    }

    async fn find_by_owner(
        &self,
        owner: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<Case>, u64)> {
        let paginator = owner_select(owner).paginate(&self.db, page_size);
        let total = paginator
            .num_items()
            .await
            .context("counting assigned cases")?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .context("loading assigned cases")?;

        Ok((models.into_iter().map(Case::from).collect(), total))
    }

    async fn status_counts_for_owner(&self, owner: &str) -> AppResult<OwnerStatusCounts> {
        case::Entity::find()
            .select_only()
            .column(case::Column::Estado)
            .column(case::Column::EstadoAdicional)
            .column_as(Expr::col(case::Column::Id).count(), "total")
            .filter(case::Column::Responsable.eq(owner))
            .group_by(case::Column::Estado)
            .group_by(case::Column::EstadoAdicional)
            .into_tuple::<(Option<String>, Option<String>, i64)>()
            .all(&self.db)
            .await
            .context("grouping assigned cases by status")
    }
}

/// `REPLACE(col, ' ', '')`
fn without_spaces(col: case::Column) -> SimpleExpr {
    Func::cust(Alias::new("REPLACE"))
        .arg(Expr::col((case::Entity, col)))
        .arg(" ")
        .arg("")
        .into()
}

/// `UPPER(col)`
fn upper(col: case::Column) -> SimpleExpr {
    Func::upper(Expr::col((case::Entity, col))).into()
}

pub(crate) fn case_number_select(number: &str) -> Select<case::Entity> {
    case::Entity::find()
        .filter(
            Condition::any()
                .add(Expr::expr(without_spaces(case::Column::RadicadoCompleto)).eq(number))
                .add(Expr::expr(without_spaces(case::Column::RadicadoCorto)).eq(number)),
        )
        .order_by_asc(case::Column::RadicadoCompleto)
        .order_by_asc(case::Column::Id)
}

pub(crate) fn status_select(query: &StatusQuery) -> Select<case::Entity> {
    let mut condition = Condition::all().add(status_condition(&query.filter));
    if let Some(range) = &query.date_range {
        condition = condition.add(date_range_condition(range));
    }

    let order = match query.order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };

    case::Entity::find()
        .filter(condition)
        .order_by_with_nulls(case::Column::FechaIngreso, order.clone(), NullOrdering::Last)
        .order_by(case::Column::Id, order)
        .limit(query.limit)
}

fn status_condition(filter: &StatusFilter) -> SimpleExpr {
    match filter {
        StatusFilter::StartsWith(word) => {
            Expr::expr(upper(case::Column::Estado)).like(format!("{}%", escape_like(word)))
        }
        StatusFilter::Contains(word) => {
            Expr::expr(upper(case::Column::Estado)).like(format!("%{}%", escape_like(word)))
        }
        StatusFilter::Exact(value) => Expr::expr(upper(case::Column::Estado)).eq(value.as_str()),
        StatusFilter::DetailExact(value) => {
            Expr::expr(upper(case::Column::EstadoAdicional)).eq(value.as_str())
        }
    }
}

fn date_range_condition(range: &DateRange) -> Condition {
    let intake = || {
        dated_exists::<docket_entry::Entity>(
            docket_entry::Column::ExpedienteId,
            docket_entry::Column::FechaIngreso,
            range,
        )
    };
    let status = || {
        dated_exists::<status_event::Entity>(
            status_event::Column::ExpedienteId,
            status_event::Column::FechaEstado,
            range,
        )
    };

    match range.field {
        DateField::Ingreso => Condition::all().add(intake()),
        DateField::Estado => Condition::all().add(status()),
        DateField::Ambas => Condition::any().add(intake()).add(status()),
    }
}

/// `EXISTS (SELECT 1 FROM child WHERE child.case_fk = expediente.id AND date in range)`
fn dated_exists<E: EntityTrait>(
    case_fk: E::Column,
    date_col: E::Column,
    range: &DateRange,
) -> SimpleExpr {
    let mut sub = Query::select();
    sub.expr(Expr::val(1))
        .from(E::default())
        .and_where(Expr::col((E::default(), case_fk)).equals((case::Entity, case::Column::Id)));
    if let Some(from) = range.from {
        sub.and_where(Expr::col((E::default(), date_col)).gte(from));
    }
    if let Some(to) = range.to {
        sub.and_where(Expr::col((E::default(), date_col)).lte(to));
    }
    Expr::exists(sub)
}

pub(crate) fn party_name_select(name: &str) -> Select<case::Entity> {
    let pattern = format!("%{}%", escape_like(&name.trim().to_uppercase()));

    case::Entity::find()
        .filter(
            Condition::any()
                .add(Expr::expr(upper(case::Column::Demandante)).like(pattern.clone()))
                .add(Expr::expr(upper(case::Column::Demandado)).like(pattern)),
        )
        .order_by_with_nulls(case::Column::FechaIngreso, Order::Desc, NullOrdering::Last)
        .order_by_desc(case::Column::Id)
}

/// Cases of one owner, most recent intake first.
pub(crate) fn owner_select(owner: &str) -> Select<case::Entity> {
    case::Entity::find()
        .filter(case::Column::Responsable.eq(owner))
        .order_by_with_nulls(case::Column::FechaIngreso, Order::Desc, NullOrdering::Last)
        .order_by_desc(case::Column::Id)
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::sea_query::{PostgresQueryBuilder, QueryStatementWriter};
    use sea_orm::QueryTrait;

    use super::*;

    fn sql(select: Select<case::Entity>) -> String {
        select.into_query().to_string(PostgresQueryBuilder)
    }

    #[test]
    fn test_status_query_pushes_limit_and_order_down() {
        let query = StatusQuery::new("ACTIVO", Some(100), SortOrder::Desc, None).unwrap();
        let sql = sql(status_select(&query));

        assert!(sql.contains("LIKE 'ACTIVO%'"), "{}", sql);
        assert!(sql.contains("UPPER("), "{}", sql);
        assert!(sql.contains("LIMIT 100"), "{}", sql);
        assert!(sql.contains("\"fecha_ingreso\" DESC"), "{}", sql);
    }

    #[test]
    fn test_status_query_ascending() {
        let query = StatusQuery::new("PENDIENTE", None, SortOrder::Asc, None).unwrap();
        let sql = sql(status_select(&query));

        assert!(sql.contains("LIKE '%PENDIENTE%'"), "{}", sql);
        assert!(sql.contains("\"fecha_ingreso\" ASC"), "{}", sql);
        assert!(sql.contains("LIMIT 100"), "{}", sql);
    }

    #[test]
    fn test_detail_filter_targets_estado_adicional() {
        let query = StatusQuery::new("SALIO", Some(5), SortOrder::Desc, None).unwrap();
        let sql = sql(status_select(&query));

        assert!(sql.contains("\"estado_adicional\""), "{}", sql);
        assert!(sql.contains("'SALIO'"), "{}", sql);
    }

    #[test]
    fn test_date_range_becomes_exists_subqueries() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1);
        let to = NaiveDate::from_ymd_opt(2024, 6, 30);
        let range = DateRange::new(from, to, DateField::Ambas).unwrap();
        let query = StatusQuery::new("ACTIVO", None, SortOrder::Desc, range).unwrap();
        let sql = sql(status_select(&query));

        assert_eq!(sql.matches("EXISTS").count(), 2, "{}", sql);
        assert!(sql.contains("\"ingresos\""), "{}", sql);
        assert!(sql.contains("\"estados\""), "{}", sql);
        assert!(sql.contains("'2024-01-01'"), "{}", sql);
    }

    #[test]
    fn test_default_date_field_only_checks_intake_dates() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1);
        let range = DateRange::new(from, None, DateField::default()).unwrap();
        let query = StatusQuery::new("ACTIVO", None, SortOrder::Desc, range).unwrap();
        let sql = sql(status_select(&query));

        assert_eq!(sql.matches("EXISTS").count(), 1, "{}", sql);
        assert!(sql.contains("\"ingresos\""), "{}", sql);
        assert!(!sql.contains("\"estados\""), "{}", sql);
    }

    #[test]
    fn test_undated_cases_sort_last_in_both_directions() {
        for (order, keyword) in [(SortOrder::Desc, "DESC"), (SortOrder::Asc, "ASC")] {
            let query = StatusQuery::new("ACTIVO", None, order, None).unwrap();
            let sql = sql(status_select(&query));
            let order_by = &sql[sql.find("ORDER BY").unwrap()..];

            assert!(
                order_by.contains(&format!("\"fecha_ingreso\" {} NULLS LAST", keyword)),
                "{}",
                sql
            );
            assert!(order_by.contains(&format!("\"id\" {}", keyword)), "{}", sql);
        }
    }

    #[test]
    fn test_case_number_matches_both_columns() {
        let sql = sql(case_number_select("2024-00123"));

        assert!(sql.contains("REPLACE("), "{}", sql);
        assert!(sql.contains("\"radicado_completo\""), "{}", sql);
        assert!(sql.contains("\"radicado_corto\""), "{}", sql);
        assert!(sql.contains(" OR "), "{}", sql);
        assert!(!sql.contains("LIKE"), "{}", sql);
    }

    #[test]
    fn test_owner_cases_filter_on_responsable() {
        let sql = sql(owner_select("ESCRIBIENTE"));

        assert!(sql.contains("\"responsable\" = 'ESCRIBIENTE'"), "{}", sql);
        assert!(sql.contains("NULLS LAST"), "{}", sql);
    }

    #[test]
    fn test_party_name_escapes_wildcards() {
        assert_eq!(escape_like("50%_a"), "50\\%\\_a");

        let sql = sql(party_name_select("perez"));
        assert!(sql.contains("'%PEREZ%'"), "{}", sql);
        assert!(sql.contains("\"demandado\""), "{}", sql);
    }
}
