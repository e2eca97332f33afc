//! Aggregate queries behind the dashboard.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, NullOrdering};
use sea_orm::{
    DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect, Select,
};

use super::entities::{case, docket_entry, filing, status_event};
use crate::domain::Case;
use crate::errors::{AppResult, ResultExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Row counts of the four case tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableTotals {
    pub cases: u64,
    pub filings: u64,
    pub docket_entries: u64,
    pub status_events: u64,
}

/// Raw `(group, count)` rows; `None` is a NULL group.
pub type GroupedCounts = Vec<(Option<String>, i64)>;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn table_totals(&self) -> AppResult<TableTotals>;

    /// Single `GROUP BY estado` over all cases.
    async fn count_by_status(&self) -> AppResult<GroupedCounts>;

    /// Largest `responsable` groups first.
    async fn count_by_owner(&self, limit: u64) -> AppResult<GroupedCounts>;

    /// Largest `tipo_solicitud` groups first.
    async fn count_by_type(&self, limit: u64) -> AppResult<GroupedCounts>;

    /// Most recent intake first; undated cases last.
    async fn recent_cases(&self, limit: u64) -> AppResult<Vec<Case>>;
}

/// Concrete implementation of DashboardRepository
pub struct DashboardStore {
    db: DatabaseConnection,
}

impl DashboardStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DashboardRepository for DashboardStore {
    async fn table_totals(&self) -> AppResult<TableTotals> {
        let (cases, filings, docket_entries, status_events) = tokio::try_join!(
            async { case::Entity::find().count(&self.db).await.context("counting cases") },
            async { filing::Entity::find().count(&self.db).await.context("counting filings") },
            async {
                docket_entry::Entity::find()
                    .count(&self.db)
                    .await
                    .context("counting docket entries")
            },
            async {
                status_event::Entity::find()
                    .count(&self.db)
                    .await
                    .context("counting status events")
            },
        )?;

        Ok(TableTotals {
            cases,
            filings,
            docket_entries,
            status_events,
        })
    }

    async fn count_by_status(&self) -> AppResult<GroupedCounts> {
        case::Entity::find()
            .select_only()
            .column(case::Column::Estado)
            .column_as(Expr::col(case::Column::Id).count(), "total")
            .group_by(case::Column::Estado)
            .into_tuple::<(Option<String>, i64)>()
            .all(&self.db)
            .await
            .context("grouping cases by status")
    }

    async fn count_by_owner(&self, limit: u64) -> AppResult<GroupedCounts> {
        top_groups(case::Column::Responsable, limit)
            .into_tuple::<(Option<String>, i64)>()
            .all(&self.db)
            .await
            .context("grouping cases by owner")
    }

    async fn count_by_type(&self, limit: u64) -> AppResult<GroupedCounts> {
        top_groups(case::Column::TipoSolicitud, limit)
            .into_tuple::<(Option<String>, i64)>()
            .all(&self.db)
            .await
            .context("grouping cases by request type")
    }

    async fn recent_cases(&self, limit: u64) -> AppResult<Vec<Case>> {
        let models = case::Entity::find()
            .order_by_with_nulls(case::Column::FechaIngreso, Order::Desc, NullOrdering::Last)
            .order_by_desc(case::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("loading recent cases")?;

        Ok(models.into_iter().map(Case::from).collect())
    }
}

/// `(column, count)` for the `limit` largest groups of `column`.
fn top_groups(column: case::Column, limit: u64) -> Select<case::Entity> {
    case::Entity::find()
        .select_only()
        .column(column)
        .column_as(Expr::col(case::Column::Id).count(), "total")
        .group_by(column)
        .order_by(Expr::col(case::Column::Id).count(), Order::Desc)
        .limit(limit)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    #[test]
    fn test_request_types_are_grouped_in_storage() {
        let sql = top_groups(case::Column::TipoSolicitud, 5)
            .build(DbBackend::Postgres)
            .to_string();

        let grouping = &sql[sql.find("GROUP BY").expect("grouped")..];
        assert!(grouping.contains("\"tipo_solicitud\""), "{}", sql);
        assert!(sql.contains("ORDER BY COUNT(\"id\") DESC"), "{}", sql);
        assert!(sql.ends_with("LIMIT 5"), "{}", sql);
    }
}
