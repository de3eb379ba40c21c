use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use standard_error::{Interpolate, StandardError};

use super::{Query, QueryClient, check_query};
use crate::prelude::Result;

/// Reads the same tables straight from postgres, for local development
/// against `migrate`d tables.
#[derive(Debug, Clone)]
pub struct PgClient {
    pool: PgPool,
}

impl PgClient {
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(url)
            .map_err(|e| StandardError::new("ERR-DB-000").interpolate_err(e.to_string()))?;
        Ok(PgClient { pool })
    }
}

/// Rows come back as json objects so both backends hand the adaptors the
/// same shape.
pub fn build_sql(query: &Query) -> Result<QueryBuilder<'_, Postgres>> {
    check_query(query)?;
    let mut qb = QueryBuilder::new("select row_to_json(t)::jsonb from (select ");
    qb.push(&query.columns);
    qb.push(" from ");
    qb.push(&query.table);
    for (i, (column, value)) in query.filters.iter().enumerate() {
        qb.push(if i == 0 { " where " } else { " and " });
        qb.push(column);
        qb.push("::text = ");
        qb.push_bind(value);
    }
    if query.single {
        // two is enough to tell "one" from "many"
        qb.push(" limit 2");
    }
    qb.push(") t");
    Ok(qb)
}

#[async_trait::async_trait]
impl QueryClient for PgClient {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn rows(&self, query: &Query) -> Result<Vec<Value>> {
        let mut qb = build_sql(query)?;
        let rows = qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StandardError::new("ERR-QUERY-001").interpolate_err(e.to_string()))?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("select 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StandardError::new("ERR-DB-000").interpolate_err(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_select_in_row_to_json() -> Result<()> {
        let mut query = Query::new("profiles");
        query.filters.push(("id".into(), "u-1".into()));
        query.single = true;
        let qb = build_sql(&query)?;
        assert_eq!(
            qb.sql(),
            "select row_to_json(t)::jsonb from (select * from profiles where id::text = $1 limit 2) t"
        );
        Ok(())
    }

    #[test]
    fn several_filters_are_anded() -> Result<()> {
        let mut query = Query::new("hr_posts");
        query.columns = "id, title".into();
        query.filters.push(("location".into(), "South".into()));
        query.filters.push(("requires_apartment".into(), "true".into()));
        let qb = build_sql(&query)?;
        assert_eq!(
            qb.sql(),
            "select row_to_json(t)::jsonb from (select id, title from hr_posts where location::text = $1 and requires_apartment::text = $2) t"
        );
        Ok(())
    }

    #[test]
    fn injection_is_refused() {
        let query = Query::new("hr_posts; drop table profiles");
        assert!(build_sql(&query).is_err());
    }
}
