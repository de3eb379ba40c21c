pub mod postgres;
pub mod rest;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use standard_error::{Interpolate, StandardError};

use crate::prelude::Result;

/// One read against a backend table: `select <columns> from <table> where
/// <column> = <value> and ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<(String, String)>,
    pub single: bool,
    /// Caller's access token, for backends that enforce row level security.
    pub bearer: Option<String>,
}

impl Query {
    pub fn new(table: &str) -> Self {
        Query {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: vec![],
            single: false,
            bearer: None,
        }
    }
}

#[async_trait::async_trait]
pub trait QueryClient: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn rows(&self, query: &Query) -> Result<Vec<Value>>;

    async fn ping(&self) -> Result<()>;
}

/// Shared handle over whichever [`QueryClient`] the server was started with.
#[derive(Clone)]
pub struct Backend(Arc<dyn QueryClient>);

impl Backend {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Backend(client)
    }

    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: &*self.0,
            query: Query::new(table),
        }
    }

    pub async fn ping(&self) -> Result<()> {
        self.0.ping().await
    }

    pub fn tag(&self) -> &'static str {
        self.0.backend_tag()
    }
}

pub struct QueryBuilder<'a> {
    client: &'a dyn QueryClient,
    query: Query,
}

impl<'a> QueryBuilder<'a> {
    pub fn select(mut self, columns: &str) -> Self {
        self.query.columns = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.query.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn auth(mut self, token: Option<&str>) -> Self {
        self.query.bearer = token.map(str::to_string);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let rows = self.client.rows(&self.query).await?;
        rows.into_iter().map(|row| decode(&self.query.table, row)).collect()
    }

    /// Exactly one row, anything else is an error.
    pub async fn single<T: DeserializeOwned>(mut self) -> Result<T> {
        self.query.single = true;
        let mut rows = self.client.rows(&self.query).await?;
        if rows.len() != 1 {
            return Err(StandardError::new("ERR-QUERY-003").interpolate_err(format!(
                "{} returned {} rows",
                &self.query.table,
                rows.len()
            )));
        }
        let row = rows.remove(0);
        decode(&self.query.table, row)
    }
}

fn decode<T: DeserializeOwned>(table: &str, row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| {
        tracing::warn!("row from {} did not match its schema: {}", table, e);
        StandardError::new("ERR-QUERY-002").interpolate_err(e.to_string())
    })
}

/// Table and column names are spliced into urls and sql, so only plain
/// identifiers get through.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn check_query(query: &Query) -> Result<()> {
    let columns_ok = query.columns == "*"
        || query
            .columns
            .split(',')
            .map(str::trim)
            .all(is_identifier);
    let filters_ok = query.filters.iter().all(|(c, _)| is_identifier(c));
    if is_identifier(&query.table) && columns_ok && filters_ok {
        Ok(())
    } else {
        Err(StandardError::new("ERR-QUERY-004").interpolate_err(format!("{:?}", query)))
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    /// In-memory tables keyed by name, rows stored as json.
    #[derive(Default)]
    pub struct MemoryClient {
        pub tables: Mutex<std::collections::HashMap<String, Vec<Value>>>,
        pub failing: Mutex<Vec<String>>,
        pub calls: AtomicU64,
        pub seen: Mutex<Vec<Query>>,
    }

    impl MemoryClient {
        pub fn with_table(self, table: &str, rows: Vec<Value>) -> Self {
            self.tables.lock().unwrap().insert(table.to_string(), rows);
            self
        }

        pub fn failing_on(self, table: &str) -> Self {
            self.failing.lock().unwrap().push(table.to_string());
            self
        }

        pub fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn calls_to(&self, table: &str) -> usize {
            self.seen.lock().unwrap().iter().filter(|q| q.table == table).count()
        }
    }

    fn text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    #[async_trait::async_trait]
    impl QueryClient for MemoryClient {
        fn backend_tag(&self) -> &'static str {
            "memory"
        }

        async fn rows(&self, query: &Query) -> Result<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(query.clone());
            check_query(query)?;
            if self.failing.lock().unwrap().contains(&query.table) {
                return Err(StandardError::new("ERR-QUERY-001"));
            }
            let tables = self.tables.lock().unwrap();
            let rows = tables.get(&query.table).cloned().unwrap_or_default();
            Ok(rows
                .into_iter()
                .filter(|row| {
                    query
                        .filters
                        .iter()
                        .all(|(col, val)| row.get(col).map(text).as_deref() == Some(val.as_str()))
                })
                .collect())
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::testing::MemoryClient;
    use super::*;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Row {
        id: i64,
        name: String,
    }

    fn backend() -> Backend {
        let client = MemoryClient::default().with_table(
            "things",
            vec![
                json!({"id": 1, "name": "one"}),
                json!({"id": 2, "name": "two"}),
            ],
        );
        Backend::new(Arc::new(client))
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("hr_posts"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("posts; drop table x"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn builder_collects_query() {
        let backend = backend();
        let builder = backend
            .from("profiles")
            .select("full_name")
            .eq("id", "abc")
            .auth(Some("tok"));
        let q = builder.query();
        assert_eq!(q.table, "profiles");
        assert_eq!(q.columns, "full_name");
        assert_eq!(q.filters, vec![("id".to_string(), "abc".to_string())]);
        assert_eq!(q.bearer.as_deref(), Some("tok"));
        assert!(check_query(q).is_ok());
    }

    #[test]
    fn rejects_spliced_columns() {
        let mut q = Query::new("profiles");
        q.columns = "id, name) from x --".into();
        assert!(check_query(&q).is_err());
        q.columns = "id, full_name".into();
        assert!(check_query(&q).is_ok());
    }

    #[traced_test]
    #[tokio::test]
    async fn execute_and_single() -> Result<()> {
        let backend = backend();
        let all: Vec<Row> = backend.from("things").execute().await?;
        assert_eq!(all.len(), 2);
        let one: Row = backend.from("things").eq("id", 2).single().await?;
        assert_eq!(one, Row { id: 2, name: "two".into() });
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn single_needs_exactly_one_row() {
        let backend = backend();
        assert!(backend.from("things").single::<Row>().await.is_err());
        assert!(backend.from("things").eq("id", 9).single::<Row>().await.is_err());
    }
}
