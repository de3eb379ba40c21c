use reqwest::Url;
use reqwest::header::ACCEPT;
use serde_json::Value;
use standard_error::{Interpolate, StandardError};

use super::{Query, QueryClient, check_query};
use crate::prelude::Result;

/// PostgREST endpoint of the hosted backend, `{base}/rest/v1/<table>`.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StandardError::new("ERR-QUERY-000").interpolate_err(e.to_string()))?;
        Ok(RestClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn request_url(&self, query: &Query) -> Result<Url> {
        check_query(query)?;
        let mut url = Url::parse(&format!("{}/rest/v1/{}", &self.base_url, &query.table))
            .map_err(|e| StandardError::new("ERR-QUERY-000").interpolate_err(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &query.columns.replace(' ', ""));
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{}", value));
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl QueryClient for RestClient {
    fn backend_tag(&self) -> &'static str {
        "rest"
    }

    async fn rows(&self, query: &Query) -> Result<Vec<Value>> {
        let url = self.request_url(query)?;
        let bearer = query.bearer.as_deref().unwrap_or(&self.anon_key);
        tracing::debug!("GET {}", url.path());
        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-QUERY-001").interpolate_err(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} answered {}: {}", &query.table, status, &body);
            return Err(StandardError::new("ERR-QUERY-001").interpolate_err(body));
        }
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StandardError::new("ERR-QUERY-002").interpolate_err(e.to_string()))
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/rest/v1/", &self.base_url))
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-QUERY-001").interpolate_err(e.to_string()))?;
        if response.status().is_server_error() {
            return Err(StandardError::new("ERR-QUERY-001")
                .interpolate_err(response.status().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_postgrest_url() -> Result<()> {
        let client = RestClient::new("https://abc.supabase.co/", "anon")?;
        let mut query = Query::new("profiles");
        query.columns = "id, full_name".into();
        query.filters.push(("id".into(), "u-1".into()));
        let url = client.request_url(&query)?;
        assert_eq!(url.path(), "/rest/v1/profiles");
        assert_eq!(url.query(), Some("select=id%2Cfull_name&id=eq.u-1"));
        Ok(())
    }

    #[test]
    fn refuses_bad_table() -> Result<()> {
        let client = RestClient::new("https://abc.supabase.co", "anon")?;
        assert!(client.request_url(&Query::new("../auth")).is_err());
        Ok(())
    }
}
