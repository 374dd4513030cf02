//! HTTP retrieval from the expense backend

use crate::error::SourceError;
use crate::types::{decode_payload, WireRecord};
use crate::RecordSource;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tally_config::BackendConfig;

/// Longest slice of an error body kept for diagnostics
const MAX_ERROR_BODY: usize = 512;

/// Fetches the listing with a single GET against the configured endpoint
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: reqwest::Client,
    endpoint: String,
    base_query: BTreeMap<String, String>,
}

impl HttpRecordSource {
    pub fn from_config(config: &BackendConfig) -> Result<Self, SourceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| SourceError::Transport {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            base_query: config.query.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured query first, then the caller's pairs in order.
    /// No query at all leaves the endpoint without a trailing `?`.
    fn request_url(&self, params: &[(String, String)]) -> Result<reqwest::Url, SourceError> {
        if self.base_query.is_empty() && params.is_empty() {
            return reqwest::Url::parse(&self.endpoint).map_err(|e| self.invalid_url(e));
        }

        let pairs = self
            .base_query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        reqwest::Url::parse_with_params(&self.endpoint, pairs).map_err(|e| self.invalid_url(e))
    }

    fn invalid_url(&self, error: impl std::fmt::Display) -> SourceError {
        SourceError::Transport {
            message: format!("invalid backend URL {}: {}", self.endpoint, error),
        }
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch(&self, params: &[(String, String)]) -> Result<Vec<WireRecord>, SourceError> {
        let url = self.request_url(params)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            log::warn!("Backend answered {} for {}", status, self.endpoint);
            return Err(SourceError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| SourceError::Transport {
            message: e.to_string(),
        })?;
        let records = decode_payload(&bytes)?;
        log::debug!("Backend returned {} records", records.len());
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn backend(url: String) -> BackendConfig {
        BackendConfig {
            url,
            ..BackendConfig::default()
        }
    }

    fn listing() -> serde_json::Value {
        serde_json::json!([
            {"id": 1, "spent_at": "2024-01-05", "category": "Food", "sub_category": "Lunch",
             "item": "Bibimbap", "payment_method": "Card", "amount": 10000, "memo": ""},
            {"id": 2, "spent_at": "2024-02-10", "category": "Transport", "sub_category": "Bus",
             "item": "Card top-up", "payment_method": "Cash", "amount": 3000, "memo": null}
        ])
    }

    #[tokio::test]
    async fn test_fetch_listing() {
        let url = serve(Router::new().route("/api/expenses/", get(|| async { Json(listing()) }))).await;
        let source = HttpRecordSource::from_config(&backend(url)).unwrap();

        let records = source.fetch(&[]).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].category, "Transport");
        assert_eq!(records[1].memo, "");
    }

    #[tokio::test]
    async fn test_query_passthrough() {
        let router = Router::new().route(
            "/api/expenses/",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let user = q.get("user").cloned().unwrap_or_default();
                let year = q.get("year").cloned().unwrap_or_default();
                if user == "kim" && year == "2024" {
                    Json(serde_json::json!({"results": listing()}))
                } else {
                    Json(serde_json::json!({"results": []}))
                }
            }),
        );
        let url = serve(router).await;
        let mut config = backend(url);
        config.query.insert("user".to_string(), "kim".to_string());
        let source = HttpRecordSource::from_config(&config).unwrap();

        let params = vec![("year".to_string(), "2024".to_string())];
        assert_eq!(source.fetch(&params).await.unwrap().len(), 2);
        assert!(source.fetch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_status() {
        let router = Router::new().route(
            "/api/expenses/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is down") }),
        );
        let url = serve(router).await;
        let source = HttpRecordSource::from_config(&backend(url)).unwrap();

        match source.fetch(&[]).await.unwrap_err() {
            SourceError::Backend { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "database is down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpRecordSource::from_config(&backend(format!("http://{}", addr))).unwrap();
        let err = source.fetch(&[]).await.unwrap_err();
        assert!(err.is_transport(), "{:?}", err);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let router = Router::new().route("/api/expenses/", get(|| async { "<html>oops</html>" }));
        let url = serve(router).await;
        let source = HttpRecordSource::from_config(&backend(url)).unwrap();

        let err = source.fetch(&[]).await.unwrap_err();
        assert!(matches!(err, SourceError::MalformedPayload { .. }));
    }

    #[test]
    fn test_endpoint_join() {
        let source =
            HttpRecordSource::from_config(&backend("http://backend:8000/".to_string())).unwrap();
        assert_eq!(source.endpoint(), "http://backend:8000/api/expenses/");
    }

    #[test]
    fn test_request_url_query() {
        let mut config = backend("http://backend:8000".to_string());
        let source = HttpRecordSource::from_config(&config).unwrap();
        assert_eq!(
            source.request_url(&[]).unwrap().as_str(),
            "http://backend:8000/api/expenses/"
        );

        let params = vec![("year".to_string(), "2024".to_string())];
        assert_eq!(
            source.request_url(&params).unwrap().as_str(),
            "http://backend:8000/api/expenses/?year=2024"
        );

        config.query.insert("user".to_string(), "kim".to_string());
        let source = HttpRecordSource::from_config(&config).unwrap();
        assert_eq!(
            source.request_url(&[]).unwrap().as_str(),
            "http://backend:8000/api/expenses/?user=kim"
        );
        assert_eq!(
            source.request_url(&params).unwrap().as_str(),
            "http://backend:8000/api/expenses/?user=kim&year=2024"
        );
    }
}
