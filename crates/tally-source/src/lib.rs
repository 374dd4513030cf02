//! Expense record retrieval
//!
//! One trait at the seam between the ledger and wherever the records live:
//! the HTTP backend in production, a JSON file for offline use, or a fixed
//! list in tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod http;
pub mod types;

pub use error::SourceError;
pub use http::HttpRecordSource;
pub use types::{decode_payload, WireRecord, RESULTS_FIELD};

// ==================== Source Trait ====================

/// Source reference type
pub type SourceRef = Arc<dyn RecordSource>;

/// Anything that can produce the full expense listing
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Retrieve every record, passing `params` through to the backend
    async fn fetch(&self, params: &[(String, String)]) -> Result<Vec<WireRecord>, SourceError>;

    /// Where the records come from, for log lines
    fn describe(&self) -> String;
}

/// Reads a saved listing from disk. Accepts the same two payload shapes as the backend.
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for FileRecordSource {
    async fn fetch(&self, _params: &[(String, String)]) -> Result<Vec<WireRecord>, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let records = decode_payload(&bytes)?;
        log::debug!("Read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// In-memory source with a fixed answer
#[derive(Debug, Clone)]
pub struct StaticRecordSource {
    outcome: Result<Vec<WireRecord>, String>,
}

impl StaticRecordSource {
    pub fn new(records: Vec<WireRecord>) -> Self {
        Self {
            outcome: Ok(records),
        }
    }

    /// A source whose every fetch fails as if the backend were down
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn fetch(&self, _params: &[(String, String)]) -> Result<Vec<WireRecord>, SourceError> {
        match &self.outcome {
            Ok(records) => Ok(records.clone()),
            Err(message) => Err(SourceError::Transport {
                message: message.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        "static records".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tally-source-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_file_source_reads_wrapped_payload() {
        let path = temp_path("wrapped.json");
        tokio::fs::write(
            &path,
            r#"{"results":[{"id":7,"spent_at":"2024-03-01","category":"Travel","sub_category":"Taxi","item":"Airport","payment_method":"Card","amount":32000,"memo":null}]}"#,
        )
        .await
        .unwrap();

        let source = FileRecordSource::new(&path);
        let records = source.fetch(&[]).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].memo, "");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileRecordSource::new(temp_path("does-not-exist.json"));
        let err = source.fetch(&[]).await.unwrap_err();
        assert!(matches!(err, SourceError::IoError(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticRecordSource::new(vec![]);
        assert!(source.fetch(&[]).await.unwrap().is_empty());

        let down = StaticRecordSource::unreachable("connection refused");
        let err = down.fetch(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Backend unreachable: connection refused");
    }
}
