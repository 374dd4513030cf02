//! Record store: the resident record set and the status of its retrieval
//!
//! Every load takes a ticket. Only the most recently issued ticket may
//! change the store; an older load that resolves later is discarded,
//! whether it succeeded or failed.

use crate::error::{CoreError, ErrorSeverity};
use crate::models::Record;
use crate::types::LoadStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Handle for one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What a finished load did to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Record set replaced wholesale
    Replaced { count: usize },
    /// Retrieval failed; previous records kept
    Failed { message: String },
    /// A newer load was started before this one resolved
    Superseded,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Arc<Record>>,
    status: LoadStatus,
    error: Option<CoreError>,
    latest: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the store loading and clear any previous error
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest += 1;
        self.status = LoadStatus::Loading;
        self.error = None;
        LoadTicket(self.latest)
    }

    /// Apply a resolved load if its ticket is still the latest
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Record>, CoreError>,
    ) -> LoadOutcome {
        if ticket.0 != self.latest {
            log::debug!(
                "Discarding load #{}: load #{} started after it",
                ticket.0,
                self.latest
            );
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(records) => {
                self.records = records.into_iter().map(Arc::new).collect();
                self.status = LoadStatus::Ready;
                self.error = None;
                self.loaded_at = Some(Utc::now());
                LoadOutcome::Replaced {
                    count: self.records.len(),
                }
            }
            Err(error) => {
                let level = match error.severity() {
                    ErrorSeverity::Warning => log::Level::Warn,
                    ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
                };
                log::log!(
                    level,
                    "Load #{} failed [{}]: {}",
                    ticket.0,
                    error.code(),
                    error
                );
                let message = error.to_string();
                self.status = LoadStatus::Error;
                self.error = Some(error);
                LoadOutcome::Failed { message }
            }
        }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&CoreError> {
        self.error.as_ref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> Record {
        Record {
            id,
            date: "2024-01-01".to_string(),
            category: "Food".to_string(),
            sub_category: String::new(),
            item: String::new(),
            payment_method: "Card".to_string(),
            amount: 100,
            memo: String::new(),
        }
    }

    fn down() -> CoreError {
        CoreError::Transport {
            message: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_successful_load() {
        let mut store = RecordStore::new();
        assert_eq!(store.status(), LoadStatus::Idle);

        let ticket = store.begin_load();
        assert!(store.is_loading());
        let outcome = store.finish_load(ticket, Ok(vec![record(1), record(2)]));

        assert_eq!(outcome, LoadOutcome::Replaced { count: 2 });
        assert_eq!(store.status(), LoadStatus::Ready);
        assert_eq!(store.records().len(), 2);
        assert!(store.loaded_at().is_some());
    }

    #[test]
    fn test_failed_reload_keeps_records() {
        let mut store = RecordStore::new();
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(vec![record(1)]));

        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Err(down()));

        assert_eq!(
            outcome,
            LoadOutcome::Failed {
                message: "Backend unreachable: connection refused".to_string()
            }
        );
        assert_eq!(store.status(), LoadStatus::Error);
        assert_eq!(store.records().len(), 1);
        assert!(store.error().is_some());
    }

    #[test]
    fn test_begin_load_clears_error() {
        let mut store = RecordStore::new();
        let ticket = store.begin_load();
        store.finish_load(ticket, Err(down()));
        assert!(store.error().is_some());

        store.begin_load();
        assert!(store.error().is_none());
        assert!(store.is_loading());
    }

    #[test]
    fn test_latest_started_load_wins() {
        let mut store = RecordStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        // second resolves first, then the stale first arrives
        assert_eq!(
            store.finish_load(second, Ok(vec![record(2)])),
            LoadOutcome::Replaced { count: 1 }
        );
        assert_eq!(
            store.finish_load(first, Ok(vec![record(1), record(3)])),
            LoadOutcome::Superseded
        );
        assert_eq!(store.records()[0].id, 2);
        assert_eq!(store.status(), LoadStatus::Ready);
    }

    #[test]
    fn test_stale_result_does_not_end_loading() {
        let mut store = RecordStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        assert_eq!(store.finish_load(first, Err(down())), LoadOutcome::Superseded);
        assert!(store.is_loading());
        assert!(store.error().is_none());

        store.finish_load(second, Ok(vec![]));
        assert_eq!(store.status(), LoadStatus::Ready);
        assert!(first < second);
    }
}
