//! Core ledger processing: the record store and the view engine over it

pub mod error;
pub mod filter;
pub mod models;
pub mod reports;
pub mod store;
pub mod time;
pub mod types;
pub mod view;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tally_config::{Config, SortKey};
use tally_source::{SourceError, WireRecord};
use tokio::sync::RwLock;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use filter::{derive_filtered_set, FilterCriteria, FilterUpdate};
pub use models::Record;
pub use reports::{
    category_chart, derive_aggregates, monthly_chart, Aggregates, CategoryAggregate,
    CategoryShare, ChartData, ChartDataPoint, MonthTotal, SummaryStats,
};
pub use store::{LoadOutcome, LoadTicket, RecordStore};
pub use tally_source::SourceRef;
pub use time::DateWindow;
pub use types::{ChartType, DateMode, LoadStatus};
pub use view::{derive_page, derive_sorted, FacetOptions, Page, SortSpec, ViewEngine};

/// Retrieval status for API responses
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Criteria, options and summary in one read
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub status: LoadStatus,
    pub criteria: FilterCriteria,
    pub date_description: String,
    pub active_filter_count: usize,
    pub sort: SortSpec,
    pub page: usize,
    pub total_pages: usize,
    pub options: FacetOptions,
    pub summary: SummaryStats,
}

/// One session: configuration, record source, record store and view engine
pub struct Ledger {
    config: Config,
    source: SourceRef,
    store: RecordStore,
    view: ViewEngine,
}

impl Ledger {
    /// Create a new ledger with config and record source
    pub fn new(config: Config, source: SourceRef) -> CoreResult<Self> {
        config.validate()?;
        let view = ViewEngine::from_config(&config);
        Ok(Self {
            config,
            source,
            store: RecordStore::new(),
            view,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> SourceRef {
        Arc::clone(&self.source)
    }

    /// Fetch and apply in one step. Holds `&mut self` across the fetch;
    /// use [`reload_shared`] when the ledger sits behind a lock.
    pub async fn load(&mut self, params: &[(String, String)]) -> LoadOutcome {
        let ticket = self.begin_load();
        let source = self.source();
        let result = source.fetch(params).await;
        self.finish_load(ticket, result)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.store.begin_load();
        log::info!("Load #{} from {}", ticket.id(), self.source.describe());
        ticket
    }

    /// Apply a fetch result. A replaced record set is pushed through the
    /// view engine under the current filters and sort.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<WireRecord>, SourceError>,
    ) -> LoadOutcome {
        let result = result
            .map(|wire| wire.into_iter().map(Record::from).collect())
            .map_err(CoreError::from);

        let outcome = self.store.finish_load(ticket, result);
        if let LoadOutcome::Replaced { count } = outcome {
            self.view.rebuild(self.store.records());
            log::info!(
                "Load #{} replaced the record set: {} records, {} pass current filters",
                ticket.id(),
                count,
                self.view.filtered().len()
            );
        }
        outcome
    }

    // ==================== View Operations ====================

    pub fn set_filter(&mut self, update: FilterUpdate) {
        self.view.set_filter(update);
    }

    pub fn reset_filters(&mut self) {
        self.view.reset_filters();
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.view.set_sort(key);
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.set_page(page);
    }

    pub fn table_page(&self) -> Page {
        self.view.table_page()
    }

    pub fn view(&self) -> &ViewEngine {
        &self.view
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn summary(&self) -> &SummaryStats {
        &self.view.aggregates().summary
    }

    pub fn category_chart(&self) -> ChartData {
        category_chart(
            &self.view.aggregates().categories,
            &self.config.charts,
            &self.config.currency,
        )
    }

    pub fn monthly_chart(&self) -> ChartData {
        monthly_chart(
            &self.view.aggregates().months,
            &self.config.charts,
            &self.config.currency,
        )
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            status: self.store.status(),
            error: self.store.error().map(CoreError::to_details),
            record_count: self.store.records().len(),
            loaded_at: self.store.loaded_at(),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let criteria = self.view.criteria().clone();
        let page = self.view.table_page();
        ViewSnapshot {
            status: self.store.status(),
            date_description: criteria.date.description(),
            active_filter_count: criteria.active_count(),
            criteria,
            sort: self.view.sort(),
            page: page.page,
            total_pages: page.total_pages,
            options: self.view.options().clone(),
            summary: self.summary().clone(),
        }
    }
}

/// Reload a shared ledger without holding the lock across the fetch.
/// Filters and sorts issued meanwhile apply to the resident records.
pub async fn reload_shared(ledger: &RwLock<Ledger>, params: &[(String, String)]) -> LoadOutcome {
    let (ticket, source) = {
        let mut guard = ledger.write().await;
        (guard.begin_load(), guard.source())
    };

    let started = Instant::now();
    let result = source.fetch(params).await;
    let outcome = ledger.write().await.finish_load(ticket, result);

    match &outcome {
        LoadOutcome::Superseded => {
            log::debug!("Load #{} superseded after {:?}", ticket.id(), started.elapsed())
        }
        _ => log::info!("Load #{} finished in {:?}", ticket.id(), started.elapsed()),
    }
    outcome
}
