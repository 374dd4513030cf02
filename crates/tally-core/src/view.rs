//! View engine: filtered subset, facet options, sorted pages and aggregates
//!
//! Every mutation discards the derived state it affects and recomputes it
//! from the resident record set. Sorting never touches the filtered subset
//! or the aggregates.

use crate::filter::{derive_filtered_set, FilterCriteria, FilterUpdate};
use crate::models::Record;
use crate::reports::{derive_aggregates, Aggregates};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tally_config::{Config, SortDirection, SortKey};

// ==================== Sorting ====================

/// Table sort key and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Same key flips the direction, a new key starts ascending
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }
}

/// Stable sort: equal keys keep their filtered order in both directions
pub fn derive_sorted(filtered: &[Arc<Record>], sort: &SortSpec) -> Vec<Arc<Record>> {
    let mut sorted = filtered.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = a.compare_by(b, sort.key);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

// ==================== Pagination ====================

/// Number of pages for `total` records, never less than one
pub fn page_count(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    ((total + size - 1) / size).max(1)
}

/// One table page plus the numbers behind its caption
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-based page actually served, after clamping
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// 1-based position of the first row, 0 when empty
    pub first_index: usize,
    /// 1-based position of the last row, 0 when empty
    pub last_index: usize,
    pub records: Vec<Arc<Record>>,
}

/// Slice page `requested` out of the sorted sequence, clamped to `1..=total_pages`
pub fn derive_page(sorted: &[Arc<Record>], requested: usize, page_size: usize) -> Page {
    let size = page_size.max(1);
    let total_pages = page_count(sorted.len(), size);
    let page = requested.clamp(1, total_pages);

    let start = ((page - 1) * size).min(sorted.len());
    let end = (start + size).min(sorted.len());
    let records = sorted[start..end].to_vec();

    Page {
        page,
        page_size: size,
        total_pages,
        total_count: sorted.len(),
        first_index: if records.is_empty() { 0 } else { start + 1 },
        last_index: end,
        records,
    }
}

// ==================== Facet Options ====================

/// Distinct facet values from the full record set, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    pub payment_methods: Vec<String>,
}

impl FacetOptions {
    pub fn from_records(records: &[Arc<Record>]) -> Self {
        let mut categories = BTreeSet::new();
        let mut sub_categories = BTreeSet::new();
        let mut payment_methods = BTreeSet::new();
        for record in records {
            categories.insert(record.category.clone());
            sub_categories.insert(record.sub_category.clone());
            payment_methods.insert(record.payment_method.clone());
        }
        Self {
            categories: categories.into_iter().collect(),
            sub_categories: sub_categories.into_iter().collect(),
            payment_methods: payment_methods.into_iter().collect(),
        }
    }
}

// ==================== Engine ====================

/// Everything presentation reads, recomputed after each mutation
#[derive(Debug, Clone, Default)]
pub struct DerivedView {
    pub filtered: Vec<Arc<Record>>,
    pub sorted: Vec<Arc<Record>>,
    pub options: FacetOptions,
    pub aggregates: Aggregates,
}

/// Owns filter and sort criteria and the view derived from them
#[derive(Debug, Clone)]
pub struct ViewEngine {
    all: Vec<Arc<Record>>,
    criteria: FilterCriteria,
    sort: SortSpec,
    page: usize,
    page_size: usize,
    derived: DerivedView,
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new(SortSpec::default(), 50)
    }
}

impl ViewEngine {
    pub fn new(sort: SortSpec, page_size: usize) -> Self {
        Self {
            all: Vec::new(),
            criteria: FilterCriteria::default(),
            sort,
            page: 1,
            page_size: page_size.max(1),
            derived: DerivedView::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SortSpec {
                key: config.view.default_sort_key,
                direction: config.view.default_sort_direction,
            },
            config.pagination.records_per_page,
        )
    }

    /// Replace the record set and recompute everything under the current criteria
    pub fn rebuild(&mut self, records: &[Arc<Record>]) {
        self.all = records.to_vec();
        self.derived.options = FacetOptions::from_records(&self.all);
        self.refilter();
    }

    pub fn set_filter(&mut self, update: FilterUpdate) {
        log::debug!("Filter update: {:?}", update);
        self.criteria.apply(update);
        self.refilter();
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refilter();
    }

    /// Toggle the sort and return to the first page
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
        self.page = 1;
        self.derived.sorted = derive_sorted(&self.derived.filtered, &self.sort);
        log::debug!("Sorted by {} {}", self.sort.key, self.sort.direction);
    }

    /// Remember the requested page; clamping happens when the page is read
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    fn refilter(&mut self) {
        self.derived.filtered = derive_filtered_set(&self.all, &self.criteria);
        self.derived.sorted = derive_sorted(&self.derived.filtered, &self.sort);
        self.derived.aggregates = derive_aggregates(&self.all, &self.derived.filtered);
        log::debug!(
            "View recomputed: {} of {} records pass {} active filters",
            self.derived.filtered.len(),
            self.all.len(),
            self.criteria.active_count()
        );
    }

    pub fn table_page(&self) -> Page {
        derive_page(&self.derived.sorted, self.page, self.page_size)
    }

    /// Page `page` without moving the engine's current page
    pub fn page_at(&self, page: usize) -> Page {
        derive_page(&self.derived.sorted, page, self.page_size)
    }

    pub fn all(&self) -> &[Arc<Record>] {
        &self.all
    }

    pub fn filtered(&self) -> &[Arc<Record>] {
        &self.derived.filtered
    }

    pub fn sorted(&self) -> &[Arc<Record>] {
        &self.derived.sorted
    }

    pub fn options(&self) -> &FacetOptions {
        &self.derived.options
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.derived.aggregates
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, date: &str, category: &str, amount: u64) -> Arc<Record> {
        Arc::new(Record {
            id,
            date: date.to_string(),
            category: category.to_string(),
            sub_category: format!("{} sub", category),
            item: format!("item {}", id),
            payment_method: if id % 2 == 0 { "Cash" } else { "Card" }.to_string(),
            amount,
            memo: String::new(),
        })
    }

    fn many(n: u64) -> Vec<Arc<Record>> {
        (1..=n).map(|i| record(i, "2024-01-01", "Food", i)).collect()
    }

    fn ids(records: &[Arc<Record>]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_sort_toggle() {
        let mut sort = SortSpec::default();
        assert_eq!(sort.key, SortKey::Date);
        assert_eq!(sort.direction, SortDirection::Desc);

        sort.toggle(SortKey::Date);
        assert_eq!(sort.direction, SortDirection::Asc);
        sort.toggle(SortKey::Date);
        assert_eq!(sort.direction, SortDirection::Desc);

        sort.toggle(SortKey::Amount);
        assert_eq!(sort.key, SortKey::Amount);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let records = vec![
            record(1, "2024-01-01", "Food", 500),
            record(2, "2024-01-02", "Food", 100),
            record(3, "2024-01-03", "Food", 500),
            record(4, "2024-01-04", "Food", 100),
        ];
        let asc = SortSpec { key: SortKey::Amount, direction: SortDirection::Asc };
        assert_eq!(ids(&derive_sorted(&records, &asc)), vec![2, 4, 1, 3]);

        let desc = SortSpec { key: SortKey::Amount, direction: SortDirection::Desc };
        assert_eq!(ids(&derive_sorted(&records, &desc)), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 50), 1);
        assert_eq!(page_count(50, 50), 1);
        assert_eq!(page_count(51, 50), 2);
        assert_eq!(page_count(120, 50), 3);
    }

    #[test]
    fn test_derive_page_slices_and_clamps() {
        let records = many(120);

        let first = derive_page(&records, 1, 50);
        assert_eq!(first.records.len(), 50);
        assert_eq!((first.first_index, first.last_index), (1, 50));

        let last = derive_page(&records, 3, 50);
        assert_eq!(last.records.len(), 20);
        assert_eq!((last.first_index, last.last_index), (101, 120));

        let past_end = derive_page(&records, 9, 50);
        assert_eq!(past_end.page, 3);
        assert_eq!(ids(&past_end.records), ids(&last.records));

        let zero = derive_page(&records, 0, 50);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn test_empty_page() {
        let page = derive_page(&[], 4, 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!((page.first_index, page.last_index), (0, 0));
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_options_come_from_full_set() {
        let mut engine = ViewEngine::default();
        engine.rebuild(&[
            record(1, "2024-01-01", "Transport", 10),
            record(2, "2024-01-02", "Food", 20),
            record(3, "2024-01-03", "Food", 30),
        ]);
        engine.set_filter(FilterUpdate::Category("Food".to_string()));

        assert_eq!(engine.filtered().len(), 2);
        assert_eq!(engine.options().categories, vec!["Food", "Transport"]);
        assert_eq!(engine.options().payment_methods, vec!["Card", "Cash"]);
    }

    #[test]
    fn test_set_sort_resets_page_and_keeps_filtered_set() {
        let mut engine = ViewEngine::default();
        engine.rebuild(&many(120));
        engine.set_filter(FilterUpdate::AmountMin("11".to_string()));
        engine.set_page(2);
        assert_eq!(engine.table_page().page, 2);

        let filtered_before = ids(engine.filtered());
        let total_before = engine.aggregates().summary.total;
        engine.set_sort(SortKey::Amount);

        assert_eq!(engine.table_page().page, 1);
        assert_eq!(ids(engine.filtered()), filtered_before);
        assert_eq!(engine.aggregates().summary.total, total_before);
        assert_eq!(engine.table_page().records[0].amount, 11);
    }

    #[test]
    fn test_filter_narrowing_clamps_current_page() {
        let mut engine = ViewEngine::default();
        engine.rebuild(&many(120));
        engine.set_page(3);
        engine.set_filter(FilterUpdate::AmountMax("10".to_string()));
        let page = engine.table_page();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_count, 10);
    }

    #[test]
    fn test_reset_filters_restores_full_set() {
        let mut engine = ViewEngine::default();
        engine.rebuild(&many(10));
        engine.set_filter(FilterUpdate::Search("item 1".to_string()));
        engine.set_filter(FilterUpdate::DateTo("2023-12-31".to_string()));
        assert!(engine.filtered().is_empty());

        engine.reset_filters();
        assert_eq!(ids(engine.filtered()), ids(engine.all()));
        assert!(engine.criteria().is_default());
    }

    #[test]
    fn test_rebuild_keeps_criteria_and_sort() {
        let mut engine = ViewEngine::default();
        engine.rebuild(&many(5));
        engine.set_filter(FilterUpdate::AmountMin("3".to_string()));
        engine.set_sort(SortKey::Amount);

        engine.rebuild(&many(8));
        assert_eq!(ids(engine.sorted()), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(engine.sort().key, SortKey::Amount);
    }
}
