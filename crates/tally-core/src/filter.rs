//! Filter criteria and the record predicate

use crate::models::Record;
use crate::time::{normalize_date_bound, DateWindow};
use crate::types::DateMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Parse an amount bound. Blank, unparsable or non-finite input means "no bound".
pub fn parse_amount_bound(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Pure criteria data: legal to evaluate against any record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub date: DateWindow,
    /// Empty set leaves the facet inert
    pub categories: BTreeSet<String>,
    pub sub_categories: BTreeSet<String>,
    pub payment_methods: BTreeSet<String>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    /// Matched case-insensitively against item or memo
    pub search: String,
}

impl FilterCriteria {
    pub fn is_default(&self) -> bool {
        *self == FilterCriteria::default()
    }

    /// Active filter groups: date bounds, each facet, amount bounds, search
    pub fn active_count(&self) -> usize {
        [
            self.date.has_bound(),
            !self.categories.is_empty(),
            !self.sub_categories.is_empty(),
            !self.payment_methods.is_empty(),
            self.amount_min.is_some() || self.amount_max.is_some(),
            !self.search.is_empty(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// Check a single record against every facet
    pub fn matches(&self, record: &Record) -> bool {
        self.matcher().matches(record)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            criteria: self,
            needle: self.search.to_lowercase(),
        }
    }

    /// Apply one update. Never fails: bad bounds are stored as "no bound".
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::DateMode(mode) => self.date.mode = mode,
            FilterUpdate::DateFrom(raw) => self.date.from = normalize_date_bound(&raw),
            FilterUpdate::DateTo(raw) => self.date.to = normalize_date_bound(&raw),
            FilterUpdate::Category(value) => toggle(&mut self.categories, value),
            FilterUpdate::SubCategory(value) => toggle(&mut self.sub_categories, value),
            FilterUpdate::PaymentMethod(value) => toggle(&mut self.payment_methods, value),
            FilterUpdate::AmountMin(raw) => self.amount_min = parse_amount_bound(&raw),
            FilterUpdate::AmountMax(raw) => self.amount_max = parse_amount_bound(&raw),
            FilterUpdate::Search(text) => self.search = text,
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, value: String) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// Criteria with the search needle lowered once per pass
struct Matcher<'a> {
    criteria: &'a FilterCriteria,
    needle: String,
}

impl Matcher<'_> {
    fn matches(&self, record: &Record) -> bool {
        let c = self.criteria;

        if !c.date.contains(&record.date) {
            return false;
        }
        if !c.categories.is_empty() && !c.categories.contains(&record.category) {
            return false;
        }
        if !c.sub_categories.is_empty() && !c.sub_categories.contains(&record.sub_category) {
            return false;
        }
        if !c.payment_methods.is_empty() && !c.payment_methods.contains(&record.payment_method) {
            return false;
        }

        let amount = record.amount as f64;
        if c.amount_min.map_or(false, |min| amount < min) {
            return false;
        }
        if c.amount_max.map_or(false, |max| amount > max) {
            return false;
        }

        self.needle.is_empty() || record.matches_search(&self.needle)
    }
}

/// Records passing the criteria, in their original order
pub fn derive_filtered_set(records: &[Arc<Record>], criteria: &FilterCriteria) -> Vec<Arc<Record>> {
    if criteria.is_default() {
        return records.to_vec();
    }
    let matcher = criteria.matcher();
    records
        .iter()
        .filter(|r| matcher.matches(r))
        .cloned()
        .collect()
}

/// One `setFilter` call. Facet values toggle membership.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    DateMode(DateMode),
    DateFrom(String),
    DateTo(String),
    Category(String),
    SubCategory(String),
    PaymentMethod(String),
    AmountMin(String),
    AmountMax(String),
    Search(String),
}

impl FilterUpdate {
    /// Build an update from a dimension name and its raw value
    pub fn parse(dimension: &str, value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let update = match dimension.to_lowercase().as_str() {
            "date_mode" | "datemode" | "mode" => FilterUpdate::DateMode(value.parse()?),
            "date_from" | "datefrom" | "from" => FilterUpdate::DateFrom(value),
            "date_to" | "dateto" | "to" => FilterUpdate::DateTo(value),
            "category" | "categories" => FilterUpdate::Category(value),
            "sub_category" | "subcategory" | "sub_categories" | "subcategories" => {
                FilterUpdate::SubCategory(value)
            }
            "payment_method" | "paymentmethod" | "payment_methods" | "paymentmethods" => {
                FilterUpdate::PaymentMethod(value)
            }
            "amount_min" | "amountmin" | "min" => FilterUpdate::AmountMin(value),
            "amount_max" | "amountmax" | "max" => FilterUpdate::AmountMax(value),
            "search" | "q" => FilterUpdate::Search(value),
            _ => return Err(format!("Invalid filter dimension: {}", dimension)),
        };
        Ok(update)
    }
}
