//! Date window used by the filter predicate
//!
//! Record dates are ISO `YYYY-MM-DD` text and are compared as strings, so
//! bounds are normalized to the same zero-padded form before they are stored.

use crate::types::DateMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a user supplied bound. Blank or invalid input means "no bound".
pub fn normalize_date_bound(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .map(|d| d.format(DATE_FORMAT).to_string())
}

/// Date mode plus its two bounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub mode: DateMode,
    /// Lower bound, read in `range` and `after` modes
    pub from: Option<String>,
    /// Upper bound, read in `range` and `before` modes
    pub to: Option<String>,
}

impl DateWindow {
    /// Check if a record date falls inside the window
    pub fn contains(&self, date: &str) -> bool {
        match self.mode {
            DateMode::Range => {
                let after_start = self.from.as_deref().map_or(true, |from| date >= from);
                let before_end = self.to.as_deref().map_or(true, |to| date <= to);
                after_start && before_end
            }
            DateMode::Before => self.to.as_deref().map_or(true, |to| date < to),
            DateMode::After => self.from.as_deref().map_or(true, |from| date > from),
        }
    }

    /// Either bound is set, whatever the mode
    pub fn has_bound(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Get a human-readable description of the window
    pub fn description(&self) -> String {
        match (self.mode, self.from.as_deref(), self.to.as_deref()) {
            (DateMode::Range, None, None) => "All dates".to_string(),
            (DateMode::Range, Some(from), None) => format!("From {}", from),
            (DateMode::Range, None, Some(to)) => format!("Until {}", to),
            (DateMode::Range, Some(from), Some(to)) => format!("{} to {}", from, to),
            (DateMode::Before, _, Some(to)) => format!("Before {}", to),
            (DateMode::After, Some(from), _) => format!("After {}", from),
            _ => "All dates".to_string(),
        }
    }
}
