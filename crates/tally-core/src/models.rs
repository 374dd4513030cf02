//! Record model

use serde::{Deserialize, Serialize};
use tally_config::SortKey;
use tally_source::WireRecord;
use std::cmp::Ordering;

/// One expense. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    /// ISO "YYYY-MM-DD"
    pub date: String,
    pub category: String,
    pub sub_category: String,
    pub item: String,
    pub payment_method: String,
    pub amount: u64,
    pub memo: String,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        Self {
            id: wire.id,
            date: wire.spent_at,
            category: wire.category,
            sub_category: wire.sub_category,
            item: wire.item,
            payment_method: wire.payment_method,
            amount: wire.amount,
            memo: wire.memo,
        }
    }
}

impl Record {
    /// Year-month prefix of the date ("2024-01")
    pub fn month(&self) -> &str {
        match self.date.char_indices().nth(7) {
            Some((idx, _)) => &self.date[..idx],
            None => &self.date,
        }
    }

    /// Case-insensitive match against item or memo. `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.item.to_lowercase().contains(needle) || self.memo.to_lowercase().contains(needle)
    }

    /// Natural order on one field: numeric for id and amount, lexicographic otherwise
    pub fn compare_by(&self, other: &Record, key: SortKey) -> Ordering {
        match key {
            SortKey::Id => self.id.cmp(&other.id),
            SortKey::Date => self.date.cmp(&other.date),
            SortKey::Category => self.category.cmp(&other.category),
            SortKey::SubCategory => self.sub_category.cmp(&other.sub_category),
            SortKey::Item => self.item.cmp(&other.item),
            SortKey::PaymentMethod => self.payment_method.cmp(&other.payment_method),
            SortKey::Amount => self.amount.cmp(&other.amount),
            SortKey::Memo => self.memo.cmp(&other.memo),
        }
    }
}
