//! Aggregates over the filtered subset and the chart payloads built from them

use crate::models::Record;
use crate::types::ChartType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tally_config::{ChartConfig, CurrencyConfig, SymbolPosition};
use tally_utils::{format_compact, format_currency};

// ==================== Aggregates ====================

/// Category breakdown for charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: u64,
    pub count: usize,
    /// Share of the unfiltered grand total
    pub percentage: f64,
}

/// Per-category sums, largest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub entries: Vec<CategoryShare>,
    pub filtered_total: u64,
    pub grand_total: u64,
    /// Filtered total as a share of the grand total
    pub filtered_percentage: f64,
}

/// Monthly summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    /// "YYYY-MM"
    pub month: String,
    /// "YY-MM"
    pub label: String,
    pub total: u64,
    pub count: usize,
    /// Total relative to the largest month, 0..=1
    pub peak_ratio: f64,
}

/// Summary cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Filtered record count
    pub count: usize,
    /// Full record count
    pub total_count: usize,
    pub total: u64,
    pub grand_total: u64,
    /// Per record, rounded to the nearest unit
    pub average: u64,
    pub percentage_of_total: f64,
    pub month_count: usize,
    /// Per distinct month, rounded to the nearest unit
    pub monthly_average: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub categories: CategoryAggregate,
    pub months: Vec<MonthTotal>,
    pub summary: SummaryStats,
}

fn sum_amounts(records: &[Arc<Record>]) -> u64 {
    records
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.amount))
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Integer division rounding halves up
fn rounded_div(total: u64, n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let (total, n) = (total as u128, n as u128);
    ((2 * total + n) / (2 * n)) as u64
}

/// Category sums in first-seen order, then stably ordered by total descending
fn category_shares(filtered: &[Arc<Record>], grand_total: u64) -> Vec<CategoryShare> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut shares: Vec<CategoryShare> = Vec::new();

    for record in filtered {
        let slot = *index.entry(record.category.as_str()).or_insert_with(|| {
            shares.push(CategoryShare {
                category: record.category.clone(),
                total: 0,
                count: 0,
                percentage: 0.0,
            });
            shares.len() - 1
        });
        let share = &mut shares[slot];
        share.total = share.total.saturating_add(record.amount);
        share.count += 1;
    }

    for share in &mut shares {
        share.percentage = percent(share.total, grand_total);
    }
    shares.sort_by(|a, b| b.total.cmp(&a.total));
    shares
}

/// Month sums in chronological order
fn month_totals(filtered: &[Arc<Record>]) -> Vec<MonthTotal> {
    let mut months: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for record in filtered {
        let entry = months.entry(record.month()).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(record.amount);
        entry.1 += 1;
    }

    let peak = months.values().map(|(total, _)| *total).max().unwrap_or(0);
    months
        .into_iter()
        .map(|(month, (total, count))| MonthTotal {
            month: month.to_string(),
            label: month.chars().skip(2).collect(),
            total,
            count,
            peak_ratio: if peak == 0 { 0.0 } else { total as f64 / peak as f64 },
        })
        .collect()
}

/// Aggregate the filtered subset against the full set's grand total
pub fn derive_aggregates(all: &[Arc<Record>], filtered: &[Arc<Record>]) -> Aggregates {
    let grand_total = sum_amounts(all);
    let total = sum_amounts(filtered);
    let months = month_totals(filtered);

    let summary = SummaryStats {
        count: filtered.len(),
        total_count: all.len(),
        total,
        grand_total,
        average: rounded_div(total, filtered.len() as u64),
        percentage_of_total: percent(total, grand_total),
        month_count: months.len(),
        monthly_average: rounded_div(total, months.len() as u64),
    };

    Aggregates {
        categories: CategoryAggregate {
            entries: category_shares(filtered, grand_total),
            filtered_total: total,
            grand_total,
            filtered_percentage: percent(total, grand_total),
        },
        months,
        summary,
    }
}

// ==================== Chart Payloads ====================

/// Chart data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Bar intensity, 0..=1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// Full amount with currency ("15,000원")
    pub formatted: String,
    /// Axis label ("15K")
    pub compact: String,
}

/// Chart data for visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub chart_type: ChartType,
    pub title: String,
    pub points: Vec<ChartDataPoint>,
    /// Leading points listed under the chart
    pub highlights: Vec<ChartDataPoint>,
    pub total: u64,
    pub formatted_total: String,
    /// Filtered total as a share of everything loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_of_total: Option<f64>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Full amount with the configured currency symbol
pub fn format_money(amount: u64, currency: &CurrencyConfig) -> String {
    format_currency(
        amount,
        &currency.symbol,
        currency.symbol_position == SymbolPosition::Before,
    )
}

/// Pie chart of category totals, colored by rank
pub fn category_chart(
    categories: &CategoryAggregate,
    charts: &ChartConfig,
    currency: &CurrencyConfig,
) -> ChartData {
    let points: Vec<ChartDataPoint> = categories
        .entries
        .iter()
        .enumerate()
        .map(|(rank, share)| ChartDataPoint {
            label: share.category.clone(),
            value: share.total,
            percentage: Some(share.percentage),
            color: charts.color(rank).map(str::to_string),
            intensity: None,
            formatted: format_money(share.total, currency),
            compact: format_compact(share.total),
        })
        .collect();

    ChartData {
        chart_type: ChartType::Pie,
        title: "Spending by category".to_string(),
        highlights: points.iter().take(charts.top_items_count).cloned().collect(),
        points,
        total: categories.filtered_total,
        formatted_total: format_money(categories.filtered_total, currency),
        share_of_total: Some(categories.filtered_percentage),
    }
}

/// Bar chart of month totals in chronological order
pub fn monthly_chart(
    months: &[MonthTotal],
    charts: &ChartConfig,
    currency: &CurrencyConfig,
) -> ChartData {
    let color = charts.color(0).map(str::to_string);
    let total = months
        .iter()
        .fold(0u64, |acc, m| acc.saturating_add(m.total));

    let points = months
        .iter()
        .map(|m| ChartDataPoint {
            label: m.label.clone(),
            value: m.total,
            percentage: None,
            color: color.clone(),
            intensity: Some(m.peak_ratio),
            formatted: format_money(m.total, currency),
            compact: format_compact(m.total),
        })
        .collect();

    ChartData {
        chart_type: ChartType::Bar,
        title: "Spending by month".to_string(),
        points,
        highlights: Vec::new(),
        total,
        formatted_total: format_money(total, currency),
        share_of_total: None,
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
            sub_category: String::new(),
            item: String::new(),
            payment_method: "Card".to_string(),
            amount,
            memo: String::new(),
        })
    }

    fn worked_example() -> Vec<Arc<Record>> {
        vec![
            record(1, "2024-01-05", "Food", 10000),
            record(2, "2024-02-10", "Food", 5000),
            record(3, "2024-02-15", "Transport", 3000),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_unfiltered_aggregates() {
        let all = worked_example();
        let agg = derive_aggregates(&all, &all);

        assert_eq!(agg.summary.total, 18000);
        assert_eq!(agg.summary.average, 6000);
        assert_eq!(agg.summary.month_count, 2);
        assert_eq!(agg.summary.monthly_average, 9000);
        assert!(close(agg.summary.percentage_of_total, 100.0));

        let entries = &agg.categories.entries;
        assert_eq!(entries[0].category, "Food");
        assert_eq!(entries[0].total, 15000);
        assert_eq!(entries[0].count, 2);
        assert!(close(entries[0].percentage, 83.3));
        assert_eq!(entries[1].category, "Transport");
        assert!(close(entries[1].percentage, 16.7));

        let sum: f64 = entries.iter().map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_filtered_shares_use_grand_total() {
        let all = worked_example();
        let filtered: Vec<_> = all.iter().filter(|r| r.date.as_str() >= "2024-02-01").cloned().collect();
        let agg = derive_aggregates(&all, &filtered);

        assert_eq!(agg.summary.count, 2);
        assert_eq!(agg.summary.total, 8000);
        assert!(close(agg.categories.entries[0].percentage, 27.8));
        assert!(close(agg.categories.entries[1].percentage, 16.7));
        assert!(close(agg.categories.filtered_percentage, 44.4));

        let sum: f64 = agg.categories.entries.iter().map(|e| e.percentage).sum();
        assert!(sum <= 100.0);
    }

    #[test]
    fn test_empty_aggregates_are_zero() {
        let agg = derive_aggregates(&[], &[]);
        assert_eq!(agg.summary, SummaryStats::default());
        assert!(agg.categories.entries.is_empty());
        assert!(agg.months.is_empty());
        assert_eq!(agg.categories.filtered_percentage, 0.0);

        let all = vec![record(1, "2024-01-01", "Gift", 0)];
        let agg = derive_aggregates(&all, &all);
        assert_eq!(agg.summary.percentage_of_total, 0.0);
        assert_eq!(agg.months[0].peak_ratio, 0.0);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let all = vec![
            record(1, "2024-01-01", "Food", 1),
            record(2, "2024-01-02", "Food", 2),
        ];
        assert_eq!(derive_aggregates(&all, &all).summary.average, 2);
    }

    #[test]
    fn test_category_ties_keep_first_seen_order() {
        let all = vec![
            record(1, "2024-01-01", "Books", 100),
            record(2, "2024-01-02", "Art", 100),
            record(3, "2024-01-03", "Food", 300),
        ];
        let agg = derive_aggregates(&all, &all);
        let order: Vec<_> = agg.categories.entries.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(order, vec!["Food", "Books", "Art"]);
    }

    #[test]
    fn test_month_totals_ordered_with_labels() {
        let all = vec![
            record(1, "2024-03-01", "Food", 500),
            record(2, "2023-12-24", "Food", 2000),
            record(3, "2024-03-09", "Food", 500),
        ];
        let agg = derive_aggregates(&all, &all);
        let months: Vec<_> = agg.months.iter().map(|m| (m.month.as_str(), m.label.as_str(), m.total)).collect();
        assert_eq!(months, vec![("2023-12", "23-12", 2000), ("2024-03", "24-03", 1000)]);
        assert_eq!(agg.months[0].peak_ratio, 1.0);
        assert_eq!(agg.months[1].peak_ratio, 0.5);
    }

    #[test]
    fn test_category_chart_payload() {
        let all = worked_example();
        let agg = derive_aggregates(&all, &all);
        let charts = ChartConfig {
            top_items_count: 1,
            ..ChartConfig::default()
        };
        let chart = category_chart(&agg.categories, &charts, &CurrencyConfig::default());

        assert_eq!(chart.chart_type, ChartType::Pie);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.highlights.len(), 1);
        assert_eq!(chart.points[0].color.as_deref(), Some("#c9a96e"));
        assert_eq!(chart.points[1].color.as_deref(), Some("#7eb8b0"));
        assert_eq!(chart.points[0].formatted, "15,000원");
        assert_eq!(chart.points[0].compact, "15K");
        assert_eq!(chart.formatted_total, "18,000원");
    }

    #[test]
    fn test_monthly_chart_payload() {
        let all = worked_example();
        let agg = derive_aggregates(&all, &all);
        let currency = CurrencyConfig {
            symbol: "$".to_string(),
            symbol_position: SymbolPosition::Before,
        };
        let chart = monthly_chart(&agg.months, &ChartConfig::default(), &currency);

        assert_eq!(chart.chart_type, ChartType::Bar);
        let labels: Vec<_> = chart.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["24-01", "24-02"]);
        assert_eq!(chart.points[0].intensity, Some(1.0));
        assert_eq!(chart.points[1].intensity, Some(0.8));
        assert_eq!(chart.formatted_total, "$18,000");
        assert!(chart.highlights.is_empty());
    }
}
