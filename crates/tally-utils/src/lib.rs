//! Utility functions and helpers

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Short axis label: `1.2M`, `15K`, or the plain number below a thousand
pub fn format_compact(amount: u64) -> String {
    if amount >= 1_000_000 {
        format!("{:.1}M", amount as f64 / 1_000_000.0)
    } else if amount >= 1_000 {
        format!("{:.0}K", amount as f64 / 1_000.0)
    } else {
        amount.to_string()
    }
}

/// Full amount with separators and a currency symbol on either side
pub fn format_currency(amount: u64, symbol: &str, symbol_before: bool) -> String {
    if symbol_before {
        format!("{}{}", symbol, format_number(amount))
    } else {
        format!("{}{}", format_number(amount), symbol)
    }
}
