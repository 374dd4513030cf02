//! Wire format of the expense listing

use crate::error::SourceError;
use serde::{Deserialize, Deserializer, Serialize};

/// Field under which paginating backends wrap the record array
pub const RESULTS_FIELD: &str = "results";

/// One expense exactly as the backend sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    pub id: u64,
    /// "YYYY-MM-DD"
    #[serde(alias = "date")]
    pub spent_at: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub item: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payment_method: String,
    #[serde(deserialize_with = "whole_amount")]
    pub amount: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub memo: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

/// Accepts `10000`, `10000.0` and `"10000.00"`; rejects negatives and fractions.
fn whole_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match AmountRepr::deserialize(deserializer)? {
        AmountRepr::Whole(n) => return Ok(n),
        AmountRepr::Fractional(f) => f,
        AmountRepr::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("amount is not a number: {:?}", s)))?,
    };

    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(D::Error::custom(format!(
            "amount must be a non-negative whole number, got {}",
            value
        )));
    }
    Ok(value as u64)
}

/// Decode a listing response: either a bare array of records or an object
/// carrying the array under `results`.
pub fn decode_payload(bytes: &[u8]) -> Result<Vec<WireRecord>, SourceError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;

    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => match map.remove(RESULTS_FIELD) {
            Some(results @ serde_json::Value::Array(_)) => results,
            _ => {
                return Err(SourceError::MalformedPayload {
                    message: format!("object response without a `{}` array", RESULTS_FIELD),
                })
            }
        },
        other => {
            return Err(SourceError::MalformedPayload {
                message: format!("expected an array of records, got {}", json_kind(&other)),
            })
        }
    };

    Ok(serde_json::from_value(array)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
