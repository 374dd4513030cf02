//! Basic types for the core ledger module

use serde::{Deserialize, Serialize};

/// Which date bound is authoritative and whether it is inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// Inclusive `from` and `to`, either may be absent
    Range,
    /// Strictly before `to`
    Before,
    /// Strictly after `from`
    After,
}

impl Default for DateMode {
    fn default() -> Self {
        DateMode::Range
    }
}

impl std::str::FromStr for DateMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "range" | "between" => Ok(DateMode::Range),
            "before" => Ok(DateMode::Before),
            "after" => Ok(DateMode::After),
            _ => Err(format!("Invalid date mode: {}", s)),
        }
    }
}

impl std::fmt::Display for DateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateMode::Range => write!(f, "range"),
            DateMode::Before => write!(f, "before"),
            DateMode::After => write!(f, "after"),
        }
    }
}

/// State of the most recent retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Nothing requested yet
    Idle,
    Loading,
    Ready,
    Error,
}

impl Default for LoadStatus {
    fn default() -> Self {
        LoadStatus::Idle
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "idle"),
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Ready => write!(f, "ready"),
            LoadStatus::Error => write!(f, "error"),
        }
    }
}

/// Kind of chart a payload is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Pie,
    Bar,
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartType::Pie => write!(f, "pie"),
            ChartType::Bar => write!(f, "bar"),
        }
    }
}
