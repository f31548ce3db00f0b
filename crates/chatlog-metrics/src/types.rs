use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Value of the `error` column meaning that the turn completed cleanly.
pub const NO_ERROR_SENTINEL: &str = "NONE";

const SPANISH_MARKERS: [&str; 3] = ["hola", "gracias", "buenos días"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
        }
    }

    /// Keyword heuristic over the assistant response, not a classifier.
    pub fn detect(outputs: &str) -> Self {
        let lowered = outputs.to_lowercase();
        if SPANISH_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            Self::Spanish
        } else {
            Self::English
        }
    }
}

/// Source columns of one logged turn, already coerced to their types.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInteraction {
    pub timestamp: NaiveDateTime,
    pub user_id: String,
    pub latency_seconds: f64,
    pub total_tokens: u64,
    pub is_flow_successful: bool,
    pub error: String,
    pub outputs: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionRecord {
    pub timestamp: NaiveDateTime,
    pub user_id: String,
    pub latency_seconds: f64,
    pub total_tokens: u64,
    pub is_flow_successful: bool,
    pub error: String,
    pub outputs: String,
    pub hour: u32,
    pub day_of_week: Weekday,
    pub latency_ms: f64,
    pub has_error: bool,
    pub language: Language,
}

impl InteractionRecord {
    pub fn new(raw: RawInteraction) -> Self {
        let hour = raw.timestamp.hour();
        let day_of_week = raw.timestamp.weekday();
        let latency_ms = raw.latency_seconds * 1000.0;
        let has_error = raw.error != NO_ERROR_SENTINEL;
        let language = Language::detect(&raw.outputs);

        Self {
            timestamp: raw.timestamp,
            user_id: raw.user_id,
            latency_seconds: raw.latency_seconds,
            total_tokens: raw.total_tokens,
            is_flow_successful: raw.is_flow_successful,
            error: raw.error,
            outputs: raw.outputs,
            hour,
            day_of_week,
            latency_ms,
            has_error,
            language,
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LanguageCount {
    pub language: Language,
    pub count: usize,
}

/// Undefined means (empty table) are reported as `None`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BasicStats {
    pub total_interactions: usize,
    pub unique_users: usize,
    pub success_rate: Option<f64>,
    pub avg_latency_ms: Option<f64>,
    pub avg_tokens: Option<f64>,
    /// Ordered by descending count.
    pub languages: Vec<LanguageCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HourlyStats {
    pub hour: u32,
    pub interactions: usize,
    pub avg_latency_ms: f64,
    pub avg_tokens: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorCount {
    pub error: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorImpactRow {
    pub has_error: bool,
    pub interactions: usize,
    pub latency_ms_mean: Option<f64>,
    pub latency_ms_std: Option<f64>,
    pub total_tokens_mean: Option<f64>,
    pub total_tokens_std: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorImpact {
    pub without_error: ErrorImpactRow,
    pub with_error: ErrorImpactRow,
}

impl ErrorImpact {
    pub fn rows(&self) -> [&ErrorImpactRow; 2] {
        [&self.without_error, &self.with_error]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorAnalysis {
    pub error_counts: Vec<ErrorCount>,
    pub error_impact: ErrorImpact,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TokenPoint {
    pub timestamp: NaiveDateTime,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeekdayCount {
    pub day: String,
    pub interactions: usize,
}

/// Everything the dashboard draws; nothing in here points back at the table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisualizationBundle {
    pub hourly_interactions: BTreeMap<u32, usize>,
    pub latency_distribution: Vec<f64>,
    pub language_distribution: Vec<LanguageCount>,
    pub token_usage: Vec<TokenPoint>,
    pub daily_interactions: Vec<WeekdayCount>,
}
