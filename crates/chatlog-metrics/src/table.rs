use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{InteractionRecord, RawInteraction};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "user_id",
    "latency",
    "total_tokens",
    "is_flow_successful",
    "error",
    "outputs",
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Immutable, fully derived snapshot of an interaction log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTable {
    records: Vec<InteractionRecord>,
}

impl LogTable {
    pub fn from_path(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AnalysisError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_reader(file)?;
        log::debug!(
            "Loaded {} interaction records from {}",
            table.row_count(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> AnalysisResult<Self> {
        let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns = ColumnIndex::resolve(csv_reader.headers()?)?;

        let mut raw_rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            raw_rows.push(columns.coerce(&record, index + 1)?);
        }

        Ok(Self::from_records(raw_rows))
    }

    pub fn from_records(rows: impl IntoIterator<Item = RawInteraction>) -> Self {
        let records: Vec<InteractionRecord> =
            rows.into_iter().map(InteractionRecord::new).collect();

        if records.is_empty() {
            log::warn!("Interaction log is empty; averages will be reported as undefined");
        }

        Self { records }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn distinct_user_count(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.user_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn rows(&self) -> &[InteractionRecord] {
        &self.records
    }
}

struct ColumnIndex {
    date: usize,
    user_id: usize,
    latency: usize,
    total_tokens: usize,
    is_flow_successful: usize,
    error: usize,
    outputs: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> AnalysisResult<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or(AnalysisError::MissingColumn(name))
        };

        Ok(Self {
            date: find("date")?,
            user_id: find("user_id")?,
            latency: find("latency")?,
            total_tokens: find("total_tokens")?,
            is_flow_successful: find("is_flow_successful")?,
            error: find("error")?,
            outputs: find("outputs")?,
        })
    }

    fn coerce(&self, record: &StringRecord, row: usize) -> AnalysisResult<RawInteraction> {
        let cell = move |index: usize| record.get(index).unwrap_or_default();

        let date = cell(self.date);
        let timestamp = parse_timestamp(date)
            .ok_or_else(|| AnalysisError::coercion(row, "date", date, "a date-time"))?;

        let latency = cell(self.latency);
        let latency_seconds = parse_latency(latency).ok_or_else(|| {
            AnalysisError::coercion(row, "latency", latency, "a non-negative number of seconds")
        })?;

        let tokens = cell(self.total_tokens);
        let total_tokens = parse_token_count(tokens).ok_or_else(|| {
            AnalysisError::coercion(row, "total_tokens", tokens, "a non-negative integer")
        })?;

        let success = cell(self.is_flow_successful);
        let is_flow_successful = parse_bool(success).ok_or_else(|| {
            AnalysisError::coercion(row, "is_flow_successful", success, "a boolean")
        })?;

        let user = cell(self.user_id).trim();
        if user.is_empty() {
            return Err(AnalysisError::coercion(
                row,
                "user_id",
                user,
                "a non-empty identifier",
            ));
        }

        Ok(RawInteraction {
            timestamp,
            user_id: user.to_string(),
            latency_seconds,
            total_tokens,
            is_flow_successful,
            error: cell(self.error).to_string(),
            outputs: cell(self.outputs).to_string(),
        })
    }
}

/// Offsets in RFC 3339 input are kept as wall-clock time, so `hour` is the
/// hour written in the log rather than a UTC conversion.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_latency(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

fn parse_token_count(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(count) = value.parse::<u64>() {
        return Some(count);
    }

    // Integral floats such as "12.0" show up when the column was round-tripped
    // through a spreadsheet.
    value
        .parse::<f64>()
        .ok()
        .filter(|count| count.is_finite() && *count >= 0.0 && count.fract() == 0.0)
        .filter(|count| *count <= u64::MAX as f64)
        .map(|count| count as u64)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
