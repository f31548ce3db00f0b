use crate::aggregator::{group_by, round2, value_counts, RunningStats};
use crate::table::LogTable;
use crate::types::{
    weekday_name, BasicStats, ErrorAnalysis, ErrorCount, ErrorImpact, ErrorImpactRow,
    HourlyStats, InteractionRecord, LanguageCount, TokenPoint, VisualizationBundle, WeekdayCount,
};

/// Read-only queries over a [`LogTable`]. Every method is independent and
/// returns the same value when called twice on the same table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

#[derive(Debug, Default)]
struct HourAccumulator {
    latency_ms: RunningStats,
    total_tokens: RunningStats,
    errors: RunningStats,
}

#[derive(Debug, Default)]
struct ImpactAccumulator {
    latency_ms: RunningStats,
    total_tokens: RunningStats,
}

impl ImpactAccumulator {
    fn into_row(self, has_error: bool) -> ErrorImpactRow {
        ErrorImpactRow {
            has_error,
            interactions: self.latency_ms.count(),
            latency_ms_mean: self.latency_ms.mean().map(round2),
            latency_ms_std: self.latency_ms.sample_std().map(round2),
            total_tokens_mean: self.total_tokens.mean().map(round2),
            total_tokens_std: self.total_tokens.sample_std().map(round2),
        }
    }
}

impl MetricsEngine {
    pub fn basic_stats(table: &LogTable) -> BasicStats {
        let rows = table.rows();

        let success: RunningStats = rows
            .iter()
            .map(|record| bool_as_f64(record.is_flow_successful))
            .collect();
        let latency: RunningStats = rows.iter().map(|record| record.latency_ms).collect();
        let tokens: RunningStats = rows
            .iter()
            .map(|record| record.total_tokens as f64)
            .collect();

        BasicStats {
            total_interactions: table.row_count(),
            unique_users: table.distinct_user_count(),
            success_rate: success.mean().map(|rate| round2(rate * 100.0)),
            avg_latency_ms: latency.mean().map(round2),
            avg_tokens: tokens.mean().map(round2),
            languages: language_counts(rows),
        }
    }

    pub fn time_patterns(table: &LogTable) -> Vec<HourlyStats> {
        let hours = group_by(
            table.rows(),
            |record| record.hour,
            |acc: &mut HourAccumulator, record| {
                acc.latency_ms.push(record.latency_ms);
                acc.total_tokens.push(record.total_tokens as f64);
                acc.errors.push(bool_as_f64(record.has_error));
            },
        );

        // Groups only exist for observed hours, so every mean is defined.
        hours
            .into_iter()
            .map(|(hour, acc)| HourlyStats {
                hour,
                interactions: acc.latency_ms.count(),
                avg_latency_ms: round2(acc.latency_ms.mean().unwrap_or_default()),
                avg_tokens: round2(acc.total_tokens.mean().unwrap_or_default()),
                error_rate: round2(acc.errors.mean().unwrap_or_default()),
            })
            .collect()
    }

    pub fn error_analysis(table: &LogTable) -> ErrorAnalysis {
        let error_counts = value_counts(table.rows(), |record| record.error.clone())
            .into_iter()
            .map(|(error, count)| ErrorCount { error, count })
            .collect();

        let mut impact = group_by(
            table.rows(),
            |record| record.has_error,
            |acc: &mut ImpactAccumulator, record| {
                acc.latency_ms.push(record.latency_ms);
                acc.total_tokens.push(record.total_tokens as f64);
            },
        );

        let without_error = impact.remove(&false).unwrap_or_default().into_row(false);
        let with_error = impact.remove(&true).unwrap_or_default().into_row(true);

        ErrorAnalysis {
            error_counts,
            error_impact: ErrorImpact {
                without_error,
                with_error,
            },
        }
    }

    pub fn visualization_bundle(table: &LogTable) -> VisualizationBundle {
        let rows = table.rows();

        let hourly_interactions = group_by(
            rows,
            |record| record.hour,
            |count: &mut usize, _| *count += 1,
        );

        let daily_interactions = group_by(
            rows,
            |record| record.day_of_week.num_days_from_monday(),
            |acc: &mut Option<WeekdayCount>, record| {
                acc.get_or_insert_with(|| WeekdayCount {
                    day: weekday_name(record.day_of_week).to_string(),
                    interactions: 0,
                })
                .interactions += 1;
            },
        )
        .into_values()
        .flatten()
        .collect();

        VisualizationBundle {
            hourly_interactions,
            latency_distribution: rows.iter().map(|record| record.latency_ms).collect(),
            language_distribution: language_counts(rows),
            token_usage: rows
                .iter()
                .map(|record| TokenPoint {
                    timestamp: record.timestamp,
                    total_tokens: record.total_tokens,
                })
                .collect(),
            daily_interactions,
        }
    }
}

fn language_counts(rows: &[InteractionRecord]) -> Vec<LanguageCount> {
    value_counts(rows, |record| record.language)
        .into_iter()
        .map(|(language, count)| LanguageCount { language, count })
        .collect()
}

fn bool_as_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
