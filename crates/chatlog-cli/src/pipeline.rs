use std::path::Path;

use anyhow::{Context, Result};
use chatlog_dashboard::{save_dashboard, DashboardConfig};
use chatlog_metrics::{BasicStats, ErrorAnalysis, HourlyStats, LogTable, MetricsEngine};

use crate::logging::log_json;

/// Aggregates produced by one run, returned so callers can inspect them.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub basic_stats: BasicStats,
    pub time_patterns: Vec<HourlyStats>,
    pub error_analysis: ErrorAnalysis,
}

pub fn run_analysis(
    input: &Path,
    output: &Path,
    dashboard: &DashboardConfig,
) -> Result<AnalysisReport> {
    log::info!("Starting chatbot log analysis of {}", input.display());
    let table = LogTable::from_path(input)
        .with_context(|| format!("failed to load interaction log {}", input.display()))?;

    let report = AnalysisReport {
        basic_stats: MetricsEngine::basic_stats(&table),
        time_patterns: MetricsEngine::time_patterns(&table),
        error_analysis: MetricsEngine::error_analysis(&table),
    };
    log_report(&report);

    let bundle = MetricsEngine::visualization_bundle(&table);
    save_dashboard(&bundle, dashboard, output)
        .with_context(|| format!("failed to save dashboard to {}", output.display()))?;
    log::info!("Analysis complete. Dashboard saved to {}", output.display());

    Ok(report)
}

fn log_report(report: &AnalysisReport) {
    let stats = &report.basic_stats;
    log::info!("Basic statistics:");
    log::info!("  total_interactions: {}", stats.total_interactions);
    log::info!("  unique_users: {}", stats.unique_users);
    log::info!("  success_rate: {}", display_optional(stats.success_rate));
    log::info!("  avg_latency_ms: {}", display_optional(stats.avg_latency_ms));
    log::info!("  avg_tokens: {}", display_optional(stats.avg_tokens));
    log_json("  languages", &stats.languages);

    log::info!("Hourly usage patterns:");
    for hour in &report.time_patterns {
        log::info!(
            "  {:02}h interactions={} avg_latency_ms={:.2} avg_tokens={:.2} error_rate={:.2}",
            hour.hour,
            hour.interactions,
            hour.avg_latency_ms,
            hour.avg_tokens,
            hour.error_rate
        );
    }

    log::info!("Error distribution:");
    for entry in &report.error_analysis.error_counts {
        log::info!("  {}: {}", entry.error, entry.count);
    }
    log::info!("Error impact on performance:");
    for row in report.error_analysis.error_impact.rows() {
        log_json(&format!("  has_error={}", row.has_error), row);
    }
}

fn display_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chatlog_dashboard::DashboardConfig;
    use tempfile::tempdir;

    use super::{display_optional, run_analysis};

    const LOG: &str = "\
date,user_id,latency,total_tokens,is_flow_successful,error,outputs
2024-01-15 10:00:00,1,0.1,10,true,NONE,hello
2024-01-15 10:30:00,2,0.2,20,false,TIMEOUT,hola amigo
2024-01-15 11:00:00,3,0.3,30,true,NONE,bye
";

    #[test]
    fn run_analysis_writes_dashboard_and_returns_aggregates() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("chatbot_logs.csv");
        let output = dir.path().join("output").join("dashboard.svg");
        fs::write(&input, LOG).expect("write log");

        let report =
            run_analysis(&input, &output, &DashboardConfig::default()).expect("analysis runs");

        assert!(output.exists());
        assert_eq!(report.basic_stats.total_interactions, 3);
        assert_eq!(report.basic_stats.success_rate, Some(66.67));
        assert_eq!(report.time_patterns.len(), 2);
        assert_eq!(report.error_analysis.error_counts[0].error, "NONE");
    }

    #[test]
    fn run_analysis_handles_header_only_log() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("empty.csv");
        let output = dir.path().join("empty.svg");
        fs::write(&input, LOG.lines().next().expect("header")).expect("write log");

        let report =
            run_analysis(&input, &output, &DashboardConfig::default()).expect("empty log runs");

        assert_eq!(report.basic_stats.total_interactions, 0);
        assert_eq!(report.basic_stats.avg_latency_ms, None);
        assert!(output.exists());
    }

    #[test]
    fn run_analysis_reports_missing_input_with_context() {
        let dir = tempdir().expect("temp dir");
        let error = run_analysis(
            &dir.path().join("absent.csv"),
            &dir.path().join("out.svg"),
            &DashboardConfig::default(),
        )
        .expect_err("missing input");

        assert!(format!("{error:#}").contains("failed to load interaction log"));
        assert!(!dir.path().join("out.svg").exists());
    }

    #[test]
    fn display_optional_marks_undefined_values() {
        assert_eq!(display_optional(None), "undefined");
        assert_eq!(display_optional(Some(66.67)), "66.67");
    }
}
