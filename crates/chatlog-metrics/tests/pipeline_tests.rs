//! Integration tests for ingestion and aggregation over on-disk logs

use std::fs;

use chatlog_metrics::{ErrorKind, Language, LogTable, MetricsEngine, NO_ERROR_SENTINEL};
use tempfile::tempdir;

const SAMPLE_LOG: &str = "\
date,user_id,latency,total_tokens,is_flow_successful,error,outputs
2024-02-05 08:12:00,101,0.42,180,True,NONE,Hello! How can I help you today?
2024-02-05 08:45:10,102,1.10,320,False,TIMEOUT,Sorry the request timed out
2024-02-05 13:02:33,101,0.35,150,True,NONE,\"Hola, ¿en qué puedo ayudarte?\"
2024-02-06 13:30:00,103,0.80,410,True,NONE,Here is the summary you asked for
2024-02-06 21:05:45,104,2.05,90,False,RATE_LIMIT,GRACIAS por tu paciencia
2024-02-07 21:59:59,102,0.60,260,True,TIMEOUT,Buenos Días! Retrying now
2024-02-10 02:15:00,105,0.25,75,True,NONE,Goodbye
";

fn write_sample() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("chatbot_logs.csv");
    fs::write(&path, SAMPLE_LOG).expect("write sample log");
    (dir, path)
}

#[test]
fn row_count_matches_data_rows() {
    let (_dir, path) = write_sample();
    let table = LogTable::from_path(&path).expect("load sample");

    assert_eq!(table.row_count(), SAMPLE_LOG.lines().count() - 1);
    assert_eq!(table.distinct_user_count(), 5);
}

#[test]
fn derived_columns_hold_for_every_record() {
    let (_dir, path) = write_sample();
    let table = LogTable::from_path(&path).expect("load sample");

    for record in table.rows() {
        assert_eq!(record.has_error, record.error != NO_ERROR_SENTINEL);
        assert_eq!(record.latency_ms, record.latency_seconds * 1000.0);

        let lowered = record.outputs.to_lowercase();
        let spanish = ["hola", "gracias", "buenos días"]
            .iter()
            .any(|marker| lowered.contains(marker));
        let expected = if spanish {
            Language::Spanish
        } else {
            Language::English
        };
        assert_eq!(record.language, expected, "outputs {:?}", record.outputs);
    }
}

#[test]
fn aggregate_totals_agree_with_row_count() {
    let (_dir, path) = write_sample();
    let table = LogTable::from_path(&path).expect("load sample");
    let total = table.row_count();

    let stats = MetricsEngine::basic_stats(&table);
    assert_eq!(stats.total_interactions, total);
    assert_eq!(
        stats.languages.iter().map(|entry| entry.count).sum::<usize>(),
        total
    );
    assert_eq!(stats.languages[0].language, Language::English);
    assert_eq!(stats.languages[1].language, Language::Spanish);
    assert_eq!(stats.languages[1].count, 3);

    let hourly = MetricsEngine::time_patterns(&table);
    assert_eq!(hourly.iter().map(|hour| hour.interactions).sum::<usize>(), total);
    let hours: Vec<u32> = hourly.iter().map(|hour| hour.hour).collect();
    assert_eq!(hours, vec![2, 8, 13, 21]);

    let errors = MetricsEngine::error_analysis(&table);
    assert_eq!(
        errors.error_counts.iter().map(|entry| entry.count).sum::<usize>(),
        total
    );
    assert_eq!(errors.error_counts[0].error, "NONE");
    assert_eq!(errors.error_counts[0].count, 4);
    assert_eq!(errors.error_counts[1].error, "TIMEOUT");

    let impact = errors.error_impact;
    assert_eq!(
        impact.without_error.interactions + impact.with_error.interactions,
        total
    );

    let bundle = MetricsEngine::visualization_bundle(&table);
    assert_eq!(bundle.latency_distribution.len(), total);
    assert_eq!(bundle.token_usage.len(), total);
    assert_eq!(bundle.hourly_interactions.values().sum::<usize>(), total);
    assert_eq!(
        bundle
            .daily_interactions
            .iter()
            .map(|day| day.interactions)
            .sum::<usize>(),
        total
    );
}

#[test]
fn empty_log_serializes_undefined_means_as_null() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("empty.csv");
    fs::write(
        &path,
        "date,user_id,latency,total_tokens,is_flow_successful,error,outputs\n",
    )
    .expect("write empty log");

    let table = LogTable::from_path(&path).expect("header-only log loads");
    let stats = MetricsEngine::basic_stats(&table);
    let json = serde_json::to_value(&stats).expect("serialize stats");

    assert_eq!(json["total_interactions"], 0);
    assert!(json["success_rate"].is_null());
    assert!(json["avg_latency_ms"].is_null());
    assert!(json["avg_tokens"].is_null());

    let analysis = MetricsEngine::error_analysis(&table);
    assert!(analysis.error_counts.is_empty());
    assert_eq!(analysis.error_impact.with_error.latency_ms_std, None);
}

#[test]
fn hourly_stats_serialize_with_display_field_names() {
    let (_dir, path) = write_sample();
    let table = LogTable::from_path(&path).expect("load sample");
    let hourly = MetricsEngine::time_patterns(&table);
    let json = serde_json::to_value(&hourly).expect("serialize hourly stats");

    let first = &json[0];
    assert_eq!(first["Hour"], 2);
    assert_eq!(first["Interactions"], 1);
    assert_eq!(first["AvgLatencyMs"], 250.0);
    assert_eq!(first["AvgTokens"], 75.0);
    assert_eq!(first["ErrorRate"], 0.0);
}

#[test]
fn invalid_numeric_cell_aborts_ingestion() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.csv");
    fs::write(
        &path,
        "date,user_id,latency,total_tokens,is_flow_successful,error,outputs\n\
         2024-02-05 08:12:00,101,0.42,lots,True,NONE,Hello\n",
    )
    .expect("write broken log");

    let error = LogTable::from_path(&path).expect_err("non-numeric tokens");
    assert_eq!(error.kind(), ErrorKind::TypeCoercion);
    assert!(error.to_string().contains("total_tokens"));
}
