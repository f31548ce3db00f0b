use std::io::Write;

/// Initialize the logger; `debug` lowers the default filter to `debug`.
/// An explicit log level (flag or `RUST_LOG`) always wins.
pub fn init_logging(debug: bool, log_level: Option<&str>) {
    let filter = if debug { "debug" } else { "info" };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter));
    if let Some(level) = log_level {
        builder.parse_filters(level);
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();
}

/// Log a serializable value as one line of JSON, falling back to `Debug`.
pub fn log_json<T>(label: &str, value: &T)
where
    T: serde::Serialize + std::fmt::Debug,
{
    match serde_json::to_string(value) {
        Ok(json) => log::info!("{label}: {json}"),
        Err(_) => log::info!("{label}: {value:?}"),
    }
}
