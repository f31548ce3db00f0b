use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chatlog_dashboard::DashboardConfig;
use clap::Parser;

mod logging;
mod pipeline;

use logging::init_logging;
use pipeline::run_analysis;

#[derive(Parser, Debug, Clone)]
#[command(name = "chatlog-cli")]
#[command(about = "Summarize a chatbot interaction log and render a dashboard")]
#[command(version)]
struct Cli {
    /// CSV log with date, user_id, latency, total_tokens, is_flow_successful, error, outputs
    #[arg(long, short, env = "CHATLOG_INPUT", default_value = "chatbot_logs.csv")]
    input: PathBuf,

    /// Dashboard image path
    #[arg(
        long,
        short,
        env = "CHATLOG_OUTPUT",
        default_value = "output/chatbot_analysis_dashboard.svg"
    )]
    output: PathBuf,

    /// TOML file with dashboard styling
    #[arg(long, env = "CHATLOG_DASHBOARD_CONFIG")]
    dashboard_config: Option<PathBuf>,

    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_level.as_deref());

    if cli.debug {
        log::debug!("Debug mode enabled");
        log::debug!("  Input: {}", cli.input.display());
        log::debug!("  Output: {}", cli.output.display());
        log::debug!("  Dashboard config: {:?}", cli.dashboard_config);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("An error occurred during analysis: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let dashboard = DashboardConfig::load(cli.dashboard_config.as_deref())
        .context("failed to load dashboard config")?;

    run_analysis(&cli.input, &cli.output, &dashboard)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn cli_defaults_match_conventional_paths() {
        let cli = Cli::try_parse_from(["chatlog-cli"]).expect("defaults parse");
        // CHATLOG_* variables are not expected in the test environment
        if std::env::var_os("CHATLOG_INPUT").is_none() {
            assert_eq!(cli.input.to_str(), Some("chatbot_logs.csv"));
        }
        if std::env::var_os("CHATLOG_OUTPUT").is_none() {
            assert_eq!(
                cli.output.to_str(),
                Some("output/chatbot_analysis_dashboard.svg")
            );
        }
    }

    #[test]
    fn cli_accepts_explicit_paths() {
        let cli = Cli::try_parse_from([
            "chatlog-cli",
            "--input",
            "logs/today.csv",
            "-o",
            "out/today.svg",
            "--dashboard-config",
            "theme.toml",
        ])
        .expect("explicit args parse");

        assert_eq!(cli.input.to_str(), Some("logs/today.csv"));
        assert_eq!(cli.output.to_str(), Some("out/today.svg"));
        assert_eq!(
            cli.dashboard_config.as_deref().and_then(|path| path.to_str()),
            Some("theme.toml")
        );
    }
}
