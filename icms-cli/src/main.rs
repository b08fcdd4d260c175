use anyhow::Context;
use clap::Parser;
use tracing::debug;

use icms_cli::app;
use icms_cli::cli::Cli;
use icms_cli::config::AppConfig;
use icms_cli::logging::{init_logging, set_log_level};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging starts before the config is read so config problems are visible.
    init_logging(cli.log_level.as_deref().unwrap_or("info"));

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    match &cli.log_level {
        Some(level) => set_log_level(level)?,
        None if std::env::var_os("RUST_LOG").is_none() => set_log_level(&config.log_level)?,
        None => {}
    }
    debug!(?config, "configuration loaded");

    let table = config.rate_table()?;
    let report = app::run(&cli, &table)?;
    print!("{report}");

    Ok(())
}
