mod cli;

use std::io::{Read, Write};

use anyhow::Context;
use calforge_core::config::load_config;
use calforge_service::calendar::CalendarEngine;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let input = read_input(&cli)?;
    let value: serde_json::Value =
        serde_json::from_str(&input).context("Input is not valid JSON")?;

    let engine = CalendarEngine::new(
        cli.local_timezone(&config.calendar),
        cli.emit_options(&config.calendar),
    );
    let report = engine.generate(&value)?;

    match cli.output_path() {
        Some(path) => {
            std::fs::write(path, report.document.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                emitted = report.emitted,
                skipped = report.skipped.len(),
                "ICS file saved"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.document.as_bytes())?;
            stdout.flush()?;
            tracing::info!(
                emitted = report.emitted,
                skipped = report.skipped.len(),
                "ICS written to stdout"
            );
        }
    }

    Ok(())
}

fn read_input(cli: &Cli) -> anyhow::Result<String> {
    match cli.input_path() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read standard input")?;
            Ok(input)
        }
    }
}
