use anyhow::{Context, Result};
use colored::Colorize;
use fault_demo::config::{DemoConfig, CONFIG_FILE};
use fault_demo::scenarios::run_demo;
use fault_demo::Report;
use std::io;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_summary(report: &Report) {
    let summary = report.summary();
    if std::env::var("NO_COLOR").is_ok() {
        eprintln!("{summary}");
    } else if report.completed == report.len() {
        eprintln!("{}", summary.green());
    } else {
        eprintln!("{}", summary.yellow());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fault_demo=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = DemoConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("loading {CONFIG_FILE}"))?;
    debug!(?config, "configuration loaded");

    let report = run_demo(&config, &mut io::stdout().lock())?;
    print_summary(&report);

    Ok(())
}
