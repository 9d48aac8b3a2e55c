#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI printing the unread count of every configured IMAP account

use clap::Parser;
use mail_unread_checker::{AccountCheckOrchestrator, AccountConfig, CheckResult, Report};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "unread-cli")]
#[command(about = "Show unread message counts for one or more IMAP accounts")]
struct Args {
    /// JSON file listing the accounts to check. Without it, a single
    /// account is read from the IMAP_* environment variables.
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Check all accounts at the same time
    #[arg(long)]
    parallel: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ReportLine<'a> {
    account: &'a str,
    unread: Option<usize>,
    error: Option<String>,
}

impl<'a> From<&'a CheckResult> for ReportLine<'a> {
    fn from(result: &'a CheckResult) -> Self {
        Self {
            account: &result.account,
            unread: result.unread(),
            error: result.error().map(ToString::to_string),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let configs = match &args.accounts {
        Some(path) => mail_unread_checker::load_accounts(path)?,
        None => vec![AccountConfig::from_env()?],
    };

    let mut orchestrator =
        AccountCheckOrchestrator::from_configs(configs).disconnect_after_check(true);

    let report = if args.parallel {
        orchestrator.check_all_concurrent().await
    } else {
        orchestrator.check_all().await
    };

    if args.json {
        let lines: Vec<ReportLine<'_>> = report.iter().map(ReportLine::from).collect();
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    if report.is_empty() {
        println!("No accounts configured.");
        return;
    }

    for result in report {
        match &result.outcome {
            Ok(count) => println!("{}: {count} unread", result.account),
            Err(e) => println!("{}: error: {e}", result.account),
        }
    }

    println!(
        "\n{} unread across {} account(s), {} failed",
        report.total_unread(),
        report.len(),
        report.failures()
    );
}
