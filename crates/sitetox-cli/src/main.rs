//! sitetox - automated bid grading
//!
//! The `sitetox` command grades pending remediation bids in the shared
//! spreadsheet and rebuilds the team leaderboard.
//!
//! ## Commands
//!
//! - `run`: evaluate pending bids, pick winners, rebuild the leaderboard
//!   (default when no command is given)
//! - `leaderboard`: rebuild the leaderboard only
//! - `cases`: list the case sites bids are judged against
//!
//! Configuration comes from the environment, optionally via a `.env` file.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitetox_core::{
    init_tracing, CaseCatalog, EvaluationPipeline, GroupDisposition, LeaderboardAggregator,
    LeaderboardEntry, RunReport,
};
use sitetox_reasoning::{GeminiClient, ReasoningService};
use sitetox_state::{BidTable, SheetsHandle, Worksheet};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sitetox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Grade bioremediation bids and maintain the leaderboard", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines and a JSON run report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Evaluate pending bids, select winners and rebuild the leaderboard
    Run,

    /// Rebuild the leaderboard from the bid worksheet without grading
    Leaderboard,

    /// List the active case catalog
    Cases,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let catalog = load_catalog()?;
            let reasoning =
                GeminiClient::from_env().context("Failed to configure the Gemini client")?;
            info!(model = %reasoning.model(), "Reasoning service configured");
            let sheets = SheetsHandle::setup_from_env()
                .await
                .context("Failed to connect to Google Sheets")?;

            let report = cmd_run(
                catalog,
                Arc::new(reasoning),
                Arc::new(sheets.bids()),
                Arc::new(sheets.leaderboard()),
            )
            .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_summary(&report));
            }
            Ok(())
        }
        Commands::Leaderboard => {
            let sheets = SheetsHandle::setup_from_env()
                .await
                .context("Failed to connect to Google Sheets")?;
            let entries =
                cmd_leaderboard(Arc::new(sheets.bids()), Arc::new(sheets.leaderboard())).await?;
            match entries {
                Some(entries) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&entries)?)
                }
                Some(entries) => print!("{}", render_leaderboard(&entries)),
                None => println!("No bid data found; leaderboard left unchanged."),
            }
            Ok(())
        }
        Commands::Cases => {
            print!("{}", render_cases(&load_catalog()?));
            Ok(())
        }
    }
}

fn load_catalog() -> Result<CaseCatalog> {
    CaseCatalog::from_env_or_builtin().context("Failed to load case catalog")
}

async fn cmd_run(
    catalog: CaseCatalog,
    reasoning: Arc<dyn ReasoningService>,
    bids: Arc<dyn Worksheet>,
    leaderboard: Arc<dyn Worksheet>,
) -> Result<RunReport> {
    info!("Starting bid evaluation run");
    let pipeline = EvaluationPipeline::new(catalog, reasoning, bids, leaderboard);
    pipeline
        .run()
        .await
        .context("Failed to read pending bids")
}

async fn cmd_leaderboard(
    bids: Arc<dyn Worksheet>,
    leaderboard: Arc<dyn Worksheet>,
) -> Result<Option<Vec<LeaderboardEntry>>> {
    LeaderboardAggregator::new(BidTable::new(bids), leaderboard)
        .rebuild()
        .await
        .context("Failed to rebuild leaderboard")
}

fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    if report.pending == 0 {
        out.push_str("No pending bids to process.\n");
    } else {
        out.push_str(&format!("Found {} pending bids.\n", report.pending));
    }

    for group in &report.groups {
        match &group.disposition {
            GroupDisposition::Skipped => out.push_str(&format!(
                "  {}: skipped {} bid(s), case details missing\n",
                group.case_id,
                group.rows.len()
            )),
            GroupDisposition::Judged {
                evaluations,
                candidates,
                winner,
            } => {
                let verdict = match winner {
                    Some(row) => format!("winner row {row}"),
                    None => "no winner".to_string(),
                };
                out.push_str(&format!(
                    "  {}: {} evaluated, {} candidate(s), {}\n",
                    group.case_id,
                    evaluations.len(),
                    candidates,
                    verdict
                ));
            }
        }
        if !group.failed_writes.is_empty() {
            let rows: Vec<String> = group.failed_writes.iter().map(|r| r.to_string()).collect();
            out.push_str(&format!("    failed writes: rows {}\n", rows.join(", ")));
        }
    }

    match (&report.leaderboard, &report.leaderboard_error) {
        (Some(entries), _) => out.push_str(&render_leaderboard(entries)),
        (None, Some(error)) => out.push_str(&format!("Leaderboard not updated: {error}\n")),
        (None, None) => out.push_str("No bid data found; leaderboard left unchanged.\n"),
    }
    out.push_str(&format!(
        "Run {} finished in {} ms.\n",
        report.run_id,
        report.duration_ms()
    ));
    out
}

fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let width = entries
        .iter()
        .map(|e| e.team_name.len())
        .max()
        .unwrap_or(0)
        .max("Team Name".len());
    let mut out = format!("{:<width$}  Total Points\n", "Team Name");
    for entry in entries {
        out.push_str(&format!("{:<width$}  {}\n", entry.team_name, entry.points));
    }
    out
}

fn render_cases(catalog: &CaseCatalog) -> String {
    catalog
        .iter()
        .map(|(id, description)| format!("{id}\n    {description}\n"))
        .collect()
}
