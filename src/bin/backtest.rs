use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use pl_predictor::backtest;
use pl_predictor::{MatchScorer, scorer_config};

#[derive(Parser)]
#[command(name = "backtest")]
#[command(about = "Score predictions for past fixtures against their results")]
struct Cli {
    /// JSON array of past fixtures with final scores
    cases: PathBuf,

    /// Scorer config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    pl_predictor::load_dotenv();
    let cli = Cli::parse();
    pl_predictor::init_logging(&cli.log_level);

    let scorer = MatchScorer::new(scorer_config::load_config(cli.config.as_deref())?)?;
    let cases = backtest::load_cases(&cli.cases)?;
    if cases.is_empty() {
        return Err(anyhow!("no cases in {}", cli.cases.display()));
    }
    tracing::info!(cases = cases.len(), "running backtest");

    let report = backtest::run_backtest(&scorer, &cases);
    for (id, reason) in &report.rejected {
        tracing::warn!(case = %id, "skipped: {reason}");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let m = report.metrics;
    println!("Cases scored: {}/{}", m.samples, cases.len());
    println!("Brier:        {:.4}", m.brier);
    println!("Log loss:     {:.4}", m.log_loss);
    println!("Accuracy:     {:.1}%", m.accuracy * 100.0);
    println!("Exact scores: {}/{}", report.scoreline_hits, m.samples);
    println!();
    println!("Home-win calibration:");
    for bin in report.home_bins.iter().filter(|b| b.count > 0) {
        println!(
            "  {:>3.0}-{:<3.0}% n={:<4} pred {:>5.1}% actual {:>5.1}%",
            bin.bucket_start * 100.0,
            bin.bucket_end * 100.0,
            bin.count,
            bin.avg_pred * 100.0,
            bin.actual_rate * 100.0
        );
    }

    Ok(())
}
