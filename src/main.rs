use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pl_predictor::report::{self, PredictionReport};
use pl_predictor::team_input::load_match_request;
use pl_predictor::{MatchScorer, prediction_cache, scorer_config};

#[derive(Parser)]
#[command(name = "pl_predictor")]
#[command(about = "Home/draw/away probabilities and a predicted score from season stats")]
#[command(version)]
struct Cli {
    /// Match request JSON (reads stdin when omitted)
    #[arg(long, short)]
    request: Option<PathBuf>,

    /// Scorer config JSON (falls back to $PL_PREDICTOR_CONFIG, then the cache dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the effective scorer config to this path
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    pl_predictor::load_dotenv();
    let cli = Cli::parse();
    pl_predictor::init_logging(&cli.log_level);

    let config = scorer_config::load_config(cli.config.as_deref())?;
    let scorer = MatchScorer::new(config)?;
    if let Some(path) = cli.save_config.as_deref() {
        scorer_config::save_config(path, scorer.config())?;
        tracing::info!(path = %path.display(), "saved scorer config");
    }

    let request = load_match_request(cli.request.as_deref())?;
    let resolved = request
        .resolve(scorer.config())
        .context("match request rejected")?;
    tracing::info!(
        home = %resolved.home_name,
        away = %resolved.away_name,
        "predicting match"
    );

    let result =
        prediction_cache::predict_cached(&scorer, &resolved.home, &resolved.away, &resolved.h2h)?;

    if cli.json {
        let report = PredictionReport::new(&resolved.home_name, &resolved.away_name, result);
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{json}");
    } else {
        print!(
            "{}",
            report::render_text(
                &resolved.home_name,
                &resolved.away_name,
                &result,
                scorer.config()
            )
        );
    }

    Ok(())
}
