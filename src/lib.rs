//! Explainable pre-match predictor for league football.
//!
//! Season stats for both sides go through `normalize` into bounded features,
//! `win_prob::MatchScorer` folds them into one weighted advantage score and
//! maps that to home/draw/away percentages, a confidence bucket and a
//! predicted scoreline. Everything in the core is a pure function of its
//! inputs and the `ScorerConfig` constants.

pub mod backtest;
pub mod calibration;
pub mod error;
pub mod match_data;
pub mod normalize;
pub mod prediction_cache;
pub mod report;
pub mod scorer_config;
pub mod team_input;
pub mod win_prob;

pub use error::{PredictError, Result};
pub use match_data::{
    Confidence, FactorBreakdown, FactorScore, HeadToHead, Outcome, PredictionResult, Scoreline,
    Side, TeamStats,
};
pub use scorer_config::{FactorWeights, ScorerConfig};
pub use win_prob::MatchScorer;

/// Install the `tracing` subscriber for a binary. `RUST_LOG` wins over
/// `default_level`.
pub fn init_logging(default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Read `.env.local` then `.env` if present.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}
