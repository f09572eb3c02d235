use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calibration::{self, CalibrationBin, Metrics, Prob3};
use crate::match_data::{Outcome, PredictionResult, Scoreline};
use crate::team_input::MatchRequest;
use crate::win_prob::MatchScorer;

const CALIBRATION_BINS: usize = 10;

type Scored = std::result::Result<CaseOutcome, (String, String)>;

/// A past fixture: the request as it stood before kickoff plus the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestCase {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub request: MatchRequest,
    pub home_goals: u32,
    pub away_goals: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub id: String,
    pub actual: Outcome,
    pub actual_score: Scoreline,
    pub result: PredictionResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub metrics: Metrics,
    pub home_bins: Vec<CalibrationBin>,
    pub scoreline_hits: usize,
    pub cases: Vec<CaseOutcome>,
    // (case id, reason) for cases whose inputs were rejected.
    pub rejected: Vec<(String, String)>,
}

pub fn load_cases(path: &Path) -> Result<Vec<BacktestCase>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read backtest cases {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse backtest cases {}", path.display()))
}

/// Predict every case in parallel and score the predictions.
pub fn run_backtest(scorer: &MatchScorer, cases: &[BacktestCase]) -> BacktestReport {
    let scored: Vec<Scored> = cases
        .par_iter()
        .enumerate()
        .map(|(idx, case)| -> Scored {
            let id = case.id.clone().unwrap_or_else(|| format!("case-{idx}"));
            let resolved = case
                .request
                .resolve(scorer.config())
                .map_err(|e| (id.clone(), e.to_string()))?;
            let result = scorer
                .predict(&resolved.home, &resolved.away, &resolved.h2h)
                .map_err(|e| (id.clone(), e.to_string()))?;
            Ok(CaseOutcome {
                id,
                actual: calibration::classify_outcome(case.home_goals, case.away_goals),
                actual_score: Scoreline {
                    home: case.home_goals,
                    away: case.away_goals,
                },
                result,
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    let mut rejected = Vec::new();
    for item in scored {
        match item {
            Ok(outcome) => outcomes.push(outcome),
            Err(reject) => rejected.push(reject),
        }
    }

    let probs: Vec<Prob3> = outcomes
        .iter()
        .map(|c| Prob3::from_result(&c.result))
        .collect();
    let actual: Vec<Outcome> = outcomes.iter().map(|c| c.actual).collect();
    let scoreline_hits = outcomes
        .iter()
        .filter(|c| c.result.predicted_score == c.actual_score)
        .count();

    BacktestReport {
        metrics: calibration::evaluate_probs(&probs, &actual),
        home_bins: calibration::calibration_bins(
            &probs,
            &actual,
            Outcome::HomeWin,
            CALIBRATION_BINS,
        ),
        scoreline_hits,
        cases: outcomes,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASES: &str = r#"[
        {
            "id": "ars-bur",
            "home": {"name": "Arsenal", "recent": {"wins": 4, "draws": 1}, "table_position": 2,
                     "goals_scored": 35, "goals_conceded": 15},
            "away": {"name": "Burnley", "recent": {"losses": 5}, "table_position": 19,
                     "goals_scored": 12, "goals_conceded": 40},
            "h2h": {"home_wins": 3, "draws": 1, "away_wins": 1},
            "home_goals": 3,
            "away_goals": 0
        },
        {
            "home": {"table_position": 30},
            "away": {},
            "home_goals": 1,
            "away_goals": 1
        }
    ]"#;

    #[test]
    fn scores_valid_cases_and_reports_rejects() {
        let cases: Vec<BacktestCase> = serde_json::from_str(CASES).unwrap();
        let report = run_backtest(&MatchScorer::default(), &cases);

        assert_eq!(report.metrics.samples, 1);
        assert_eq!(report.metrics.accuracy, 1.0);
        assert_eq!(report.cases[0].id, "ars-bur");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "case-1");
        assert!(report.rejected[0].1.contains("home.table_position"));
    }
}
