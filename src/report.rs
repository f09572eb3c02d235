use std::fmt::Write as _;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::match_data::{Outcome, PredictionResult};
use crate::scorer_config::ScorerConfig;

/// JSON envelope written by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub generated_at: String,
    pub home_team: String,
    pub away_team: String,
    pub most_likely: Outcome,
    pub result: PredictionResult,
}

impl PredictionReport {
    pub fn new(home_team: &str, away_team: &str, result: PredictionResult) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            most_likely: result.most_likely(),
            result,
        }
    }
}

pub fn outcome_label(outcome: Outcome, home_team: &str, away_team: &str) -> String {
    match outcome {
        Outcome::HomeWin => format!("{home_team} Win"),
        Outcome::Draw => "Draw".to_string(),
        Outcome::AwayWin => format!("{away_team} Win"),
    }
}

pub fn render_text(
    home_team: &str,
    away_team: &str,
    result: &PredictionResult,
    config: &ScorerConfig,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Prediction: {home_team} vs {away_team}");
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<24} {:>5.1}%", format!("{home_team} Win"), result.home_win_prob);
    let _ = writeln!(out, "  {:<24} {:>5.1}%", "Draw", result.draw_prob);
    let _ = writeln!(out, "  {:<24} {:>5.1}%", format!("{away_team} Win"), result.away_win_prob);
    let _ = writeln!(out);
    let _ = writeln!(out, "Predicted score: {}", result.predicted_score);
    let _ = writeln!(
        out,
        "Most likely:     {}",
        outcome_label(result.most_likely(), home_team, away_team)
    );
    let _ = writeln!(
        out,
        "Confidence:      {} (advantage {:+.2})",
        result.confidence, result.advantage
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Factors (raw x weight = contribution):");
    for (name, f) in result.factors.iter() {
        let _ = writeln!(
            out,
            "  {:<15} {:>8.2} x {:.2} = {:>+7.2}",
            name, f.raw, f.weight, f.contribution
        );
    }
    let _ = writeln!(out);
    let _ = write!(out, "Model weights:");
    for (i, (name, w)) in config.weights.as_array().iter().enumerate() {
        let sep = if i == 0 { " " } else { ", " };
        let _ = write!(out, "{sep}{name} {:.0}%", w * 100.0);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_data::{HeadToHead, TeamStats};
    use crate::win_prob::MatchScorer;

    fn result() -> PredictionResult {
        let team = TeamStats {
            recent_form: 50.0,
            record_pct: 50.0,
            table_position: 10,
            goals_scored: 19.0,
            goals_conceded: 19.0,
            key_injuries: 0,
            suspensions: 0,
        };
        MatchScorer::default()
            .predict(&team, &team, &HeadToHead::default())
            .unwrap()
    }

    #[test]
    fn text_report_lists_outcomes_and_weights() {
        let text = render_text("Arsenal", "Liverpool", &result(), &ScorerConfig::default());
        assert!(text.contains("Prediction: Arsenal vs Liverpool"));
        assert!(text.contains("Arsenal Win"));
        assert!(text.contains("Predicted score: 1-1"));
        assert!(text.contains("Most likely:     Arsenal Win"));
        assert!(text.contains("Confidence:      Low"));
        assert!(text.contains("form 25%"));
        assert!(text.contains("defense 10%"));
    }

    #[test]
    fn report_records_most_likely() {
        let report = PredictionReport::new("A", "B", result());
        assert_eq!(report.most_likely, Outcome::HomeWin);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["most_likely"], "home_win");
        assert_eq!(json["result"]["confidence"], "Low");
        assert!(json["generated_at"].as_str().unwrap().ends_with('Z'));
    }
}
