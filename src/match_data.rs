use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PredictError, Result};
use crate::scorer_config::ScorerConfig;

/// Upper bound on a goals figure, whether a season total or a per-game rate.
pub const MAX_GOALS_INPUT: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// One side's season statistics for a single prediction.
///
/// `record_pct` is the home record for the home side and the away record for
/// the away side; the venue is implied by where the record is passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub recent_form: f64,
    pub record_pct: f64,
    pub table_position: u32,
    pub goals_scored: f64,
    pub goals_conceded: f64,
    pub key_injuries: u32,
    pub suspensions: u32,
}

impl TeamStats {
    pub fn unavailable_players(&self) -> u32 {
        self.key_injuries.saturating_add(self.suspensions)
    }

    pub fn validate(&self, side: Side, config: &ScorerConfig) -> Result<()> {
        let prefix = side.label();
        check_pct(prefix, "recent_form", self.recent_form)?;
        check_pct(prefix, "record_pct", self.record_pct)?;
        if self.table_position == 0 || self.table_position > config.league_size {
            return Err(PredictError::invalid(
                format!("{prefix}.table_position"),
                format!(
                    "position {} outside [1, {}]",
                    self.table_position, config.league_size
                ),
            ));
        }
        check_goals(prefix, "goals_scored", self.goals_scored)?;
        check_goals(prefix, "goals_conceded", self.goals_conceded)?;
        Ok(())
    }
}

fn check_pct(prefix: &str, name: &str, v: f64) -> Result<()> {
    if !v.is_finite() || !(0.0..=100.0).contains(&v) {
        return Err(PredictError::invalid(
            format!("{prefix}.{name}"),
            format!("{v} outside [0, 100]"),
        ));
    }
    Ok(())
}

fn check_goals(prefix: &str, name: &str, v: f64) -> Result<()> {
    if !v.is_finite() || !(0.0..=MAX_GOALS_INPUT).contains(&v) {
        return Err(PredictError::invalid(
            format!("{prefix}.{name}"),
            format!("{v} outside [0, {MAX_GOALS_INPUT}]"),
        ));
    }
    Ok(())
}

/// Results of the recent meetings between the two sides, from the home
/// side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeadToHead {
    pub home_wins: u32,
    pub draws: u32,
    pub away_wins: u32,
}

impl HeadToHead {
    pub fn new(home_wins: u32, draws: u32, away_wins: u32) -> Self {
        Self {
            home_wins,
            draws,
            away_wins,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.home_wins) + u64::from(self.draws) + u64::from(self.away_wins)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn validate(&self, config: &ScorerConfig) -> Result<()> {
        let total = self.total();
        if total > u64::from(config.h2h_window) {
            return Err(PredictError::invalid(
                "h2h",
                format!(
                    "{total} meetings exceed the {}-meeting window",
                    config.h2h_window
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub fn from_score(home_goals: u32, away_goals: u32) -> Self {
        if home_goals > away_goals {
            Outcome::HomeWin
        } else if home_goals < away_goals {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        }
    }
}

/// Raw and weighted value of one scoring factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub raw: f64,
    pub weight: f64,
    pub contribution: f64,
}

impl FactorScore {
    pub fn new(raw: f64, weight: f64) -> Self {
        Self {
            raw,
            weight,
            contribution: raw * weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub form: FactorScore,
    pub home_advantage: FactorScore,
    pub head_to_head: FactorScore,
    pub injuries: FactorScore,
    pub table_position: FactorScore,
    pub attack: FactorScore,
    pub defense: FactorScore,
}

impl FactorBreakdown {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FactorScore)> {
        [
            ("form", &self.form),
            ("home_advantage", &self.home_advantage),
            ("head_to_head", &self.head_to_head),
            ("injuries", &self.injuries),
            ("table_position", &self.table_position),
            ("attack", &self.attack),
            ("defense", &self.defense),
        ]
        .into_iter()
    }

    /// Sum of weighted contributions, in declaration order.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, f)| f.contribution).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    pub predicted_score: Scoreline,
    pub confidence: Confidence,
    // Weighted advantage score; positive favours the home side.
    pub advantage: f64,
    pub factors: FactorBreakdown,
}

impl PredictionResult {
    pub fn probability_of(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::HomeWin => self.home_win_prob,
            Outcome::Draw => self.draw_prob,
            Outcome::AwayWin => self.away_win_prob,
        }
    }

    /// Highest-probability outcome. Ties go to the earlier of home win,
    /// draw, away win.
    pub fn most_likely(&self) -> Outcome {
        let mut best = Outcome::HomeWin;
        for outcome in [Outcome::Draw, Outcome::AwayWin] {
            if self.probability_of(outcome) > self.probability_of(best) {
                best = outcome;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> TeamStats {
        TeamStats {
            recent_form: 60.0,
            record_pct: 55.0,
            table_position: 8,
            goals_scored: 25.0,
            goals_conceded: 20.0,
            key_injuries: 1,
            suspensions: 1,
        }
    }

    #[test]
    fn validate_accepts_in_range_stats() {
        assert!(stats().validate(Side::Home, &ScorerConfig::default()).is_ok());
    }

    #[test]
    fn validate_names_side_and_field() {
        let cfg = ScorerConfig::default();

        let mut s = stats();
        s.recent_form = 101.0;
        let err = s.validate(Side::Away, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("away.recent_form"));

        let mut s = stats();
        s.table_position = 21;
        let err = s.validate(Side::Home, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("home.table_position"));

        let mut s = stats();
        s.table_position = 0;
        assert!(s.validate(Side::Home, &cfg).is_err());

        let mut s = stats();
        s.goals_conceded = f64::NAN;
        let err = s.validate(Side::Home, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("home.goals_conceded"));
    }

    #[test]
    fn goals_are_bounded() {
        let cfg = ScorerConfig::default();

        let mut s = stats();
        s.goals_scored = MAX_GOALS_INPUT;
        assert!(s.validate(Side::Home, &cfg).is_ok());

        s.goals_scored = 1e308;
        let err = s.validate(Side::Home, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("home.goals_scored"));

        let mut s = stats();
        s.goals_conceded = -0.5;
        let err = s.validate(Side::Away, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("away.goals_conceded"));
    }

    #[test]
    fn h2h_window_is_enforced() {
        let cfg = ScorerConfig::default();
        assert!(HeadToHead::new(3, 1, 1).validate(&cfg).is_ok());
        let err = HeadToHead::new(3, 2, 1).validate(&cfg).unwrap_err();
        assert_eq!(err.field(), Some("h2h"));
        assert!(HeadToHead::default().is_empty());
    }

    #[test]
    fn scoreline_displays_as_dash_pair() {
        assert_eq!(Scoreline { home: 2, away: 1 }.to_string(), "2-1");
    }

    #[test]
    fn confidence_orders_low_to_high() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(Confidence::Medium.to_string(), "Medium");
    }

    #[test]
    fn outcome_from_score() {
        assert_eq!(Outcome::from_score(2, 1), Outcome::HomeWin);
        assert_eq!(Outcome::from_score(1, 1), Outcome::Draw);
        assert_eq!(Outcome::from_score(0, 3), Outcome::AwayWin);
    }
}
