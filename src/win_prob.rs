use crate::error::{PredictError, Result};
use crate::match_data::{
    Confidence, FactorBreakdown, FactorScore, HeadToHead, PredictionResult, Scoreline, Side,
    TeamStats,
};
use crate::scorer_config::ScorerConfig;

/// Weighted-sum match model. Holds only its (validated) constants, so one
/// scorer can be shared across threads and every call is a pure function
/// of its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScorer {
    config: ScorerConfig,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self {
            config: ScorerConfig::default(),
        }
    }
}

impl MatchScorer {
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn predict(
        &self,
        home: &TeamStats,
        away: &TeamStats,
        h2h: &HeadToHead,
    ) -> Result<PredictionResult> {
        home.validate(Side::Home, &self.config)?;
        away.validate(Side::Away, &self.config)?;
        h2h.validate(&self.config)?;

        let factors = self.factor_breakdown(home, away, h2h);
        for (name, factor) in factors.iter() {
            if !factor.contribution.is_finite() {
                return Err(PredictError::invalid(
                    format!("factors.{name}"),
                    format!("raw score {} does not give a finite contribution", factor.raw),
                ));
            }
        }
        let advantage = factors.total();
        if !advantage.is_finite() {
            return Err(PredictError::invalid(
                "factors",
                format!("advantage {advantage} is not finite"),
            ));
        }
        let (home_win_prob, draw_prob, away_win_prob) = self.outcome_probabilities(advantage);

        Ok(PredictionResult {
            home_win_prob,
            draw_prob,
            away_win_prob,
            predicted_score: self.predicted_score(home, away, advantage),
            confidence: self.confidence_for(advantage),
            advantage,
            factors,
        })
    }

    pub fn factor_breakdown(
        &self,
        home: &TeamStats,
        away: &TeamStats,
        h2h: &HeadToHead,
    ) -> FactorBreakdown {
        let cfg = &self.config;
        let w = &cfg.weights;

        let form = home.recent_form - away.recent_form;
        let home_advantage = home.record_pct - away.record_pct + cfg.home_bias;
        let head_to_head = h2h_score(h2h);
        let injuries = (f64::from(away.unavailable_players())
            - f64::from(home.unavailable_players()))
            * cfg.injury_points_per_player;
        let table_position = (f64::from(away.table_position) - f64::from(home.table_position))
            * cfg.points_per_position;
        let attack = (home.goals_scored - away.goals_scored) * cfg.attack_multiplier;
        let defense = (away.goals_conceded - home.goals_conceded) * cfg.defense_multiplier;

        FactorBreakdown {
            form: FactorScore::new(form, w.form),
            home_advantage: FactorScore::new(home_advantage, w.home_advantage),
            head_to_head: FactorScore::new(head_to_head, w.head_to_head),
            injuries: FactorScore::new(injuries, w.injuries),
            table_position: FactorScore::new(table_position, w.table_position),
            attack: FactorScore::new(attack, w.attack),
            defense: FactorScore::new(defense, w.defense),
        }
    }

    pub fn advantage_score(&self, home: &TeamStats, away: &TeamStats, h2h: &HeadToHead) -> f64 {
        self.factor_breakdown(home, away, h2h).total()
    }

    /// Home/draw/away percentages for an advantage score.
    ///
    /// The logistic split gives home and away raw shares summing to 100; the
    /// draw gets a fixed `draw_inflation` share on top and all three are
    /// renormalised to 100.
    pub fn outcome_probabilities(&self, advantage: f64) -> (f64, f64, f64) {
        let home_raw = self.sigmoid(advantage) * 100.0;
        let away_raw = self.sigmoid(-advantage) * 100.0;
        let draw_raw = 100.0 - home_raw - away_raw + self.config.draw_inflation;

        let sum = home_raw + draw_raw + away_raw;
        (
            home_raw / sum * 100.0,
            draw_raw / sum * 100.0,
            away_raw / sum * 100.0,
        )
    }

    pub fn confidence_for(&self, advantage: f64) -> Confidence {
        let magnitude = advantage.abs();
        if magnitude > self.config.high_confidence_threshold {
            Confidence::High
        } else if magnitude > self.config.medium_confidence_threshold {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Scoreline from season scoring rate nudged by the advantage.
    ///
    /// Rounds half away from zero (`f64::round`), so 2.5 goals become 3 and
    /// -0.5 becomes -1 (then clamped to 0).
    pub fn predicted_score(&self, home: &TeamStats, away: &TeamStats, advantage: f64) -> Scoreline {
        let cfg = &self.config;
        let nudge = advantage / cfg.advantage_goal_divisor;
        Scoreline {
            home: self.goals(home.goals_scored / cfg.goals_per_game_divisor + nudge),
            away: self.goals(away.goals_scored / cfg.goals_per_game_divisor - nudge),
        }
    }

    fn goals(&self, expected: f64) -> u32 {
        clamp(expected.round(), 0.0, f64::from(self.config.max_goals)) as u32
    }

    fn sigmoid(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x / self.config.sigmoid_scale).exp())
    }
}

fn h2h_score(h2h: &HeadToHead) -> f64 {
    let total = h2h.total();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    (f64::from(h2h.home_wins) / total - f64::from(h2h.away_wins) / total) * 100.0
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() {
        return lo;
    }
    v.max(lo).min(hi)
}
