//! Raw per-team entries as a caller collects them (results lists, table
//! position, goals, team news) and their conversion into `TeamStats`.
//!
//! Entries come from hand-written JSON, so every field is optional and
//! counts are signed: a missing value falls back to its neutral default, a
//! negative one is rejected with the field named.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};

use crate::error::{PredictError, Result};
use crate::match_data::{HeadToHead, Side, TeamStats};
use crate::normalize::{self, NEUTRAL_PCT};
use crate::scorer_config::ScorerConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub draws: i64,
    #[serde(default)]
    pub losses: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeamEntry {
    #[serde(default)]
    pub name: Option<String>,
    /// Results over the recent-form window.
    #[serde(default)]
    pub recent: Option<RawRecord>,
    /// Season results at this fixture's venue: home games for the home
    /// side, away games for the away side.
    #[serde(default)]
    pub venue: Option<RawRecord>,
    #[serde(default)]
    pub table_position: Option<i64>,
    #[serde(default)]
    pub goals_scored: Option<f64>,
    #[serde(default)]
    pub goals_conceded: Option<f64>,
    #[serde(default)]
    pub key_injuries: Option<i64>,
    #[serde(default)]
    pub suspensions: Option<i64>,
}

impl RawTeamEntry {
    pub fn display_name(&self, side: Side) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match side {
                Side::Home => "Home".to_string(),
                Side::Away => "Away".to_string(),
            })
    }

    pub fn to_team_stats(&self, side: Side, config: &ScorerConfig) -> Result<TeamStats> {
        let prefix = side.label();

        let recent_form = match self.recent {
            Some(rec) => {
                let (w, d, l) = record_counts(prefix, "recent", rec)?;
                normalize::form_percentage(w, d, l, config.form_window)
                    .map_err(|e| rename_field(e, format!("{prefix}.recent")))?
            }
            None => NEUTRAL_PCT,
        };
        let record_pct = match self.venue {
            Some(rec) => {
                let (w, d, l) = record_counts(prefix, "venue", rec)?;
                normalize::record_percentage_within(w, d, l, config.record_window)
                    .map_err(|e| rename_field(e, format!("{prefix}.venue")))?
            }
            None => NEUTRAL_PCT,
        };

        let table_position = match self.table_position {
            Some(pos) => count(prefix, "table_position", pos)?,
            None => config.league_size.div_ceil(2),
        };

        let stats = TeamStats {
            recent_form,
            record_pct,
            table_position,
            goals_scored: self.goals_scored.unwrap_or(0.0),
            goals_conceded: self.goals_conceded.unwrap_or(0.0),
            key_injuries: opt_count(prefix, "key_injuries", self.key_injuries)?,
            suspensions: opt_count(prefix, "suspensions", self.suspensions)?,
        };
        stats.validate(side, config)?;
        Ok(stats)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHeadToHead {
    #[serde(default)]
    pub home_wins: i64,
    #[serde(default)]
    pub draws: i64,
    #[serde(default)]
    pub away_wins: i64,
}

impl RawHeadToHead {
    pub fn into_head_to_head(self, config: &ScorerConfig) -> Result<HeadToHead> {
        let h2h = HeadToHead::new(
            count("h2h", "home_wins", self.home_wins)?,
            count("h2h", "draws", self.draws)?,
            count("h2h", "away_wins", self.away_wins)?,
        );
        h2h.validate(config)?;
        Ok(h2h)
    }
}

/// One fixture as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub home: RawTeamEntry,
    pub away: RawTeamEntry,
    #[serde(default)]
    pub h2h: Option<RawHeadToHead>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch {
    pub home_name: String,
    pub away_name: String,
    pub home: TeamStats,
    pub away: TeamStats,
    pub h2h: HeadToHead,
}

impl MatchRequest {
    pub fn resolve(&self, config: &ScorerConfig) -> Result<ResolvedMatch> {
        Ok(ResolvedMatch {
            home_name: self.home.display_name(Side::Home),
            away_name: self.away.display_name(Side::Away),
            home: self.home.to_team_stats(Side::Home, config)?,
            away: self.away.to_team_stats(Side::Away, config)?,
            h2h: self.h2h.unwrap_or_default().into_head_to_head(config)?,
        })
    }

    pub fn from_json(origin: &str, raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| PredictError::unavailable(origin, e.to_string()))
    }
}

/// Load a request from a JSON file, or stdin when `path` is `None`.
pub fn load_match_request(path: Option<&Path>) -> AnyResult<MatchRequest> {
    let (origin, raw) = match path {
        Some(path) => {
            let origin = path.display().to_string();
            let raw = fs::read_to_string(path)
                .map_err(|e| PredictError::unavailable(origin.clone(), e.to_string()))?;
            (origin, raw)
        }
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| PredictError::unavailable("stdin", e.to_string()))?;
            ("stdin".to_string(), raw)
        }
    };
    tracing::debug!(origin = %origin, bytes = raw.len(), "read match request");
    Ok(MatchRequest::from_json(&origin, &raw)?)
}

fn record_counts(prefix: &str, name: &str, rec: RawRecord) -> Result<(u32, u32, u32)> {
    Ok((
        count(prefix, &format!("{name}.wins"), rec.wins)?,
        count(prefix, &format!("{name}.draws"), rec.draws)?,
        count(prefix, &format!("{name}.losses"), rec.losses)?,
    ))
}

fn opt_count(prefix: &str, name: &str, value: Option<i64>) -> Result<u32> {
    value.map_or(Ok(0), |v| count(prefix, name, v))
}

fn count(prefix: &str, name: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(PredictError::invalid(
            format!("{prefix}.{name}"),
            format!("count must be non-negative, got {value}"),
        ));
    }
    u32::try_from(value).map_err(|_| {
        PredictError::invalid(format!("{prefix}.{name}"), format!("count {value} too large"))
    })
}

fn rename_field(err: PredictError, field: String) -> PredictError {
    match err {
        PredictError::InvalidInput { reason, .. } => PredictError::InvalidInput { field, reason },
        other => other,
    }
}
