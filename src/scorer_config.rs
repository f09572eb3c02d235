use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

const CONFIG_DIR: &str = "pl_predictor";
const CONFIG_FILE: &str = "scorer_config.json";
pub const CONFIG_ENV: &str = "PL_PREDICTOR_CONFIG";

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Relative importance of each factor. Fixed for the lifetime of a scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub form: f64,
    pub home_advantage: f64,
    pub head_to_head: f64,
    pub injuries: f64,
    pub table_position: f64,
    pub attack: f64,
    pub defense: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            form: 0.25,
            home_advantage: 0.15,
            head_to_head: 0.10,
            injuries: 0.15,
            table_position: 0.15,
            attack: 0.10,
            defense: 0.10,
        }
    }
}

impl FactorWeights {
    pub fn as_array(&self) -> [(&'static str, f64); 7] {
        [
            ("form", self.form),
            ("home_advantage", self.home_advantage),
            ("head_to_head", self.head_to_head),
            ("injuries", self.injuries),
            ("table_position", self.table_position),
            ("attack", self.attack),
            ("defense", self.defense),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().map(|(_, w)| w).sum()
    }
}

/// Every constant the scorer uses. Alternate house rules are just a
/// different `ScorerConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub weights: FactorWeights,

    // Added to the home/away record gap regardless of the records themselves.
    pub home_bias: f64,
    pub injury_points_per_player: f64,
    pub points_per_position: f64,
    pub attack_multiplier: f64,
    pub defense_multiplier: f64,

    pub sigmoid_scale: f64,
    // Raw draw mass added before renormalising the three outcomes.
    pub draw_inflation: f64,

    pub high_confidence_threshold: f64,
    pub medium_confidence_threshold: f64,

    pub goals_per_game_divisor: f64,
    pub advantage_goal_divisor: f64,
    pub max_goals: u32,

    pub form_window: u32,
    pub record_window: u32,
    pub h2h_window: u32,
    pub league_size: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            home_bias: 10.0,
            injury_points_per_player: 5.0,
            points_per_position: 3.0,
            attack_multiplier: 2.0,
            defense_multiplier: 2.0,
            sigmoid_scale: 10.0,
            draw_inflation: 30.0,
            high_confidence_threshold: 15.0,
            medium_confidence_threshold: 8.0,
            goals_per_game_divisor: 19.0,
            advantage_goal_divisor: 20.0,
            max_goals: 5,
            form_window: 5,
            record_window: 19,
            h2h_window: 5,
            league_size: 20,
        }
    }
}

impl ScorerConfig {
    /// Canonical tuning without the fixed home bias.
    pub fn neutral_venue() -> Self {
        Self {
            home_bias: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), PredictError> {
        for (name, w) in self.weights.as_array() {
            if !w.is_finite() || w < 0.0 {
                return Err(PredictError::invalid(
                    format!("config.weights.{name}"),
                    format!("weight must be a non-negative number, got {w}"),
                ));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PredictError::invalid(
                "config.weights",
                format!("weights must sum to 1.0, got {sum}"),
            ));
        }

        let finite = [
            ("home_bias", self.home_bias),
            ("injury_points_per_player", self.injury_points_per_player),
            ("points_per_position", self.points_per_position),
            ("attack_multiplier", self.attack_multiplier),
            ("defense_multiplier", self.defense_multiplier),
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("medium_confidence_threshold", self.medium_confidence_threshold),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(PredictError::invalid(
                    format!("config.{name}"),
                    "must be a finite number",
                ));
            }
        }

        let positive = [
            ("sigmoid_scale", self.sigmoid_scale),
            ("goals_per_game_divisor", self.goals_per_game_divisor),
            ("advantage_goal_divisor", self.advantage_goal_divisor),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(PredictError::invalid(
                    format!("config.{name}"),
                    format!("must be greater than zero, got {v}"),
                ));
            }
        }

        if !self.draw_inflation.is_finite() || self.draw_inflation < 0.0 {
            return Err(PredictError::invalid(
                "config.draw_inflation",
                format!("must be non-negative, got {}", self.draw_inflation),
            ));
        }
        if self.medium_confidence_threshold > self.high_confidence_threshold {
            return Err(PredictError::invalid(
                "config.medium_confidence_threshold",
                "must not exceed high_confidence_threshold",
            ));
        }

        let counts = [
            ("form_window", self.form_window),
            ("record_window", self.record_window),
            ("h2h_window", self.h2h_window),
            ("league_size", self.league_size),
        ];
        for (name, v) in counts {
            if v == 0 {
                return Err(PredictError::invalid(
                    format!("config.{name}"),
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

/// Resolve and load the scorer config: explicit path, then
/// `$PL_PREDICTOR_CONFIG`, then the cache-dir file. Nothing found means the
/// canonical defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScorerConfig> {
    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| opt_env(CONFIG_ENV).map(PathBuf::from));

    let config = match explicit {
        Some(path) => read_config(&path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => read_config(&path)?,
            None => {
                tracing::debug!("no scorer config found, using canonical defaults");
                ScorerConfig::default()
            }
        },
    };
    config.validate()?;
    Ok(config)
}

pub fn read_config(path: &Path) -> Result<ScorerConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read scorer config {}", path.display()))?;
    let config = serde_json::from_str::<ScorerConfig>(&raw)
        .with_context(|| format!("parse scorer config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded scorer config");
    Ok(config)
}

pub fn save_config(path: &Path, config: &ScorerConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("create config dir")?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(config).context("serialize scorer config")?;
    fs::write(&tmp, json).context("write scorer config")?;
    fs::rename(&tmp, path).context("swap scorer config")?;
    Ok(())
}

pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

fn app_config_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Some(base) = opt_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CONFIG_DIR));
    }
    let home = opt_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(CONFIG_DIR))
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
