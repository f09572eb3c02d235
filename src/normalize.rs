//! Raw season counters to bounded percentage features.
//!
//! Points follow league scoring: 3 for a win, 1 for a draw. Every value is a
//! share of the maximum available points, so it lands in [0, 100]. An empty
//! sample reads as 50 (neutral) rather than 0.

use crate::error::{PredictError, Result};

pub const NEUTRAL_PCT: f64 = 50.0;

/// Share of points taken over the recent-form window.
///
/// The denominator is the full window (`3 * window`), not the matches
/// actually played, so a team with only 3 results in a 5-match window is
/// scored against 15 points. No completed matches returns 50.
pub fn form_percentage(wins: u32, draws: u32, losses: u32, window: u32) -> Result<f64> {
    if window == 0 {
        return Err(PredictError::invalid("form.window", "window must be at least 1"));
    }
    let played = completed(wins, draws, losses);
    if played > u64::from(window) {
        return Err(PredictError::invalid(
            "form",
            format!("{played} results exceed the {window}-match window"),
        ));
    }
    if played == 0 {
        return Ok(NEUTRAL_PCT);
    }

    let max_points = 3.0 * f64::from(window);
    Ok(clamp_pct(points(wins, draws) / max_points * 100.0))
}

/// Share of points taken over every listed match. No matches returns 50.
pub fn record_percentage(wins: u32, draws: u32, losses: u32) -> f64 {
    let played = completed(wins, draws, losses);
    if played == 0 {
        return NEUTRAL_PCT;
    }
    clamp_pct(points(wins, draws) / (3.0 * played as f64) * 100.0)
}

/// `record_percentage` with the season-length bound enforced.
pub fn record_percentage_within(
    wins: u32,
    draws: u32,
    losses: u32,
    season_len: u32,
) -> Result<f64> {
    let played = completed(wins, draws, losses);
    if played > u64::from(season_len) {
        return Err(PredictError::invalid(
            "record",
            format!("{played} results exceed the {season_len}-fixture season"),
        ));
    }
    Ok(record_percentage(wins, draws, losses))
}

pub fn clamp_pct(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

fn completed(wins: u32, draws: u32, losses: u32) -> u64 {
    u64::from(wins) + u64::from(draws) + u64::from(losses)
}

fn points(wins: u32, draws: u32) -> f64 {
    3.0 * f64::from(wins) + f64::from(draws)
}
