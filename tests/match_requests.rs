use std::path::PathBuf;

use pl_predictor::backtest;
use pl_predictor::prediction_cache;
use pl_predictor::team_input::load_match_request;
use pl_predictor::{Confidence, MatchScorer, Outcome, PredictError, ScorerConfig};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn full_request_resolves_and_predicts() {
    let request = load_match_request(Some(&fixture("arsenal_liverpool.json")))
        .expect("fixture should parse");
    let cfg = ScorerConfig::default();
    let resolved = request.resolve(&cfg).expect("fixture is valid");

    assert_eq!(resolved.home_name, "Arsenal");
    assert_eq!(resolved.away_name, "Liverpool");
    assert!((resolved.home.recent_form - 200.0 / 3.0).abs() < 1e-9);
    assert!((resolved.away.recent_form - 220.0 / 3.0).abs() < 1e-9);
    assert!((resolved.away.record_pct - 60.0).abs() < 1e-9);
    assert_eq!(resolved.away.unavailable_players(), 3);

    let result = MatchScorer::default()
        .predict(&resolved.home, &resolved.away, &resolved.h2h)
        .unwrap();
    assert!((result.advantage - 3.3944).abs() < 1e-3);
    assert_eq!(result.confidence, Confidence::Low);
    assert_eq!(result.predicted_score.to_string(), "2-2");
    assert_eq!(result.most_likely(), Outcome::HomeWin);
    assert!((result.home_win_prob - 44.92).abs() < 0.01);
}

#[test]
fn partial_request_uses_neutral_defaults() {
    let request = load_match_request(Some(&fixture("partial_entry.json"))).unwrap();
    let resolved = request.resolve(&ScorerConfig::default()).unwrap();

    assert_eq!(resolved.home.record_pct, 50.0);
    assert_eq!(resolved.home.table_position, 12);
    assert_eq!(resolved.away.recent_form, 50.0);
    assert_eq!(resolved.away.table_position, 10);
    assert_eq!(resolved.away.goals_scored, 18.0);
    assert!(resolved.h2h.is_empty());
}

#[test]
fn missing_request_file_is_data_unavailable() {
    let err = load_match_request(Some(&fixture("does_not_exist.json"))).unwrap_err();
    let err = err
        .downcast_ref::<PredictError>()
        .expect("library error preserved");
    assert!(matches!(err, PredictError::DataUnavailable { .. }));
}

#[test]
fn cached_prediction_matches_direct_prediction() {
    let request = load_match_request(Some(&fixture("arsenal_liverpool.json"))).unwrap();
    let scorer = MatchScorer::default();
    let resolved = request.resolve(scorer.config()).unwrap();

    let direct = scorer
        .predict(&resolved.home, &resolved.away, &resolved.h2h)
        .unwrap();
    let first =
        prediction_cache::predict_cached(&scorer, &resolved.home, &resolved.away, &resolved.h2h)
            .unwrap();
    let second =
        prediction_cache::predict_cached(&scorer, &resolved.home, &resolved.away, &resolved.h2h)
            .unwrap();

    assert_eq!(direct, first);
    assert_eq!(first, second);
    assert!(prediction_cache::global_stats().hits >= 1);
}

#[test]
fn backtest_fixture_scores_and_skips_bad_cases() {
    let cases = backtest::load_cases(&fixture("backtest_cases.json")).unwrap();
    assert_eq!(cases.len(), 4);

    let report = backtest::run_backtest(&MatchScorer::default(), &cases);
    assert_eq!(report.metrics.samples, 3);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, "bad-input");
    assert!(report.rejected[0].1.contains("home.key_injuries"));
    assert!((report.metrics.accuracy - 2.0 / 3.0).abs() < 1e-9);
    assert!(report.metrics.brier > 0.0 && report.metrics.brier < 2.0);
    assert_eq!(report.home_bins.iter().map(|b| b.count).sum::<usize>(), 3);
}
