use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use fundwatch_rs::DeltaAction;
use fundwatch_rs::trend::{
    TrendDirection, TrendObservation, TrendParams, detect_streak, detect_trends,
};

use crate::common::date;

fn obs(action: DeltaAction, diff_value: i64, on: NaiveDate) -> TrendObservation {
    TrendObservation::new(action, diff_value, on)
}

fn acc(history: &[TrendObservation]) -> Option<usize> {
    detect_streak(
        "X",
        history,
        TrendDirection::Accumulating,
        TrendParams::default(),
    )
    .map(|t| t.streak_length)
}

#[test]
fn four_month_spacing_is_one_streak() {
    let history = [
        obs(DeltaAction::New, 100, date(2024, 1, 15)),
        obs(DeltaAction::Increase, 100, date(2024, 5, 15)),
        obs(DeltaAction::Increase, 100, date(2024, 9, 15)),
    ];
    assert_eq!(acc(&history), Some(3));
}

#[test]
fn six_month_spacing_never_qualifies() {
    let history = [
        obs(DeltaAction::New, 100, date(2024, 1, 15)),
        obs(DeltaAction::Increase, 100, date(2024, 7, 15)),
    ];
    assert_eq!(acc(&history), None);
}

#[test]
fn five_month_gap_is_tolerated() {
    let history = [
        obs(DeltaAction::Increase, 100, date(2024, 1, 15)),
        obs(DeltaAction::Increase, 100, date(2024, 6, 15)),
    ];
    assert_eq!(acc(&history), Some(2));
}

#[test]
fn tsla_three_quarters_is_strong() {
    let start = date(2024, 1, 2);
    let history = [
        obs(DeltaAction::New, 1000, start),
        obs(DeltaAction::Increase, 500, start + Duration::days(90)),
        obs(DeltaAction::Increase, 250, start + Duration::days(180)),
    ];
    let t = detect_streak(
        "TSLA",
        &history,
        TrendDirection::Accumulating,
        TrendParams::default(),
    )
    .unwrap();

    assert_eq!(t.security_id, "TSLA");
    assert_eq!(t.streak_length, 3);
    assert!(t.is_strong);
    assert_eq!(t.total_value, 1750);
    assert!((t.avg_value_per_period - 1750.0 / 3.0).abs() < 1e-9);
    assert_eq!(t.latest_date, start + Duration::days(180));
    assert_eq!(t.earliest_date, start);
}

#[test]
fn opposite_move_ends_the_streak() {
    let history = [
        obs(DeltaAction::Increase, 100, date(2024, 1, 31)),
        obs(DeltaAction::Decrease, -50, date(2024, 4, 30)),
        obs(DeltaAction::Increase, 100, date(2024, 7, 31)),
        obs(DeltaAction::Increase, 100, date(2024, 10, 31)),
    ];
    assert_eq!(acc(&history), Some(2), "only the most recent run counts");

    let broken = [
        obs(DeltaAction::Increase, 100, date(2024, 1, 31)),
        obs(DeltaAction::Increase, 100, date(2024, 4, 30)),
        obs(DeltaAction::Decrease, -50, date(2024, 7, 31)),
        obs(DeltaAction::Increase, 100, date(2024, 10, 31)),
    ];
    assert_eq!(acc(&broken), None);
}

#[test]
fn neutral_move_keeps_the_streak_and_moves_the_gap_reference() {
    // the zero-value decrease sits between two increases eight months apart
    let history = [
        obs(DeltaAction::Increase, 100, date(2024, 2, 15)),
        obs(DeltaAction::Decrease, 0, date(2024, 6, 15)),
        obs(DeltaAction::Increase, 100, date(2024, 10, 15)),
    ];
    assert_eq!(acc(&history), Some(2));
}

#[test]
fn leading_opposite_moves_are_skipped() {
    let history = [
        obs(DeltaAction::Increase, 100, date(2024, 1, 31)),
        obs(DeltaAction::Increase, 100, date(2024, 4, 30)),
        obs(DeltaAction::Exit, -200, date(2024, 7, 31)),
    ];
    assert_eq!(acc(&history), Some(2));
    let dist = detect_streak(
        "X",
        &history,
        TrendDirection::Distributing,
        TrendParams::default(),
    );
    assert!(dist.is_none(), "a single exit is not a streak");
}

#[test]
fn increase_with_falling_value_does_not_accumulate() {
    let history = [
        obs(DeltaAction::Increase, -10, date(2024, 1, 31)),
        obs(DeltaAction::Increase, -10, date(2024, 4, 30)),
    ];
    assert_eq!(acc(&history), None);
}

#[test]
fn detect_trends_covers_both_directions() {
    let mut history = BTreeMap::new();
    history.insert(
        "SELL".to_string(),
        vec![
            obs(DeltaAction::Decrease, -300, date(2024, 3, 31)),
            obs(DeltaAction::Decrease, -200, date(2024, 6, 30)),
            obs(DeltaAction::Exit, -100, date(2024, 9, 30)),
        ],
    );
    history.insert(
        "BUY".to_string(),
        vec![
            obs(DeltaAction::New, 50, date(2024, 6, 30)),
            obs(DeltaAction::Increase, 50, date(2024, 9, 30)),
        ],
    );
    history.insert(
        "BIGBUY".to_string(),
        vec![
            obs(DeltaAction::New, 500, date(2024, 6, 30)),
            obs(DeltaAction::Increase, 500, date(2024, 9, 30)),
        ],
    );
    history.insert(
        "FLAT".to_string(),
        vec![obs(DeltaAction::Decrease, 0, date(2024, 9, 30))],
    );

    let summary = detect_trends(&history, TrendParams::default());

    let acc: Vec<&str> = summary
        .accumulating
        .iter()
        .map(|t| t.security_id.as_str())
        .collect();
    assert_eq!(acc, ["BIGBUY", "BUY"]);

    assert_eq!(summary.distributing.len(), 1);
    let sell = &summary.distributing[0];
    assert_eq!(sell.security_id, "SELL");
    assert_eq!(sell.streak_length, 3);
    assert_eq!(sell.total_value, 600);
    assert!(sell.is_strong);

    assert!(summary.find("FLAT", TrendDirection::Accumulating).is_none());
    assert_eq!(
        summary
            .for_delta("SELL", DeltaAction::Exit)
            .map(|t| t.direction),
        Some(TrendDirection::Distributing)
    );
    assert!(
        summary.for_delta("SELL", DeltaAction::Increase).is_none(),
        "a reversing delta carries no trend"
    );
}
