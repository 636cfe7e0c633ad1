//! Numeric helpers shared by the weight, conviction and flow calculations.

#[allow(clippy::cast_precision_loss)]
fn as_f64(v: i64) -> f64 {
    v as f64
}

/// `part / whole * 100`, or `0.0` when `whole` is zero.
#[must_use]
pub fn pct_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    as_f64(part) / as_f64(whole) * 100.0
}

/// Percentage change of shares relative to the old share count.
///
/// `None` when there is no old count or it is zero.
#[must_use]
pub fn shares_change_pct(diff_shares: i64, shares_old: Option<i64>) -> Option<f64> {
    match shares_old {
        Some(old) if old != 0 => Some(as_f64(diff_shares) / as_f64(old) * 100.0),
        _ => None,
    }
}

/// Average of `total` over `periods`, or `0.0` for no periods.
#[must_use]
pub fn average(total: i64, periods: usize) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = periods as f64;
    as_f64(total) / n
}

/// Portfolio impact of a value change: `|diff_value| / total * 100`.
#[must_use]
pub fn impact_pct(diff_value: i64, total: i64) -> f64 {
    pct_of(diff_value.saturating_abs(), total)
}
