use std::collections::HashMap;

use crate::conviction::{ConvictionBuckets, ConvictionThresholds, apply_trend, classify};
use crate::core::conversions::impact_pct;
use crate::core::{DeltaAction, DeltaSet, EngineConfig, FwEngine, FwError};
use crate::flows::aggregate_sector_flows;
use crate::sector::{SectorMatcher, resolve_with};
use crate::trend::{TrendParams, TrendSummary, TrendWindow, trends_from_snapshots};
use crate::weights::{LatestTotal, PortfolioWeights, referenced_filings};

use super::model::{ReportSummary, StrategicDelta, StrategicReport};

/// Everything the report needs once the reads are done.
pub(super) struct ReportInputs<'a> {
    pub set: &'a DeltaSet,
    pub weights: &'a PortfolioWeights,
    pub total: &'a LatestTotal,
    pub sectors: &'a HashMap<String, Option<String>>,
    pub trends: TrendSummary,
}

pub(super) struct ReportOptions {
    pub thresholds: ConvictionThresholds,
    pub include_low: bool,
    pub rotation_threshold_pct: f64,
}

impl ReportOptions {
    pub(super) fn new(cfg: &EngineConfig, noise_threshold_pct: f64, include_low: bool) -> Self {
        let mut thresholds = ConvictionThresholds::from(cfg);
        thresholds.noise_pct = noise_threshold_pct;
        Self {
            thresholds,
            include_low,
            rotation_threshold_pct: cfg.rotation_threshold_pct,
        }
    }
}

/// Reads everything with one batched snapshot read and one sector read, then builds the report.
pub(super) async fn analyze(
    engine: &FwEngine,
    fund_id: &str,
    set: &DeltaSet,
    opts: ReportOptions,
) -> Result<StrategicReport, FwError> {
    if set.is_empty() {
        return Ok(StrategicReport::empty(fund_id));
    }

    let cfg = engine.config();
    let store = engine.store();
    let window = TrendWindow::read(store, fund_id, cfg.effective_lookback()).await?;

    let mut ids = referenced_filings(&set.deltas);
    ids.extend(window.filings.iter().map(|f| f.id.clone()));
    ids.sort();
    ids.dedup();
    let snapshots = store.read_snapshots(&ids).await?;

    let weights = PortfolioWeights::from_snapshots(&ids, &snapshots);
    let total = weights.resolve_latest_total(&set.deltas, store).await;

    let table = store.read_sector_reference().await?;
    let matcher = SectorMatcher::new(&table);
    let sectors = resolve_with(
        &matcher,
        set.deltas.iter().map(|d| d.security_id.as_str()),
    );

    let trends = trends_from_snapshots(
        fund_id,
        &window.filings,
        &snapshots,
        window.oldest_is_first,
        TrendParams::from(cfg),
    )?;

    Ok(build_report(
        fund_id,
        ReportInputs {
            set,
            weights: &weights,
            total: &total,
            sectors: &sectors,
            trends,
        },
        &opts,
    ))
}

/// Enriches, classifies and aggregates. Performs no I/O.
pub(super) fn build_report(
    fund_id: &str,
    inputs: ReportInputs<'_>,
    opts: &ReportOptions,
) -> StrategicReport {
    let total_value = inputs.total.total_value;

    let enriched: Vec<StrategicDelta> = inputs
        .set
        .deltas
        .iter()
        .map(|d| {
            let impact = impact_pct(d.diff_value, total_value);
            let base = classify(d.action, impact, &opts.thresholds);
            let trend = inputs.trends.for_delta(&d.security_id, d.action);
            let streak = trend.map(|t| t.streak_length);
            StrategicDelta {
                portfolio_impact_pct: impact,
                portfolio_weight_old: d
                    .filing_id_old
                    .as_deref()
                    .and_then(|f| inputs.weights.weight(f, &d.security_id)),
                portfolio_weight_new: inputs.weights.weight(&d.filing_id_new, &d.security_id),
                impact_conviction: base,
                conviction_level: apply_trend(base, streak, &opts.thresholds),
                sector: inputs.sectors.get(&d.security_id).cloned().flatten(),
                trend_streak_length: streak,
                trend_direction: trend.map(|t| t.direction),
                delta: d.clone(),
            }
        })
        .collect();

    let mut summary = ReportSummary {
        latest_portfolio_value: total_value,
        total_source: Some(inputs.total.source.clone()),
        ..ReportSummary::default()
    };
    for d in &enriched {
        let v = d.delta.diff_value.saturating_abs();
        summary.gross_activity_value = summary.gross_activity_value.saturating_add(v);
        if d.delta.action.is_inflow() {
            summary.net_inflow = summary.net_inflow.saturating_add(v);
        } else {
            summary.net_outflow = summary.net_outflow.saturating_add(v);
        }
    }

    let sector_flows = aggregate_sector_flows(&enriched, total_value, opts.rotation_threshold_pct);
    let buckets = ConvictionBuckets::partition(enriched);
    let all_movements = buckets.merged(opts.include_low, opts.thresholds.strong_streak);

    let of_action = |action: DeltaAction| -> Vec<StrategicDelta> {
        buckets
            .strong
            .iter()
            .chain(&buckets.medium)
            .chain(&buckets.low)
            .filter(|d| d.delta.action == action)
            .cloned()
            .collect::<Vec<_>>()
    };
    let mut exits = of_action(DeltaAction::Exit);
    let mut trims = of_action(DeltaAction::Decrease);
    let mut new_positions = of_action(DeltaAction::New);
    for list in [&mut exits, &mut trims, &mut new_positions] {
        list.sort_by(|a, b| {
            b.portfolio_impact_pct
                .total_cmp(&a.portfolio_impact_pct)
                .then_with(|| a.delta.security_id.cmp(&b.delta.security_id))
        });
    }

    summary.strong_conviction_count = buckets.strong.len();
    summary.exit_count = exits.len();
    summary.new_position_count = new_positions.len();
    summary.sector_rotation_detected = sector_flows.rotation_detected;

    StrategicReport {
        fund_id: fund_id.to_string(),
        filing_id_new: Some(inputs.set.filing_id_new.clone()),
        filing_id_old: inputs.set.filing_id_old.clone(),
        summary,
        noise_filtered_out: buckets.noise_filtered_out,
        strong: buckets.strong,
        medium: buckets.medium,
        low: buckets.low,
        sector_flows,
        exits,
        trims,
        new_positions,
        all_movements,
        trends: inputs.trends,
    }
}
