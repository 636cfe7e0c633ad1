use chrono::NaiveDate;
use fundwatch_rs::{
    Filing, FilingStatus, FwEngine, HoldingRow, MemoryStore, SectorRef, Snapshot,
};

fn day(y: i32, m: u32, d: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("bad date {y}-{m}-{d}").into())
}

async fn add_quarter(
    store: &MemoryStore,
    fund: &str,
    id: &str,
    on: NaiveDate,
    rows: &[(&str, i64, i64)],
) {
    let filing = Filing {
        id: id.to_string(),
        fund_id: fund.to_string(),
        filing_date: on,
        status: FilingStatus::Parsed,
    };
    let rows = rows
        .iter()
        .map(|(sec, shares, value)| HoldingRow::new(*sec, *shares, *value))
        .collect();
    store.put_filing(filing, Snapshot::new(id, rows)).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Seed an in-memory store with four quarters for two funds.
    let store = MemoryStore::new();
    store
        .set_sector_reference(vec![
            SectorRef::new("AAPL", "Technology"),
            SectorRef::new("MSFT", "Technology"),
            SectorRef::new("NVDA", "Technology"),
            SectorRef::new("LULU", "Consumer Discretionary"),
            SectorRef::new("KO", "Consumer Staples"),
            SectorRef::new("XOM", "Energy"),
        ])
        .await;

    let quarters = [
        day(2023, 9, 30)?,
        day(2023, 12, 31)?,
        day(2024, 3, 31)?,
        day(2024, 6, 30)?,
    ];
    let growth: [&[(&str, i64, i64)]; 4] = [
        &[("AAPL", 1000, 180_000), ("KO", 2000, 120_000), ("XOM", 900, 95_000)],
        &[("AAPL", 1200, 230_000), ("KO", 1800, 108_000), ("XOM", 600, 62_000), ("NVDA", 100, 50_000)],
        &[("AAPL", 1400, 240_000), ("KO", 1500, 90_000), ("XOM", 300, 33_000), ("NVDA", 250, 220_000)],
        &[("AAPL", 1500, 320_000), ("KO", 1500, 95_000), ("NVDA", 400, 480_000), ("LULULEMON ATHLETICA", 120, 41_000)],
    ];
    let value: [&[(&str, i64, i64)]; 4] = [
        &[("KO", 5000, 300_000), ("XOM", 2000, 210_000)],
        &[("KO", 5200, 320_000), ("XOM", 2000, 205_000)],
        &[("KO", 5400, 335_000), ("XOM", 2100, 220_000), ("MSFT", 50, 20_000)],
        &[("KO", 5600, 350_000), ("XOM", 2100, 230_000), ("MSFT", 40, 17_000)],
    ];
    for (i, on) in quarters.iter().enumerate() {
        add_quarter(&store, "growth-fund", &format!("g{i}"), *on, growth[i]).await;
        add_quarter(&store, "value-fund", &format!("v{i}"), *on, value[i]).await;
    }

    let engine = FwEngine::builder()
        .store(store.clone())
        .sink(store.clone())
        .build()?;

    // 2. Diff and analyse both funds concurrently.
    let funds = ["growth-fund", "value-fund"];
    let tasks = funds.iter().map(|fund| {
        let engine = engine.clone();
        async move {
            let deltas = engine.diff(*fund).persist(true).compute().await?;
            engine.strategic(*fund, &deltas).run().await
        }
    });
    let reports = futures::future::join_all(tasks).await;

    // 3. Print a short summary per fund, then the full first report as JSON.
    for report in &reports {
        let report = report.as_ref().map_err(|e| e.to_string())?;
        let s = &report.summary;
        println!("--- {} ({:?} vs {:?}) ---", report.fund_id, report.filing_id_new, report.filing_id_old);
        println!("Portfolio value: {}k", s.latest_portfolio_value);
        println!("Gross activity:  {}k (in {}k / out {}k)", s.gross_activity_value, s.net_inflow, s.net_outflow);
        println!(
            "Strong moves: {}, exits: {}, new positions: {}, rotation: {}",
            s.strong_conviction_count, s.exit_count, s.new_position_count, s.sector_rotation_detected
        );
        for d in &report.all_movements {
            println!(
                "  {:<22} {:<9} {:>6.2}%  {:?}  streak={:?}  sector={}",
                d.security_id(),
                d.action(),
                d.portfolio_impact_pct,
                d.conviction_level,
                d.trend_streak_length,
                d.sector.as_deref().unwrap_or("Unknown"),
            );
        }
        for flow in &report.sector_flows.filtered {
            println!("  sector {:<24} net {:>8}k ({:+.1}%)", flow.sector, flow.net_flow, flow.net_flow_pct);
        }
        println!();
    }

    if let Some(Ok(first)) = reports.first() {
        println!("{}", serde_json::to_string_pretty(first)?);
    }

    Ok(())
}
