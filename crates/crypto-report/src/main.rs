//! crypto-report: run one analytics report over a JSON price export and print it.
//!
//! The input file is a JSON array of price rows, each carrying its instrument
//! (`{"instrument": {"id", "symbol", "name"}, "date", "open", "high", "low",
//! "close", "volume", "marketCap"}`).
//!
//! Usage:
//!   cargo run -p crypto-report -- prices.json trends --days 30
//!   cargo run -p crypto-report -- prices.json correlations --ids 1,2,3
//!   cargo run -p crypto-report -- prices.json predictions --id 1

use analysis_core::PriceRow;
use analysis_orchestrator::{AnalyticsService, InMemoryRepository, ServiceConfig};
use anyhow::{bail, Context};
use std::sync::Arc;

const USAGE: &str = "usage: crypto-report <rows.json> <trends|volatility|correlations|seasonal|dominance|predictions> [--id N] [--ids N,N] [--days N]";

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_ids(raw: &str) -> anyhow::Result<Vec<i64>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<i64>().with_context(|| format!("invalid instrument id {:?}", s)))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crypto_report=info,analysis_orchestrator=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
    let config = ServiceConfig::from_env();

    let args: Vec<String> = std::env::args().collect();
    let (Some(path), Some(report)) = (args.get(1), args.get(2)) else {
        bail!(USAGE);
    };

    let days = flag_value(&args, "--days")
        .map(|d| d.parse::<u32>().with_context(|| format!("invalid --days {:?}", d)))
        .transpose()?;
    let id = flag_value(&args, "--id")
        .map(|d| d.parse::<i64>().with_context(|| format!("invalid --id {:?}", d)))
        .transpose()?;
    let ids = flag_value(&args, "--ids").map(parse_ids).transpose()?;

    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let rows: Vec<PriceRow> = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;
    tracing::info!("Loaded {} price rows from {}", rows.len(), path);

    let service = AnalyticsService::with_config(Arc::new(InMemoryRepository::from_rows(rows)), config);
    let ids = ids.as_deref();
    let require_id = || id.context("this report needs --id");

    let output = match report.as_str() {
        "trends" => serde_json::to_string_pretty(&service.trends(ids, days).await?)?,
        "volatility" => serde_json::to_string_pretty(&service.volatility(ids, days).await?)?,
        "correlations" => serde_json::to_string_pretty(&service.correlations(ids, days).await?)?,
        "seasonal" => serde_json::to_string_pretty(&service.seasonal(require_id()?, days).await?)?,
        "dominance" => serde_json::to_string_pretty(&service.dominance(days).await?)?,
        "predictions" => serde_json::to_string_pretty(&service.predictions(require_id()?, days).await?)?,
        other => bail!("unknown report {:?}\n{}", other, USAGE),
    };

    println!("{}", output);
    Ok(())
}
