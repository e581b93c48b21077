use serde::Serialize;

use satscan_core::{read_hit_records, Balance, ProviderId, UtcDateTime};

use crate::cli::HitsArgs;
use crate::error::CliError;

/// Hit row without secret material.
#[derive(Debug, Serialize)]
struct HitSummary {
    address: String,
    balance: String,
    balance_sats: u64,
    provider: ProviderId,
    timestamp: UtcDateTime,
}

#[derive(Debug, Serialize)]
struct HitsResponseData {
    path: String,
    count: usize,
    total_sats: u64,
    total_btc: String,
    hits: Vec<HitSummary>,
}

pub fn run(args: &HitsArgs) -> Result<serde_json::Value, CliError> {
    let records = if args.output.exists() {
        read_hit_records(&args.output)?
    } else {
        Vec::new()
    };

    let total_sats = records
        .iter()
        .fold(0_u64, |total, record| total.saturating_add(record.balance_sats));
    let hits = records
        .into_iter()
        .map(|record| HitSummary {
            address: record.address,
            balance: Balance::from_sats(record.balance_sats).to_string(),
            balance_sats: record.balance_sats,
            provider: record.provider,
            timestamp: record.timestamp,
        })
        .collect::<Vec<_>>();

    Ok(serde_json::to_value(HitsResponseData {
        path: args.output.display().to_string(),
        count: hits.len(),
        total_sats,
        total_btc: Balance::from_sats(total_sats).to_string(),
        hits,
    })?)
}
