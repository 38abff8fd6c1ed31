//! Leaderboard export — CSV and JSON artifact generation.

use crate::ranker::InstrumentScore;
use crate::recent::RecentRipple;
use anyhow::{Context, Result};
use std::path::Path;

/// Full leaderboard CSV: `stock_id,mean_rise_ripples,mean_fall_ripples`.
pub fn leaderboard_to_csv(scores: &[InstrumentScore]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["stock_id", "mean_rise_ripples", "mean_fall_ripples"])?;
    for score in scores {
        wtr.write_record([
            score.stock_id.as_str(),
            &format!("{:.4}", score.mean_rise_ratio),
            &format!("{:.4}", score.mean_fall_ratio),
        ])?;
    }
    into_string(wtr)
}

/// Rise-only leaderboard CSV: `stock_id,mean_ripple_ratio`.
pub fn rise_leaderboard_to_csv(scores: &[InstrumentScore]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["stock_id", "mean_ripple_ratio"])?;
    for score in scores {
        wtr.write_record([
            score.stock_id.as_str(),
            &format!("{:.4}", score.mean_rise_ratio),
        ])?;
    }
    into_string(wtr)
}

/// Recent-scan CSV: `stock_id,ripple_ratio` (signed).
pub fn recent_to_csv(ripples: &[RecentRipple]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["stock_id", "ripple_ratio"])?;
    for r in ripples {
        wtr.write_record([r.stock_id.as_str(), &format!("{:.4}", r.ripple_ratio)])?;
    }
    into_string(wtr)
}

/// Pretty JSON for downstream tooling.
pub fn leaderboard_to_json(scores: &[InstrumentScore]) -> Result<String> {
    serde_json::to_string_pretty(scores).context("failed to serialize leaderboard to JSON")
}

pub fn write_leaderboard_csv(path: &Path, scores: &[InstrumentScore]) -> Result<()> {
    std::fs::write(path, leaderboard_to_csv(scores)?)
        .with_context(|| format!("writing leaderboard to {}", path.display()))
}

pub fn write_recent_csv(path: &Path, ripples: &[RecentRipple]) -> Result<()> {
    std::fs::write(path, recent_to_csv(ripples)?)
        .with_context(|| format!("writing recent scan to {}", path.display()))
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
