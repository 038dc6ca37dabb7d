//! Grouping of raw per-instrument, per-date rows into the series the engines take.
//!
//! Duplicate rows for the same instrument on the same date are resolved
//! first-wins everywhere in this module.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use analysis_core::{Instrument, PricePoint, PriceRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::returns::returns;

/// One instrument's history, ascending by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSeries {
    pub instrument: Instrument,
    pub points: Vec<PricePoint>,
}

impl InstrumentSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

/// Rows on each calendar date, at most one per instrument.
pub fn index_by_date(rows: &[PriceRow]) -> BTreeMap<NaiveDate, Vec<&PriceRow>> {
    let mut seen: HashSet<(i64, NaiveDate)> = HashSet::new();
    let mut by_date: BTreeMap<NaiveDate, Vec<&PriceRow>> = BTreeMap::new();

    for row in rows {
        if seen.insert((row.instrument_id(), row.date())) {
            by_date.entry(row.date()).or_default().push(row);
        }
    }
    by_date
}

/// Split rows per instrument, in the order instruments first appear.
pub fn group_by_instrument(rows: &[PriceRow]) -> Vec<InstrumentSeries> {
    let mut order: Vec<i64> = Vec::new();
    let mut grouped: HashMap<i64, InstrumentSeries> = HashMap::new();
    let mut seen: HashSet<(i64, NaiveDate)> = HashSet::new();

    for row in rows {
        let id = row.instrument_id();
        if !seen.insert((id, row.date())) {
            continue;
        }
        grouped
            .entry(id)
            .or_insert_with(|| {
                order.push(id);
                InstrumentSeries {
                    instrument: row.instrument.clone(),
                    points: Vec::new(),
                }
            })
            .points
            .push(row.point.clone());
    }

    order
        .into_iter()
        .filter_map(|id| grouped.remove(&id))
        .map(|mut series| {
            series.points.sort_by_key(|p| p.date);
            series
        })
        .collect()
}

/// Close series per requested instrument over the sorted union of all dates.
///
/// Dates an instrument has no row for are skipped for that instrument, not
/// filled. Instruments with no rows at all are left out, and a repeated id
/// yields one series.
pub fn aligned_closes(rows: &[PriceRow], instrument_ids: &[i64]) -> Vec<(Instrument, Vec<f64>)> {
    let by_date = index_by_date(rows);
    let dates: BTreeSet<NaiveDate> = by_date.keys().copied().collect();
    let mut requested: HashSet<i64> = HashSet::new();

    instrument_ids
        .iter()
        .filter(|&&id| requested.insert(id))
        .filter_map(|&id| {
            let mut instrument = None;
            let mut closes = Vec::new();
            for date in &dates {
                if let Some(row) = by_date[date].iter().find(|r| r.instrument_id() == id) {
                    instrument.get_or_insert_with(|| row.instrument.clone());
                    closes.push(row.point.close);
                }
            }
            instrument.map(|inst| (inst, closes))
        })
        .collect()
}

/// Returns of [`aligned_closes`], keeping only instruments with more than one close.
pub fn aligned_returns(rows: &[PriceRow], instrument_ids: &[i64]) -> Vec<(Instrument, Vec<f64>)> {
    aligned_closes(rows, instrument_ids)
        .into_iter()
        .filter(|(_, closes)| closes.len() > 1)
        .map(|(inst, closes)| (inst, returns(&closes)))
        .collect()
}
