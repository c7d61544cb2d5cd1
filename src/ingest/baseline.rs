/// Baseline retrieval: the same calendar day in prior years.
///
/// Baseline years are fetched concurrently on a small worker pool. The
/// caller blocks until every job has reported (the channel closes only when
/// all workers have dropped their sender), so aggregation never sees a
/// partial baseline. A year that fails to load is excluded and reported in
/// `skipped`; it never fails the run.

use std::sync::Arc;
use std::sync::mpsc;

use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use threadpool::ThreadPool;

use super::vpts::VptsSource;
use crate::model::ObservationSet;

/// A baseline year that was left out of the comparison, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedBaseline {
    pub year: i32,
    pub date: NaiveDate,
    pub reason: String,
}

/// Outcome of a baseline fetch. `sets` follows the order of the requested
/// dates, minus the skipped ones.
#[derive(Debug, Clone, Default)]
pub struct BaselineFetch {
    pub sets: Vec<ObservationSet>,
    pub skipped: Vec<SkippedBaseline>,
}

impl BaselineFetch {
    /// Years that made it into the baseline, in request order.
    pub fn years(&self) -> Vec<i32> {
        self.sets.iter().map(|s| s.date.year()).collect()
    }
}

/// Returns the same month/day in each of the `years` preceding `date`,
/// most recent first. Feb 29 maps to Feb 28 in non-leap years.
pub fn baseline_dates(date: NaiveDate, years: u32) -> Vec<NaiveDate> {
    (1..=years as i32)
        .filter_map(|back| {
            let year = date.year() - back;
            date.with_year(year)
                .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        })
        .collect()
}

/// Fetches every requested baseline date on `workers` threads and waits for
/// all of them.
pub fn fetch_baseline(
    source: Arc<dyn VptsSource>,
    station_id: &str,
    dates: &[NaiveDate],
    workers: usize,
) -> BaselineFetch {
    if dates.is_empty() {
        return BaselineFetch::default();
    }

    let pool = ThreadPool::new(workers.clamp(1, dates.len()));
    let (tx, rx) = mpsc::channel();

    for (idx, &date) in dates.iter().enumerate() {
        let tx = tx.clone();
        let source = Arc::clone(&source);
        let station_id = station_id.to_string();
        pool.execute(move || {
            let result = source.fetch_day(&station_id, date);
            // Receiver outlives the pool; a send error means the caller is gone.
            let _ = tx.send((idx, result));
        });
    }
    drop(tx);

    let mut results: Vec<Option<Result<ObservationSet, String>>> = vec![None; dates.len()];
    for (idx, result) in rx.iter() {
        results[idx] = Some(result.map_err(|e| e.to_string()));
    }

    let mut fetch = BaselineFetch::default();
    for (date, result) in dates.iter().zip(results) {
        match result {
            Some(Ok(set)) => {
                info!("Baseline {} loaded ({} readings)", date, set.len());
                fetch.sets.push(set);
            }
            Some(Err(reason)) => {
                warn!("Baseline {} skipped: {}", date, reason);
                fetch.skipped.push(SkippedBaseline {
                    year: date.year(),
                    date: *date,
                    reason,
                });
            }
            None => {
                warn!("Baseline {} skipped: worker exited without a result", date);
                fetch.skipped.push(SkippedBaseline {
                    year: date.year(),
                    date: *date,
                    reason: "fetch worker exited without a result".to_string(),
                });
            }
        }
    }

    fetch
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
