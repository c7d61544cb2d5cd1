/// Time-of-day grouping of vertical-profile readings.
///
/// `aggregate_by_time_of_day` collapses a flat list of `DensityReading`s onto
/// the diel cycle: every reading is keyed by its wall-clock time (second
/// resolution, date discarded) and the densities sharing a key are averaged.
/// All heights at one time fold into a single value, so the result answers
/// "how much bird density at this time of day", not "at this height".
///
/// The same function serves both curves of the comparison chart: the current
/// day, and the baseline years pooled together with `ObservationSet::concat`.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Serialize;

use crate::model::{DensityReading, TIME_OF_DAY_FORMAT};

/// Mean density for one time-of-day key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeOfDayMean {
    pub time_of_day: NaiveTime,
    pub mean_density: f64,
    /// Readings that contributed to the mean.
    pub count: usize,
}

impl TimeOfDayMean {
    /// `HH:MM:SS` label used on the chart x-axis.
    pub fn label(&self) -> String {
        self.time_of_day.format(TIME_OF_DAY_FORMAT).to_string()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Groups readings by time of day and averages density per key.
///
/// Output is sorted ascending by key. Keys with no readings are simply
/// absent; nothing is interpolated or zero-filled, and two series produced
/// by this function are never reindexed against each other. An empty input
/// yields an empty series.
pub fn aggregate_by_time_of_day(readings: &[DensityReading]) -> Vec<TimeOfDayMean> {
    let mut grouped: BTreeMap<NaiveTime, Vec<f64>> = BTreeMap::new();

    for reading in readings {
        grouped
            .entry(reading.time_of_day())
            .or_default()
            .push(reading.density);
    }

    grouped
        .into_iter()
        .map(|(time_of_day, mut densities)| {
            // Sorted before summing so the mean does not depend on input order.
            densities.sort_by(f64::total_cmp);
            let count = densities.len();
            let sum: f64 = densities.iter().sum();
            TimeOfDayMean {
                time_of_day,
                mean_density: sum / count as f64,
                count,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
