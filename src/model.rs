/// Core data types for the bird-migration risk service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O: only types, the derived keys the analysis groups on,
/// and the error enums raised at the data-source boundary.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Height of the rotor-risk band above the station, in meters.
pub const DEFAULT_BAND_OFFSET_M: f64 = 200.0;

/// Number of prior years averaged into the baseline curve.
pub const DEFAULT_BASELINE_YEARS: u32 = 3;

/// Format of the `time_of_day` grouping key.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One vertical-profile bin: bird density at a height for a radar scan.
///
/// Corresponds to one row of a vpts CSV file after validation; rows whose
/// `dens` was empty or NaN never become a `DensityReading`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityReading {
    pub timestamp: DateTime<Utc>,
    /// Meters above ground.
    pub height: f64,
    /// Birds per unit volume.
    pub density: f64,
}

impl DensityReading {
    pub fn new(timestamp: DateTime<Utc>, height: f64, density: f64) -> Self {
        Self {
            timestamp,
            height,
            density,
        }
    }

    /// The diel-cycle key: wall-clock time at second resolution, date dropped.
    pub fn time_of_day(&self) -> NaiveTime {
        let time = self.timestamp.time();
        time.with_nanosecond(0).unwrap_or(time)
    }
}

/// All readings for one station on one calendar day, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSet {
    pub station_id: String,
    pub date: NaiveDate,
    pub readings: Vec<DensityReading>,
}

impl ObservationSet {
    pub fn new(station_id: impl Into<String>, date: NaiveDate, readings: Vec<DensityReading>) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            readings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Concatenates the readings of several sets in the order given.
    ///
    /// Used to blend baseline years into one pool before aggregation.
    pub fn concat<'a>(sets: impl IntoIterator<Item = &'a ObservationSet>) -> Vec<DensityReading> {
        sets.into_iter()
            .flat_map(|set| set.readings.iter().copied())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Station types
// ---------------------------------------------------------------------------

/// Radar station metadata, as stored in the `radar_sites` warehouse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationContext {
    /// Five-letter ODIM radar code, e.g. "bejab".
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level.
    pub elevation: f64,
}

/// Altitude range treated as the rotor-swept zone. Both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalBand {
    pub lower: f64,
    pub upper: f64,
}

impl CriticalBand {
    pub fn from_station(station: &StationContext, band_offset_m: f64) -> Self {
        Self {
            lower: station.elevation,
            upper: station.elevation + band_offset_m,
        }
    }

    pub fn contains(&self, height: f64) -> bool {
        self.lower <= height && height <= self.upper
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Density totals for one observation pool and the share inside the band.
///
/// Only constructed when `total_density > 0`; see `RiskError`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total_density: f64,
    pub critical_density: f64,
    pub risk_fraction: f64,
}

impl RiskSummary {
    /// Risk fraction scaled to percent. Not clamped: values above 100 are
    /// legitimate for wide bands.
    pub fn risk_percentage(&self) -> f64 {
        self.risk_fraction * 100.0
    }
}

/// Sunrise and sunset for a station and date, used for chart annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while retrieving or validating a vpts CSV resource.
#[derive(Debug, Error)]
pub enum VptsError {
    /// Non-2xx HTTP response from the object store.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// A required column is absent from the CSV header.
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    /// A cell that must hold a value could not be interpreted.
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    /// The body is not decodable as CSV at all.
    #[error("CSV decode error: {0}")]
    Decode(String),
}

/// A failed fetch, tagged with the resource and parameters that failed.
#[derive(Debug, Error)]
#[error("failed to load vpts for station {station_id} on {date} from {url}: {source}")]
pub struct DataFetchError {
    pub station_id: String,
    pub date: NaiveDate,
    pub url: String,
    #[source]
    pub source: VptsError,
}

/// Computation errors. Recoverable: the run completes and flags the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RiskError {
    /// The pool holds no bird density at all, so no fraction exists.
    #[error("risk undefined: total density is zero")]
    DivisionUndefined,
    /// The densities are individually finite but their sum overflows.
    #[error("risk undefined: density sum is not finite")]
    NonFiniteTotal,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
