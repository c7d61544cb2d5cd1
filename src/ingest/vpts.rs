/// Vertical-profile time series (vpts) client for the aloft object store.
///
/// Handles URL construction, HTTP retrieval, and CSV validation for the
/// daily vpts files published per radar:
///   https://aloftdata.s3-eu-west-1.amazonaws.com/baltrad/daily/{radar}/{yyyy}/{radar}_vpts_{yyyymmdd}.csv
///
/// The parser is the boundary where loosely typed CSV becomes
/// `DensityReading`s: missing columns and non-numeric cells fail fast with a
/// named `VptsError`, while bins without a density value are dropped. See
/// `fixtures.rs` for annotated examples of the file layout.

use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use log::{debug, info};

use crate::model::{DataFetchError, DensityReading, ObservationSet, VptsError};

pub const DEFAULT_BASE_URL: &str = "https://aloftdata.s3-eu-west-1.amazonaws.com/baltrad/daily";

const COL_DATETIME: &str = "datetime";
const COL_HEIGHT: &str = "height";
const COL_DENS: &str = "dens";

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the object-store URL of one station's vpts file for one day.
///
/// # Example
/// ```
/// use birdrisk_service::ingest::vpts::{build_daily_url, DEFAULT_BASE_URL};
/// use chrono::NaiveDate;
///
/// let url = build_daily_url(
///     DEFAULT_BASE_URL,
///     "bejab",
///     NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
/// );
/// assert!(url.ends_with("/bejab/2023/bejab_vpts_20230501.csv"));
/// ```
pub fn build_daily_url(base_url: &str, station_id: &str, date: NaiveDate) -> String {
    let station = urlencoding::encode(station_id);
    format!(
        "{}/{}/{}/{}_vpts_{}.csv",
        base_url.trim_end_matches('/'),
        station,
        date.year(),
        station,
        date.format("%Y%m%d")
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a vpts CSV body into an `ObservationSet`, keeping source order.
///
/// Only `datetime`, `height` and `dens` are read; any other columns are
/// ignored. Naive timestamps are taken as UTC.
///
/// # Errors
/// - `VptsError::MissingColumn` - one of the three required columns is absent.
/// - `VptsError::InvalidValue` - unparseable timestamp, a height that is not
///   a finite non-negative number, or a density that is negative, infinite,
///   or not a number at all.
/// - `VptsError::Decode` - the body is not readable as CSV.
///
/// Empty and `NaN`/`NA` density cells are skipped, not errors.
pub fn parse_vpts_csv(body: &str, station_id: &str, date: NaiveDate) -> Result<ObservationSet, VptsError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| VptsError::Decode(e.to_string()))?
        .clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim_matches('"') == name)
            .ok_or(VptsError::MissingColumn(name))
    };
    let datetime_idx = column(COL_DATETIME)?;
    let height_idx = column(COL_HEIGHT)?;
    let dens_idx = column(COL_DENS)?;

    let mut readings = Vec::new();
    let mut skipped_bins = 0usize;

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| VptsError::Decode(e.to_string()))?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let raw_dens = cell(dens_idx);
        if is_missing(raw_dens) {
            skipped_bins += 1;
            continue;
        }

        let raw_time = cell(datetime_idx);
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| VptsError::InvalidValue {
            row,
            column: COL_DATETIME,
            value: raw_time.to_string(),
        })?;

        let raw_height = cell(height_idx);
        let height = raw_height
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && *h >= 0.0)
            // `-0` passes the check; adding 0.0 folds it into +0.0.
            .map(|h| h + 0.0)
            .ok_or_else(|| VptsError::InvalidValue {
                row,
                column: COL_HEIGHT,
                value: raw_height.to_string(),
            })?;

        let density = raw_dens
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| VptsError::InvalidValue {
                row,
                column: COL_DENS,
                value: raw_dens.to_string(),
            })?;

        readings.push(DensityReading::new(timestamp, height, density));
    }

    if skipped_bins > 0 {
        debug!(
            "{} {}: dropped {} bins without density",
            station_id, date, skipped_bins
        );
    }

    Ok(ObservationSet::new(station_id, date, readings))
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("na")
}

/// Accepts RFC 3339 (`2023-05-01T00:05:00Z`) and the naive layouts pandas
/// writes when a frame is round-tripped without a timezone.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y%m%dT%H%M",
    ];

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Anything that can deliver one station-day of vertical profiles.
///
/// The pipeline orchestration only talks to this trait so baseline fetching
/// can run on worker threads and tests can substitute canned data.
pub trait VptsSource: Send + Sync {
    fn fetch_day(&self, station_id: &str, date: NaiveDate) -> Result<ObservationSet, DataFetchError>;
}

/// `VptsSource` backed by the public object store over HTTPS.
pub struct HttpVptsSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpVptsSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, VptsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VptsError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::blocking::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_text(&self, url: &str) -> Result<String, VptsError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/csv")
            .send()
            .map_err(|e| VptsError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VptsError::HttpStatus(response.status().as_u16()));
        }

        response
            .text()
            .map_err(|e| VptsError::Transport(e.to_string()))
    }
}

impl VptsSource for HttpVptsSource {
    fn fetch_day(&self, station_id: &str, date: NaiveDate) -> Result<ObservationSet, DataFetchError> {
        let url = build_daily_url(&self.base_url, station_id, date);
        info!("Loading vpts from {}", url);

        self.fetch_text(&url)
            .and_then(|body| parse_vpts_csv(&body, station_id, date))
            .map_err(|source| DataFetchError {
                station_id: station_id.to_string(),
                date,
                url: url.clone(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
