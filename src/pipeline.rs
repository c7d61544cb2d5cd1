/// DensityRiskPipeline: one (station, date) selection in, one report out.
///
/// `DensityRiskPipeline::run` is pure. It takes already-validated
/// observation sets and returns the full result record. `run_for_date`
/// wraps it with the I/O: fetch the current day (terminal on failure),
/// fetch the baseline years (isolated per year), attach sun times.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use log::{info, warn};
use serde::Serialize;

use crate::analysis::density_grid::{build_density_grid, DensityGrid};
use crate::analysis::groupings::{aggregate_by_time_of_day, TimeOfDayMean};
use crate::analysis::risk::{score, RiskOutcome};
use crate::astro::SunCalculator;
use crate::config::PipelineSettings;
use crate::ingest::baseline::{baseline_dates, fetch_baseline, SkippedBaseline};
use crate::ingest::vpts::VptsSource;
use crate::model::{DataFetchError, ObservationSet, StationContext, SunTimes};

/// Result record handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub station: StationContext,
    pub date: NaiveDate,
    pub band_offset_m: f64,
    /// Legend entry for the current-day curve, e.g. "Density 20230501".
    pub current_label: String,
    /// Legend entry for the baseline curve; `None` when no baseline year loaded.
    pub baseline_label: Option<String>,
    /// Years pooled into the baseline, ascending.
    pub baseline_years: Vec<i32>,
    pub current_series: Vec<TimeOfDayMean>,
    pub baseline_series: Vec<TimeOfDayMean>,
    /// Current day only.
    pub density_grid: DensityGrid,
    pub peak_headline: Option<String>,
    pub current_risk: RiskOutcome,
    pub baseline_risk: RiskOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityRiskPipeline {
    band_offset_m: f64,
}

impl DensityRiskPipeline {
    pub fn new(band_offset_m: f64) -> Self {
        Self { band_offset_m }
    }

    pub fn band_offset_m(&self) -> f64 {
        self.band_offset_m
    }

    /// Runs every transformation over one current day and its baseline.
    ///
    /// Baseline sets are pooled in date order whatever order they arrive
    /// in, so the report depends only on which years are present.
    pub fn run(
        &self,
        station: &StationContext,
        current: &ObservationSet,
        baseline: &[ObservationSet],
    ) -> PipelineReport {
        let mut ordered: Vec<&ObservationSet> = baseline.iter().collect();
        ordered.sort_by_key(|set| set.date);
        let baseline_years: Vec<i32> = ordered.iter().map(|set| set.date.year()).collect();
        let pooled = ObservationSet::concat(ordered);

        let density_grid = build_density_grid(&current.readings);
        let peak_headline = density_grid.peak.as_ref().map(|p| p.headline());

        PipelineReport {
            station: station.clone(),
            date: current.date,
            band_offset_m: self.band_offset_m,
            current_label: current_label(current.date),
            baseline_label: baseline_label(&baseline_years),
            current_series: aggregate_by_time_of_day(&current.readings),
            baseline_series: aggregate_by_time_of_day(&pooled),
            density_grid,
            peak_headline,
            current_risk: score(&current.readings, station, self.band_offset_m),
            baseline_risk: score(&pooled, station, self.band_offset_m),
            baseline_years,
        }
    }
}

impl Default for DensityRiskPipeline {
    fn default() -> Self {
        Self::new(crate::model::DEFAULT_BAND_OFFSET_M)
    }
}

pub fn current_label(date: NaiveDate) -> String {
    format!("Density {}", date.format("%Y%m%d"))
}

/// "Mean density 2021-2023" over the years actually pooled.
pub fn baseline_label(years: &[i32]) -> Option<String> {
    let first = years.iter().min()?;
    let last = years.iter().max()?;
    if first == last {
        Some(format!("Mean density {}", first))
    } else {
        Some(format!("Mean density {}-{}", first, last))
    }
}

/// The most recent date the archive is expected to hold complete files for.
pub fn default_report_date(today: NaiveDate, latency_days: u32) -> NaiveDate {
    today - Duration::days(i64::from(latency_days))
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// `PipelineReport` plus what the I/O stage learned along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    #[serde(flatten)]
    pub report: PipelineReport,
    pub skipped_baselines: Vec<SkippedBaseline>,
    pub sun_times: Option<SunTimes>,
}

/// Fetches everything one selection needs and runs the pipeline.
///
/// # Errors
/// Returns the `DataFetchError` of the current day if it cannot be loaded.
/// Baseline failures never surface here; they are listed in
/// `DailyReport::skipped_baselines`.
pub fn run_for_date(
    source: Arc<dyn VptsSource>,
    sun: &dyn SunCalculator,
    station: &StationContext,
    date: NaiveDate,
    settings: &PipelineSettings,
) -> Result<DailyReport, DataFetchError> {
    info!("Running density risk pipeline for {} on {}", station.station_id, date);

    let current = source.fetch_day(&station.station_id, date)?;

    let dates = baseline_dates(date, settings.baseline_years);
    let baseline = fetch_baseline(
        Arc::clone(&source),
        &station.station_id,
        &dates,
        settings.fetch_workers,
    );
    if baseline.sets.is_empty() && !dates.is_empty() {
        warn!(
            "No baseline year available for {} on {}; comparison curve will be empty",
            station.station_id, date
        );
    }

    let report = DensityRiskPipeline::new(settings.band_offset_m).run(station, &current, &baseline.sets);

    Ok(DailyReport {
        report,
        skipped_baselines: baseline.skipped,
        sun_times: sun.sun_times(station, date),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
