/// Behavioural properties of the density risk pipeline, exercised through
/// the public API only.
///
/// Covers grouping, risk scoring, band bounds, peak tie-breaking,
/// idempotence and baseline-order independence.
///
/// Run with: cargo test --test pipeline_properties

use approx::assert_relative_eq;
use chrono::{NaiveDate, TimeZone, Utc};

use birdrisk_service::analysis::density_grid::build_density_grid;
use birdrisk_service::analysis::groupings::aggregate_by_time_of_day;
use birdrisk_service::analysis::risk::compute_risk;
use birdrisk_service::model::{DensityReading, ObservationSet, RiskError, StationContext};
use birdrisk_service::pipeline::DensityRiskPipeline;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reading(day: u32, h: u32, m: u32, s: u32, height: f64, density: f64) -> DensityReading {
    DensityReading::new(Utc.with_ymd_and_hms(2024, 9, day, h, m, s).unwrap(), height, density)
}

fn station(elevation: f64) -> StationContext {
    StationContext {
        station_id: "nohur".to_string(),
        latitude: 59.6269,
        longitude: 10.5658,
        elevation,
    }
}

fn year_set(year: i32, densities: &[f64]) -> ObservationSet {
    let date = NaiveDate::from_ymd_opt(year, 9, 12).unwrap();
    let readings = densities
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            DensityReading::new(
                Utc.with_ymd_and_hms(year, 9, 12, 22, (i % 3) as u32 * 5, 0).unwrap(),
                (i as f64) * 100.0,
                d,
            )
        })
        .collect();
    ObservationSet::new("nohur", date, readings)
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[test]
fn test_grouping_averages_per_second() {
    let readings = vec![
        reading(12, 10, 0, 0, 100.0, 4.0),
        reading(12, 10, 0, 0, 300.0, 6.0),
        reading(12, 10, 0, 1, 100.0, 5.0),
    ];

    let series = aggregate_by_time_of_day(&readings);

    let labels: Vec<_> = series.iter().map(|m| (m.label(), m.mean_density)).collect();
    assert_eq!(
        labels,
        vec![("10:00:00".to_string(), 5.0), ("10:00:01".to_string(), 5.0)]
    );
}

#[test]
fn test_grouping_collapses_days_onto_one_cycle() {
    let readings = vec![reading(12, 23, 0, 0, 0.0, 2.0), reading(13, 23, 0, 0, 0.0, 4.0)];
    let series = aggregate_by_time_of_day(&readings);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].mean_density, 3.0);
    assert_eq!(series[0].count, 2);
}

#[test]
fn test_grouping_empty_is_valid() {
    assert!(aggregate_by_time_of_day(&[]).is_empty());
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[test]
fn test_risk_happy_path() {
    let readings = vec![
        reading(12, 0, 0, 0, 50.0, 10.0),
        reading(12, 0, 0, 0, 150.0, 20.0),
        reading(12, 0, 0, 0, 400.0, 5.0),
    ];

    let summary = compute_risk(&readings, &station(100.0), 200.0).expect("total is 35");

    assert_eq!(summary.total_density, 35.0);
    assert_eq!(summary.critical_density, 20.0);
    assert_relative_eq!(summary.risk_fraction, 0.5714, epsilon = 1e-4);
    assert_relative_eq!(summary.risk_percentage(), 57.14, epsilon = 1e-2);
}

#[test]
fn test_risk_zero_total_is_explicit() {
    let readings = vec![reading(12, 0, 0, 0, 150.0, 0.0)];
    let result = compute_risk(&readings, &station(100.0), 200.0);
    assert_eq!(result, Err(RiskError::DivisionUndefined));
}

#[test]
fn test_risk_band_edges_included() {
    let readings = vec![
        reading(12, 0, 0, 0, 100.0, 1.0),
        reading(12, 0, 0, 0, 300.0, 1.0),
    ];
    let summary = compute_risk(&readings, &station(100.0), 200.0).unwrap();
    assert_eq!(summary.critical_density, 2.0);
    assert_eq!(summary.risk_fraction, 1.0);
}

// ---------------------------------------------------------------------------
// Peak
// ---------------------------------------------------------------------------

#[test]
fn test_peak_ties_resolve_to_first_in_input() {
    let readings = vec![
        reading(12, 22, 0, 0, 500.0, 3.0),
        reading(12, 22, 5, 0, 200.0, 8.0),
        reading(12, 22, 10, 0, 700.0, 8.0),
    ];

    for _ in 0..5 {
        let peak = build_density_grid(&readings).peak.expect("non-empty");
        assert_eq!(peak.index, 1);
        assert_eq!(peak.height, 200.0);
    }
}

// ---------------------------------------------------------------------------
// Whole pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_pipeline_is_idempotent() {
    let current = year_set(2024, &[0.1, 2.7, 3.3, 0.0, 9.9, 1.25]);
    let baseline = vec![
        year_set(2023, &[1.0, 0.3, 0.7]),
        year_set(2022, &[2.2, 0.1]),
        year_set(2021, &[0.7, 0.7, 0.3, 0.9]),
    ];
    let pipeline = DensityRiskPipeline::new(200.0);

    let a = pipeline.run(&station(0.0), &current, &baseline);
    let b = pipeline.run(&station(0.0), &current, &baseline);

    assert_eq!(a, b);
    let bits = |r: &birdrisk_service::pipeline::PipelineReport| -> Vec<u64> {
        r.current_series
            .iter()
            .chain(&r.baseline_series)
            .map(|m| m.mean_density.to_bits())
            .collect()
    };
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn test_baseline_order_does_not_matter() {
    let current = year_set(2024, &[1.0, 2.0, 3.0]);
    let y1 = year_set(2023, &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    let y2 = year_set(2022, &[1.7, 0.03, 2.9]);
    let y3 = year_set(2021, &[0.333, 0.777, 0.111, 0.999]);

    let pipeline = DensityRiskPipeline::default();
    let forward = pipeline.run(&station(0.0), &current, &[y1.clone(), y2.clone(), y3.clone()]);
    let shuffled = pipeline.run(&station(0.0), &current, &[y3, y1, y2]);

    assert_eq!(forward.baseline_series, shuffled.baseline_series);
    assert_eq!(forward.baseline_risk, shuffled.baseline_risk);
    assert_eq!(forward.baseline_label.as_deref(), Some("Mean density 2021-2023"));
}

#[test]
fn test_grouping_order_independent_without_pipeline_sorting() {
    let a = year_set(2023, &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    let b = year_set(2022, &[1.7, 0.03, 2.9, 1e-9, 1e9, 0.3]);

    let ab = aggregate_by_time_of_day(&ObservationSet::concat([&a, &b]));
    let ba = aggregate_by_time_of_day(&ObservationSet::concat([&b, &a]));

    assert_eq!(ab, ba);
}
