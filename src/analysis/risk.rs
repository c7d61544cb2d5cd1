/// Rotor-zone risk scoring.
///
/// The risk of a day is the share of all bird density recorded that day
/// which sits inside the critical band, [station elevation, elevation +
/// offset]. A pool with no density at all has no share; that case is an
/// explicit `RiskError::DivisionUndefined`, never a NaN handed to a gauge.
/// Sums that overflow are `RiskError::NonFiniteTotal` for the same reason.

use serde::Serialize;

use crate::model::{CriticalBand, DensityReading, RiskError, RiskSummary, StationContext};

/// Gauge colour steps.
pub const GAUGE_MIN: f64 = 0.0;
pub const GAUGE_MAX: f64 = 100.0;
pub const GAUGE_HIGH_FROM: f64 = 50.0;

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Sums total and in-band density and returns their ratio.
///
/// Band bounds are inclusive at both ends. The fraction is not capped: a
/// band wider than the profile can legitimately score above 1.
///
/// # Errors
/// `RiskError::DivisionUndefined` when the total density is zero, including
/// for an empty set. `RiskError::NonFiniteTotal` when a sum overflows.
pub fn compute_risk(
    readings: &[DensityReading],
    station: &StationContext,
    band_offset_m: f64,
) -> Result<RiskSummary, RiskError> {
    let band = CriticalBand::from_station(station, band_offset_m);

    let total_density: f64 = readings.iter().map(|r| r.density).sum();
    let critical_density: f64 = readings
        .iter()
        .filter(|r| band.contains(r.height))
        .map(|r| r.density)
        .sum();

    if !total_density.is_finite() || !critical_density.is_finite() {
        return Err(RiskError::NonFiniteTotal);
    }
    if total_density <= 0.0 {
        return Err(RiskError::DivisionUndefined);
    }

    Ok(RiskSummary {
        total_density,
        critical_density,
        risk_fraction: critical_density / total_density,
    })
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeBand {
    Low,
    High,
}

/// What a 0–100 gauge should show for a risk percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeDisplay {
    /// Needle position, clamped to the dial.
    pub value: f64,
    /// Unclamped percentage, for the numeric readout.
    pub percentage: f64,
    pub band: GaugeBand,
}

impl GaugeDisplay {
    pub fn from_percentage(percentage: f64) -> Self {
        let value = percentage.clamp(GAUGE_MIN, GAUGE_MAX);
        let band = if value < GAUGE_HIGH_FROM {
            GaugeBand::Low
        } else {
            GaugeBand::High
        };
        Self {
            value,
            percentage,
            band,
        }
    }
}

/// Serializable result of scoring one pool: either a score or the reason
/// there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskOutcome {
    Scored {
        band: CriticalBand,
        summary: RiskSummary,
        risk_percentage: f64,
        gauge: GaugeDisplay,
    },
    Undefined {
        band: CriticalBand,
        reason: String,
    },
}

impl RiskOutcome {
    pub fn new(band: CriticalBand, result: Result<RiskSummary, RiskError>) -> Self {
        match result {
            Ok(summary) => {
                let risk_percentage = summary.risk_percentage();
                RiskOutcome::Scored {
                    band,
                    summary,
                    risk_percentage,
                    gauge: GaugeDisplay::from_percentage(risk_percentage),
                }
            }
            Err(e) => RiskOutcome::Undefined {
                band,
                reason: e.to_string(),
            },
        }
    }

    pub fn summary(&self) -> Option<&RiskSummary> {
        match self {
            RiskOutcome::Scored { summary, .. } => Some(summary),
            RiskOutcome::Undefined { .. } => None,
        }
    }

    pub fn risk_percentage(&self) -> Option<f64> {
        self.summary().map(RiskSummary::risk_percentage)
    }

    /// Human-readable value for a gauge caption.
    pub fn caption(&self) -> String {
        match self {
            RiskOutcome::Scored { risk_percentage, .. } => format!("{:.1} %", risk_percentage),
            RiskOutcome::Undefined { .. } => "risk undefined for this day".to_string(),
        }
    }
}

/// Scores a pool and wraps the result for display.
pub fn score(readings: &[DensityReading], station: &StationContext, band_offset_m: f64) -> RiskOutcome {
    RiskOutcome::new(
        CriticalBand::from_station(station, band_offset_m),
        compute_risk(readings, station, band_offset_m),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
