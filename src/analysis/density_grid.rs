/// Time × height density field for the heatmap, and its peak.
///
/// The grid is sparse: one cell per reading, kept in source order. Renderers
/// either plot the cells directly (x = timestamp, y = height, z = density)
/// or ask for a dense `matrix()` over the sorted axes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::DensityReading;

/// The highest-density reading of a set, with where it sits in the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityPeak {
    /// Position of the peak reading in the input.
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub height: f64,
    pub density: f64,
}

impl DensityPeak {
    /// Chart title describing the peak.
    pub fn headline(&self) -> String {
        format!(
            "Highest bird density value of {:.2} at {} flying at {} m above ground",
            self.density,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.height
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    pub cells: Vec<DensityReading>,
    pub peak: Option<DensityPeak>,
}

impl DensityGrid {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct timestamps, ascending.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        let mut axis: Vec<_> = self.cells.iter().map(|c| c.timestamp).collect();
        axis.sort();
        axis.dedup();
        axis
    }

    /// Distinct heights, ascending. `-0.0` and `0.0` are one height.
    pub fn heights(&self) -> Vec<f64> {
        let mut axis: Vec<_> = self.cells.iter().map(|c| c.height + 0.0).collect();
        axis.sort_by(f64::total_cmp);
        axis.dedup();
        axis
    }

    /// Density at an exact (timestamp, height). When the source repeats a
    /// coordinate, the first reading wins.
    pub fn density_at(&self, timestamp: DateTime<Utc>, height: f64) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.timestamp == timestamp && c.height == height)
            .map(|c| c.density)
    }

    /// Dense view: one row per height (ascending), one column per timestamp
    /// (ascending); `None` where no reading exists. First reading wins on
    /// repeated coordinates, same as `density_at`.
    pub fn matrix(&self) -> Vec<Vec<Option<f64>>> {
        let timestamps = self.timestamps();
        let heights = self.heights();
        let col: HashMap<DateTime<Utc>, usize> =
            timestamps.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let row: HashMap<u64, usize> =
            heights.iter().enumerate().map(|(i, h)| (h.to_bits(), i)).collect();

        let mut grid = vec![vec![None; timestamps.len()]; heights.len()];
        for cell in &self.cells {
            let (Some(&r), Some(&c)) = (row.get(&(cell.height + 0.0).to_bits()), col.get(&cell.timestamp)) else {
                continue;
            };
            if grid[r][c].is_none() {
                grid[r][c] = Some(cell.density);
            }
        }
        grid
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Builds the density field for one set of readings and locates its peak.
///
/// The peak is a stable argmax: on ties the reading that appears first in
/// the input is chosen, so the cross-hair position is reproducible.
pub fn build_density_grid(readings: &[DensityReading]) -> DensityGrid {
    DensityGrid {
        cells: readings.to_vec(),
        peak: find_peak(readings),
    }
}

/// Stable argmax over density. `None` for an empty input.
pub fn find_peak(readings: &[DensityReading]) -> Option<DensityPeak> {
    let mut best: Option<(usize, &DensityReading)> = None;

    for (index, reading) in readings.iter().enumerate() {
        match best {
            // Strictly greater: an equal later value never displaces the first.
            Some((_, current)) if reading.density <= current.density => {}
            _ => best = Some((index, reading)),
        }
    }

    best.map(|(index, r)| DensityPeak {
        index,
        timestamp: r.timestamp,
        height: r.height,
        density: r.density,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
