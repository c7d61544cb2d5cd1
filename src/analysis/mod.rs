/// Pure transformations over validated density readings.
///
/// Submodules:
/// - `groupings`    - mean density per time of day (the diel curve).
/// - `density_grid` - time × height field for the heatmap, plus its peak.
/// - `risk`         - share of density inside the critical altitude band.

pub mod density_grid;
pub mod groupings;
pub mod risk;
