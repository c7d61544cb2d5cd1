/// birdrisk_service: bird migration density and rotor-zone risk from
/// weather radar vertical profiles.
///
/// # Module structure
///
/// ```text
/// birdrisk_service
/// ├── model       - shared data types (DensityReading, ObservationSet, StationContext, VptsError, …)
/// ├── config      - service configuration loader (birdrisk.toml)
/// ├── db          - warehouse connection and validation
/// ├── stations    - radar station registry (radar_sites, with config fallback)
/// ├── ingest
/// │   ├── vpts     - object-store URL construction, HTTP fetch, CSV validation
/// │   ├── baseline - prior-year fetches on a worker pool
/// │   └── fixtures (test only) - representative vpts CSV bodies
/// ├── analysis
/// │   ├── groupings    - mean density per time of day
/// │   ├── density_grid - time × height field and its peak
/// │   └── risk         - share of density in the critical band
/// ├── astro       - sunrise/sunset annotations
/// ├── pipeline    - DensityRiskPipeline and fetch-then-run orchestration
/// └── endpoint    - JSON HTTP API for the rendering layer
/// ```

pub mod analysis;
pub mod astro;
pub mod config;
pub mod db;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod stations;
