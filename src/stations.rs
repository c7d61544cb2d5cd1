/// Radar station registry.
///
/// Station metadata lives in the warehouse table `radar_sites`
/// (`radar, latitude, longitude, elevation`). When the warehouse is not
/// configured or cannot be read, the `[[station]]` entries from
/// birdrisk.toml stand in, so a bare checkout still has something to run on.

use log::{info, warn};
use postgres::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::db::{self, DbConfigError, WAREHOUSE_SCHEMA};
use crate::model::StationContext;

#[derive(Debug, Error)]
pub enum StationError {
    #[error(transparent)]
    Db(#[from] DbConfigError),
    #[error("radar_sites query failed: {0}")]
    Query(#[from] postgres::Error),
    #[error("radar_sites row for {radar}: {column} {value} is not a usable number")]
    InvalidValue {
        radar: String,
        column: &'static str,
        value: String,
    },
}

/// Where the registry contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationOrigin {
    Warehouse,
    Config,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationRegistry {
    pub origin: StationOrigin,
    pub stations: Vec<StationContext>,
}

impl StationRegistry {
    pub fn new(origin: StationOrigin, mut stations: Vec<StationContext>) -> Self {
        stations.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        Self { origin, stations }
    }

    /// Looks a station up by radar code, ignoring case.
    pub fn find(&self, station_id: &str) -> Option<&StationContext> {
        self.stations
            .iter()
            .find(|s| s.station_id.eq_ignore_ascii_case(station_id))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.stations.iter().map(|s| s.station_id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Warehouse
// ---------------------------------------------------------------------------

fn decimal_to_f64(radar: &str, column: &'static str, value: Decimal) -> Result<f64, StationError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StationError::InvalidValue {
            radar: radar.to_string(),
            column,
            value: value.to_string(),
        })
}

/// Builds a `StationContext` from the NUMERIC columns of one `radar_sites` row.
pub fn station_from_row(
    radar: &str,
    latitude: Decimal,
    longitude: Decimal,
    elevation: Decimal,
) -> Result<StationContext, StationError> {
    Ok(StationContext {
        station_id: radar.trim().to_lowercase(),
        latitude: decimal_to_f64(radar, "latitude", latitude)?,
        longitude: decimal_to_f64(radar, "longitude", longitude)?,
        elevation: decimal_to_f64(radar, "elevation", elevation)?,
    })
}

/// Reads every radar site from the warehouse.
pub fn load_from_warehouse(client: &mut Client) -> Result<Vec<StationContext>, StationError> {
    let sql = format!(
        "SELECT radar, latitude, longitude, elevation FROM {}.radar_sites ORDER BY radar",
        WAREHOUSE_SCHEMA
    );
    let rows = client.query(sql.as_str(), &[])?;

    rows.iter()
        .map(|row| {
            let radar: String = row.get(0);
            station_from_row(&radar, row.get(1), row.get(2), row.get(3))
        })
        .collect()
}

/// Loads the registry from the warehouse, falling back to the config file.
pub fn load_registry(config: &ServiceConfig) -> StationRegistry {
    let from_warehouse = db::connect_and_verify()
        .map_err(StationError::from)
        .and_then(|mut client| load_from_warehouse(&mut client));

    match from_warehouse {
        Ok(stations) if !stations.is_empty() => {
            info!("Loaded {} radar stations from the warehouse", stations.len());
            StationRegistry::new(StationOrigin::Warehouse, stations)
        }
        Ok(_) => {
            warn!("radar_sites is empty, using stations from config");
            StationRegistry::new(StationOrigin::Config, config.stations.clone())
        }
        Err(e) => {
            warn!("Station warehouse unavailable ({}), using stations from config", e);
            StationRegistry::new(StationOrigin::Config, config.stations.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn station(id: &str) -> StationContext {
        StationContext {
            station_id: id.to_string(),
            latitude: 60.0,
            longitude: 10.0,
            elevation: 0.0,
        }
    }

    #[test]
    fn test_row_conversion_normalises_id_and_numbers() {
        let s = station_from_row(" NOHUR ", dec("59.6269"), dec("10.5658"), dec("503.0")).unwrap();
        assert_eq!(s.station_id, "nohur");
        assert_eq!(s.latitude, 59.6269);
        assert_eq!(s.longitude, 10.5658);
        assert_eq!(s.elevation, 503.0);
    }

    #[test]
    fn test_registry_sorted_and_case_insensitive_lookup() {
        let registry = StationRegistry::new(
            StationOrigin::Config,
            vec![station("nohur"), station("bejab"), station("noand")],
        );
        assert_eq!(registry.ids(), vec!["bejab", "noand", "nohur"]);
        assert!(registry.find("BEJAB").is_some());
        assert!(registry.find("xxxxx").is_none());
    }

    #[test]
    fn test_config_stations_feed_fallback_registry() {
        let config = ServiceConfig::from_toml_str(
            "[[station]]\nstation_id = \"bejab\"\nlatitude = 51.19\nlongitude = 3.06\nelevation = 50.0\n",
            std::path::Path::new("inline.toml"),
        )
        .unwrap();
        let registry = StationRegistry::new(StationOrigin::Config, config.stations.clone());
        assert_eq!(registry.find("bejab").map(|s| s.elevation), Some(50.0));
    }

    #[test]
    #[ignore] // Only run when the warehouse is available
    fn test_warehouse_has_radar_sites() {
        let mut client = db::connect_and_verify().expect("warehouse connection");
        let stations = load_from_warehouse(&mut client).expect("radar_sites readable");
        assert!(!stations.is_empty());
    }
}
