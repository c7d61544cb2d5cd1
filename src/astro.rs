/// Sunrise and sunset for chart annotations.
///
/// The solar geometry comes from the `sunrise` crate (NOAA sunrise
/// equation, corrected for observer altitude). This module only adapts it
/// to station metadata and UTC instants. Polar day and polar night have no
/// crossing and yield `None`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::model::{StationContext, SunTimes};

/// Source of sun times. A trait so the pipeline can run with a fixed
/// calculator in tests or without annotations at all.
pub trait SunCalculator: Send + Sync {
    fn sun_times(&self, station: &StationContext, date: NaiveDate) -> Option<SunTimes>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoaaSunCalculator;

impl SunCalculator for NoaaSunCalculator {
    fn sun_times(&self, station: &StationContext, date: NaiveDate) -> Option<SunTimes> {
        sun_times(station.latitude, station.longitude, station.elevation, date)
    }
}

/// Sunrise and sunset (UTC) for an observer at `elevation_m` above sea level.
pub fn sun_times(latitude: f64, longitude: f64, elevation_m: f64, date: NaiveDate) -> Option<SunTimes> {
    let day = SolarDay::new(Coordinates::new(latitude, longitude)?, date)
        .with_altitude(elevation_m.max(0.0));

    let sunrise = DateTime::<Utc>::from_timestamp(day.event_time(SolarEvent::Sunrise), 0)?;
    let sunset = DateTime::<Utc>::from_timestamp(day.event_time(SolarEvent::Sunset), 0)?;

    // Without a horizon crossing the hour angle degenerates: both events
    // collapse onto transit, span a full day, or land at the Unix epoch.
    let noon = date.and_hms_opt(12, 0, 0)?.and_utc();
    let near_date = |t: DateTime<Utc>| {
        let offset = t - noon;
        offset <= Duration::days(1) && offset >= -Duration::days(1)
    };
    if sunset <= sunrise || sunset - sunrise >= Duration::hours(24) || !near_date(sunrise) || !near_date(sunset) {
        return None;
    }

    Some(SunTimes { sunrise, sunset })
}
