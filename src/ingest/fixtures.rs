/// Test fixtures: representative vpts CSV bodies from the aloft object store.
///
/// These are structurally complete but truncated to a few scans and a few
/// height bins. They mirror the column layout of the daily files served at
///   https://aloftdata.s3-eu-west-1.amazonaws.com/baltrad/daily/{radar}/{yyyy}/
///
/// vpts CSV shape:
///   radar, datetime (ISO 8601, UTC), height (m, bin bottom), u, v, w, ff, dd,
///   sd_vvp, gap, eta, dens (birds/km^3), dbz, ..., radar_height, source_file
///
/// Note: `dens` is frequently empty or the literal `NaN` for bins the
/// processing chain could not resolve. Parsers must drop those bins rather
/// than treat them as zero.

#[cfg(test)]
pub(crate) fn fixture_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
}

/// Station used alongside the fixtures. Ground-level radar so the default
/// 200 m band covers the 0 m and 200 m bins.
#[cfg(test)]
pub(crate) fn fixture_station() -> crate::model::StationContext {
    crate::model::StationContext {
        station_id: "bejab".to_string(),
        latitude: 51.1917,
        longitude: 3.0642,
        elevation: 0.0,
    }
}

/// Three scans (00:00, 00:05, 00:10) at three heights. Two bins have no
/// density (one empty, one `NaN`), leaving seven readings:
///
/// | time     | 0 m | 200 m | 400 m |
/// |----------|-----|-------|-------|
/// | 00:00:00 | 2   | 10    | 0     |
/// | 00:05:00 | 4   | -     | 8     |
/// | 00:10:00 | -   | 12    | 3     |
///
/// Total 39, inside [0, 200]: 28, peak 12 at 00:10:00 / 200 m.
#[cfg(test)]
pub(crate) fn fixture_bejab_day_csv() -> &'static str {
    "radar,datetime,height,u,v,w,ff,dd,sd_vvp,gap,eta,dens,dbz,dbz_all,n,n_dbz,n_all,n_dbz_all,rcs,sd_vvp_threshold,vcp,radar_latitude,radar_longitude,radar_height,radar_wavelength,source_file
bejab,2023-05-01T00:00:00Z,0,1.2,3.4,,3.6,19.4,2.1,FALSE,22.0,2.0,2.1,3.0,1200,800,2400,1600,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0000Z.h5
bejab,2023-05-01T00:00:00Z,200,2.0,5.1,,5.5,21.4,2.3,FALSE,110.0,10.0,8.4,9.0,1300,900,2500,1700,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0000Z.h5
bejab,2023-05-01T00:00:00Z,400,,,,,,,TRUE,0.0,0.0,-5.0,-5.0,200,0,2600,0,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0000Z.h5
bejab,2023-05-01T00:05:00Z,0,1.1,3.0,,3.2,20.1,2.0,FALSE,44.0,4.0,4.1,4.5,1250,820,2410,1610,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0005Z.h5
bejab,2023-05-01T00:05:00Z,200,,,,,,,TRUE,,,,,,,,,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0005Z.h5
bejab,2023-05-01T00:05:00Z,400,2.2,6.0,,6.4,20.0,2.6,FALSE,88.0,8.0,7.2,7.5,1100,700,2300,1500,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0005Z.h5
bejab,2023-05-01T00:10:00Z,0,,,,,,,TRUE,NaN,NaN,NaN,NaN,0,0,2400,0,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0010Z.h5
bejab,2023-05-01T00:10:00Z,200,2.4,5.8,,6.3,22.5,2.2,FALSE,132.0,12.0,9.1,9.4,1350,950,2550,1750,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0010Z.h5
bejab,2023-05-01T00:10:00Z,400,1.9,5.5,,5.8,19.1,2.4,FALSE,33.0,3.0,3.3,3.5,1050,650,2250,1450,11,2,,51.1917,3.0642,50,5.3,s3://aloft/baltrad/hdf5/bejab/2023/05/01/00/bejab_vp_20230501T0010Z.h5
"
}

/// Same scan times one year earlier, all heights, lower densities.
#[cfg(test)]
pub(crate) fn fixture_bejab_prior_year_csv() -> &'static str {
    "radar,datetime,height,dens
bejab,2022-05-01T00:00:00Z,0,1.0
bejab,2022-05-01T00:00:00Z,200,3.0
bejab,2022-05-01T00:05:00Z,0,2.0
bejab,2022-05-01T00:05:00Z,200,2.0
"
}

/// A file where the radar recorded nothing at all: every bin is zero.
#[cfg(test)]
pub(crate) fn fixture_all_zero_csv() -> &'static str {
    "datetime,height,dens
2023-05-01T12:00:00Z,0,0
2023-05-01T12:00:00Z,200,0.0
2023-05-01T12:05:00Z,0,0
"
}

/// The object store answers missing keys with an XML error document and a
/// 403/404 status; if that body ever reaches the parser it must be rejected.
#[cfg(test)]
pub(crate) fn fixture_s3_no_such_key_body() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>"#
}

/// Header lacks the `dens` column entirely.
#[cfg(test)]
pub(crate) fn fixture_missing_dens_column_csv() -> &'static str {
    "radar,datetime,height,ff,dd
bejab,2023-05-01T00:00:00Z,0,3.6,19.4
"
}

/// A non-numeric height value.
#[cfg(test)]
pub(crate) fn fixture_bad_height_csv() -> &'static str {
    "datetime,height,dens
2023-05-01T00:00:00Z,0,1.0
2023-05-01T00:00:00Z,two hundred,1.0
"
}
