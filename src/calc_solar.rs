/*  calc_solar.rs -- Solar position calculations
    This file is part of sombra.

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Low precision solar position from the NOAA solar calculator series.
//! Good to a fraction of a degree between the years 1800 and 2200.
//!
//! Every angle in this module is in degrees unless its name ends in `_rad`.
//! Conversions happen right where a trigonometric function is called.

use chrono::{
    Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike,
};

const JD_J2000: f64 = 2451545.0;
const DAYS_PER_CENTURY: f64 = 36525.0;
const MINUTES_PER_DAY: f64 = 1440.0;

/// Julian day of a UTC instant
pub fn jd_from_datetime(utc: NaiveDateTime) -> f64 {
    let (mut year, mut month) = (utc.year() as f64, utc.month() as f64);
    let day = utc.day() as f64;
    let hour = utc.hour() as f64
        + utc.minute() as f64 / 60.0
        + utc.second() as f64 / 3600.0
        + utc.nanosecond() as f64 / 3.6e12;

    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    let jd0 = (365.25 * (year + 4716.0)).floor()
        + (30.6001 * (month + 1.0)).floor()
        + day
        + b
        - 1524.5;

    jd0 + hour / 24.0
}

fn jcent_from_jd(jd: f64) -> f64 {
    (jd - JD_J2000) / DAYS_PER_CENTURY
}

/// Geometric mean longitude of the sun
fn sun_geom_mean_lon(t: f64) -> f64 {
    (280.46646 + t * (36000.76983 + 0.0003032 * t)) % 360.0
}

/// Geometric mean anomaly of the sun
fn sun_geom_mean_anomaly(t: f64) -> f64 {
    357.52911 + t * (35999.05029 - 0.0001537 * t)
}

/// Eccentricity of earth orbit, unitless
fn earth_orbit_eccentricity(t: f64) -> f64 {
    0.016708634 - t * (0.000042037 + 0.0000001267 * t)
}

fn sun_equation_of_center(t: f64) -> f64 {
    let m_rad = sun_geom_mean_anomaly(t).to_radians();
    m_rad.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m_rad).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m_rad).sin() * 0.000289
}

fn sun_true_lon(t: f64) -> f64 {
    sun_geom_mean_lon(t) + sun_equation_of_center(t)
}

/// Longitude of the ascending node of the moon's orbit, used for the
/// nutation corrections below
fn omega(t: f64) -> f64 {
    125.04 - 1934.136 * t
}

fn sun_apparent_lon(t: f64) -> f64 {
    sun_true_lon(t) - 0.00569 - 0.00478 * omega(t).to_radians().sin()
}

fn mean_ecliptic_obliquity(t: f64) -> f64 {
    let sec = 21.448 - t * (46.815 + t * (0.00059 - 0.001813 * t));
    23.0 + (26.0 + sec / 60.0) / 60.0
}

fn obliquity_corr(t: f64) -> f64 {
    mean_ecliptic_obliquity(t) + 0.00256 * omega(t).to_radians().cos()
}

/// Declination of the sun in radians
fn solar_declination_rad(t: f64) -> f64 {
    let eps_rad = obliquity_corr(t).to_radians();
    let lambda_rad = sun_apparent_lon(t).to_radians();
    (eps_rad.sin() * lambda_rad.sin()).asin()
}

/// Difference between true solar time and mean solar time in minutes
fn equation_of_time(t: f64) -> f64 {
    let eps_rad = obliquity_corr(t).to_radians();
    let l0_rad = sun_geom_mean_lon(t).to_radians();
    let m_rad = sun_geom_mean_anomaly(t).to_radians();
    let e = earth_orbit_eccentricity(t);
    let y = (eps_rad / 2.0).tan().powi(2);

    let eq_time_rad = y * (2.0 * l0_rad).sin() - 2.0 * e * m_rad.sin()
        + 4.0 * e * y * m_rad.sin() * (2.0 * l0_rad).cos()
        - 0.5 * y * y * (4.0 * l0_rad).sin()
        - 1.25 * e * e * (2.0 * m_rad).sin();

    4.0 * eq_time_rad.to_degrees()
}

/// Offset of `hours` from UTC, in whole seconds
pub fn offset_delta(hours: f64) -> TimeDelta {
    TimeDelta::seconds((hours * 3600.0).round() as i64)
}

/// Azimuth and elevation of the sun seen from `lat`, `lon` at the local
/// civil time `local` of a place `utc_offset` hours ahead of UTC
///
/// Azimuth is in `[0, 360)` with 0 at north and 90 at east. Elevation is
/// negative while the sun is below the horizon.
pub fn solar_position(
    local: NaiveDateTime,
    lat: f64,
    lon: f64,
    utc_offset: f64,
) -> (f64, f64) {
    let t = jcent_from_jd(jd_from_datetime(local - offset_delta(utc_offset)));

    let decl_rad = solar_declination_rad(t);
    let eq_time = equation_of_time(t);

    let minutes = local.hour() as f64 * 60.0
        + local.minute() as f64
        + local.second() as f64 / 60.0;
    let time_offset = eq_time + 4.0 * lon - 60.0 * utc_offset;
    let tst = (minutes + time_offset).rem_euclid(MINUTES_PER_DAY);

    // Hour angle, in [-180, 180)
    let ha = tst / 4.0 - 180.0;
    let (lat_rad, ha_rad) = (lat.to_radians(), ha.to_radians());

    let cos_zenith = lat_rad.sin() * decl_rad.sin()
        + lat_rad.cos() * decl_rad.cos() * ha_rad.cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos().to_degrees();
    let elevation = 90.0 - zenith;

    let azimuth = (ha_rad.sin())
        .atan2(ha_rad.cos() * lat_rad.sin() - decl_rad.tan() * lat_rad.cos())
        .to_degrees();
    let azimuth = (azimuth + 180.0).rem_euclid(360.0);
    // rem_euclid rounds tiny negative values up to the modulus
    let azimuth = if azimuth >= 360.0 { 0.0 } else { azimuth };

    (azimuth, elevation)
}

/// Minutes after local midnight of the sun's meridian transit on `date`
pub fn solar_noon_minutes(
    date: NaiveDate,
    lon: f64,
    utc_offset: f64,
) -> f64 {
    let jd_midnight = jd_from_datetime(date.and_time(NaiveTime::MIN));

    // First guess at local noon, then refine at the estimated instant
    let t = jcent_from_jd(jd_midnight + 0.5 - lon / 360.0);
    let noon_utc = 720.0 - 4.0 * lon - equation_of_time(t);
    let t = jcent_from_jd(jd_midnight + noon_utc / MINUTES_PER_DAY);
    let noon_utc = 720.0 - 4.0 * lon - equation_of_time(t);

    noon_utc + 60.0 * utc_offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    const LAT: f64 = -3.731862;
    const LON: f64 = -38.526669;
    const OFFSET: f64 = -3.0;

    fn local(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(hh, mm, 0))
            .unwrap_or_default()
    }

    #[test]
    fn julian_day_of_j2000() {
        // 2000-01-01 12:00 UTC
        assert_float_eq!(
            jd_from_datetime(local(2000, 1, 1, 12, 0)),
            JD_J2000,
            abs <= 1e-9
        );
    }

    #[test]
    fn julian_day_of_gregorian_reform() {
        // 1582-10-15 00:00 UTC, first day of the gregorian calendar
        assert_float_eq!(
            jd_from_datetime(local(1582, 10, 15, 0, 0)),
            2299160.5,
            abs <= 1e-9
        );
    }

    #[test]
    fn equation_of_time_in_known_ranges() {
        // Mid February the sun runs about 14 minutes late, early November
        // about 16 minutes early
        let feb = jcent_from_jd(jd_from_datetime(local(2026, 2, 11, 12, 0)));
        let nov = jcent_from_jd(jd_from_datetime(local(2026, 11, 3, 12, 0)));
        assert_float_eq!(equation_of_time(feb), -14.2, abs <= 0.5);
        assert_float_eq!(equation_of_time(nov), 16.4, abs <= 0.5);
    }

    #[test]
    fn declination_at_solstices() {
        let jun = jcent_from_jd(jd_from_datetime(local(2026, 6, 21, 12, 0)));
        let dec = jcent_from_jd(jd_from_datetime(local(2026, 12, 21, 12, 0)));
        assert_float_eq!(
            solar_declination_rad(jun).to_degrees(),
            23.44,
            abs <= 0.1
        );
        assert_float_eq!(
            solar_declination_rad(dec).to_degrees(),
            -23.44,
            abs <= 0.1
        );
    }

    #[test]
    fn elevation_at_equinox_noon() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap_or_default();
        let noon = solar_noon_minutes(date, LON, OFFSET);
        let (hh, mm) = ((noon / 60.0) as u32, (noon % 60.0).round() as u32);
        let (az, elev) =
            solar_position(local(2026, 3, 20, hh, mm), LAT, LON, OFFSET);
        assert_float_eq!(elev, 90.0 - LAT.abs(), abs <= 1.0);
        assert!((0.0..360.0).contains(&az));
    }

    #[test]
    fn solar_noon_in_fortaleza() {
        // Standard meridian of UTC-3 is 45°W, the city is 6.5° east of it,
        // so noon comes roughly 26 minutes early before the equation of time
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
        let noon = solar_noon_minutes(date, LON, OFFSET);
        assert_float_eq!(noon, 11.0 * 60.0 + 38.0, abs <= 3.0);
    }

    #[test]
    fn new_year_noon_is_near_meridian() {
        let (az, elev) =
            solar_position(local(2026, 1, 1, 12, 0), LAT, LON, OFFSET);
        assert!(elev > 60.0, "elevation {elev}");
        // January sun stands south of the city at noon
        assert_float_eq!(az, 180.0, abs <= 25.0);
    }

    #[test]
    fn night_has_negative_elevation() {
        let (_, elev) =
            solar_position(local(2026, 1, 1, 0, 0), LAT, LON, OFFSET);
        assert!(elev < -55.0, "elevation {elev}");
    }

    #[test]
    fn offset_rolls_over_month_boundary() {
        // 22:30 local at UTC-3 is 01:30 UTC the next day, next month
        let a = solar_position(local(2026, 1, 31, 22, 30), LAT, LON, OFFSET);
        let utc = solar_position(local(2026, 2, 1, 1, 30), LAT, LON, 0.0);
        assert_float_eq!(a.0, utc.0, abs <= 1e-6);
        assert_float_eq!(a.1, utc.1, abs <= 1e-6);
    }

    #[test]
    fn fractional_offset_in_whole_seconds() {
        assert_eq!(offset_delta(5.75), TimeDelta::minutes(345));
        assert_eq!(offset_delta(-3.0), TimeDelta::hours(-3));
        assert_eq!(offset_delta(1.0 / 7.0), TimeDelta::seconds(514));

        // 12:00 at UTC+05:45 is 06:15 UTC
        let a = solar_position(local(2026, 6, 1, 12, 0), LAT, LON, 5.75);
        let utc = solar_position(local(2026, 6, 1, 6, 15), LAT, LON, 0.0);
        assert_float_eq!(a.0, utc.0, abs <= 1e-6);
        assert_float_eq!(a.1, utc.1, abs <= 1e-6);
    }

    #[test]
    fn position_ranges_over_a_year() {
        for m in 1..=12 {
            for hh in 0..24 {
                let at = local(2026, m, 15, hh, 17);
                let (az, elev) = solar_position(at, LAT, LON, OFFSET);
                assert!((0.0..360.0).contains(&az), "azimuth {az}");
                assert!(elev > -90.0 && elev <= 90.0, "elevation {elev}");
            }
        }
    }

    #[test]
    fn morning_sun_is_east_afternoon_sun_is_west() {
        let (am, _) =
            solar_position(local(2026, 3, 20, 8, 0), LAT, LON, OFFSET);
        let (pm, _) =
            solar_position(local(2026, 3, 20, 16, 0), LAT, LON, OFFSET);
        assert_float_eq!(am, 90.0, abs <= 10.0);
        assert_float_eq!(pm, 270.0, abs <= 10.0);
    }
}
