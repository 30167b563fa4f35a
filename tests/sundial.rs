/*  sundial.rs -- Public API tests
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

use anstream::adapter::strip_str;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use float_eq::assert_float_eq;
use insta::assert_snapshot;
use sombra::{
    error::{SombraError, SombraErrorKind},
    types::{
        Fraction, Grid, GridSpec, Length, Month, ShadeModel, ShadowCast, Site,
        SolarPosition, Span,
    },
    MIRROR_AFTER_HOUR, TARGET_TOLERANCE,
};

fn local(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(hh, mm, 0))
        .context("invalid date")
}

#[test]
fn noon_shadow_points_north_in_january() -> Result<()> {
    let site = Site::default();
    let pos = SolarPosition::new(local(2026, 1, 1, 12, 0)?, &site.observer);
    let shadow =
        ShadowCast::new(&pos, site.pole_height).context("sun is down")?;

    assert!(shadow.length < 1.0 / 60f64.to_radians().tan());
    assert!(shadow.tip_north > 0.0, "{shadow:?}");
    let tip = shadow.tip_east.hypot(shadow.tip_north);
    assert_float_eq!(tip, shadow.length, abs <= 1e-9);

    let [e, n, u] = pos.sun_vector();
    assert_float_eq!(e * e + n * n + u * u, 1.0, abs <= 1e-12);
    assert!(u > 0.0);
    Ok(())
}

#[test]
fn taller_pole_casts_longer_shadow() -> Result<()> {
    let site = Site::default();
    let pos = SolarPosition::new(local(2026, 6, 21, 9, 0)?, &site.observer);
    let short = ShadowCast::new(&pos, Length::try_from(1.0)?);
    let long = ShadowCast::new(&pos, Length::try_from(2.0)?);
    let (short, long) = short.zip(long).context("sun is down")?;
    assert_float_eq!(long.length, 2.0 * short.length, abs <= 1e-9);
    assert_float_eq!(long.bearing, short.bearing, abs <= 1e-12);
    Ok(())
}

#[test]
fn search_finds_target_through_the_day() -> Result<()> {
    let site = Site::default();
    let model = ShadeModel::default();
    let p = 0.5;

    for hour in 8..=16 {
        let pos =
            SolarPosition::new(local(2026, 3, 20, hour, 0)?, &site.observer);
        let angles = model
            .angles(&pos, site.pole_height, &site.view)
            .context("sun is down")?;
        let s = angles.slopes();

        for target in [0.3, 0.5, 0.7] {
            let q = model.inverse_search(target, p, s);
            let area = model.reconcile(q, p, s);
            assert!(area.is_consistent(), "{hour}h: {area:?}");
            assert!(
                (area.left_area - target).abs() < TARGET_TOLERANCE,
                "{hour}h: wanted {target}, got {area:?}"
            );
        }
    }
    Ok(())
}

#[test]
fn grid_mirrors_afternoon_polygons() -> Result<()> {
    let month = Month::try_from(6)?;
    let bias = Fraction::try_from(0.5)?;
    let spec = GridSpec {
        months: Span::try_from((month, month))?,
        bias: Span::try_from((bias, bias))?,
        target: Fraction::try_from(0.4)?,
        ..Default::default()
    };
    let g = Grid::sweep(&spec, &Site::default(), &ShadeModel::default());
    let row = g.rows.first().context("no rows")?;
    assert_eq!(*row.month, 6);

    for cell in &row.cells {
        let Some(shade) = &cell.shade else { continue };
        // The bottom left corner always closes the polygon
        let last = shade.polygon.last().context("empty polygon")?;
        let x = if cell.hour > MIRROR_AFTER_HOUR { 1.0 } else { 0.0 };
        assert_float_eq!(last.x, x, abs <= 1e-12);
        assert_float_eq!(last.y, 0.0, abs <= 1e-12);
        assert!((shade.area.left_area - 0.4).abs() < TARGET_TOLERANCE);
    }
    Ok(())
}

#[test]
fn no_sun_error() -> Result<()> {
    let midnight = local(2026, 1, 1, 0, 0)?;
    let e = SombraError::from(SombraErrorKind::NoSun(midnight));
    assert_eq!(e.exit_code(), exitcode::DATAERR);
    assert_snapshot!(
        strip_str(&e.to_string()).to_string(),
        @"error: the sun is below the horizon at 2026-01-01 00:00:00"
    );
    Ok(())
}
