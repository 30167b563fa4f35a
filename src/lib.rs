/*  lib.rs -- Main program
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

mod calc_grid;
mod calc_shade;
mod calc_solar;
mod cli;
mod config;
pub mod error;
pub mod types;
mod types_display;
mod types_parse;
mod utils;

pub use calc_grid::{MIRROR_AFTER_HOUR, TARGET_TOLERANCE};
pub use calc_shade::AREA_TOLERANCE;
pub use calc_solar::{jd_from_datetime, solar_noon_minutes, solar_position};
pub use types_display::{BODY, ERR, HEADER};
pub use types_parse::{parse_date, parse_time};
pub use utils::{linspace, position_closest};

use crate::{
    cli::ClapColorChoiceExt,
    config::{Config, ConfigBuilder},
    error::{SombraError, SombraErrorKind},
    types::{
        Fraction, Grid, Mode, ShadeAngles, ShadowCast, SolarPosition, When,
    },
    utils::IsDefault,
};
use anstream::AutoStream;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::{io, process::ExitCode};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn main() -> ExitCode {
    (|| -> Result<(), SombraError> {
        let c = ConfigBuilder::new(|verbosity, color| {
            let choice = color.to_choice();
            let stdout = move || AutoStream::new(io::stdout(), choice).lock();
            let stderr = move || AutoStream::new(io::stderr(), choice).lock();
            let stdio = stderr.with_max_level(Level::WARN).or_else(stdout);

            tracing_subscriber::fmt()
                .with_writer(stdio)
                .with_max_level(verbosity.level_filter())
                .without_time()
                .with_level(false)
                .with_target(false)
                .init();
        })?
        .build();

        if c.site.observer.loc.is_default() {
            warn!("using the default location, set one with -l LAT:LON");
        }
        debug!("{c}");
        run(&c)
    })()
    .map_or_else(
        |e| {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        },
        |()| ExitCode::SUCCESS,
    )
}

fn run(c: &Config) -> Result<(), SombraError> {
    match c.mode {
        Mode::Position(when) => run_position_mode(c, when),
        Mode::Print(date) => {
            let date = date
                .unwrap_or_else(|| c.local_datetime(When::default()).date());
            run_print_mode(c, date);
            Ok(())
        }
        Mode::Area { when, q, p } => run_area_mode(c, when, q, p),
        Mode::Search { when, p } => run_search_mode(c, when, p),
        Mode::Grid => {
            let g = Grid::sweep(&c.grid, &c.site, &c.model);
            info!("{HEADER}Left area{HEADER:#}:\n{g}");
            Ok(())
        }
    }
}

fn run_position_mode(c: &Config, when: When) -> Result<(), SombraError> {
    let local = c.local_datetime(when);
    let pos = SolarPosition::new(local, &c.site.observer);
    let noon = c.site.observer.solar_noon(local.date());
    let [e, n, u] = pos.sun_vector();
    let shadow = match ShadowCast::new(&pos, c.site.pole_height) {
        Some(s) => s.to_string(),
        None => "none, the sun is below the horizon".to_string(),
    };

    info!(
        "{HEADER}Position{HEADER:#}:
    {BODY}Local time{BODY:#}: {local}
    {BODY}Sun{BODY:#}: {pos}
    {BODY}Sun vector{BODY:#}: ({e:.4} east, {n:.4} north, {u:.4} up)
    {BODY}Solar noon{BODY:#}: {noon}
    {BODY}Shadow{BODY:#}: {shadow}"
    );
    Ok(())
}

fn run_print_mode(c: &Config, date: NaiveDate) {
    info!(
        "{HEADER}{date}{HEADER:#}:      azimuth elevation  shadow\n{}",
        hourly_table(c, date).join("\n")
    );
}

/// One row per whole hour of `date`, a dash in place of the shadow length
/// while the sun is down
fn hourly_table(c: &Config, date: NaiveDate) -> Vec<String> {
    (0..24)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .map(|time| {
            let pos = SolarPosition::new(date.and_time(time), &c.site.observer);
            let shadow = ShadowCast::new(&pos, c.site.pole_height)
                .map_or(format!("{:>8}", "-"), |s| {
                    format!("{:6.2} m", s.length)
                });
            format!(
                "{BODY}{time}{BODY:#}: {:6.2}° {:6.2}° {shadow}",
                *pos.azimuth, *pos.elevation
            )
        })
        .collect()
}

/// Angles at `local`, failing when the sun is down
fn shade_angles(
    c: &Config,
    local: NaiveDateTime,
) -> Result<(SolarPosition, ShadeAngles), SombraError> {
    let pos = SolarPosition::new(local, &c.site.observer);
    let angles = c
        .model
        .angles(&pos, c.site.pole_height, &c.site.view)
        .ok_or(SombraErrorKind::NoSun(local))?;
    Ok((pos, angles))
}

fn run_area_mode(
    c: &Config,
    when: When,
    q: Fraction,
    p: Fraction,
) -> Result<(), SombraError> {
    let local = c.local_datetime(when);
    let (pos, angles) = shade_angles(c, local)?;
    let s = angles.slopes();
    let (q, p) = (*q, *p);
    let area = c.model.reconcile(q, p, s);
    let ends = c.model.line_endpoints(q, p, s);
    let polygon = c.model.shade_polygon(q, p, s);

    if !area.is_consistent() {
        warn!(
            "closed form area {:.4} and left area {:.4} differ by {:.4}",
            area.area,
            area.left_area,
            area.diff()
        );
    }
    info!(
        "{HEADER}Shade{HEADER:#} at {local}, {pos}:
{angles}
    {BODY}Slopes{BODY:#}: {:.4}, {:.4}
    {BODY}Area{BODY:#}: {:.4}
    {BODY}Left area{BODY:#}: {:.4}
    {BODY}Endpoints{BODY:#}: {ends}
    {BODY}Boundary{BODY:#}: {}
    {BODY}Polygon{BODY:#}: {polygon}",
        s.ta,
        s.tb,
        area.area,
        area.left_area,
        ends.boundary()
    );
    Ok(())
}

fn run_search_mode(
    c: &Config,
    when: When,
    p: Fraction,
) -> Result<(), SombraError> {
    let local = c.local_datetime(when);
    let (pos, angles) = shade_angles(c, local)?;
    let s = angles.slopes();
    let target = *c.grid.target;
    let q = c.model.inverse_search(target, *p, s);
    let area = c.model.reconcile(q, *p, s);

    if (area.left_area - target).abs() > TARGET_TOLERANCE {
        warn!(
            "wanted an area of {target:.3}, the closest split gives {:.3}",
            area.left_area
        );
    }
    info!(
        "{HEADER}Search{HEADER:#} at {local}, {pos}:
    {BODY}Target{BODY:#}: {target:.3}
    {BODY}Split{BODY:#}: {q:.4}
    {BODY}Area{BODY:#}: {:.4}
    {BODY}Left area{BODY:#}: {:.4}",
        area.area, area.left_area
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use anstream::adapter::strip_str;
    use anyhow::Result;
    use clap::Parser;
    use insta::assert_snapshot;

    fn config(args: &[&str]) -> Result<Config> {
        let mut cfg = ConfigBuilder::default();
        cfg.merge_with_cli_args(CliArgs::try_parse_from(args)?);
        Ok(cfg.build())
    }

    #[test]
    fn test_area_and_search_at_night() -> Result<()> {
        let area = [
            "sombra", "area", "-d", "2026-01-01", "-t", "00:00", "-s", "0.4",
            "-b", "0.5",
        ];
        let search =
            ["sombra", "search", "-d", "2026-01-01", "-t", "00:00", "-b", "0.5"];

        for args in [&area[..], &search[..]] {
            let Err(e) = run(&config(args)?) else {
                anyhow::bail!("{} should fail at midnight", args[1]);
            };
            assert_eq!(e.exit_code(), exitcode::DATAERR);
            assert!(matches!(e.kind(), SombraErrorKind::NoSun(_)), "{e}");
        }
        Ok(())
    }

    #[test]
    fn test_area_and_search_at_noon() -> Result<()> {
        let area = [
            "sombra", "area", "-d", "2026-01-01", "-t", "12:00", "-s", "0.4",
            "-b", "0.5",
        ];
        let search =
            ["sombra", "search", "-d", "2026-01-01", "-t", "12:00", "-b", "0.5"];

        for args in [&area[..], &search[..]] {
            run(&config(args)?)?;
        }
        Ok(())
    }

    #[test]
    fn test_hourly_table() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
        let c = config(&["sombra", "print", "-d", "2026-01-01"])?;
        let rows = hourly_table(&c, date)
            .iter()
            .map(|r| strip_str(r).to_string())
            .collect::<Vec<_>>();

        assert_eq!(rows.len(), 24);
        for (h, row) in rows.iter().enumerate() {
            assert!(row.starts_with(&format!("{h:02}:00:00: ")), "{row}");
        }
        assert_snapshot!(&rows[0], @"00:00:00: 168.65° -62.70°        -");
        assert_snapshot!(&rows[12], @"12:00:00: 195.16°  70.03°   0.36 m");

        let daylight = rows.iter().filter(|r| r.ends_with(" m")).count();
        assert_eq!(daylight, 12);
        Ok(())
    }
}
