/*  types_display.rs -- Display implementation for common types
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

use crate::{
    config::Config,
    types::{
        Azimuth, Boundary, Day, Elevation, Endpoints, Epsilon, Fraction, Grid,
        GridSpec, Hour, Length, Location, Month, Point, SampleCount,
        ShadeAngles, ShadeModel, ShadePolygon, ShadowCast, Site,
        SolarPosition, Span, Step, UtcOffset, Verbosity,
    },
};
use anstyle::{AnsiColor, Style};
use clap::ColorChoice;
use itertools::Itertools;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub const HEADER: Style = Style::new().bold().underline();
pub const BODY: Style = Style::new().bold();
pub const ERR: Style = AnsiColor::Red.on_default().bold();

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        // Whole hundredths of an arc second
        let dms = |a: f64| {
            let cs = (a.abs() * 360_000.0).round() as u64;
            let (d, m, s) = (cs / 360_000, cs / 6000 % 60, cs % 6000);
            format!("{d}°{m}′{}.{:02}″", s / 100, s % 100)
        };
        let ns = if *self.lat >= 0.0 { "N" } else { "S" };
        let ew = if *self.lon >= 0.0 { "E" } else { "W" };
        let (a, b) = (dms(*self.lat), dms(*self.lon));
        write!(f, "{a}{ns}, {b}{ew}")
    }
}

impl Display for UtcOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let sign = if **self < 0.0 { '-' } else { '+' };
        let minutes = (self.abs() * 60.0).round() as u32;
        write!(f, "UTC{sign}{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

impl Display for Length {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:.2} m", **self)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:.3}", **self)
    }
}

impl Display for Epsilon {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:e}", **self)
    }
}

impl Display for SampleCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", **self)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", **self)
    }
}

impl Display for Hour {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:02}:00", **self)
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", **self)
    }
}

impl<T: Display + PartialEq> Display for Span<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self { min, max } = self;
        if min == max {
            write!(f, "{min}")
        } else {
            write!(f, "{min} to {max}")
        }
    }
}

impl Display for Azimuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:.2}°", **self)
    }
}

impl Display for Elevation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:.2}°", **self)
    }
}

impl Display for SolarPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self { azimuth, elevation } = self;
        write!(f, "azimuth {azimuth}, elevation {elevation}")
    }
}

impl Display for ShadowCast {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self {
            length,
            bearing,
            tip_east,
            tip_north,
        } = self;
        write!(
            f,
            "{length:.3} m towards {bearing:.2}°, tip at {tip_east:.3} m east, \
             {tip_north:.3} m north"
        )
    }
}

impl Display for ShadeAngles {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self {
            alpha,
            beta,
            shadow_length,
        } = self;
        write!(
            f,
            "    {BODY}Alpha{BODY:#}: {:.2}°
    {BODY}Beta{BODY:#}: {:.2}°
    {BODY}Shadow length{BODY:#}: {shadow_length:.3} m",
            alpha.to_degrees(),
            beta.to_degrees(),
        )
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

impl Display for Endpoints {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self { l0, ln, sn, s1 } = self;
        write!(f, "L0 {l0}, Ln {ln}, Sn {sn}, S1 {s1}")
    }
}

impl Display for Boundary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            Boundary::LeftBottom => "left and bottom",
            Boundary::TopRight => "top and right",
            Boundary::LeftRight => "left and right",
            Boundary::TopBottom => "top and bottom",
        };
        f.write_str(s)
    }
}

impl Display for ShadePolygon {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.iter().join(" "))
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Site {
            observer,
            view,
            pole_height,
        } = self;
        write!(
            f,
            "    {BODY}Location{BODY:#}: {}
    {BODY}Offset{BODY:#}: {}
    {BODY}Pole height{BODY:#}: {pole_height}
    {BODY}Eye height{BODY:#}: {}
    {BODY}Observer distance{BODY:#}: {}",
            observer.loc,
            observer.offset,
            view.eye_height,
            view.observer_distance
        )
    }
}

impl Display for ShadeModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let ShadeModel {
            eps,
            line_samples,
            search_samples,
        } = self;
        write!(
            f,
            "    {BODY}Epsilon{BODY:#}: {eps}
    {BODY}Line samples{BODY:#}: {line_samples}
    {BODY}Search samples{BODY:#}: {search_samples}"
        )
    }
}

impl Display for GridSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let GridSpec {
            year,
            day,
            minute,
            months,
            month_step,
            hours,
            hour_step,
            bias,
            target,
        } = self;
        write!(
            f,
            "    {BODY}Year{BODY:#}: {year}
    {BODY}Day{BODY:#}: {day}
    {BODY}Minute{BODY:#}: {minute}
    {BODY}Months{BODY:#}: {months}, every {month_step}
    {BODY}Hours{BODY:#}: {hours}, every {hour_step}
    {BODY}Bias{BODY:#}: {bias}
    {BODY}Target{BODY:#}: {target}"
        )
    }
}

/// Covered area of each cell, one row per month
impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let header =
            self.hours.iter().map(|h| format!("{h:02}:00")).join(" ");
        write!(f, "{BODY}   {BODY:#} {BODY}{header}{BODY:#}")?;
        for row in &self.rows {
            let cells = row
                .cells
                .iter()
                .map(|c| match &c.shade {
                    Some(s) => format!("{:.3}", s.area.left_area),
                    None => format!("{:^5}", "-"),
                })
                .join(" ");
            write!(f, "\n{BODY}{}{BODY:#} {cells}", row.month)?;
        }
        Ok(())
    }
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Low => "low",
            Verbosity::High => "high",
        };
        f.write_str(s)
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Config {
            verbosity,
            color,
            site,
            model,
            grid,
            ..
        } = self;
        let color = match color {
            ColorChoice::Auto => "auto",
            ColorChoice::Always => "always",
            ColorChoice::Never => "never",
        };
        write!(
            f,
            "{HEADER}Output{HEADER:#}:
    {BODY}Verbosity{BODY:#}: {verbosity}
    {BODY}Color{BODY:#}: {color}
{HEADER}Site{HEADER:#}:
{site}
{HEADER}Shade model{HEADER:#}:
{model}
{HEADER}Grid{HEADER:#}:
{grid}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ConfigBuilder,
        types::{Latitude, Longitude},
    };
    use anstream::adapter::strip_str;
    use anyhow::Result;
    use insta::assert_snapshot;

    fn plain(t: impl Display) -> String {
        strip_str(&t.to_string()).to_string()
    }

    fn trimmed(t: impl Display) -> String {
        plain(t).lines().map(str::trim).join("\n")
    }

    #[test]
    fn test_location() -> Result<()> {
        assert_snapshot!(Location::default(), @"3°43′54.70″S, 38°31′36.01″W");
        let loc = Location {
            lat: Latitude::try_from(51.4769)?,
            lon: Longitude::try_from(0.0)?,
        };
        assert_snapshot!(loc, @"51°28′36.84″N, 0°0′0.00″E");
        Ok(())
    }

    #[test]
    fn test_numbers() -> Result<()> {
        assert_snapshot!(UtcOffset::default(), @"UTC-03:00");
        assert_snapshot!(UtcOffset::try_from(5.75)?, @"UTC+05:45");
        assert_snapshot!(Length::try_from(1.5)?, @"1.50 m");
        assert_snapshot!(Epsilon::default(), @"1e-15");
        assert_snapshot!(Span::<Month>::default(), @"jan to dec");
        assert_snapshot!(Span::<Hour>::default(), @"06:00 to 17:00");
        let pos = SolarPosition::try_from((195.04, 70.0))?;
        assert_snapshot!(pos, @"azimuth 195.04°, elevation 70.00°");
        Ok(())
    }

    #[test]
    fn test_polygon() {
        let poly = ShadePolygon::new(vec![
            Point::new(0.0, 0.75),
            Point::new(0.5, 0.25),
            Point::new(0.0, 0.0),
        ]);
        assert_snapshot!(
            poly,
            @"(0.0000, 0.7500) (0.5000, 0.2500) (0.0000, 0.0000)"
        );
    }

    #[test]
    fn test_site() {
        assert_snapshot!(trimmed(Site::default()), @r###"
        Location: 3°43′54.70″S, 38°31′36.01″W
        Offset: UTC-03:00
        Pole height: 1.00 m
        Eye height: 1.50 m
        Observer distance: 3.00 m
        "###);
    }

    #[test]
    fn test_config_output() {
        let mut c = ConfigBuilder::default().build();
        c.verbosity = Verbosity::High;
        c.color = ColorChoice::Never;
        let s = trimmed(&c);
        let head = s.lines().take(4).join("\n");
        assert_snapshot!(head, @r###"
        Output:
        Verbosity: high
        Color: never
        Site:
        "###);
        assert!(s.contains("Pole height: 1.00 m"), "{s}");
    }

    #[test]
    fn test_grid() {
        let spec = GridSpec::default();
        let g = Grid::sweep(&spec, &Site::default(), &ShadeModel::default());
        let s = plain(&g);
        let mut lines = s.lines();
        assert_eq!(
            lines.next(),
            Some(
                "    06:00 07:00 08:00 09:00 10:00 11:00 12:00 13:00 14:00 \
                 15:00 16:00 17:00"
            )
        );
        let jan = lines.next().unwrap_or_default();
        assert!(jan.starts_with("jan "), "{jan}");
        assert_eq!(jan.split_whitespace().count(), 13);
        assert_eq!(s.lines().count(), 13);
    }
}
