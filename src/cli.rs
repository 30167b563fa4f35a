/*  cli.rs -- Command line interface
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
    types::{
        Day, Epsilon, Fraction, Hour, Length, Location, Month, SampleCount,
        Span, Step, UtcOffset, Verbosity, When,
    },
    types_parse::{parse_date, parse_time},
};
use clap::{ArgAction, Args, ColorChoice, Parser, Subcommand};
use chrono::{NaiveDate, NaiveTime};
use const_format::formatcp;
use std::{path::PathBuf, str::FromStr};

const VERSION: &str = {
    const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_DESCRIBE: &str = env!("VERGEN_GIT_DESCRIBE");
    const GIT_COMMIT_DATE: &str = env!("VERGEN_GIT_COMMIT_DATE");

    formatcp!("{PKG_VERSION} ({GIT_DESCRIBE} {GIT_COMMIT_DATE})")
};

const VERSION_LONG: &str = {
    const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");
    const RUSTC_HOST_TRIPLE: &str = env!("VERGEN_RUSTC_HOST_TRIPLE");
    const CARGO_FEATURES: &str = env!("VERGEN_CARGO_FEATURES");
    const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

    formatcp!(
        "{VERSION}

rustc version:       {RUSTC_SEMVER}
rustc host triple:   {RUSTC_HOST_TRIPLE}
cargo features:      {CARGO_FEATURES}
cargo target triple: {CARGO_TARGET_TRIPLE}"
    )
};

/// Sun position and gnomon shadow coverage for a fixed observer
#[derive(Debug, Parser)]
#[command(version = VERSION, long_version = VERSION_LONG, about)]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[command(subcommand)]
    pub mode: ModeArgs,

    #[command(flatten)]
    pub verbosity: VerbosityArgs,

    #[arg(long, global = true, display_order(100), value_name = "WHEN")]
    pub color: Option<ColorChoice>,
}

#[derive(Debug, Subcommand)]
pub enum ModeArgs {
    /// Solar position, solar noon and cast shadow at a date and time
    Position {
        #[command(flatten)]
        c: CmdArgs,
        #[command(flatten)]
        w: WhenArgs,
    },

    /// Hourly solar position table of a day
    Print {
        #[command(flatten)]
        c: CmdArgs,
        #[arg(long, short, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Tile angles, covered area and boundary of one split
    Area {
        #[command(flatten)]
        c: CmdArgs,
        #[command(flatten)]
        w: WhenArgs,
        /// Horizontal split of the tile (q)
        #[arg(long, short, value_parser = Fraction::from_str)]
        split: Fraction,
        /// Vertical bias of both lines (p)
        #[arg(long, short, value_parser = Fraction::from_str)]
        bias: Fraction,
    },

    /// Split that covers a target fraction of the tile
    Search {
        #[command(flatten)]
        c: CmdArgs,
        #[command(flatten)]
        w: WhenArgs,
        /// Vertical bias of both lines (p)
        #[arg(long, short, value_parser = Fraction::from_str)]
        bias: Fraction,
        /// Covered fraction to look for
        #[arg(long, short = 'a', value_parser = Fraction::from_str)]
        target: Option<Fraction>,
    },

    /// Covered area of every month and hour of the sundial
    Grid {
        #[command(flatten)]
        c: CmdArgs,
        #[command(flatten)]
        g: GridArgs,
    },
}

#[derive(Debug, Args)]
pub struct CmdArgs {
    /// Location of the sundial
    #[arg(
        long,
        short,
        value_name = "LATITUDE:LONGITUDE",
        allow_hyphen_values = true,
        value_parser = Location::from_str
    )]
    pub location: Option<Location>,

    /// Fixed offset from UTC in hours
    #[arg(
        long,
        short,
        value_name = "HOURS",
        allow_hyphen_values = true,
        value_parser = UtcOffset::from_str
    )]
    pub utc_offset: Option<UtcOffset>,

    /// Height of the gnomon in meters
    #[arg(long, value_name = "METERS", value_parser = Length::from_str)]
    pub pole_height: Option<Length>,
    #[arg(long, value_name = "METERS", value_parser = Length::from_str)]
    pub eye_height: Option<Length>,
    #[arg(long, value_name = "METERS", value_parser = Length::from_str)]
    pub observer_distance: Option<Length>,

    #[arg(long, display_order(99), value_parser = Epsilon::from_str)]
    pub epsilon: Option<Epsilon>,
    #[arg(long, display_order(99), value_parser = SampleCount::from_str)]
    pub line_samples: Option<SampleCount>,
    #[arg(long, display_order(99), value_parser = SampleCount::from_str)]
    pub search_samples: Option<SampleCount>,

    #[arg(long, short, display_order(100), value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WhenArgs {
    /// Local date, today if missing
    #[arg(long, short, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// Local time, now if missing
    #[arg(long, short, value_name = "HH:MM[:SS]", value_parser = parse_time)]
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Args)]
pub struct GridArgs {
    #[arg(long, short)]
    pub year: Option<i32>,
    /// Day of the month
    #[arg(long, value_parser = Day::from_str)]
    pub day: Option<Day>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=59))]
    pub minute: Option<u8>,
    #[arg(long, short, value_name = "MIN-MAX", value_parser = Span::<Month>::from_str)]
    pub months: Option<Span<Month>>,
    #[arg(long, value_parser = Step::from_str)]
    pub month_step: Option<Step>,
    #[arg(long, short = 'H', value_name = "MIN-MAX", value_parser = Span::<Hour>::from_str)]
    pub hours: Option<Span<Hour>>,
    #[arg(long, value_parser = Step::from_str)]
    pub hour_step: Option<Step>,
    /// Vertical bias at the first and the last hour
    #[arg(long, short, value_name = "MIN-MAX", value_parser = Span::<Fraction>::from_str)]
    pub bias: Option<Span<Fraction>>,
    /// Covered fraction every cell aims for
    #[arg(long, short = 'a', value_parser = Fraction::from_str)]
    pub target: Option<Fraction>,
}

#[derive(Debug, Clone, Args)]
pub struct VerbosityArgs {
    #[arg(long, short, global = true, display_order(100))]
    #[arg(action = ArgAction::SetTrue, conflicts_with = "verbose")]
    pub quiet: bool,
    #[arg(long, short, global = true, display_order(100))]
    pub verbose: bool,
}

impl From<VerbosityArgs> for Verbosity {
    fn from(t: VerbosityArgs) -> Self {
        match t {
            VerbosityArgs { quiet: true, .. } => Verbosity::Quiet,
            VerbosityArgs { verbose: true, .. } => Verbosity::High,
            _ => Verbosity::Low,
        }
    }
}

impl From<WhenArgs> for When {
    fn from(t: WhenArgs) -> Self {
        let WhenArgs { date, time } = t;
        When { date, time }
    }
}

impl ModeArgs {
    pub fn cmd(&self) -> &CmdArgs {
        match self {
            ModeArgs::Position { c, .. }
            | ModeArgs::Print { c, .. }
            | ModeArgs::Area { c, .. }
            | ModeArgs::Search { c, .. }
            | ModeArgs::Grid { c, .. } => c,
        }
    }
}

pub trait ClapColorChoiceExt {
    fn to_choice(self) -> anstream::ColorChoice;
}

impl ClapColorChoiceExt for ColorChoice {
    fn to_choice(self) -> anstream::ColorChoice {
        match self {
            ColorChoice::Auto => anstream::ColorChoice::Auto,
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_area() -> Result<()> {
        let args = CliArgs::try_parse_from([
            "sombra",
            "area",
            "-l",
            "-3.73:-38.53",
            "-u",
            "-3",
            "-d",
            "2026-01-01",
            "-t",
            "12:00",
            "-s",
            "0.4",
            "-b",
            "0.5",
            "-v",
        ])?;
        assert_eq!(Verbosity::from(args.verbosity), Verbosity::High);
        let ModeArgs::Area { c, w, split, bias } = args.mode else {
            anyhow::bail!("expected the area subcommand");
        };
        assert_eq!(c.location.map(|l| *l.lat), Some(-3.73));
        assert_eq!(c.utc_offset.map(|o| *o), Some(-3.0));
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(w.time, NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!((*split, *bias), (0.4, 0.5));
        Ok(())
    }

    #[test]
    fn test_parse_grid() -> Result<()> {
        let args = CliArgs::try_parse_from([
            "sombra", "-q", "grid", "-m", "3-6", "-H", "8-16", "-b", "0-1",
            "-a", "0.3",
        ])?;
        assert_eq!(Verbosity::from(args.verbosity), Verbosity::Quiet);
        let ModeArgs::Grid { g, .. } = args.mode else {
            anyhow::bail!("expected the grid subcommand");
        };
        assert_eq!(g.months.map(|m| (*m.min, *m.max)), Some((3, 6)));
        assert_eq!(g.hours.map(|h| (*h.min, *h.max)), Some((8, 16)));
        assert_eq!(g.target.map(|t| *t), Some(0.3));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        let parse = |args: &[&str]| CliArgs::try_parse_from(args).is_err();
        assert!(parse(&["sombra", "grid", "-m", "0-13"]));
        assert!(parse(&["sombra", "area", "-s", "2", "-b", "0.5"]));
        assert!(parse(&["sombra", "position", "-l", "95:0"]));
        assert!(parse(&["sombra", "position", "-q", "-v"]));
    }
}
