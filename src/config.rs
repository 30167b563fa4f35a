/*  config.rs -- Hierarchical configuration
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
    cli::{CliArgs, CmdArgs, GridArgs, ModeArgs},
    error::config::{ConfigError, ConfigFileError},
    types::{
        Day, Epsilon, Fraction, GridSpec, Hour, Length, Location, Mode, Month,
        SampleCount, ShadeModel, Site, Span, Step, UtcOffset, Verbosity, When,
    },
};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{ColorChoice, Parser};
use const_format::formatcp;
use serde::{de, Deserialize, Deserializer};
use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use toml::Value;

pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const MAX_MINUTE: u8 = 59;

/// Merge of cli arguments and config files from highest priority to lowest:
/// 1. CLI arguments
/// 2. User config file
/// 3. System config file (Unix-like OS's only)
/// 4. Default values
#[derive(Debug)]
pub struct Config {
    pub mode: Mode,
    pub verbosity: Verbosity,
    pub color: ColorChoice,

    pub site: Site,
    pub model: ShadeModel,
    pub grid: GridSpec,
    pub time: fn() -> DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    mode: Mode,
    verbosity: Verbosity,
    color: ColorChoice,

    site: Site,
    model: ShadeModel,
    grid: GridSpec,
    time: fn() -> DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    location: Option<Location>,
    utc_offset: Option<UtcOffset>,
    pole_height: Option<Length>,
    eye_height: Option<Length>,
    observer_distance: Option<Length>,

    epsilon: Option<Epsilon>,
    line_samples: Option<SampleCount>,
    search_samples: Option<SampleCount>,

    year: Option<i32>,
    day: Option<Day>,
    minute: Option<u8>,
    months: Option<Span<Month>>,
    month_step: Option<Step>,
    hours: Option<Span<Hour>>,
    hour_step: Option<Step>,
    bias: Option<Span<Fraction>>,
    target: Option<Fraction>,
}

impl ConfigBuilder {
    /// `init_log` runs as soon as verbosity and color are known so that
    /// errors while reading config files are already logged
    pub fn new(
        init_log: impl FnOnce(Verbosity, ColorChoice),
    ) -> Result<Self, ConfigError> {
        Self::from_cli_args(CliArgs::parse(), init_log)
    }

    pub fn from_cli_args(
        cli_args: CliArgs,
        init_log: impl FnOnce(Verbosity, ColorChoice),
    ) -> Result<Self, ConfigError> {
        let verbosity = Verbosity::from(cli_args.verbosity.clone());
        init_log(verbosity, cli_args.color.unwrap_or_default());

        let mut cfg = Self::default();
        let config_path = cli_args.mode.cmd().config.as_deref();
        let config_file = ConfigFile::new(config_path)?;
        cfg.merge_with_config_file(config_file);
        cfg.merge_with_cli_args(cli_args);
        Ok(cfg)
    }

    pub fn build(self) -> Config {
        let Self {
            mode,
            verbosity,
            color,
            site,
            model,
            grid,
            time,
        } = self;

        Config {
            mode,
            verbosity,
            color,
            site,
            model,
            grid,
            time,
        }
    }

    pub(crate) fn merge_with_cli_args(&mut self, cli_args: CliArgs) {
        let CliArgs {
            mode,
            verbosity,
            color,
        } = cli_args;
        self.verbosity = verbosity.into();
        if let Some(t) = color {
            self.color = t;
        }

        match mode {
            ModeArgs::Position { c, w } => {
                self.merge_with_cmd_args(c);
                self.mode = Mode::Position(w.into());
            }
            ModeArgs::Print { c, date } => {
                self.merge_with_cmd_args(c);
                self.mode = Mode::Print(date);
            }
            ModeArgs::Area { c, w, split, bias } => {
                self.merge_with_cmd_args(c);
                self.mode = Mode::Area {
                    when: w.into(),
                    q: split,
                    p: bias,
                };
            }
            ModeArgs::Search { c, w, bias, target } => {
                self.merge_with_cmd_args(c);
                if let Some(t) = target {
                    self.grid.target = t;
                }
                self.mode = Mode::Search {
                    when: w.into(),
                    p: bias,
                };
            }
            ModeArgs::Grid { c, g } => {
                self.merge_with_cmd_args(c);
                self.merge_with_grid_args(g);
                self.mode = Mode::Grid;
            }
        }
    }

    fn merge_with_cmd_args(&mut self, args: CmdArgs) {
        let CmdArgs {
            location,
            utc_offset,
            pole_height,
            eye_height,
            observer_distance,
            epsilon,
            line_samples,
            search_samples,
            config: _,
        } = args;

        if let Some(t) = location {
            self.site.observer.loc = t;
        }
        if let Some(t) = utc_offset {
            self.site.observer.offset = t;
        }
        if let Some(t) = pole_height {
            self.site.pole_height = t;
        }
        if let Some(t) = eye_height {
            self.site.view.eye_height = t;
        }
        if let Some(t) = observer_distance {
            self.site.view.observer_distance = t;
        }

        if let Some(t) = epsilon {
            self.model.eps = t;
        }
        if let Some(t) = line_samples {
            self.model.line_samples = t;
        }
        if let Some(t) = search_samples {
            self.model.search_samples = t;
        }
    }

    fn merge_with_grid_args(&mut self, args: GridArgs) {
        let GridArgs {
            year,
            day,
            minute,
            months,
            month_step,
            hours,
            hour_step,
            bias,
            target,
        } = args;

        let g = &mut self.grid;
        if let Some(t) = year {
            g.year = t;
        }
        if let Some(t) = day {
            g.day = t;
        }
        if let Some(t) = minute {
            g.minute = t;
        }
        if let Some(t) = months {
            g.months = t;
        }
        if let Some(t) = month_step {
            g.month_step = t;
        }
        if let Some(t) = hours {
            g.hours = t;
        }
        if let Some(t) = hour_step {
            g.hour_step = t;
        }
        if let Some(t) = bias {
            g.bias = t;
        }
        if let Some(t) = target {
            g.target = t;
        }
    }

    #[allow(clippy::too_many_lines)]
    fn merge_with_config_file(&mut self, config: ConfigFile) {
        let ConfigFile {
            location,
            utc_offset,
            pole_height,
            eye_height,
            observer_distance,
            epsilon,
            line_samples,
            search_samples,
            year,
            day,
            minute,
            months,
            month_step,
            hours,
            hour_step,
            bias,
            target,
        } = config;

        if let Some(t) = location {
            self.site.observer.loc = t;
        }
        if let Some(t) = utc_offset {
            self.site.observer.offset = t;
        }
        if let Some(t) = pole_height {
            self.site.pole_height = t;
        }
        if let Some(t) = eye_height {
            self.site.view.eye_height = t;
        }
        if let Some(t) = observer_distance {
            self.site.view.observer_distance = t;
        }

        if let Some(t) = epsilon {
            self.model.eps = t;
        }
        if let Some(t) = line_samples {
            self.model.line_samples = t;
        }
        if let Some(t) = search_samples {
            self.model.search_samples = t;
        }

        let g = &mut self.grid;
        if let Some(t) = year {
            g.year = t;
        }
        if let Some(t) = day {
            g.day = t;
        }
        if let Some(t) = minute {
            g.minute = t.min(MAX_MINUTE);
        }
        if let Some(t) = months {
            g.months = t;
        }
        if let Some(t) = month_step {
            g.month_step = t;
        }
        if let Some(t) = hours {
            g.hours = t;
        }
        if let Some(t) = hour_step {
            g.hour_step = t;
        }
        if let Some(t) = bias {
            g.bias = t;
        }
        if let Some(t) = target {
            g.target = t;
        }
    }
}

impl Config {
    /// Local civil date and time, filling what `when` leaves out with the
    /// current time at the configured UTC offset
    pub fn local_datetime(&self, when: When) -> NaiveDateTime {
        let offset = self.site.observer.offset.as_delta();
        let now = (self.time)().naive_utc() + offset;
        let When { date, time } = when;
        NaiveDateTime::new(
            date.unwrap_or(now.date()),
            time.unwrap_or(now.time()),
        )
    }
}

impl ConfigFile {
    fn new(config_path: Option<&Path>) -> Result<Self, ConfigFileError> {
        #[cfg(unix)]
        let system_config =
            Path::new(formatcp!("/etc/{PKG_NAME}/config.toml"));
        let local_config =
            dirs::config_dir().map(|d| d.join(PKG_NAME).join("config.toml"));
        let user_config = config_path
            .map(|p| match p.is_file() {
                true => Ok(p),
                false => Err(ConfigFileError::PathNotFile(p.to_path_buf())),
            })
            .transpose()?
            .or(local_config.as_deref())
            .ok_or(ConfigFileError::ConfigDirNotFound)?;

        let mut config = Self::default();
        #[cfg(unix)]
        config.merge(Self::read(system_config)?);
        config.merge(Self::read(user_config)?);
        Ok(config)
    }

    /// Missing files read as empty
    fn read(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let buf = fs::read_to_string(path)
            .map_err(|e| ConfigFileError::OpenFailed(e, path.into()))?;
        Self::from_toml(&buf, path)
    }

    fn from_toml(buf: &str, path: &Path) -> Result<Self, ConfigFileError> {
        toml::from_str(buf).map_err(|e| {
            ConfigFileError::DeserializeFailed(e, PathBuf::from(path))
        })
    }

    fn merge(&mut self, other: Self) {
        let Self {
            location,
            utc_offset,
            pole_height,
            eye_height,
            observer_distance,
            epsilon,
            line_samples,
            search_samples,
            year,
            day,
            minute,
            months,
            month_step,
            hours,
            hour_step,
            bias,
            target,
        } = other;

        self.location = location.or(self.location);
        self.utc_offset = utc_offset.or(self.utc_offset);
        self.pole_height = pole_height.or(self.pole_height);
        self.eye_height = eye_height.or(self.eye_height);
        self.observer_distance = observer_distance.or(self.observer_distance);
        self.epsilon = epsilon.or(self.epsilon);
        self.line_samples = line_samples.or(self.line_samples);
        self.search_samples = search_samples.or(self.search_samples);
        self.year = year.or(self.year);
        self.day = day.or(self.day);
        self.minute = minute.or(self.minute);
        self.months = months.or(self.months);
        self.month_step = month_step.or(self.month_step);
        self.hours = hours.or(self.hours);
        self.hour_step = hour_step.or(self.hour_step);
        self.bias = bias.or(self.bias);
        self.target = target.or(self.target);
    }
}

//

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            mode: Default::default(),
            verbosity: Default::default(),
            color: Default::default(),
            site: Default::default(),
            model: Default::default(),
            grid: Default::default(),
            time: Utc::now,
        }
    }
}

/// Numbers and strings both go through `FromStr`, so `pole-height = 1.2`
/// and `pole-height = "1.2"` are the same
fn deserialize_from_str<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        v => Err(de::Error::custom(format!(
            "expected a string or a number, found {}",
            v.type_str()
        )))?,
    };
    s.parse().map_err(de::Error::custom)
}

macro_rules! impl_deserialize_from_str {
    ($($t:ty),*) => {$(
        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(
                d: D,
            ) -> Result<Self, D::Error> {
                deserialize_from_str(d)
            }
        }
    )*};
}

impl_deserialize_from_str!(
    Location,
    UtcOffset,
    Length,
    Fraction,
    Epsilon,
    SampleCount,
    Month,
    Day,
    Hour,
    Step
);

impl<'de, E, T> Deserialize<'de> for Span<T>
where
    E: std::error::Error,
    T: Clone + PartialOrd + FromStr<Err = E>,
{
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        deserialize_from_str(d)
    }
}
