/*  error.rs -- Errors
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

use crate::types_display::ERR;
use chrono::NaiveDateTime;
use config::ConfigError;
use itertools::Itertools;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub struct VecError<E: Error>(pub Vec<E>);

impl<E: Error> Display for VecError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let err =
            |e: &E| "- ".to_string() + &e.to_string().lines().join("\n  ");
        let s = self.0.iter().map(err).join("\n");
        f.write_str(&s)
    }
}

impl<E: Error> From<Vec<E>> for VecError<E> {
    fn from(v: Vec<E>) -> Self {
        Self(v)
    }
}

//

#[derive(Debug)]
pub struct SombraError(SombraErrorKind);

impl Display for SombraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sep = "\n".to_string() + &" ".repeat("error: ".len());
        let s = format!("{ERR}error:{ERR:#} {}", self.0).lines().join(&sep);
        f.write_str(&s)
    }
}

impl Error for SombraError {}

impl From<SombraErrorKind> for SombraError {
    fn from(e: SombraErrorKind) -> Self {
        Self(e)
    }
}

impl From<ConfigError> for SombraError {
    fn from(e: ConfigError) -> Self {
        Self(e.into())
    }
}

impl SombraError {
    pub fn kind(&self) -> &SombraErrorKind {
        &self.0
    }

    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self.0 {
            SombraErrorKind::Config(_) => exitcode::CONFIG,
            SombraErrorKind::NoSun(_) => exitcode::DATAERR,
        }
    }
}

#[derive(Debug, Error)]
pub enum SombraErrorKind {
    #[error("configuration failed:\n{0}")]
    Config(#[from] ConfigError),
    #[error("the sun is below the horizon at {0}")]
    NoSun(NaiveDateTime),
}

pub mod types {
    use super::*;
    use crate::types::{
        MAX_AZIMUTH, MAX_DAY, MAX_ELEVATION, MAX_EPSILON, MAX_HOUR,
        MAX_LATITUDE, MAX_LONGITUDE, MAX_MONTH, MAX_STEP, MAX_UTC_OFFSET,
        MIN_AZIMUTH, MIN_DAY, MIN_ELEVATION, MIN_LATITUDE, MIN_LONGITUDE,
        MIN_MONTH, MIN_SAMPLES, MIN_STEP, MIN_UTC_OFFSET,
    };

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("latitude must be strictly between {MIN_LATITUDE}° and {MAX_LATITUDE}°, got {0}")]
    pub struct LatitudeError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("longitude must be between {MIN_LONGITUDE}° and {MAX_LONGITUDE}°, got {0}")]
    pub struct LongitudeError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("UTC offset must be between {MIN_UTC_OFFSET}h and {MAX_UTC_OFFSET}h, got {0}")]
    pub struct UtcOffsetError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("length must be a positive number of meters, got {0}")]
    pub struct LengthError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("value must be between 0 and 1, got {0}")]
    pub struct FractionError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("epsilon must be positive and at most {MAX_EPSILON}, got {0}")]
    pub struct EpsilonError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("sample count must be at least {MIN_SAMPLES}, got {0}")]
    pub struct SampleCountError(pub usize);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("month must be between {MIN_MONTH} and {MAX_MONTH}, got {0}")]
    pub struct MonthError(pub u8);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("day must be between {MIN_DAY} and {MAX_DAY}, got {0}")]
    pub struct DayError(pub u8);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("hour must be between 0 and {MAX_HOUR}, got {0}")]
    pub struct HourError(pub u8);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("step must be between {MIN_STEP} and {MAX_STEP}, got {0}")]
    pub struct StepError(pub u8);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("start of a range must not be greater than its end")]
    pub struct SpanError;

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("azimuth must be in [{MIN_AZIMUTH}°, {MAX_AZIMUTH}°), got {0}")]
    pub struct AzimuthError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("elevation must be between {MIN_ELEVATION}° and {MAX_ELEVATION}°, got {0}")]
    pub struct ElevationError(pub f64);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("{0}")]
    pub enum SolarPositionError {
        Azimuth(#[from] AzimuthError),
        Elevation(#[from] ElevationError),
    }
}

pub mod parse {
    use super::*;
    use std::num::{ParseFloatError, ParseIntError};

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum LatitudeError {
        #[error("invalid latitude ({1}):\n{0}")]
        Parse(ParseFloatError, String),
        #[error("{0}")]
        Type(#[from] types::LatitudeError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum LongitudeError {
        #[error("invalid longitude ({1}):\n{0}")]
        Parse(ParseFloatError, String),
        #[error("{0}")]
        Type(#[from] types::LongitudeError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum UtcOffsetError {
        #[error("invalid UTC offset ({1}):\n{0}")]
        Parse(ParseFloatError, String),
        #[error("{0}")]
        Type(#[from] types::UtcOffsetError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum LengthError {
        #[error("invalid length ({1}):\n{0}")]
        Parse(ParseFloatError, String),
        #[error("{0}")]
        Type(#[from] types::LengthError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum FractionError {
        #[error("invalid fraction ({1}):\n{0}")]
        Parse(ParseFloatError, String),
        #[error("{0}")]
        Type(#[from] types::FractionError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum EpsilonError {
        #[error("invalid epsilon ({1}):\n{0}")]
        Parse(ParseFloatError, String),
        #[error("{0}")]
        Type(#[from] types::EpsilonError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum SampleCountError {
        #[error("invalid sample count ({1}):\n{0}")]
        Parse(ParseIntError, String),
        #[error("{0}")]
        Type(#[from] types::SampleCountError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum MonthError {
        #[error("invalid month ({1}):\n{0}")]
        Parse(ParseIntError, String),
        #[error("{0}")]
        Type(#[from] types::MonthError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum DayError {
        #[error("invalid day ({1}):\n{0}")]
        Parse(ParseIntError, String),
        #[error("{0}")]
        Type(#[from] types::DayError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum HourError {
        #[error("invalid hour ({1}):\n{0}")]
        Parse(ParseIntError, String),
        #[error("{0}")]
        Type(#[from] types::HourError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum StepError {
        #[error("invalid step ({1}):\n{0}")]
        Parse(ParseIntError, String),
        #[error("{0}")]
        Type(#[from] types::StepError),
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("{0}")]
    pub enum LocationErrorT {
        Latitude(#[from] LatitudeError),
        Longitude(#[from] LongitudeError),
    }

    #[derive(Debug, Error)]
    pub enum LocationError {
        #[error("{0}")]
        Vec(#[from] VecError<LocationErrorT>),
        #[error("location must be formatted as LATITUDE:LONGITUDE")]
        Fmt,
    }

    #[derive(Debug, Error)]
    pub enum SpanError<E: Error> {
        #[error("{0}")]
        Vec(#[from] VecError<E>),
        #[error("{0}")]
        Type(#[from] types::SpanError),
        #[error("range must be formatted as MIN-MAX or a single value")]
        Fmt,
    }

    impl From<Vec<LocationErrorT>> for LocationError {
        fn from(v: Vec<LocationErrorT>) -> Self {
            Self::Vec(VecError(v))
        }
    }

    impl<E: Error> From<Vec<E>> for SpanError<E> {
        fn from(v: Vec<E>) -> Self {
            Self::Vec(VecError(v))
        }
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("invalid date ({1}), expected YYYY-MM-DD:\n{0}")]
    pub struct DateError(pub chrono::ParseError, pub String);

    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("invalid time ({1}), expected HH:MM or HH:MM:SS:\n{0}")]
    pub struct TimeError(pub chrono::ParseError, pub String);
}

pub mod config {
    use super::*;
    use std::{io, path::PathBuf};

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("{0}")]
        File(#[from] ConfigFileError),
    }

    #[derive(Debug, Error)]
    pub enum ConfigFileError {
        #[error("given path is not a file ({0})")]
        PathNotFile(PathBuf),
        #[error("unable to find configuration file. Use the -c flag.")]
        ConfigDirNotFound,
        #[error("unable to read file ({1}):\n{0}")]
        OpenFailed(io::Error, PathBuf),
        #[error("unable to deserialize file ({1}):\n{0}")]
        DeserializeFailed(toml::de::Error, PathBuf),
    }
}
