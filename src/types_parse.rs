/*  types_parse.rs -- Parsing of common types
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
    error::parse::*,
    types::{
        Day, Epsilon, Fraction, Hour, Latitude, Length, Location, Longitude,
        Month, SampleCount, Span, Step, UtcOffset,
    },
    utils::IntoGeneric,
};
use chrono::{NaiveDate, NaiveTime};
use frunk::validated::IntoValidated;
use std::{error::Error, str::FromStr};

impl FromStr for Latitude {
    type Err = LatitudeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<f64>()
            .map_err(|e| LatitudeError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Longitude {
    type Err = LongitudeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<f64>()
            .map_err(|e| LongitudeError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lat =
            |s: &str| s.parse::<Latitude>().map_err(LocationErrorT::from);
        let lon =
            |s: &str| s.parse::<Longitude>().map_err(LocationErrorT::from);

        match *s.split(':').collect::<Vec<_>>().as_slice() {
            [a, b] => Ok((lat(a).into_validated() + lon(b))
                .into_result()?
                .into_generic()),
            _ => Err(LocationError::Fmt),
        }
    }
}

impl FromStr for UtcOffset {
    type Err = UtcOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<f64>()
            .map_err(|e| UtcOffsetError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Length {
    type Err = LengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<f64>()
            .map_err(|e| LengthError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<f64>()
            .map_err(|e| FractionError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Epsilon {
    type Err = EpsilonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<f64>()
            .map_err(|e| EpsilonError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for SampleCount {
    type Err = SampleCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<usize>()
            .map_err(|e| SampleCountError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Month {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<u8>()
            .map_err(|e| MonthError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Day {
    type Err = DayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<u8>()
            .map_err(|e| DayError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Hour {
    type Err = HourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<u8>()
            .map_err(|e| HourError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl FromStr for Step {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim()
            .parse::<u8>()
            .map_err(|e| StepError::Parse(e, s.into()))?
            .try_into()?)
    }
}

impl<E, T> FromStr for Span<T>
where
    E: Error,
    T: Clone + PartialOrd + FromStr<Err = E>,
{
    type Err = SpanError<E>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match *s.split('-').collect::<Vec<_>>().as_slice() {
            [v] => {
                let v = v.parse::<T>().map_err(|e| vec![e])?;
                Ok(Self {
                    min: v.clone(),
                    max: v,
                })
            }
            [min, max] => Ok((min.parse().into_validated() + max.parse())
                .into_result()?
                .into_generic::<(T, T)>()
                .try_into()?),
            _ => Err(SpanError::Fmt),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| DateError(e, s.into()))
}

/// Accepts `HH:MM` and `HH:MM:SS`
pub fn parse_time(s: &str) -> Result<NaiveTime, TimeError> {
    let t = s.trim();
    NaiveTime::parse_from_str(t, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .map_err(|e| TimeError(e, s.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use insta::assert_snapshot;

    #[test]
    fn test_location() -> Result<()> {
        let loc = "-3.731862:-38.526669".parse::<Location>()?;
        assert_eq!(*loc.lat, -3.731862);
        assert_eq!(*loc.lon, -38.526669);

        let loc = " 51.5 : 0 ".parse::<Location>()?;
        assert_eq!(*loc.lat, 51.5);
        assert_eq!(*loc.lon, 0.0);

        assert!("90:0".parse::<Location>().is_err());
        assert!(matches!(
            "-3.7".parse::<Location>(),
            Err(LocationError::Fmt)
        ));
        Ok(())
    }

    #[test]
    fn test_location_collects_both_errors() {
        let e = "91:west".parse::<Location>().unwrap_err();
        assert_snapshot!(e, @r###"
        - latitude must be strictly between -90° and 90°, got 91
        - invalid longitude (west):
          invalid float literal
        "###);
    }

    #[test]
    fn test_numbers() -> Result<()> {
        assert_eq!(*"-3".parse::<UtcOffset>()?, -3.0);
        assert_eq!(*"5.75".parse::<UtcOffset>()?, 5.75);
        assert!("-13".parse::<UtcOffset>().is_err());
        assert_eq!(*"1.2".parse::<Length>()?, 1.2);
        assert!("0".parse::<Length>().is_err());
        assert!("-1".parse::<Length>().is_err());
        assert!("inf".parse::<Length>().is_err());
        assert_eq!(*"0.5".parse::<Fraction>()?, 0.5);
        assert!("1.5".parse::<Fraction>().is_err());
        assert_eq!(*"1e-12".parse::<Epsilon>()?, 1e-12);
        assert!("0".parse::<Epsilon>().is_err());
        assert_eq!(*"300".parse::<SampleCount>()?, 300);
        assert!("1".parse::<SampleCount>().is_err());
        assert_eq!(*"12".parse::<Month>()?, 12);
        assert!("13".parse::<Month>().is_err());
        assert_eq!(*"31".parse::<Day>()?, 31);
        assert!("0".parse::<Day>().is_err());
        assert_eq!(*"0".parse::<Hour>()?, 0);
        assert!("24".parse::<Hour>().is_err());
        assert_eq!(*"12".parse::<Step>()?, 12);
        assert!("0".parse::<Step>().is_err());
        Ok(())
    }

    #[test]
    fn test_number_errors() {
        assert_snapshot!(
            "x".parse::<Month>().unwrap_err(),
            @r###"
        invalid month (x):
        invalid digit found in string
        "###
        );
        assert_snapshot!(
            "-0.5".parse::<Fraction>().unwrap_err(),
            @"value must be between 0 and 1, got -0.5"
        );
    }

    #[test]
    fn test_span() -> Result<()> {
        let s = "3-9".parse::<Span<Month>>()?;
        assert_eq!((*s.min, *s.max), (3, 9));
        let s = "7".parse::<Span<Hour>>()?;
        assert_eq!((*s.min, *s.max), (7, 7));
        let s = "0.2-0.8".parse::<Span<Fraction>>()?;
        assert_eq!((*s.min, *s.max), (0.2, 0.8));

        assert!(matches!(
            "9-3".parse::<Span<Month>>(),
            Err(SpanError::Type(_))
        ));
        assert!(matches!(
            "1-2-3".parse::<Span<Month>>(),
            Err(SpanError::Fmt)
        ));
        assert!(matches!(
            "0-13".parse::<Span<Month>>(),
            Err(SpanError::Vec(_))
        ));
        Ok(())
    }

    #[test]
    fn test_date_time() -> Result<()> {
        let d = parse_date("2026-03-20")?;
        assert_eq!(Some(d), NaiveDate::from_ymd_opt(2026, 3, 20));
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("20/03/2026").is_err());

        let t = parse_time("12:30")?;
        assert_eq!(Some(t), NaiveTime::from_hms_opt(12, 30, 0));
        let t = parse_time("06:05:09")?;
        assert_eq!(Some(t), NaiveTime::from_hms_opt(6, 5, 9));
        assert!(parse_time("25:00").is_err());
        Ok(())
    }
}
