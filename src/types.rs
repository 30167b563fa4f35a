/*  types.rs -- Common types
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
    calc_solar::{offset_delta, solar_noon_minutes, solar_position},
    error::types::{
        AzimuthError, DayError, ElevationError, EpsilonError, FractionError,
        HourError, LatitudeError, LengthError, LongitudeError, MonthError,
        SampleCountError, SolarPositionError, SpanError, StepError,
        UtcOffsetError,
    },
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use frunk::Generic;
use std::ops::Deref;
use tracing::level_filters::LevelFilter;

// Fortaleza, Brazil: -3° 43' 54.70", -38° 31' 36.01"
pub const DEFAULT_LATITUDE: f64 = -3.731862;
pub const DEFAULT_LONGITUDE: f64 = -38.526669;
pub const DEFAULT_UTC_OFFSET: f64 = -3.0;

// Gnomon and the person looking at it (meters)
pub const DEFAULT_POLE_HEIGHT: f64 = 1.0;
pub const DEFAULT_EYE_HEIGHT: f64 = 1.5;
pub const DEFAULT_OBSERVER_DISTANCE: f64 = 3.0;

pub const DEFAULT_EPSILON: f64 = 1e-15;
pub const DEFAULT_LINE_SAMPLES: usize = 300;
pub const DEFAULT_SEARCH_SAMPLES: usize = 180;
pub const DEFAULT_TARGET: f64 = 0.5;

pub const DEFAULT_YEAR: i32 = 2026;
pub const DEFAULT_DAY: u8 = 1;
pub const DEFAULT_MINUTE: u8 = 0;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_UTC_OFFSET: f64 = -12.0;
pub const MAX_UTC_OFFSET: f64 = 14.0;
pub const MIN_ELEVATION: f64 = -90.0;
pub const MAX_ELEVATION: f64 = 90.0;
pub const MIN_AZIMUTH: f64 = 0.0;
pub const MAX_AZIMUTH: f64 = 360.0;
pub const MAX_EPSILON: f64 = 1e-6;
pub const MIN_SAMPLES: usize = 2;
pub const MIN_MONTH: u8 = 1;
pub const MAX_MONTH: u8 = 12;
pub const MIN_DAY: u8 = 1;
pub const MAX_DAY: u8 = 31;
pub const MAX_HOUR: u8 = 23;
pub const MIN_STEP: u8 = 1;
pub const MAX_STEP: u8 = 12;

// The sundial grid only covers daylight hours
pub const MIN_GRID_HOUR: u8 = 6;
pub const MAX_GRID_HOUR: u8 = 17;

#[derive(Debug, Clone, Copy)]
pub struct Latitude(f64);
#[derive(Debug, Clone, Copy)]
pub struct Longitude(f64);
#[derive(Debug, Clone, Copy, Default, PartialEq, Generic)]
pub struct Location {
    pub lat: Latitude,
    pub lon: Longitude,
}

/// Fixed offset from UTC in hours. Applied as a flat shift, there are no
/// daylight saving rules involved.
#[derive(Debug, Clone, Copy)]
pub struct UtcOffset(f64);

/// Where the sundial stands
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Observer {
    pub loc: Location,
    pub offset: UtcOffset,
}

/// Positive length in meters
#[derive(Debug, Clone, Copy)]
pub struct Length(f64);

/// Position of the person looking at the gnomon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    pub eye_height: Length,
    pub observer_distance: Length,
}

/// Everything about the physical setup that stays fixed during a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Site {
    pub observer: Observer,
    pub view: ViewGeometry,
    pub pole_height: Length,
}

/// A value in the closed unit interval
#[derive(Debug, Clone, Copy)]
pub struct Fraction(f64);

/// Degeneracy guard added to the denominators of the shade model
#[derive(Debug, Clone, Copy)]
pub struct Epsilon(f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCount(usize);

/// Numerical knobs of the shade model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeModel {
    pub eps: Epsilon,
    /// Samples per boundary segment
    pub line_samples: SampleCount,
    /// Grid size of the inverse search over q
    pub search_samples: SampleCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month(u8);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Day(u8);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hour(u8);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Step(u8);

/// Inclusive range with `min <= max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

/// Degrees clockwise from north, in `[0, 360)`
#[derive(Debug, Clone, Copy)]
pub struct Azimuth(f64);

/// Degrees above the horizon
#[derive(Debug, Clone, Copy, PartialOrd)]
pub struct Elevation(f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    pub azimuth: Azimuth,
    pub elevation: Elevation,
}

/// Angles that set the slopes of the two boundary lines in the tile.
/// Only defined while the sun is above the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeAngles {
    /// Radians, in `[0, π/2)`
    pub alpha: f64,
    /// Radians, in `[0, π/2)`
    pub beta: f64,
    /// Meters
    pub shadow_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slopes {
    pub ta: f64,
    pub tb: f64,
}

/// Shadow of the gnomon on flat ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCast {
    pub length: f64,
    /// Degrees clockwise from north, pointing away from the sun
    pub bearing: f64,
    pub tip_east: f64,
    pub tip_north: f64,
}

/// Point in tile coordinates, origin at the bottom left corner
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Corners of the left region boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoints {
    /// Where the light line leaves the top edge, or its first sample
    pub l0: Point,
    /// Light line at `x = q`
    pub ln: Point,
    /// Shadow line at `x = q`
    pub sn: Point,
    /// Where the shadow line ends
    pub s1: Point,
}

/// Tile edges touched by the two boundary lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    LeftBottom,
    TopRight,
    LeftRight,
    TopBottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadePolygon(Vec<Point>);

/// Closed form area next to the polygon area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    pub area: f64,
    pub left_area: f64,
}

/// Date and time left out on the command line default to now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct When {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

/// Month by hour sweep of the sundial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub year: i32,
    pub day: Day,
    pub minute: u8,
    pub months: Span<Month>,
    pub month_step: Step,
    /// Clamped to the daylight hours of the grid
    pub hours: Span<Hour>,
    pub hour_step: Step,
    /// Vertical bias, swept from `min` at the first hour to `max` at the
    /// last one
    pub bias: Span<Fraction>,
    /// Covered fraction every cell aims for
    pub target: Fraction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub hours: Vec<u8>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub month: Month,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub hour: u8,
    pub bias: f64,
    /// `None` while the sun is down
    pub shade: Option<CellShade>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellShade {
    pub position: SolarPosition,
    pub angles: ShadeAngles,
    pub split: f64,
    /// Mirrored for afternoon cells
    pub polygon: ShadePolygon,
    pub area: Reconciliation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Position(When),
    Print(Option<NaiveDate>),
    Area { when: When, q: Fraction, p: Fraction },
    Search { when: When, p: Fraction },
    Grid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    #[default]
    Low,
    High,
}

//

impl Default for Latitude {
    fn default() -> Self {
        Self(DEFAULT_LATITUDE)
    }
}

impl Default for Longitude {
    fn default() -> Self {
        Self(DEFAULT_LONGITUDE)
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self(DEFAULT_UTC_OFFSET)
    }
}

impl Default for Length {
    fn default() -> Self {
        Self(DEFAULT_POLE_HEIGHT)
    }
}

impl Default for ViewGeometry {
    fn default() -> Self {
        Self {
            eye_height: Length(DEFAULT_EYE_HEIGHT),
            observer_distance: Length(DEFAULT_OBSERVER_DISTANCE),
        }
    }
}

impl Default for Epsilon {
    fn default() -> Self {
        Self(DEFAULT_EPSILON)
    }
}

impl Default for ShadeModel {
    fn default() -> Self {
        Self {
            eps: Default::default(),
            line_samples: SampleCount(DEFAULT_LINE_SAMPLES),
            search_samples: SampleCount(DEFAULT_SEARCH_SAMPLES),
        }
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self(DEFAULT_TARGET)
    }
}

impl Default for Day {
    fn default() -> Self {
        Self(DEFAULT_DAY)
    }
}

impl Default for Step {
    fn default() -> Self {
        Self(MIN_STEP)
    }
}

impl Default for Span<Month> {
    fn default() -> Self {
        Self {
            min: Month(MIN_MONTH),
            max: Month(MAX_MONTH),
        }
    }
}

impl Default for Span<Hour> {
    fn default() -> Self {
        Self {
            min: Hour(MIN_GRID_HOUR),
            max: Hour(MAX_GRID_HOUR),
        }
    }
}

impl Default for Span<Fraction> {
    fn default() -> Self {
        Self {
            min: Fraction(0.0),
            max: Fraction(1.0),
        }
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR,
            day: Default::default(),
            minute: DEFAULT_MINUTE,
            months: Default::default(),
            month_step: Default::default(),
            hours: Default::default(),
            hour_step: Default::default(),
            bias: Default::default(),
            target: Default::default(),
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Grid
    }
}

//

impl TryFrom<f64> for Latitude {
    type Error = LatitudeError;

    /// Open range, both poles are rejected
    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if n > MIN_LATITUDE && n < MAX_LATITUDE {
            Ok(Self(n))
        } else {
            Err(LatitudeError(n))
        }
    }
}

impl TryFrom<f64> for Longitude {
    type Error = LongitudeError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&n) {
            Ok(Self(n))
        } else {
            Err(LongitudeError(n))
        }
    }
}

impl TryFrom<f64> for UtcOffset {
    type Error = UtcOffsetError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if (MIN_UTC_OFFSET..=MAX_UTC_OFFSET).contains(&n) {
            Ok(Self(n))
        } else {
            Err(UtcOffsetError(n))
        }
    }
}

impl TryFrom<f64> for Length {
    type Error = LengthError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if n.is_finite() && n > 0.0 {
            Ok(Self(n))
        } else {
            Err(LengthError(n))
        }
    }
}

impl TryFrom<f64> for Fraction {
    type Error = FractionError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if (0.0..=1.0).contains(&n) {
            Ok(Self(n))
        } else {
            Err(FractionError(n))
        }
    }
}

impl TryFrom<f64> for Epsilon {
    type Error = EpsilonError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if n > 0.0 && n <= MAX_EPSILON {
            Ok(Self(n))
        } else {
            Err(EpsilonError(n))
        }
    }
}

impl TryFrom<usize> for SampleCount {
    type Error = SampleCountError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        if n >= MIN_SAMPLES {
            Ok(Self(n))
        } else {
            Err(SampleCountError(n))
        }
    }
}

impl TryFrom<u8> for Month {
    type Error = MonthError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if (MIN_MONTH..=MAX_MONTH).contains(&n) {
            Ok(Self(n))
        } else {
            Err(MonthError(n))
        }
    }
}

impl TryFrom<u8> for Day {
    type Error = DayError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if (MIN_DAY..=MAX_DAY).contains(&n) {
            Ok(Self(n))
        } else {
            Err(DayError(n))
        }
    }
}

impl TryFrom<u8> for Hour {
    type Error = HourError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if n <= MAX_HOUR {
            Ok(Self(n))
        } else {
            Err(HourError(n))
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = StepError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if (MIN_STEP..=MAX_STEP).contains(&n) {
            Ok(Self(n))
        } else {
            Err(StepError(n))
        }
    }
}

impl<T: PartialOrd> TryFrom<(T, T)> for Span<T> {
    type Error = SpanError;

    fn try_from((min, max): (T, T)) -> Result<Self, Self::Error> {
        if min <= max {
            Ok(Self { min, max })
        } else {
            Err(SpanError)
        }
    }
}

impl TryFrom<f64> for Azimuth {
    type Error = AzimuthError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if (MIN_AZIMUTH..MAX_AZIMUTH).contains(&n) {
            Ok(Self(n))
        } else {
            Err(AzimuthError(n))
        }
    }
}

impl TryFrom<f64> for Elevation {
    type Error = ElevationError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        if (MIN_ELEVATION..=MAX_ELEVATION).contains(&n) {
            Ok(Self(n))
        } else {
            Err(ElevationError(n))
        }
    }
}

// NOTE: These newtypes only enforce boundaries on the inner value, so they
// deref to it. DerefMut is deliberately missing.

impl Deref for Latitude {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Longitude {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for UtcOffset {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Length {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Fraction {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Epsilon {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for SampleCount {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Month {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Day {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Hour {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Step {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Azimuth {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for Elevation {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for ShadePolygon {
    type Target = [Point];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

//

fn eq(lhs: f64, rhs: f64) -> bool {
    (lhs * 1e6).round() == (rhs * 1e6).round()
}

impl PartialEq for Latitude {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}
impl PartialEq for Longitude {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}
impl PartialEq for UtcOffset {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}
impl PartialEq for Length {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}
impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}
impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl PartialEq for Epsilon {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl PartialEq for Azimuth {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}
impl PartialEq for Elevation {
    fn eq(&self, other: &Self) -> bool {
        eq(**self, **other)
    }
}

//

impl UtcOffset {
    pub fn as_delta(&self) -> TimeDelta {
        offset_delta(self.0)
    }
}

impl Observer {
    pub fn new(loc: Location, offset: UtcOffset) -> Self {
        Self { loc, offset }
    }

    /// Local civil time of the sun's meridian transit
    pub fn solar_noon(&self, date: NaiveDate) -> NaiveTime {
        let Self { loc, offset } = self;
        let minutes = solar_noon_minutes(date, *loc.lon, **offset);
        let secs = ((minutes * 60.0).round() as i64).rem_euclid(86400) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl SolarPosition {
    /// Position of the sun seen by `obs` at local civil time `local`
    pub fn new(local: NaiveDateTime, obs: &Observer) -> Self {
        let (az, elev) =
            solar_position(local, *obs.loc.lat, *obs.loc.lon, *obs.offset);
        Self {
            azimuth: Azimuth(az),
            elevation: Elevation(elev),
        }
    }

    pub fn is_daytime(&self) -> bool {
        *self.elevation > 0.0
    }

    /// Unit vector pointing at the sun, as (east, north, up)
    pub fn sun_vector(&self) -> [f64; 3] {
        let a = self.azimuth.to_radians();
        let e = self.elevation.to_radians();
        [a.sin() * e.cos(), a.cos() * e.cos(), e.sin()]
    }
}

impl TryFrom<(f64, f64)> for SolarPosition {
    type Error = SolarPositionError;

    fn try_from((az, elev): (f64, f64)) -> Result<Self, Self::Error> {
        Ok(Self {
            azimuth: az.try_into()?,
            elevation: elev.try_into()?,
        })
    }
}

impl ShadowCast {
    pub fn new(pos: &SolarPosition, pole_height: Length) -> Option<Self> {
        if !pos.is_daytime() {
            return None;
        }
        let length = *pole_height / pos.elevation.to_radians().tan();
        let bearing = (*pos.azimuth + 180.0) % 360.0;
        let b = bearing.to_radians();
        Some(Self {
            length,
            bearing,
            tip_east: length * b.sin(),
            tip_north: length * b.cos(),
        })
    }
}

impl ShadeAngles {
    pub fn slopes(&self) -> Slopes {
        Slopes {
            ta: self.alpha.tan(),
            tb: self.beta.tan(),
        }
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl ShadePolygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    /// Shoelace formula, orientation independent
    pub fn area(&self) -> f64 {
        let n = self.0.len();
        let twice = (0..n)
            .map(|i| {
                let (a, b) = (self.0[i], self.0[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>();
        twice.abs() / 2.0
    }

    /// Flip around the vertical center line of the tile
    pub fn mirrored(&self) -> Self {
        Self(self.0.iter().map(|p| Point::new(1.0 - p.x, p.y)).collect())
    }
}

impl Reconciliation {
    pub fn diff(&self) -> f64 {
        (self.left_area - self.area).abs()
    }
}

impl Span<Fraction> {
    pub fn lerp(&self, t: f64) -> f64 {
        t * (*self.max - *self.min) + *self.min
    }
}

impl Month {
    pub fn name(&self) -> &'static str {
        const MONTHS: [&str; 12] = [
            "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep",
            "oct", "nov", "dec",
        ];
        MONTHS[(self.0 - 1) as usize]
    }
}

impl Verbosity {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Low => LevelFilter::INFO,
            Verbosity::High => LevelFilter::DEBUG,
        }
    }
}
