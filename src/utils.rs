/*  utils.rs -- Utilities
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

use frunk::Generic;
use itertools::Itertools;

pub trait IsDefault {
    fn is_default(&self) -> bool;
}
impl<T: Default + PartialEq> IsDefault for T {
    fn is_default(&self) -> bool {
        *self == T::default()
    }
}

/// Does the same thing as [frunk::from_generic]
pub trait IntoGeneric {
    fn into_generic<Dst>(self) -> Dst
    where
        Dst: Generic<Repr = Self>;
}
impl<Repr> IntoGeneric for Repr {
    fn into_generic<Dst>(self) -> Dst
    where
        Dst: Generic<Repr = Self>,
    {
        <Dst as Generic>::from(self)
    }
}

/// `n` evenly spaced values from `start` to `end`, both included. The last
/// value is exactly `end`.
pub fn linspace(
    start: f64,
    end: f64,
    n: usize,
) -> impl Iterator<Item = f64> + Clone {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| match i {
        0 => start,
        i if i == n - 1 => end,
        i => start + step * i as f64,
    })
}

/// Index of the value nearest to `target`. Ties go to the first one.
pub fn position_closest(
    values: impl IntoIterator<Item = f64>,
    target: f64,
) -> Option<usize> {
    values
        .into_iter()
        .map(|v| (v - target).abs())
        .position_min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn test_linspace() {
        let v = linspace(0.0, 1.0, 5).collect::<Vec<_>>();
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let v = linspace(0.001, 0.999, 180).collect::<Vec<_>>();
        assert_eq!(v.len(), 180);
        assert_eq!(v.first(), Some(&0.001));
        assert_eq!(v.last(), Some(&0.999));
        assert_float_eq!(v[1] - v[0], 0.998 / 179.0, abs <= 1e-15);

        assert_eq!(linspace(0.3, 0.3, 3).collect::<Vec<_>>(), [0.3; 3]);
        assert_eq!(linspace(0.3, 0.7, 1).collect::<Vec<_>>(), [0.3]);
        assert_eq!(linspace(0.3, 0.7, 0).count(), 0);
    }

    #[test]
    fn test_position_closest() {
        assert_eq!(position_closest([0.1, 0.4, 0.9], 0.5), Some(1));
        assert_eq!(position_closest([0.25, 0.75], 0.5), Some(0));
        assert_eq!(position_closest([1.0, 2.0, 1.0], 1.0), Some(0));
        assert_eq!(position_closest(std::iter::empty(), 1.0), None);
    }
}
