/*  calc_shade.rs -- Shadow coverage of a sundial tile
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

//! Each cell of the sundial is a unit square split at `x = q`. Left of the
//! split a light line rises towards the top edge with slope `tan(alpha)`,
//! right of it a shadow line falls towards the bottom edge with slope
//! `tan(beta)`. The vertical bias `p` moves both lines up or down. The area
//! under the two lines is what the cell shows as covered.
//!
//! The closed form area and the trapezoid decomposition over the sampled
//! line endpoints compute the same thing in two ways. They are kept next to
//! each other so one can check the other.

use crate::{
    types::{
        Boundary, Endpoints, Length, Point, Reconciliation, ShadeAngles,
        ShadeModel, ShadePolygon, Slopes, SolarPosition, ViewGeometry,
    },
    utils::{linspace, position_closest},
};

/// Largest allowed gap between the two area computations
pub const AREA_TOLERANCE: f64 = 0.01;

const SEARCH_MIN: f64 = 0.001;
const SEARCH_MAX: f64 = 0.999;

// A light sample sits on the top edge
const TOP_EDGE: f64 = 1e-12;
// Endpoint touches an edge, for the trapezoid cases
const EDGE: f64 = 1e-9;
// Polygon needs an extra corner vertex
const CORNER: f64 = 1e-12;

impl ShadeModel {
    /// Tile angles seen from the observer. `None` while the sun is not
    /// above the horizon.
    pub fn angles(
        &self,
        pos: &SolarPosition,
        pole_height: Length,
        view: &ViewGeometry,
    ) -> Option<ShadeAngles> {
        if !pos.is_daytime() {
            return None;
        }

        let eps = *self.eps;
        let (a, e) = (pos.azimuth.to_radians(), pos.elevation.to_radians());
        let x_east = e.cos() * a.sin();
        let z_up = e.sin();

        let alpha = z_up.atan2(x_east.abs() + eps);
        let beta = ((*view.eye_height * a.cos()).abs()
            / ((*view.observer_distance * a.sin()).abs() + eps))
            .atan();

        Some(ShadeAngles {
            alpha,
            beta,
            shadow_length: *pole_height / e.tan(),
        })
    }

    /// Closed form area under the light and shadow lines
    pub fn area_value(&self, q: f64, p: f64, s: Slopes) -> f64 {
        let Slopes { ta, tb } = s;
        let eps = *self.eps;
        let u = 1.0 - p;

        let light = if u >= 2.0 * ta * q {
            0.5 * q * (ta * q + 2.0 - u)
        } else {
            q - u * u / (8.0 * ta + eps)
        };

        let r = 1.0 - q;
        let shadow = if u >= 2.0 * tb * r {
            0.5 * r * (u - tb * r)
        } else {
            u * u / (8.0 * tb + eps)
        };

        light + shadow
    }

    /// Rows follow `ps`, columns follow `qs`
    pub fn area_grid(
        &self,
        qs: &[f64],
        ps: &[f64],
        s: Slopes,
    ) -> Vec<Vec<f64>> {
        ps.iter()
            .map(|&p| qs.iter().map(|&q| self.area_value(q, p, s)).collect())
            .collect()
    }

    pub fn line_endpoints(&self, q: f64, p: f64, s: Slopes) -> Endpoints {
        let Slopes { ta, tb } = s;
        let n = *self.line_samples;
        let u = 1.0 - p;

        let light = |x: f64| {
            Point::new(x, (ta * (q - x) + 0.5 * (1.0 + p)).clamp(0.0, 1.0))
        };
        let shadow = |x: f64| {
            Point::new(x, (tb * (q - x) + 0.5 * u).clamp(0.0, 1.0))
        };

        // Where the shadow line reaches the bottom edge, if it does so
        // before the right one
        let xi_max = if u < 2.0 * tb * (1.0 - q) {
            (q + u / (2.0 * tb + *self.eps)).min(1.0)
        } else {
            1.0
        };

        let l0 = linspace(0.0, q, n)
            .map(light)
            .filter(|pt| (1.0 - pt.y).abs() < TOP_EDGE)
            .last()
            .unwrap_or_else(|| light(0.0));

        Endpoints {
            l0,
            ln: light(q),
            sn: shadow(q),
            s1: shadow(xi_max),
        }
    }

    /// Area of the left region from the trapezoids between the endpoints
    pub fn left_area(&self, q: f64, p: f64, s: Slopes) -> f64 {
        let e = self.line_endpoints(q, p, s);
        let Endpoints { l0, ln, sn, s1 } = e;

        let light_box = ln.x * ln.y;
        let light_slope = 0.5 * (ln.x - l0.x) * (l0.y - ln.y);
        let light_top = l0.x * (l0.y - ln.y);
        let shadow_width = s1.x - sn.x;

        match e.boundary() {
            Boundary::LeftBottom => {
                light_box
                    + 0.5 * ln.x * (l0.y - ln.y)
                    + 0.5 * shadow_width * sn.y
            }
            Boundary::TopRight => {
                light_box
                    + light_slope
                    + 0.5 * shadow_width * (sn.y - s1.y)
                    + light_top
                    + shadow_width * s1.y
            }
            Boundary::LeftRight => {
                light_box
                    + 0.5 * ln.x * (l0.y - ln.y)
                    + 0.5 * shadow_width * (sn.y - s1.y)
                    + shadow_width * s1.y
            }
            Boundary::TopBottom => {
                light_box
                    + 0.5 * shadow_width * sn.y
                    + light_slope
                    + light_top
            }
        }
    }

    pub fn reconcile(&self, q: f64, p: f64, s: Slopes) -> Reconciliation {
        Reconciliation {
            area: self.area_value(q, p, s),
            left_area: self.left_area(q, p, s),
        }
    }

    /// Candidate splits of the inverse search
    pub fn search_values(&self) -> impl Iterator<Item = f64> + Clone {
        linspace(SEARCH_MIN, SEARCH_MAX, *self.search_samples)
    }

    /// Split whose area is nearest to `target`. Ties go to the smallest
    /// split.
    pub fn inverse_search(&self, target: f64, p: f64, s: Slopes) -> f64 {
        let qs = self.search_values();
        let areas = qs.clone().map(|q| self.area_value(q, p, s));
        position_closest(areas, target)
            .and_then(|i| qs.clone().nth(i))
            .unwrap_or(SEARCH_MIN)
    }

    /// Outline of the left region in tile coordinates, counter to the
    /// screen convention the y axis points up
    pub fn shade_polygon(&self, q: f64, p: f64, s: Slopes) -> ShadePolygon {
        let Endpoints { l0, ln, sn, s1 } = self.line_endpoints(q, p, s);

        let mut v = Vec::with_capacity(7);
        if l0.x > CORNER {
            v.push(Point::new(0.0, 1.0));
        }
        v.extend([l0, ln, sn, s1]);
        if s1.y > CORNER {
            v.push(Point::new(1.0, 0.0));
        }
        v.push(Point::new(0.0, 0.0));

        ShadePolygon::new(v)
    }
}

impl Endpoints {
    pub fn boundary(&self) -> Boundary {
        let Self { l0, s1, .. } = self;
        if l0.x < EDGE && s1.x < 1.0 {
            Boundary::LeftBottom
        } else if l0.x > 0.0 && s1.y > EDGE {
            Boundary::TopRight
        } else if l0.x < EDGE && s1.y > EDGE {
            Boundary::LeftRight
        } else {
            Boundary::TopBottom
        }
    }
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.diff() <= AREA_TOLERANCE
    }
}
