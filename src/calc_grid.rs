/*  calc_grid.rs -- Sundial grid sweep
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

use crate::types::{
    CellShade, Grid, GridCell, GridRow, GridSpec, Month, ShadeModel, Site,
    SolarPosition, MAX_GRID_HOUR, MIN_GRID_HOUR,
};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Largest gap between the covered area of a cell and the target before
/// it is reported
pub const TARGET_TOLERANCE: f64 = 0.05;

/// Cells after this hour show the morning shape mirrored
pub const MIRROR_AFTER_HOUR: u8 = 11;

impl Grid {
    /// Rows are computed in parallel and come back in month order
    pub fn sweep(spec: &GridSpec, site: &Site, model: &ShadeModel) -> Self {
        let clamp = |h: u8| h.clamp(MIN_GRID_HOUR, MAX_GRID_HOUR);
        let (h_min, h_max) = (clamp(*spec.hours.min), clamp(*spec.hours.max));
        let hours = (h_min..=h_max)
            .step_by(*spec.hour_step as usize)
            .collect::<Vec<_>>();

        let months = (*spec.months.min..=*spec.months.max)
            .step_by(*spec.month_step as usize)
            .filter_map(|m| Month::try_from(m).ok())
            .collect::<Vec<_>>();

        let rows = months
            .into_par_iter()
            .map(|month| {
                let date = grid_date(spec.year, month, *spec.day);
                let cells = hours
                    .iter()
                    .map(|&hour| {
                        let t = if h_max > h_min {
                            (hour - h_min) as f64 / (h_max - h_min) as f64
                        } else {
                            0.0
                        };
                        let bias = spec.bias.lerp(t);
                        let local = date.and_then(|d| {
                            let time = NaiveTime::from_hms_opt(
                                hour as u32,
                                spec.minute as u32,
                                0,
                            )?;
                            Some(d.and_time(time))
                        });
                        let shade = local.and_then(|local| {
                            cell_shade(local, hour, bias, spec, site, model)
                        });
                        GridCell { hour, bias, shade }
                    })
                    .collect();
                GridRow { month, cells }
            })
            .collect();

        Self { hours, rows }
    }
}

/// Days past the end of the month roll over into the next one
fn grid_date(year: i32, month: Month, day: u8) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, *month as u32, 1)?
        .checked_add_days(Days::new(day.saturating_sub(1) as u64))
}

fn cell_shade(
    local: NaiveDateTime,
    hour: u8,
    bias: f64,
    spec: &GridSpec,
    site: &Site,
    model: &ShadeModel,
) -> Option<CellShade> {
    let position = SolarPosition::new(local, &site.observer);
    let Some(angles) = model.angles(&position, site.pole_height, &site.view)
    else {
        debug!("{local}: sun is below the horizon");
        return None;
    };

    let slopes = angles.slopes();
    let target = *spec.target;
    let split = model.inverse_search(target, bias, slopes);
    let area = model.reconcile(split, bias, slopes);
    let polygon = model.shade_polygon(split, bias, slopes);
    let polygon = if hour > MIRROR_AFTER_HOUR {
        polygon.mirrored()
    } else {
        polygon
    };

    if !area.is_consistent() {
        warn!(
            "{local}: closed form area {:.4} and left area {:.4} differ",
            area.area, area.left_area
        );
    }
    if (area.left_area - target).abs() > TARGET_TOLERANCE {
        warn!(
            "{local}: wanted an area of {target:.3}, got {:.3}",
            area.left_area
        );
    }
    debug!(
        "{local}: {position}, split {split:.3}, bias {bias:.3}, area {:.3}",
        area.left_area
    );

    Some(CellShade {
        position,
        angles,
        split,
        polygon,
        area,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Fraction, Hour, Latitude, Location, Longitude, Observer, Span, Step,
        UtcOffset,
    };
    use anyhow::Result;
    use float_eq::assert_float_eq;

    fn sweep(spec: &GridSpec) -> Grid {
        Grid::sweep(spec, &Site::default(), &ShadeModel::default())
    }

    #[test]
    fn test_default_sweep() {
        let g = sweep(&GridSpec::default());
        assert_eq!(g.hours, (6..=17).collect::<Vec<u8>>());
        assert_eq!(g.rows.len(), 12);
        for (i, row) in g.rows.iter().enumerate() {
            assert_eq!(*row.month as usize, i + 1);
            assert_eq!(row.cells.len(), 12);
            let hours = row.cells.iter().map(|c| c.hour).collect::<Vec<_>>();
            assert_eq!(hours, g.hours);
        }
    }

    #[test]
    fn test_sweep_cells() {
        let g = sweep(&GridSpec::default());
        for row in &g.rows {
            for cell in &row.cells {
                let Some(shade) = &cell.shade else { continue };
                assert!(shade.area.is_consistent(), "{:?}", shade.area);
                assert!(shade.position.is_daytime());
                assert!((0.001..=0.999).contains(&shade.split));
            }
            // Close to the equator the sun is up around noon all year
            let lit = row.cells.iter().filter(|c| c.shade.is_some()).count();
            assert!(lit >= 10, "{lit} lit cells in {}", row.month.name());
        }
    }

    #[test]
    fn test_sweep_bias() -> Result<()> {
        let bias = (Fraction::try_from(0.2)?, Fraction::try_from(0.8)?);
        let spec = GridSpec {
            bias: Span::try_from(bias)?,
            ..Default::default()
        };
        let g = sweep(&spec);
        let cells = &g.rows[0].cells;
        assert_float_eq!(cells[0].bias, 0.2, abs <= 1e-12);
        assert_float_eq!(cells[11].bias, 0.8, abs <= 1e-12);
        assert_float_eq!(cells[1].bias, 0.2 + 0.6 / 11.0, abs <= 1e-12);

        let spec = GridSpec {
            hours: Span::try_from((Hour::try_from(9)?, Hour::try_from(9)?))?,
            ..spec
        };
        let g = sweep(&spec);
        assert_eq!(g.hours, [9]);
        assert_float_eq!(g.rows[0].cells[0].bias, 0.2, abs <= 1e-12);
        Ok(())
    }

    #[test]
    fn test_sweep_steps_and_clamping() -> Result<()> {
        let spec = GridSpec {
            month_step: Step::try_from(3)?,
            hours: Span::try_from((Hour::try_from(0)?, Hour::try_from(23)?))?,
            hour_step: Step::try_from(5)?,
            ..Default::default()
        };
        let g = sweep(&spec);
        assert_eq!(g.hours, [6, 11, 16]);
        let months = g.rows.iter().map(|r| *r.month).collect::<Vec<_>>();
        assert_eq!(months, [1, 4, 7, 10]);
        Ok(())
    }

    #[test]
    fn test_sweep_mirrors_afternoon() {
        let spec = GridSpec::default();
        let site = Site::default();
        let model = ShadeModel::default();
        let g = Grid::sweep(&spec, &site, &model);
        for cell in &g.rows[0].cells {
            let Some(shade) = &cell.shade else { continue };
            let slopes = shade.angles.slopes();
            let poly = model.shade_polygon(shade.split, cell.bias, slopes);
            if cell.hour > MIRROR_AFTER_HOUR {
                assert_eq!(shade.polygon, poly.mirrored());
            } else {
                assert_eq!(shade.polygon, poly);
            }
        }
    }

    #[test]
    fn test_sweep_polar_night() -> Result<()> {
        let loc = Location {
            lat: Latitude::try_from(80.0)?,
            lon: Longitude::try_from(0.0)?,
        };
        let site = Site {
            observer: Observer::new(loc, UtcOffset::try_from(0.0)?),
            ..Default::default()
        };
        let month = Month::try_from(12)?;
        let spec = GridSpec {
            months: Span::try_from((month, month))?,
            ..Default::default()
        };
        let g = Grid::sweep(&spec, &site, &ShadeModel::default());
        assert_eq!(g.rows.len(), 1);
        assert!(g.rows[0].cells.iter().all(|c| c.shade.is_none()));
        Ok(())
    }

    #[test]
    fn test_grid_date_rolls_over() -> Result<()> {
        let feb = Month::try_from(2)?;
        let d = grid_date(2026, feb, 31);
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 3));
        let d = grid_date(2026, feb, 1);
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 2, 1));
        Ok(())
    }
}
