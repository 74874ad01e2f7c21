//! Row-major point grids indexed by `(u, v)`.
//!
//! Points are stored `u`-outer, `v`-inner: the point at `(u, v)` lives at
//! offset `u * (V + 1) + v` where `V` is the number of divisions along `v`.

use super::core::Point3;
use super::domain::Interval;
use super::panel::{Axis, PanelError};
use super::surface::Surface;

/// Flat offset of grid point `(u, v)`. Bounds are the caller's responsibility.
#[inline]
#[must_use]
pub const fn grid_index(u: usize, v: usize, v_divisions: usize) -> usize {
    u * (v_divisions + 1) + v
}

/// Largest number of cells accepted along one axis.
pub const MAX_DIVISIONS: usize = 1_000;

/// Number of cells along each axis, both in `1..=MAX_DIVISIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDivisions {
    u: usize,
    v: usize,
}

impl GridDivisions {
    pub fn new(u: usize, v: usize) -> Result<Self, PanelError> {
        for (axis, count) in [(Axis::U, u), (Axis::V, v)] {
            if count < 1 {
                return Err(PanelError::DivisionTooSmall { axis, count });
            }
            if count > MAX_DIVISIONS {
                return Err(PanelError::DivisionTooLarge {
                    axis,
                    count,
                    max: MAX_DIVISIONS,
                });
            }
        }
        Ok(Self { u, v })
    }

    #[must_use]
    pub const fn u(self) -> usize {
        self.u
    }

    #[must_use]
    pub const fn v(self) -> usize {
        self.v
    }

    /// Divisions implied by two breakpoint lists (`len - 1` each).
    pub fn from_breakpoints(u_breaks: &[f64], v_breaks: &[f64]) -> Result<Self, PanelError> {
        for breaks in [u_breaks, v_breaks] {
            if breaks.len() < 2 {
                return Err(PanelError::NotEnoughBreakpoints {
                    count: breaks.len(),
                });
            }
        }
        Self::new(u_breaks.len() - 1, v_breaks.len() - 1)
    }

    /// `(U + 1) * (V + 1)`, or `None` when that does not fit in `usize`.
    #[must_use]
    pub const fn point_count(self) -> Option<usize> {
        match (self.u.checked_add(1), self.v.checked_add(1)) {
            (Some(u), Some(v)) => u.checked_mul(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.u * self.v
    }

    #[must_use]
    pub const fn index(self, u: usize, v: usize) -> usize {
        grid_index(u, v, self.v)
    }

    #[must_use]
    pub const fn count(self, axis: Axis) -> usize {
        match axis {
            Axis::U => self.u,
            Axis::V => self.v,
        }
    }
}

/// Borrowed point grid whose length matches its divisions.
#[derive(Debug, Clone, Copy)]
pub struct PointGrid<'a> {
    points: &'a [Point3],
    divisions: GridDivisions,
}

impl<'a> PointGrid<'a> {
    pub fn new(points: &'a [Point3], divisions: GridDivisions) -> Result<Self, PanelError> {
        let Some(expected) = divisions.point_count() else {
            return Err(PanelError::GridTooLarge {
                u: divisions.u,
                v: divisions.v,
            });
        };
        if points.len() != expected {
            return Err(PanelError::GridLengthMismatch {
                expected,
                actual: points.len(),
                u: divisions.u,
                v: divisions.v,
            });
        }
        Ok(Self { points, divisions })
    }

    /// Validates raw counts as well as the length.
    pub fn with_counts(points: &'a [Point3], u: usize, v: usize) -> Result<Self, PanelError> {
        Self::new(points, GridDivisions::new(u, v)?)
    }

    #[must_use]
    pub const fn divisions(&self) -> GridDivisions {
        self.divisions
    }

    #[must_use]
    pub const fn points(&self) -> &'a [Point3] {
        self.points
    }

    /// Point at `(u, v)`. Panics when out of range, like slice indexing.
    #[must_use]
    pub fn point(&self, u: usize, v: usize) -> Point3 {
        self.points[self.divisions.index(u, v)]
    }

    #[must_use]
    pub fn corners(&self, indices: [(usize, usize); 4]) -> [Point3; 4] {
        indices.map(|(u, v)| self.point(u, v))
    }
}

/// Samples `surface` at every `(u_breaks[i], v_breaks[j])`, `u` outer.
#[must_use]
pub fn sample_surface_grid<S: Surface + ?Sized>(
    surface: &S,
    u_breaks: &[f64],
    v_breaks: &[f64],
) -> Vec<Point3> {
    let mut points = Vec::with_capacity(u_breaks.len() * v_breaks.len());
    for &u in u_breaks {
        for &v in v_breaks {
            points.push(surface.point_at(u, v));
        }
    }
    points
}

/// Grid of `(u + 1) * (v + 1)` points on a surface, spread evenly over its domain.
#[must_use]
pub fn sample_surface_uniform<S: Surface + ?Sized>(surface: &S, divisions: GridDivisions) -> Vec<Point3> {
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let us = super::domain::uniform_breakpoints(Interval::new(u0, u1), divisions.u());
    let vs = super::domain::uniform_breakpoints(Interval::new(v0, v1), divisions.v());
    sample_surface_grid(surface, &us, &vs)
}
