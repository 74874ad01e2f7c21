//! Panel construction and the errors shared by the panelization loops.

use std::fmt;

use super::core::{Point3, Tolerance};

/// Errors raised by grid tessellation, breakpoint handling and surface trimming.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("point grid has {actual} points, expected {expected} for {u}x{v} divisions")]
    GridLengthMismatch {
        expected: usize,
        actual: usize,
        u: usize,
        v: usize,
    },
    #[error("{axis} division count must be at least 1, got {count}")]
    DivisionTooSmall { axis: Axis, count: usize },
    #[error("{axis} division count must be at most {max}, got {count}")]
    DivisionTooLarge { axis: Axis, count: usize, max: usize },
    #[error("a {u}x{v} point grid does not fit in memory")]
    GridTooLarge { u: usize, v: usize },
    #[error("at least 2 distinct breakpoints are required, got {count}")]
    NotEnoughBreakpoints { count: usize },
    #[error("breakpoint {index} is not a finite number")]
    NonFiniteBreakpoint { index: usize },
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("operation was cancelled")]
    Cancelled,
}

impl PanelError {
    /// Caller contract violations: the run fails fast without partial output.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::GridLengthMismatch { .. }
                | Self::DivisionTooSmall { .. }
                | Self::DivisionTooLarge { .. }
                | Self::GridTooLarge { .. }
                | Self::NotEnoughBreakpoints { .. }
                | Self::NonFiniteBreakpoint { .. }
        )
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateGeometry(_))
    }
}

/// Parameter direction of a surface or grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    U,
    V,
}

impl Axis {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::U => Self::V,
            Self::V => Self::U,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U => f.write_str("U"),
            Self::V => f.write_str("V"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelShape {
    Quad,
    Triangle,
}

/// Flat panel spanned by four corners. A triangle repeats its first corner
/// as the fourth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub corners: [Point3; 4],
    pub shape: PanelShape,
}

impl Panel {
    /// Distinct corners: three for a triangle, four for a quad.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        match self.shape {
            PanelShape::Quad => &self.corners,
            PanelShape::Triangle => &self.corners[..3],
        }
    }

    /// Area of the corner fan `(0,1,2) + (0,2,3)`.
    #[must_use]
    pub fn area(&self) -> f64 {
        let [a, b, c, d] = self.corners;
        triangle_area(a, b, c) + triangle_area(a, c, d)
    }
}

fn triangle_area(a: Point3, b: Point3, c: Point3) -> f64 {
    0.5 * b.sub_point(a).cross(c.sub_point(a)).length()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelDiagnostics {
    /// Cells (or trims) whose construction reported degenerate geometry.
    pub skipped_degenerate: usize,
    /// Grid cells or sub-domains visited.
    pub cells_visited: usize,
}

/// Turns the four corners of a cell into a panel. Triangles arrive with the
/// first corner repeated as the fourth.
pub trait PanelBuilder {
    type Panel;

    /// Returning [`PanelError::DegenerateGeometry`] skips the cell; any other
    /// error aborts the run.
    fn panel_from_corners(&self, corners: [Point3; 4]) -> Result<Self::Panel, PanelError>;
}

impl<F, P> PanelBuilder for F
where
    F: Fn([Point3; 4]) -> Result<P, PanelError>,
{
    type Panel = P;

    fn panel_from_corners(&self, corners: [Point3; 4]) -> Result<P, PanelError> {
        self(corners)
    }
}

/// Default builder producing [`Panel`]s. Rejects corners spanning no area.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerPanelBuilder {
    pub tolerance: Tolerance,
}

impl CornerPanelBuilder {
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl PanelBuilder for CornerPanelBuilder {
    type Panel = Panel;

    fn panel_from_corners(&self, corners: [Point3; 4]) -> Result<Panel, PanelError> {
        if corners.iter().any(|corner| !corner.is_finite()) {
            return Err(PanelError::DegenerateGeometry(
                "panel corner is not finite".to_owned(),
            ));
        }
        let shape = if self.tolerance.approx_eq_point3(corners[0], corners[3]) {
            PanelShape::Triangle
        } else {
            PanelShape::Quad
        };
        let panel = Panel { corners, shape };
        if panel.area() <= self.tolerance.eps {
            return Err(PanelError::DegenerateGeometry(
                "panel corners span no area".to_owned(),
            ));
        }
        Ok(panel)
    }
}
