mod context;
mod core;
mod curve;
mod diamond;
mod domain;
mod grid;
mod panel;
mod quad;
mod sort;
mod staggered;
mod surface;
mod surface_ops;

pub use context::{CancellationToken, GeomContext};
pub use self::core::{Plane, Point3, Tolerance, Vec3};
pub use curve::{
    CurveDivisionError, DEFAULT_TARGET_STEPS, DEFAULT_TARGET_TOLERANCE, TargetDivision,
    divide_by_target_distance, divide_equidistant, is_linear, separate_segments_by_direction,
};
pub use diamond::{
    DiamondIndices, DiamondPanels, diamond_indices, diamond_panels_on_surface,
    diamonds_from_points, diamonds_from_points_with_context,
};
pub use domain::{
    BREAKPOINT_PRECISION, Interval, average_consecutive, check_breakpoints, consecutive_domains,
    require_breakpoints, round_and_deduplicate, round_to, uniform_breakpoints,
};
pub use grid::{
    GridDivisions, MAX_DIVISIONS, PointGrid, grid_index, sample_surface_grid, sample_surface_uniform,
};
pub use panel::{
    Axis, CornerPanelBuilder, Panel, PanelBuilder, PanelDiagnostics, PanelError, PanelShape,
};
pub use quad::{
    quad_subdivide, quad_subdivide_with_context, quads_from_points, quads_from_points_with_context,
};
pub use sort::sort_points_by_plane;
pub use staggered::{StaggeredPanel, staggered_panels, staggered_panels_with_context};
pub use surface::{
    FourPointSurface, IsotrimSurface, POINT_ON_SURFACE_TOLERANCE, PlaneSurface, Reparameterized,
    Surface, SurfaceDivision, SurfaceFrame, TrimSurface, closest_parameter_by_sampling,
    divide_surface_numeric, surface_corners, surface_domain, surface_point_parameters,
};
pub use surface_ops::{UnifiedSurface, rationalize_surface, unify_surface_direction};

#[cfg(test)]
mod tests;
