//! Whole-surface operations on four-point panels: aligning their V direction
//! with a vector and straightening or flattening them.

use std::f64::consts::{FRAC_PI_2, PI};

use super::core::{Plane, Vec3};
use super::panel::PanelError;
use super::surface::{FourPointSurface, Surface, surface_corners};

/// Result of [`unify_surface_direction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnifiedSurface {
    pub surface: FourPointSurface,
    pub transposed: bool,
    pub reversed_v: bool,
}

/// Angle between the V tangent at the domain centre and `direction`.
fn v_angle(surface: &FourPointSurface, direction: Vec3) -> Option<f64> {
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let (_, dv) = surface.partial_derivatives_at(0.5 * (u0 + u1), 0.5 * (v0 + v1));
    dv.angle_to(direction)
}

/// Turns `surface` so its V direction follows `direction`.
///
/// A V tangent perpendicular to `direction` (strictly within
/// `angle_tolerance` radians of 90°) swaps U and V. A V tangent that then
/// points against `direction` (within `angle_tolerance` of 180°) reverses V.
/// Degenerate tangents or a zero `direction` leave the surface untouched.
#[must_use]
pub fn unify_surface_direction(
    surface: &FourPointSurface,
    direction: Vec3,
    angle_tolerance: f64,
) -> UnifiedSurface {
    let mut result = *surface;

    let transposed =
        v_angle(&result, direction).is_some_and(|angle| (angle - FRAC_PI_2).abs() < angle_tolerance);
    if transposed {
        result = result.transpose();
    }

    let reversed_v =
        v_angle(&result, direction).is_some_and(|angle| (angle - PI).abs() <= angle_tolerance);
    if reversed_v {
        result = result.reverse_v();
    }

    UnifiedSurface {
        surface: result,
        transposed,
        reversed_v,
    }
}

/// Replaces `surface` by the straight-edged bilinear patch through its corners.
///
/// With `planarize`, the corners are first projected onto the tangent plane of
/// that patch at the unit parameter `uv` (clamped to `[0, 1]`).
pub fn rationalize_surface<S: Surface + ?Sized>(
    surface: &S,
    uv: (f64, f64),
    planarize: bool,
) -> Result<FourPointSurface, PanelError> {
    let rebuilt = FourPointSurface::new(surface_corners(surface));
    if !planarize {
        return Ok(rebuilt);
    }

    let (u, v) = uv;
    if !u.is_finite() || !v.is_finite() {
        return Err(PanelError::DegenerateGeometry(format!(
            "planarization parameter ({u}, {v}) is not finite"
        )));
    }
    let (u, v) = (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
    let frame = rebuilt.frame_at(u, v).ok_or_else(|| {
        PanelError::DegenerateGeometry(format!("surface has no tangent plane at ({u}, {v})"))
    })?;
    let plane = Plane::from_axes(frame.point, frame.u_tangent, frame.v_tangent);

    Ok(FourPointSurface::new(
        rebuilt.corners().map(|corner| plane.closest_point(corner)),
    ))
}
