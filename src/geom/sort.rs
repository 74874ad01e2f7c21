use std::f64::consts::TAU;

use super::core::{Plane, Point3};

/// Sorts points counter-clockwise around the plane normal, starting at
/// `start_angle` radians from the plane X axis.
///
/// Points are projected onto the plane first. Angles are wrapped to
/// `[0, 2*PI)` relative to the start angle; ties keep their input order.
#[must_use]
pub fn sort_points_by_plane(plane: &Plane, points: &[Point3], start_angle: f64) -> Vec<Point3> {
    let mut keyed: Vec<(f64, Point3)> = points
        .iter()
        .map(|&point| {
            let offset = plane.closest_point(point).sub_point(plane.origin);
            let angle = (plane.polar_angle(offset) - start_angle).rem_euclid(TAU);
            (angle, point)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, point)| point).collect()
}
