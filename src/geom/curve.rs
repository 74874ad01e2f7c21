//! Chord-equidistant division of polylines.

use super::core::{Point3, Tolerance, Vec3};

/// Iteration budget of [`divide_by_target_distance`] when none is given.
pub const DEFAULT_TARGET_STEPS: usize = 100;
/// Accepted gap between the last division point and the curve end.
pub const DEFAULT_TARGET_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveDivisionError {
    #[error("polyline requires at least 2 points, got {count}")]
    TooFewPoints { count: usize },
    #[error("polyline points must be finite")]
    NonFinitePoint,
    #[error("polyline has zero length")]
    ZeroLength,
    #[error("division distance must be a positive finite number, got {distance}")]
    InvalidDistance { distance: f64 },
}

fn validate_polyline(polyline: &[Point3]) -> Result<(), CurveDivisionError> {
    if polyline.len() < 2 {
        return Err(CurveDivisionError::TooFewPoints {
            count: polyline.len(),
        });
    }
    if polyline.iter().any(|point| !point.is_finite()) {
        return Err(CurveDivisionError::NonFinitePoint);
    }
    let length: f64 = polyline
        .windows(2)
        .map(|pair| pair[0].distance_to(pair[1]))
        .sum();
    if Tolerance::ZERO_LENGTH.is_zero_length(length) {
        return Err(CurveDivisionError::ZeroLength);
    }
    Ok(())
}

/// Parameter in `(t_min, 1]` where the segment `a -> b` leaves the sphere of
/// radius `distance` around `center`. The walk keeps every segment start
/// inside the sphere, so only the exit root is of interest.
fn sphere_exit(a: Point3, b: Point3, center: Point3, distance: f64, t_min: f64) -> Option<f64> {
    let dir = b.sub_point(a);
    let offset = a.sub_point(center);
    let qa = dir.dot(dir);
    if qa <= Tolerance::ZERO_LENGTH.eps_squared() {
        return None;
    }
    let qb = 2.0 * offset.dot(dir);
    let qc = offset.dot(offset) - distance * distance;
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-qb + discriminant.sqrt()) / (2.0 * qa);
    (t > t_min && t <= 1.0 + Tolerance::DEFAULT.eps).then(|| t.min(1.0))
}

/// Walks the polyline from its start, placing each point at chord distance
/// `distance` from the previous one. The start point is always included; the
/// walk stops when the remaining curve stays within `distance` of the last point.
pub fn divide_equidistant(polyline: &[Point3], distance: f64) -> Result<Vec<Point3>, CurveDivisionError> {
    validate_polyline(polyline)?;
    if !distance.is_finite() || distance <= 0.0 {
        return Err(CurveDivisionError::InvalidDistance { distance });
    }

    let mut points = vec![polyline[0]];
    let mut current = polyline[0];
    let mut segment = 0;
    let mut t_min = 0.0;

    'walk: loop {
        let mut index = segment;
        while index + 1 < polyline.len() {
            let (a, b) = (polyline[index], polyline[index + 1]);
            let start = if index == segment { t_min } else { 0.0 };
            if let Some(t) = sphere_exit(a, b, current, distance, start) {
                current = a.lerp(b, t);
                points.push(current);
                segment = index;
                t_min = t;
                continue 'walk;
            }
            index += 1;
        }
        break;
    }

    Ok(points)
}

/// Result of [`divide_by_target_distance`].
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDivision {
    pub points: Vec<Point3>,
    /// Chord distance used for the returned points.
    pub distance: f64,
    /// Gap between the last point and the polyline end.
    pub end_gap: f64,
    pub iterations: usize,
}

/// Searches for a chord distance close to `target` that divides the polyline
/// into equal chords ending (within `tolerance`) on the polyline end.
///
/// Each step spreads the leftover end gap over the division points and grows
/// the distance accordingly, for at most `steps` steps.
pub fn divide_by_target_distance(
    polyline: &[Point3],
    target: f64,
    steps: usize,
    tolerance: f64,
) -> Result<TargetDivision, CurveDivisionError> {
    let mut distance = target;
    let mut points = divide_equidistant(polyline, distance)?;
    let end = polyline[polyline.len() - 1];
    let mut end_gap = last_gap(&points, end);
    #[allow(clippy::cast_precision_loss)]
    let mut increment = end_gap / (points.len() + 2) as f64;
    let mut iterations = 0;

    for _ in 0..steps {
        iterations += 1;
        distance += increment;
        points = divide_equidistant(polyline, distance)?;
        end_gap = last_gap(&points, end);
        if end_gap < tolerance {
            break;
        }
        #[allow(clippy::cast_precision_loss)]
        let spread = (points.len() + 2) as f64;
        increment = end_gap / spread;
    }

    log::debug!(
        "target distance {target} -> {distance} after {iterations} steps, {} points, gap {end_gap}",
        points.len()
    );
    Ok(TargetDivision {
        points,
        distance,
        end_gap,
        iterations,
    })
}

fn last_gap(points: &[Point3], end: Point3) -> f64 {
    points.last().map_or(0.0, |last| last.distance_to(end))
}

/// Splits polyline segments into those parallel or anti-parallel to
/// `direction` (within `angle_tolerance` radians) and all others.
#[must_use]
pub fn separate_segments_by_direction(
    polyline: &[Point3],
    direction: Vec3,
    angle_tolerance: f64,
) -> (Vec<[Point3; 2]>, Vec<[Point3; 2]>) {
    let mut aligned = Vec::new();
    let mut other = Vec::new();
    for pair in polyline.windows(2) {
        let segment = [pair[0], pair[1]];
        let is_aligned = pair[1]
            .sub_point(pair[0])
            .angle_to(direction)
            .is_some_and(|angle| angle <= angle_tolerance || std::f64::consts::PI - angle <= angle_tolerance);
        if is_aligned {
            aligned.push(segment);
        } else {
            other.push(segment);
        }
    }
    (aligned, other)
}

/// Whether every vertex of `polyline` lies within `tolerance` of the chord
/// from its first to its last point, without running past either end.
/// Closed or zero-length polylines are never linear.
#[must_use]
pub fn is_linear(polyline: &[Point3], tolerance: f64) -> bool {
    let (Some(&start), Some(&end)) = (polyline.first(), polyline.last()) else {
        return false;
    };
    let chord = end.sub_point(start);
    let length = chord.length();
    let Some(axis) = chord.normalized() else {
        return false;
    };
    length > tolerance
        && polyline.iter().all(|point| {
            let offset = point.sub_point(start);
            let along = offset.dot(axis);
            let across = offset.sub(axis.mul_scalar(along)).length();
            across <= tolerance && along >= -tolerance && along <= length + tolerance
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linearity_respects_tolerance() {
        let nearly = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.05, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ];
        assert!(is_linear(&nearly, 0.1));
        assert!(!is_linear(&nearly, 0.01));

        let folded = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(12.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ];
        assert!(!is_linear(&folded, 0.1));

        let closed = [Point3::ORIGIN, Point3::new(1.0, 1.0, 0.0), Point3::ORIGIN];
        assert!(!is_linear(&closed, 0.1));
        assert!(!is_linear(&[Point3::ORIGIN], 0.1));
    }

    #[test]
    fn straight_line_divides_evenly() {
        let line = [Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let points = divide_equidistant(&line, 2.5).unwrap();
        assert_eq!(points.len(), 5);
        assert!((points[4].x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn chord_distance_holds_across_corners() {
        let polyline = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
        ];
        let points = divide_equidistant(&polyline, 2.0).unwrap();
        assert!(points.len() >= 3);
        for pair in points.windows(2) {
            assert!((pair[0].distance_to(pair[1]) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let line = [Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            divide_equidistant(&line[..1], 1.0),
            Err(CurveDivisionError::TooFewPoints { count: 1 })
        );
        assert!(matches!(
            divide_equidistant(&line, 0.0),
            Err(CurveDivisionError::InvalidDistance { .. })
        ));
        assert_eq!(
            divide_equidistant(&[Point3::ORIGIN, Point3::ORIGIN], 1.0),
            Err(CurveDivisionError::ZeroLength)
        );
    }

    #[test]
    fn target_distance_lands_on_curve_end() {
        let line = [Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let division =
            divide_by_target_distance(&line, 3.0, DEFAULT_TARGET_STEPS, DEFAULT_TARGET_TOLERANCE).unwrap();
        assert!(division.end_gap < DEFAULT_TARGET_TOLERANCE);
        assert_eq!(division.points.len(), 4);
        assert!((division.distance - 10.0 / 3.0).abs() < 1e-2);
    }

    #[test]
    fn separate_segments_keeps_antiparallel() {
        let polyline = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let (aligned, other) = separate_segments_by_direction(&polyline, Vec3::X, 0.02);
        assert_eq!(aligned.len(), 2);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0][1], Point3::new(1.0, 1.0, 0.0));
    }
}
