use super::core::{Point3, Tolerance, Vec3};
use super::domain::{BREAKPOINT_PRECISION, Interval, round_and_deduplicate};
use super::panel::{Axis, PanelError};

/// Maximum distance between a point and its closest surface point for the
/// point to count as lying on the surface.
pub const POINT_ON_SURFACE_TOLERANCE: f64 = 0.1;

const CLOSEST_POINT_SAMPLES: usize = 16;
const CLOSEST_POINT_ITERATIONS: usize = 32;

pub trait Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    #[must_use]
    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let (u_lo, u_hi) = (u0.min(u1), u0.max(u1));
        let (v_lo, v_hi) = (v0.min(v1), v0.max(v1));

        let u = u.clamp(u_lo, u_hi);
        let v = v.clamp(v_lo, v_hi);

        let mut du = Vec3::ZERO;
        let mut dv = Vec3::ZERO;

        let u_span = u_hi - u_lo;
        if u_span.is_finite() && u_span != 0.0 {
            let h = Tolerance::DERIVATIVE.relative_to(u_span);
            let ua = (u - h).max(u_lo);
            let ub = (u + h).min(u_hi);
            if ua != ub {
                let pa = self.point_at(ua, v);
                let pb = self.point_at(ub, v);
                du = pb.sub_point(pa).mul_scalar(1.0 / (ub - ua));
            }
        }

        let v_span = v_hi - v_lo;
        if v_span.is_finite() && v_span != 0.0 {
            let h = Tolerance::DERIVATIVE.relative_to(v_span);
            let va = (v - h).max(v_lo);
            let vb = (v + h).min(v_hi);
            if va != vb {
                let pa = self.point_at(u, va);
                let pb = self.point_at(u, vb);
                dv = pb.sub_point(pa).mul_scalar(1.0 / (vb - va));
            }
        }

        (du, dv)
    }

    #[must_use]
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        du.cross(dv).normalized()
    }

    /// Point, unit tangents and unit normal at `(u, v)`.
    /// `None` when the surface is degenerate there.
    #[must_use]
    fn frame_at(&self, u: f64, v: f64) -> Option<SurfaceFrame> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        Some(SurfaceFrame {
            point: self.point_at(u, v),
            u_tangent: du.normalized()?,
            v_tangent: dv.normalized()?,
            normal: du.cross(dv).normalized()?,
        })
    }

    /// Parameters of the surface point closest to `point`.
    #[must_use]
    fn closest_parameter(&self, point: Point3) -> (f64, f64) {
        closest_parameter_by_sampling(self, point)
    }
}

impl<S: Surface + ?Sized> Surface for &S {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        (**self).point_at(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        (**self).domain_u()
    }

    fn domain_v(&self) -> (f64, f64) {
        (**self).domain_v()
    }

    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        (**self).partial_derivatives_at(u, v)
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        (**self).normal_at(u, v)
    }

    fn closest_parameter(&self, point: Point3) -> (f64, f64) {
        (**self).closest_parameter(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    pub point: Point3,
    pub u_tangent: Vec3,
    pub v_tangent: Vec3,
    pub normal: Vec3,
}

/// Surfaces that can be cut down to a sub-domain.
pub trait TrimSurface: Surface {
    type Output: Surface;

    /// Restricts the surface to `u x v`. The request is intersected with the
    /// current domain; an empty overlap is [`PanelError::DegenerateGeometry`].
    fn trim(&self, u: Interval, v: Interval) -> Result<Self::Output, PanelError>;
}

/// Domain of `surface` along `axis` as an [`Interval`].
#[must_use]
pub fn surface_domain<S: Surface + ?Sized>(surface: &S, axis: Axis) -> Interval {
    let (start, end) = match axis {
        Axis::U => surface.domain_u(),
        Axis::V => surface.domain_v(),
    };
    Interval::new(start, end)
}

fn trim_domains<S: Surface + ?Sized>(
    surface: &S,
    u: Interval,
    v: Interval,
) -> Result<(Interval, Interval), PanelError> {
    let u_domain = surface_domain(surface, Axis::U);
    let v_domain = surface_domain(surface, Axis::V);
    let u = u_domain.intersect(u).ok_or_else(|| {
        PanelError::DegenerateGeometry(format!(
            "U interval [{}, {}] lies outside the surface domain",
            u.start, u.end
        ))
    })?;
    let v = v_domain.intersect(v).ok_or_else(|| {
        PanelError::DegenerateGeometry(format!(
            "V interval [{}, {}] lies outside the surface domain",
            v.start, v.end
        ))
    })?;
    Ok((u, v))
}

/// Corner points at the domain corners, in `(u0,v0), (u1,v0), (u1,v1), (u0,v1)` order.
#[must_use]
pub fn surface_corners<S: Surface + ?Sized>(surface: &S) -> [Point3; 4] {
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    [
        surface.point_at(u0, v0),
        surface.point_at(u1, v0),
        surface.point_at(u1, v1),
        surface.point_at(u0, v1),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// FourPointSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Bilinear patch through four corners given in `(0,0), (1,0), (1,1), (0,1)` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourPointSurface {
    corners: [Point3; 4],
    u: Interval,
    v: Interval,
}

impl FourPointSurface {
    #[must_use]
    pub const fn new(corners: [Point3; 4]) -> Self {
        Self {
            corners,
            u: Interval::UNIT,
            v: Interval::UNIT,
        }
    }

    #[must_use]
    pub const fn with_domain(corners: [Point3; 4], u: Interval, v: Interval) -> Self {
        Self { corners, u, v }
    }

    #[must_use]
    pub const fn corners(&self) -> [Point3; 4] {
        self.corners
    }

    /// Swaps the U and V directions.
    #[must_use]
    pub const fn transpose(&self) -> Self {
        let [p00, p10, p11, p01] = self.corners;
        Self {
            corners: [p00, p01, p11, p10],
            u: self.v,
            v: self.u,
        }
    }

    #[must_use]
    pub const fn reverse_u(&self) -> Self {
        let [p00, p10, p11, p01] = self.corners;
        Self {
            corners: [p10, p00, p01, p11],
            ..*self
        }
    }

    #[must_use]
    pub const fn reverse_v(&self) -> Self {
        let [p00, p10, p11, p01] = self.corners;
        Self {
            corners: [p01, p11, p10, p00],
            ..*self
        }
    }
}

impl Surface for FourPointSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let s = self.u.normalized_parameter_at(u);
        let t = self.v.normalized_parameter_at(v);
        let [p00, p10, p11, p01] = self.corners;
        let bottom = p00.lerp(p10, s);
        let top = p01.lerp(p11, s);
        bottom.lerp(top, t)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.u.into()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.v.into()
    }
}

impl TrimSurface for FourPointSurface {
    type Output = Self;

    fn trim(&self, u: Interval, v: Interval) -> Result<Self, PanelError> {
        let (u, v) = trim_domains(self, u, v)?;
        let corners = [
            self.point_at(u.start, v.start),
            self.point_at(u.end, v.start),
            self.point_at(u.end, v.end),
            self.point_at(u.start, v.end),
        ];
        Ok(Self::with_domain(corners, u, v))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PlaneSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Parallelogram `origin + u * u_axis + v * v_axis` over the unit domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    pub origin: Point3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl PlaneSurface {
    #[must_use]
    pub const fn new(origin: Point3, u_axis: Vec3, v_axis: Vec3) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
        }
    }
}

impl Surface for PlaneSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin
            .add_vec(self.u_axis.mul_scalar(u))
            .add_vec(self.v_axis.mul_scalar(v))
    }

    fn partial_derivatives_at(&self, _u: f64, _v: f64) -> (Vec3, Vec3) {
        (self.u_axis, self.v_axis)
    }

    fn normal_at(&self, _u: f64, _v: f64) -> Option<Vec3> {
        self.u_axis.cross(self.v_axis).normalized()
    }
}

impl TrimSurface for PlaneSurface {
    type Output = IsotrimSurface<Self>;

    fn trim(&self, u: Interval, v: Interval) -> Result<Self::Output, PanelError> {
        IsotrimSurface::new(*self, u, v)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IsotrimSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Sub-domain view of another surface, sharing its parameterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotrimSurface<S> {
    surface: S,
    u: Interval,
    v: Interval,
}

impl<S: Surface> IsotrimSurface<S> {
    pub fn new(surface: S, u: Interval, v: Interval) -> Result<Self, PanelError> {
        let (u, v) = trim_domains(&surface, u, v)?;
        Ok(Self { surface, u, v })
    }

    #[must_use]
    pub const fn u_range(&self) -> Interval {
        self.u
    }

    #[must_use]
    pub const fn v_range(&self) -> Interval {
        self.v
    }

    #[must_use]
    pub const fn base(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> Surface for IsotrimSurface<S> {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.surface.point_at(self.u.clamp(u), self.v.clamp(v))
    }

    fn domain_u(&self) -> (f64, f64) {
        self.u.into()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.v.into()
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        self.surface.normal_at(self.u.clamp(u), self.v.clamp(v))
    }
}

impl<S: Surface + Clone> TrimSurface for IsotrimSurface<S> {
    type Output = Self;

    fn trim(&self, u: Interval, v: Interval) -> Result<Self, PanelError> {
        let (u, v) = trim_domains(self, u, v)?;
        Ok(Self {
            surface: self.surface.clone(),
            u,
            v,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reparameterized
// ─────────────────────────────────────────────────────────────────────────────

/// Presents a surface over a different parameter domain, usually the unit
/// square, by mapping it affinely onto the wrapped surface's domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reparameterized<S> {
    surface: S,
    u: Interval,
    v: Interval,
}

impl<S: Surface> Reparameterized<S> {
    #[must_use]
    pub fn unit(surface: S) -> Self {
        Self::new(surface, Interval::UNIT, Interval::UNIT)
    }

    #[must_use]
    pub const fn new(surface: S, u: Interval, v: Interval) -> Self {
        Self { surface, u, v }
    }

    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.surface
    }

    fn map(&self, u: f64, v: f64) -> (f64, f64) {
        let inner_u = surface_domain(&self.surface, Axis::U);
        let inner_v = surface_domain(&self.surface, Axis::V);
        (
            inner_u.parameter_at(self.u.normalized_parameter_at(u)),
            inner_v.parameter_at(self.v.normalized_parameter_at(v)),
        )
    }

    fn map_interval(&self, interval: Interval, axis: Axis) -> Interval {
        let (own, inner) = match axis {
            Axis::U => (self.u, surface_domain(&self.surface, Axis::U)),
            Axis::V => (self.v, surface_domain(&self.surface, Axis::V)),
        };
        Interval::new(
            inner.parameter_at(own.normalized_parameter_at(interval.start)),
            inner.parameter_at(own.normalized_parameter_at(interval.end)),
        )
    }
}

impl<S: Surface> Surface for Reparameterized<S> {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (u, v) = self.map(u, v);
        self.surface.point_at(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.u.into()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.v.into()
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (u, v) = self.map(u, v);
        self.surface.normal_at(u, v)
    }
}

impl<S: TrimSurface> TrimSurface for Reparameterized<S> {
    type Output = Reparameterized<S::Output>;

    fn trim(&self, u: Interval, v: Interval) -> Result<Self::Output, PanelError> {
        let (u, v) = trim_domains(self, u, v)?;
        let inner = self
            .surface
            .trim(self.map_interval(u, Axis::U), self.map_interval(v, Axis::V))?;
        Ok(Reparameterized::new(inner, u, v))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Closest point
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse grid search followed by Gauss-Newton refinement, clamped to the domain.
#[must_use]
pub fn closest_parameter_by_sampling<S: Surface + ?Sized>(surface: &S, point: Point3) -> (f64, f64) {
    let u_domain = surface_domain(surface, Axis::U);
    let v_domain = surface_domain(surface, Axis::V);

    let mut best = (u_domain.start, v_domain.start);
    let mut best_distance = f64::INFINITY;
    for i in 0..=CLOSEST_POINT_SAMPLES {
        #[allow(clippy::cast_precision_loss)]
        let u = u_domain.parameter_at(i as f64 / CLOSEST_POINT_SAMPLES as f64);
        for j in 0..=CLOSEST_POINT_SAMPLES {
            #[allow(clippy::cast_precision_loss)]
            let v = v_domain.parameter_at(j as f64 / CLOSEST_POINT_SAMPLES as f64);
            let distance = surface.point_at(u, v).distance_squared_to(point);
            if distance < best_distance {
                best_distance = distance;
                best = (u, v);
            }
        }
    }

    let (mut u, mut v) = best;
    let u_eps = Tolerance::ZERO_LENGTH.relative_to(u_domain.length().max(1.0));
    let v_eps = Tolerance::ZERO_LENGTH.relative_to(v_domain.length().max(1.0));
    for _ in 0..CLOSEST_POINT_ITERATIONS {
        let residual = surface.point_at(u, v).sub_point(point);
        let (su, sv) = surface.partial_derivatives_at(u, v);
        let a = su.dot(su);
        let b = su.dot(sv);
        let c = sv.dot(sv);
        let ru = residual.dot(su);
        let rv = residual.dot(sv);
        let det = a * c - b * b;
        if !det.is_finite() || det.abs() <= Tolerance::ZERO_LENGTH.eps {
            break;
        }
        let du = (-ru * c + b * rv) / det;
        let dv = (-a * rv + b * ru) / det;
        let next_u = u_domain.clamp(u + du);
        let next_v = v_domain.clamp(v + dv);
        let converged = (next_u - u).abs() <= u_eps && (next_v - v).abs() <= v_eps;
        let distance = surface.point_at(next_u, next_v).distance_squared_to(point);
        if distance > best_distance {
            break;
        }
        best_distance = distance;
        u = next_u;
        v = next_v;
        if converged {
            break;
        }
    }
    (u, v)
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface division
// ─────────────────────────────────────────────────────────────────────────────

/// Samples grouped per U parameter: `points[i][j]` lies at `(us[i], vs[j])`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceDivision {
    pub points: Vec<Vec<Point3>>,
    pub normals: Vec<Vec<Vec3>>,
    /// `(u, v, 0)` per sample.
    pub parameters: Vec<Vec<Vec3>>,
}

/// Evaluates points, normals and parameters at every `(us[i], vs[j])`, the
/// parameters used as given. Degenerate normals come back as zero vectors.
#[must_use]
pub fn divide_surface_numeric<S: Surface + ?Sized>(surface: &S, us: &[f64], vs: &[f64]) -> SurfaceDivision {
    let mut division = SurfaceDivision::default();
    for &u in us {
        let mut points = Vec::with_capacity(vs.len());
        let mut normals = Vec::with_capacity(vs.len());
        let mut parameters = Vec::with_capacity(vs.len());
        for &v in vs {
            points.push(surface.point_at(u, v));
            normals.push(surface.normal_at(u, v).unwrap_or(Vec3::ZERO));
            parameters.push(Vec3::new(u, v, 0.0));
        }
        division.points.push(points);
        division.normals.push(normals);
        division.parameters.push(parameters);
    }
    division
}

/// Breakpoints along `axis` taken from points lying on a unit-domain surface.
///
/// Points further than [`POINT_ON_SURFACE_TOLERANCE`] from the surface are
/// ignored. The domain ends `0` and `1` are always included and the result is
/// rounded and deduplicated. When the requested axis yields no interior
/// breakpoint the other axis is used instead.
#[must_use]
pub fn surface_point_parameters<S: Surface + ?Sized>(surface: &S, points: &[Point3], axis: Axis) -> Vec<f64> {
    let on_surface: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|&point| {
            let (u, v) = surface.closest_parameter(point);
            let distance = surface.point_at(u, v).distance_to(point);
            (distance < POINT_ON_SURFACE_TOLERANCE).then_some((u, v))
        })
        .collect();

    let collect = |axis: Axis| {
        let mut values = Vec::with_capacity(on_surface.len() + 2);
        values.push(0.0);
        values.extend(on_surface.iter().map(|&(u, v)| match axis {
            Axis::U => u,
            Axis::V => v,
        }));
        values.push(1.0);
        round_and_deduplicate(&values, BREAKPOINT_PRECISION)
    };

    let values = collect(axis);
    if values.len() > 2 {
        return values;
    }
    log::debug!("no interior {axis} breakpoints found, falling back to {}", axis.other());
    collect(axis.other())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> FourPointSurface {
        FourPointSurface::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn four_point_surface_is_bilinear() {
        let surface = square();
        assert_eq!(surface.point_at(0.5, 0.5), Point3::new(1.0, 0.5, 0.0));
        let normal = surface.normal_at(0.3, 0.7).unwrap();
        assert!((normal.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn four_point_trim_keeps_parameterization() {
        let surface = square();
        let trimmed = surface
            .trim(Interval::new(0.5, 1.0), Interval::new(0.0, 0.5))
            .unwrap();
        assert_eq!(trimmed.domain_u(), (0.5, 1.0));
        assert_eq!(trimmed.point_at(0.75, 0.25), surface.point_at(0.75, 0.25));
        assert_eq!(surface_corners(&trimmed)[0], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn trim_outside_domain_is_degenerate() {
        let err = square()
            .trim(Interval::new(1.5, 2.0), Interval::UNIT)
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn transpose_and_reverse() {
        let surface = square();
        let tol = Tolerance::DEFAULT;
        assert!(tol.approx_eq_point3(surface.transpose().point_at(0.2, 0.6), surface.point_at(0.6, 0.2)));
        assert!(tol.approx_eq_point3(surface.reverse_u().point_at(0.2, 0.6), surface.point_at(0.8, 0.6)));
        assert!(tol.approx_eq_point3(surface.reverse_v().point_at(0.2, 0.6), surface.point_at(0.2, 0.4)));
    }

    #[test]
    fn reparameterized_trim_stays_in_unit_space() {
        let plane = PlaneSurface::new(Point3::ORIGIN, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        let stretched = Reparameterized::new(plane, Interval::new(0.0, 10.0), Interval::new(0.0, 5.0));
        let unit = Reparameterized::unit(stretched);
        let band = unit.trim(Interval::UNIT, Interval::new(0.5, 1.0)).unwrap();
        assert_eq!(band.domain_v(), (0.5, 1.0));
        let tol = Tolerance::LOOSE;
        assert!(tol.approx_eq_point3(band.point_at(0.5, 0.75), Point3::new(2.0, 1.5, 0.0)));
        let cell = band.trim(Interval::new(0.0, 0.25), Interval::UNIT).unwrap();
        assert!(tol.approx_eq_point3(surface_corners(&cell)[2], Point3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn closest_parameter_on_plane() {
        let surface = square();
        let (u, v) = surface.closest_parameter(Point3::new(1.5, 0.25, 3.0));
        assert!((u - 0.75).abs() < 1e-6);
        assert!((v - 0.25).abs() < 1e-6);
    }

    #[test]
    fn divide_surface_numeric_groups_by_u() {
        let division = divide_surface_numeric(&square(), &[0.0, 1.0], &[0.0, 0.5, 1.0]);
        assert_eq!(division.points.len(), 2);
        assert_eq!(division.points[1].len(), 3);
        assert_eq!(division.points[1][1], Point3::new(2.0, 0.5, 0.0));
        assert_eq!(division.parameters[1][2], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn surface_point_parameters_falls_back_to_other_axis() {
        let surface = square();
        // points along v only: u is always 0
        let points = [Point3::new(0.0, 0.25, 0.0), Point3::new(0.0, 0.5, 0.0), Point3::new(5.0, 5.0, 5.0)];
        let params = surface_point_parameters(&surface, &points, Axis::U);
        assert_eq!(params.len(), 4);
        assert!((params[1] - 0.25).abs() < 1e-6);
        assert!((params[2] - 0.5).abs() < 1e-6);
    }
}
