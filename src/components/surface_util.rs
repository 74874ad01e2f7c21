//! Implementaties van de hulpcomponenten rond vlakken: punten sorteren op een
//! vlak, de parameterrichting van een vlak omdraaien of uitlijnen, en panelen
//! rationaliseren.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::geom::{
    FourPointSurface, Plane, Vec3, rationalize_surface, sort_points_by_plane,
    unify_surface_direction,
};
use crate::graph::meta::{MetaLookupExt, MetaMap};
use crate::graph::value::Value;

use super::coerce::{
    coerce_boolean_or, coerce_four_point_surface, coerce_number_or, coerce_plane_or_world_xy,
    coerce_point, coerce_point_list, coerce_vector_or, provided,
};
use super::{Component, ComponentError, ComponentResult};

const PIN_OUTPUT_POINTS: &str = "Pts";
const PIN_OUTPUT_SURFACE: &str = "S";

/// Meta-sleutel die aangeeft dat de hoekinvoer in graden staat.
const META_USE_DEGREES: &str = "UseDegrees";

/// Standaard hoektolerantie (radialen) bij het uitlijnen van de V-richting.
const DEFAULT_UNIFY_TOLERANCE: f64 = 0.1;

/// Beschikbare componenten binnen Surface → Util.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    SortPointsByPlane,
    SurfaceSwapDirection,
    UnifySurfaceDirection,
    SurfaceRationalize,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Registraties van alle Surface → Util componenten.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["{1ddb012f-22ca-45aa-aedd-9ae1615703b5}"],
        names: &["Sort Points By Plane", "Pt-PlnSort"],
        kind: ComponentKind::SortPointsByPlane,
    },
    Registration {
        guids: &["{daf0047c-145f-4a2d-9c77-8b00fd946ac4}"],
        names: &["Swap Surface Direction", "SwapUV"],
        kind: ComponentKind::SurfaceSwapDirection,
    },
    Registration {
        guids: &["{0e255edd-7922-4ef6-8dc6-012f397b9bc6}"],
        names: &["Unify Surface by Direction", "SrfUnifyDir"],
        kind: ComponentKind::UnifySurfaceDirection,
    },
    Registration {
        guids: &["{f43a5061-9b73-4415-bd99-e476cfb54954}"],
        names: &["Surface Rationalize", "SRat"],
        kind: ComponentKind::SurfaceRationalize,
    },
];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        match self {
            Self::SortPointsByPlane => evaluate_sort_points_by_plane(inputs, meta, self.name()),
            Self::SurfaceSwapDirection => evaluate_swap_direction(inputs, self.name()),
            Self::UnifySurfaceDirection => evaluate_unify_direction(inputs, meta, self.name()),
            Self::SurfaceRationalize => evaluate_rationalize(inputs, self.name()),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SortPointsByPlane => "Sort Points By Plane",
            Self::SurfaceSwapDirection => "Swap Surface Direction",
            Self::UnifySurfaceDirection => "Unify Surface by Direction",
            Self::SurfaceRationalize => "Surface Rationalize",
        }
    }
}

fn evaluate_sort_points_by_plane(
    inputs: &[Value],
    meta: &MetaMap,
    component: &str,
) -> ComponentResult {
    if inputs.len() < 2 {
        return Err(ComponentError::new(format!(
            "{component} vereist een vlak en een lijst met punten"
        )));
    }

    let plane: Plane = coerce_plane_or_world_xy(inputs.first())?;
    let points = coerce_point_list(inputs.get(1))?;
    let mut start_angle = coerce_number_or(inputs.get(2), PI)?;
    if meta.flag_or(META_USE_DEGREES, false) && inputs.get(2).is_some_and(|v| !v.is_null()) {
        start_angle = start_angle.to_radians();
    }

    let sorted = sort_points_by_plane(&plane, &points, start_angle);

    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_POINTS.to_owned(),
        Value::List(sorted.into_iter().map(|p| Value::Point(p.to_array())).collect()),
    );
    Ok(outputs)
}

fn required_surface(inputs: &[Value], component: &str) -> Result<FourPointSurface, ComponentError> {
    match inputs.first() {
        Some(value) if !value.is_null() => coerce_four_point_surface(value),
        _ => Err(ComponentError::new(format!(
            "{component} vereist een surface"
        ))),
    }
}

fn surface_value(surface: &FourPointSurface, face: Vec<u32>) -> Value {
    Value::Surface {
        vertices: surface.corners().map(|p| p.to_array()).to_vec(),
        faces: vec![face],
    }
}

fn evaluate_swap_direction(inputs: &[Value], component: &str) -> ComponentResult {
    let surface = required_surface(inputs, component)?;
    let flip = coerce_boolean_or(inputs.get(1), false)?;
    let swap = coerce_boolean_or(inputs.get(2), false)?;
    let reverse_u = coerce_boolean_or(inputs.get(3), false)?;
    let reverse_v = coerce_boolean_or(inputs.get(4), false)?;

    let mut result = surface;
    if swap {
        result = result.transpose();
    }
    if reverse_u {
        result = result.reverse_u();
    }
    if reverse_v {
        result = result.reverse_v();
    }

    // omdraaien keert alleen de windingsrichting (en dus de normaal) om
    let face = if flip {
        vec![0, 3, 2, 1]
    } else {
        vec![0, 1, 2, 3]
    };

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_SURFACE.to_owned(), surface_value(&result, face));
    Ok(outputs)
}

fn evaluate_unify_direction(inputs: &[Value], meta: &MetaMap, component: &str) -> ComponentResult {
    let surface = required_surface(inputs, component)?;
    let direction = coerce_vector_or(inputs.get(1), Vec3::Z)?;
    let mut tolerance = coerce_number_or(inputs.get(2), DEFAULT_UNIFY_TOLERANCE)?;
    if meta.flag_or(META_USE_DEGREES, false) && provided(inputs.get(2)).is_some() {
        tolerance = tolerance.to_radians();
    }

    let unified = unify_surface_direction(&surface, direction, tolerance);
    log::debug!(
        "{component}: verwisseld={}, V omgekeerd={}",
        unified.transposed,
        unified.reversed_v
    );

    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_SURFACE.to_owned(),
        surface_value(&unified.surface, vec![0, 1, 2, 3]),
    );
    Ok(outputs)
}

fn evaluate_rationalize(inputs: &[Value], component: &str) -> ComponentResult {
    let surface = required_surface(inputs, component)?;
    let planarize = coerce_boolean_or(inputs.get(1), false)?;
    let uv = match provided(inputs.get(2)) {
        Some(value) => {
            let point = coerce_point(value)?;
            (point.x, point.y)
        }
        None => (0.0, 0.0),
    };

    let rationalized = rationalize_surface(&surface, uv, planarize)?;

    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_SURFACE.to_owned(),
        surface_value(&rationalized, vec![0, 1, 2, 3]),
    );
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::{Component, ComponentKind, PIN_OUTPUT_POINTS, PIN_OUTPUT_SURFACE};
    use crate::components::OutputMap;
    use crate::graph::meta::{MetaMap, MetaValue};
    use crate::graph::value::Value;

    fn compass_points() -> Value {
        Value::List(vec![
            Value::Point([0.0, 1.0, 0.0]),
            Value::Point([-1.0, 0.0, 0.0]),
            Value::Point([1.0, 0.0, 5.0]),
            Value::Point([0.0, -1.0, 0.0]),
        ])
    }

    fn sorted_x(outputs: &OutputMap) -> Vec<f64> {
        outputs
            .get(PIN_OUTPUT_POINTS)
            .and_then(|value| value.expect_list().ok())
            .expect("points")
            .iter()
            .map(|p| p.expect_point().expect("point")[0])
            .collect()
    }

    #[test]
    fn default_start_angle_is_half_turn() {
        let outputs = ComponentKind::SortPointsByPlane
            .evaluate(&[Value::Null, compass_points()], &MetaMap::new())
            .expect("sorted");
        // vanaf 180°: -X, -Y, +X, +Y
        assert_eq!(sorted_x(&outputs), vec![-1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn degrees_are_converted_when_flagged() {
        let mut meta = MetaMap::new();
        meta.insert("UseDegrees".to_owned(), MetaValue::from(true));
        let outputs = ComponentKind::SortPointsByPlane
            .evaluate(&[Value::Null, compass_points(), Value::Number(0.0)], &meta)
            .expect("sorted");
        assert_eq!(sorted_x(&outputs), vec![1.0, 0.0, -1.0, 0.0]);

        let outputs = ComponentKind::SortPointsByPlane
            .evaluate(&[Value::Null, compass_points(), Value::Number(45.0)], &meta)
            .expect("sorted");
        assert_eq!(sorted_x(&outputs), vec![0.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn swap_transposes_and_flip_reverses_winding() {
        let surface = Value::Surface {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            faces: vec![vec![0, 1, 2, 3]],
        };
        let inputs = [
            surface,
            Value::Boolean(true),
            Value::Boolean(true),
            Value::Null,
            Value::Null,
        ];
        let outputs = ComponentKind::SurfaceSwapDirection
            .evaluate(&inputs, &MetaMap::new())
            .expect("swapped");
        let (vertices, faces) = outputs
            .get(PIN_OUTPUT_SURFACE)
            .expect("surface")
            .expect_surface()
            .expect("surface value");
        assert_eq!(vertices[1], [0.0, 1.0, 0.0]);
        assert_eq!(vertices[3], [2.0, 0.0, 0.0]);
        assert_eq!(faces, &[vec![0, 3, 2, 1]]);
    }

    #[test]
    fn reverse_u_mirrors_corners() {
        let surface = Value::List(vec![
            Value::Point([0.0, 0.0, 0.0]),
            Value::Point([1.0, 0.0, 0.0]),
            Value::Point([1.0, 1.0, 0.0]),
            Value::Point([0.0, 1.0, 0.0]),
        ]);
        let outputs = ComponentKind::SurfaceSwapDirection
            .evaluate(
                &[surface, Value::Null, Value::Null, Value::Boolean(true)],
                &MetaMap::new(),
            )
            .expect("reversed");
        let (vertices, _) = outputs
            .get(PIN_OUTPUT_SURFACE)
            .expect("surface")
            .expect_surface()
            .expect("surface value");
        assert_eq!(vertices[0], [1.0, 0.0, 0.0]);
    }

    fn output_vertices(outputs: &OutputMap) -> Vec<[f64; 3]> {
        outputs
            .get(PIN_OUTPUT_SURFACE)
            .expect("surface")
            .expect_surface()
            .expect("surface value")
            .0
            .to_vec()
    }

    #[test]
    fn unify_transposes_sideways_surface() {
        // U loopt langs Z, V langs X
        let surface = Value::List(vec![
            Value::Point([0.0, 0.0, 0.0]),
            Value::Point([0.0, 0.0, 2.0]),
            Value::Point([1.0, 0.0, 2.0]),
            Value::Point([1.0, 0.0, 0.0]),
        ]);
        let outputs = ComponentKind::UnifySurfaceDirection
            .evaluate(&[surface], &MetaMap::new())
            .expect("unified");
        let vertices = output_vertices(&outputs);
        assert_eq!(vertices[1], [1.0, 0.0, 0.0]);
        assert_eq!(vertices[3], [0.0, 0.0, 2.0]);
    }

    #[test]
    fn unify_tolerance_accepts_degrees() {
        // V staat 80° op Z: alleen een tolerantie van meer dan 10° verwisselt
        let angle = 80_f64.to_radians();
        let surface = Value::List(vec![
            Value::Point([0.0, 0.0, 0.0]),
            Value::Point([0.0, 1.0, 0.0]),
            Value::Point([angle.sin(), 1.0, angle.cos()]),
            Value::Point([angle.sin(), 0.0, angle.cos()]),
        ]);
        let mut meta = MetaMap::new();
        meta.insert("UseDegrees".to_owned(), MetaValue::from(true));

        let narrow = [surface.clone(), Value::Vector([0.0, 0.0, 1.0]), Value::Number(5.0)];
        let outputs = ComponentKind::UnifySurfaceDirection
            .evaluate(&narrow, &meta)
            .expect("unified");
        assert_eq!(output_vertices(&outputs)[1], [0.0, 1.0, 0.0]);

        let wide = [surface, Value::Vector([0.0, 0.0, 1.0]), Value::Number(15.0)];
        let outputs = ComponentKind::UnifySurfaceDirection
            .evaluate(&wide, &meta)
            .expect("unified");
        assert_eq!(output_vertices(&outputs)[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn rationalize_planarizes_on_request() {
        let twisted = Value::List(vec![
            Value::Point([0.0, 0.0, 0.0]),
            Value::Point([1.0, 0.0, 0.0]),
            Value::Point([1.0, 1.0, 1.0]),
            Value::Point([0.0, 1.0, 0.0]),
        ]);
        let outputs = ComponentKind::SurfaceRationalize
            .evaluate(&[twisted.clone()], &MetaMap::new())
            .expect("rationalized");
        assert_eq!(output_vertices(&outputs)[2], [1.0, 1.0, 1.0]);

        let outputs = ComponentKind::SurfaceRationalize
            .evaluate(
                &[twisted, Value::Boolean(true), Value::Point([0.0, 0.0, 0.0])],
                &MetaMap::new(),
            )
            .expect("planarized");
        assert!(output_vertices(&outputs).iter().all(|p| p[2].abs() < 1e-6));
    }

    #[test]
    fn rationalize_requires_surface() {
        let err = ComponentKind::SurfaceRationalize
            .evaluate(&[], &MetaMap::new())
            .unwrap_err();
        assert_eq!(err.message(), "Surface Rationalize vereist een surface");
    }
}
