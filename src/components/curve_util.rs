//! Implementaties van de curve-hulpcomponenten.

use std::collections::BTreeMap;

use crate::geom::{
    DEFAULT_TARGET_STEPS, DEFAULT_TARGET_TOLERANCE, Point3, Vec3, divide_by_target_distance,
    is_linear, separate_segments_by_direction,
};
use crate::graph::meta::MetaMap;
use crate::graph::value::Value;

use super::coerce::{coerce_number, coerce_number_or, coerce_polyline, coerce_vector_or};
use super::{Component, ComponentError, ComponentResult};

const PIN_OUTPUT_POINTS: &str = "P";
const PIN_OUTPUT_ALIGNED: &str = "A";
const PIN_OUTPUT_OTHER: &str = "B";
const PIN_OUTPUT_CURVE: &str = "C";
const PIN_OUTPUT_LINE: &str = "L";
const PIN_OUTPUT_IS_LINE: &str = "B";

/// Standaard hoektolerantie (radialen) voor het scheiden op richting.
const DEFAULT_DIRECTION_TOLERANCE: f64 = 0.02;
/// Standaard afstandstolerantie voor de lineariteitstest.
const DEFAULT_LINEARITY_TOLERANCE: f64 = 0.1;

/// Beschikbare componenten binnen Curve → Util.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    DivideCurveTargetDistance,
    SeparatePolylineByDirection,
    SeparateCurvesAndLines,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Registraties van alle Curve → Util componenten.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["{0236b6b2-03be-4cf7-b8a5-97074f6f9792}"],
        names: &["Divide Crv by Target Distance", "CrvTargDist"],
        kind: ComponentKind::DivideCurveTargetDistance,
    },
    Registration {
        guids: &["{35c9bab4-9572-496b-ba55-533b67eaa5ab}"],
        names: &["Separate Segments By Direction", "SepPLine"],
        kind: ComponentKind::SeparatePolylineByDirection,
    },
    Registration {
        guids: &["{cf954962-32f1-4bd1-9b66-af96c80454e8}"],
        names: &["Separate Curves & Lines", "CrvsVsLns"],
        kind: ComponentKind::SeparateCurvesAndLines,
    },
];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value], _meta: &MetaMap) -> ComponentResult {
        match self {
            Self::DivideCurveTargetDistance => evaluate_target_distance(inputs, self.name()),
            Self::SeparatePolylineByDirection => evaluate_separate_by_direction(inputs, self.name()),
            Self::SeparateCurvesAndLines => evaluate_curves_and_lines(inputs, self.name()),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DivideCurveTargetDistance => "Divide Crv by Target Distance",
            Self::SeparatePolylineByDirection => "Separate Segments By Direction",
            Self::SeparateCurvesAndLines => "Separate Curves & Lines",
        }
    }
}

fn evaluate_target_distance(inputs: &[Value], component: &str) -> ComponentResult {
    if inputs.len() < 2 {
        return Err(ComponentError::new(format!(
            "{component} vereist een curve en een doelafstand"
        )));
    }

    let polyline = coerce_polyline(&inputs[0])?;
    let target = coerce_number(&inputs[1])?;
    let division = divide_by_target_distance(
        &polyline,
        target,
        DEFAULT_TARGET_STEPS,
        DEFAULT_TARGET_TOLERANCE,
    )?;
    if division.end_gap >= DEFAULT_TARGET_TOLERANCE {
        log::warn!(
            "{component}: na {} stappen blijft er {:.4} over tot het einde van de curve",
            division.iterations,
            division.end_gap
        );
    }

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_POINTS.to_owned(), points_value(&division.points));
    Ok(outputs)
}

fn evaluate_separate_by_direction(inputs: &[Value], component: &str) -> ComponentResult {
    let Some(curve) = inputs.first().filter(|value| !value.is_null()) else {
        return Err(ComponentError::new(format!(
            "{component} vereist een polyline"
        )));
    };

    let polyline = coerce_polyline(curve)?;
    let direction = coerce_vector_or(inputs.get(1), Vec3::Z)?;
    let tolerance = coerce_number_or(inputs.get(2), DEFAULT_DIRECTION_TOLERANCE)?;

    let (aligned, other) = separate_segments_by_direction(&polyline, direction, tolerance);

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_ALIGNED.to_owned(), segments_value(&aligned));
    outputs.insert(PIN_OUTPUT_OTHER.to_owned(), segments_value(&other));
    Ok(outputs)
}

fn evaluate_curves_and_lines(inputs: &[Value], component: &str) -> ComponentResult {
    let Some(curve) = inputs.first().filter(|value| !value.is_null()) else {
        return Err(ComponentError::new(format!(
            "{component} vereist een curve"
        )));
    };

    let polyline = coerce_polyline(curve)?;
    let tolerance = coerce_number_or(inputs.get(1), DEFAULT_LINEARITY_TOLERANCE)?;
    let linear = is_linear(&polyline, tolerance);

    let (curve, line) = match (linear, polyline.first(), polyline.last()) {
        (true, Some(start), Some(end)) => (
            Value::Null,
            Value::CurveLine {
                p1: start.to_array(),
                p2: end.to_array(),
            },
        ),
        _ => (points_value(&polyline), Value::Null),
    };

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_CURVE.to_owned(), curve);
    outputs.insert(PIN_OUTPUT_LINE.to_owned(), line);
    outputs.insert(PIN_OUTPUT_IS_LINE.to_owned(), Value::Boolean(linear));
    Ok(outputs)
}

fn points_value(points: &[Point3]) -> Value {
    Value::List(points.iter().map(|p| Value::Point(p.to_array())).collect())
}

fn segments_value(segments: &[[Point3; 2]]) -> Value {
    Value::List(
        segments
            .iter()
            .map(|[start, end]| Value::CurveLine {
                p1: start.to_array(),
                p2: end.to_array(),
            })
            .collect(),
    )
}
