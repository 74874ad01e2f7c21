//! Implementaties van de panelisatiecomponenten: diamant-, quad- en
//! verspringende (staggered) onderverdelingen van een vlak.
//!
//! Elk paneel wordt teruggegeven als `Value::Surface` met één vlak van vier
//! (quad) of drie (driehoek) hoekpunten.

use std::collections::BTreeMap;

use crate::geom::{
    Axis, CornerPanelBuilder, FourPointSurface, GeomContext, GridDivisions, Interval, Panel,
    PanelDiagnostics, PointGrid, Reparameterized, Surface, diamond_panels_on_surface,
    diamonds_from_points, divide_surface_numeric, quad_subdivide, quads_from_points,
    require_breakpoints, staggered_panels, surface_corners, surface_point_parameters,
    uniform_breakpoints,
};
use crate::graph::meta::MetaMap;
use crate::graph::value::Value;

use super::coerce::{
    coerce_count_or, coerce_four_point_surface, coerce_number_list, coerce_point_list,
};
use super::{Component, ComponentError, ComponentResult};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const PIN_OUTPUT_DIAMONDS: &str = "D";
const PIN_OUTPUT_TRIANGLES: &str = "T";
const PIN_OUTPUT_SURFACES: &str = "S";
const PIN_OUTPUT_POINTS: &str = "P";
const PIN_OUTPUT_NORMALS: &str = "N";
const PIN_OUTPUT_PARAMETERS: &str = "uv";

/// Standaard aantal verdelingen per richting.
const DEFAULT_DIVISIONS: usize = 10;

/// Beschikbare componenten binnen Panelize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    DiamondSubdivide,
    DiamondSubdivideNumeric,
    DiamondSubdividePoints,
    DiamondsFromPoints,
    QuadSubdivide,
    QuadSubdivideNumeric,
    QuadSubdividePoints,
    QuadsFromPoints,
    StaggeredQuadSubdivide,
    StaggeredQuadNumeric,
    StaggeredQuadPoints,
    DivideSurfaceNumeric,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Registraties van alle Panelize componenten.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["{adf918e2-3963-403f-b756-aad5407605d3}"],
        names: &["Diamond Subdivide", "Diamonds", "DiamondSubD"],
        kind: ComponentKind::DiamondSubdivide,
    },
    Registration {
        guids: &["{f112b7fd-f978-42ec-993a-54d0582d42e2}"],
        names: &["Diamond Subdivide - Numeric", "DiaNum"],
        kind: ComponentKind::DiamondSubdivideNumeric,
    },
    Registration {
        guids: &["{08cfa9a5-9adb-452c-ab2c-88b2ce49d815}"],
        names: &["Diamond Subdivide - Points", "DiaPts"],
        kind: ComponentKind::DiamondSubdividePoints,
    },
    Registration {
        guids: &["{ef763de3-f7d1-4185-b5f2-ae522fdcb70d}"],
        names: &["Diamonds From Points", "DiaFromPts"],
        kind: ComponentKind::DiamondsFromPoints,
    },
    Registration {
        guids: &["{cabc5478-3622-45c5-9649-c938592c1f87}"],
        names: &["Quad Subdivide", "SubDivQ"],
        kind: ComponentKind::QuadSubdivide,
    },
    Registration {
        guids: &["{bf5be944-b6a0-45e7-bf47-b76f3a181a69}"],
        names: &["Quad Subdivide - Numeric", "NumSDivQ"],
        kind: ComponentKind::QuadSubdivideNumeric,
    },
    Registration {
        guids: &["{e39a8a18-fd60-4ff4-8e8b-a24029643575}"],
        names: &["Quad Subdivide - Points", "PtSDivQ"],
        kind: ComponentKind::QuadSubdividePoints,
    },
    Registration {
        guids: &["{4820b8ac-f4e5-4141-bf37-706056a04555}"],
        names: &["Quad From Points", "QuadFromPts"],
        kind: ComponentKind::QuadsFromPoints,
    },
    Registration {
        guids: &["{073fa331-15f1-4cb3-8a3a-608375e9d909}"],
        names: &["Staggered Quad SubD", "StagQSubD"],
        kind: ComponentKind::StaggeredQuadSubdivide,
    },
    Registration {
        guids: &["{6cb1a842-4284-493b-8b41-2be228004e9f}"],
        names: &["Staggered Quad - Numeric", "NumStagSubD"],
        kind: ComponentKind::StaggeredQuadNumeric,
    },
    Registration {
        guids: &["{17523ae1-093b-4682-9f7c-cd68d61118d1}"],
        names: &["StaggeredQuad Subdivide - Points", "PtSDivStag"],
        kind: ComponentKind::StaggeredQuadPoints,
    },
    Registration {
        guids: &["{1fb8627e-b5c3-4f11-b35f-59edf35b634c}"],
        names: &["Divide Surface - Numeric", "SDivNums"],
        kind: ComponentKind::DivideSurfaceNumeric,
    },
];

/// Herkomst van de breekpunten van een component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Breakpoints {
    /// Gelijkmatige verdeling met `U` en `V` aantallen.
    Count,
    /// Expliciete parameterlijsten `nU` en `nV`.
    Numeric,
    /// Parameters van punten op het vlak, `ptU` en `ptV`.
    Points,
}

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value], _meta: &MetaMap) -> ComponentResult {
        match self {
            Self::DiamondSubdivide => evaluate_diamonds(inputs, Breakpoints::Count, self.name()),
            Self::DiamondSubdivideNumeric => {
                evaluate_diamonds(inputs, Breakpoints::Numeric, self.name())
            }
            Self::DiamondSubdividePoints => {
                evaluate_diamonds(inputs, Breakpoints::Points, self.name())
            }
            Self::DiamondsFromPoints => evaluate_diamonds_from_points(inputs, self.name()),
            Self::QuadSubdivide => evaluate_quads(inputs, Breakpoints::Count, self.name()),
            Self::QuadSubdivideNumeric => evaluate_quads(inputs, Breakpoints::Numeric, self.name()),
            Self::QuadSubdividePoints => evaluate_quads(inputs, Breakpoints::Points, self.name()),
            Self::QuadsFromPoints => evaluate_quads_from_points(inputs, self.name()),
            Self::StaggeredQuadSubdivide => {
                evaluate_staggered(inputs, Breakpoints::Count, self.name())
            }
            Self::StaggeredQuadNumeric => {
                evaluate_staggered(inputs, Breakpoints::Numeric, self.name())
            }
            Self::StaggeredQuadPoints => {
                evaluate_staggered(inputs, Breakpoints::Points, self.name())
            }
            Self::DivideSurfaceNumeric => evaluate_divide_surface_numeric(inputs, self.name()),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiamondSubdivide => "Diamond Subdivide",
            Self::DiamondSubdivideNumeric => "Diamond Subdivide - Numeric",
            Self::DiamondSubdividePoints => "Diamond Subdivide - Points",
            Self::DiamondsFromPoints => "Diamonds From Points",
            Self::QuadSubdivide => "Quad Subdivide",
            Self::QuadSubdivideNumeric => "Quad Subdivide - Numeric",
            Self::QuadSubdividePoints => "Quad Subdivide - Points",
            Self::QuadsFromPoints => "Quad From Points",
            Self::StaggeredQuadSubdivide => "Staggered Quad SubD",
            Self::StaggeredQuadNumeric => "Staggered Quad - Numeric",
            Self::StaggeredQuadPoints => "StaggeredQuad Subdivide - Points",
            Self::DivideSurfaceNumeric => "Divide Surface - Numeric",
        }
    }
}

fn evaluate_diamonds(inputs: &[Value], source: Breakpoints, component: &str) -> ComponentResult {
    let surface = coerce_base_surface(inputs, component)?;
    let (u_breaks, v_breaks) = breakpoints(&surface, inputs, source, component)?;

    let mut ctx = GeomContext::new();
    let (panels, diagnostics) = diamond_panels_on_surface(
        surface,
        &u_breaks,
        &v_breaks,
        &CornerPanelBuilder::default(),
        &mut ctx,
    )?;
    report_skipped(component, diagnostics);

    // de puntvariant noemt zijn diamanten "S"
    let diamond_pin = if source == Breakpoints::Points {
        PIN_OUTPUT_SURFACES
    } else {
        PIN_OUTPUT_DIAMONDS
    };

    let mut outputs = BTreeMap::new();
    outputs.insert(diamond_pin.to_owned(), corner_panels_to_value(panels.diamonds));
    outputs.insert(
        PIN_OUTPUT_TRIANGLES.to_owned(),
        corner_panels_to_value(panels.triangles),
    );
    Ok(outputs)
}

fn evaluate_diamonds_from_points(inputs: &[Value], component: &str) -> ComponentResult {
    if inputs.len() < 3 {
        return Err(ComponentError::new(format!(
            "{component} vereist punten en U/V-aantallen"
        )));
    }
    let points = coerce_point_list(inputs.first())?;
    let u = coerce_count_or(inputs.get(1), 0, &format!("{component} U"))?;
    let v = coerce_count_or(inputs.get(2), 0, &format!("{component} V"))?;

    let grid = PointGrid::with_counts(&points, u, v)?;
    let (panels, diagnostics) = diamonds_from_points(&grid, &CornerPanelBuilder::default())?;
    report_skipped(component, diagnostics);

    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_DIAMONDS.to_owned(),
        corner_panels_to_value(panels.diamonds),
    );
    outputs.insert(
        PIN_OUTPUT_TRIANGLES.to_owned(),
        corner_panels_to_value(panels.triangles),
    );
    Ok(outputs)
}

fn evaluate_quads(inputs: &[Value], source: Breakpoints, component: &str) -> ComponentResult {
    let surface = coerce_base_surface(inputs, component)?;
    let (u_breaks, v_breaks) = breakpoints(&surface, inputs, source, component)?;

    let (panels, diagnostics) = quad_subdivide(&surface, &u_breaks, &v_breaks)?;
    report_skipped(component, diagnostics);

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_SURFACES.to_owned(), surfaces_to_value(panels));
    Ok(outputs)
}

fn evaluate_quads_from_points(inputs: &[Value], component: &str) -> ComponentResult {
    if inputs.len() < 3 {
        return Err(ComponentError::new(format!(
            "{component} vereist punten en U/V-aantallen"
        )));
    }
    let points = coerce_point_list(inputs.first())?;
    let u = coerce_count_or(inputs.get(1), 0, &format!("{component} U"))?;
    let v = coerce_count_or(inputs.get(2), 0, &format!("{component} V"))?;

    let grid = PointGrid::with_counts(&points, u, v)?;
    let (panels, diagnostics) = quads_from_points(&grid, &CornerPanelBuilder::default())?;
    report_skipped(component, diagnostics);

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_SURFACES.to_owned(), corner_panels_to_value(panels));
    Ok(outputs)
}

fn evaluate_staggered(inputs: &[Value], source: Breakpoints, component: &str) -> ComponentResult {
    let surface = coerce_base_surface(inputs, component)?;
    let (u_breaks, v_breaks) = breakpoints(&surface, inputs, source, component)?;

    let (panels, diagnostics) = staggered_panels(&surface, &u_breaks, &v_breaks)?;
    report_skipped(component, diagnostics);

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_SURFACES.to_owned(), surfaces_to_value(panels));
    Ok(outputs)
}

fn evaluate_divide_surface_numeric(inputs: &[Value], component: &str) -> ComponentResult {
    let surface = coerce_base_surface(inputs, component)?;
    let us = coerce_number_list(inputs.get(1))?;
    let vs = coerce_number_list(inputs.get(2))?;
    if let Some(value) = us.iter().chain(&vs).find(|value| !value.is_finite()) {
        return Err(ComponentError::new(format!(
            "{component} kreeg een ongeldige parameter {value}"
        )));
    }

    let division = divide_surface_numeric(&surface, &us, &vs);

    let points = division
        .points
        .iter()
        .map(|row| Value::List(row.iter().map(|p| Value::Point(p.to_array())).collect()))
        .collect();
    let normals = division
        .normals
        .iter()
        .map(|row| Value::List(row.iter().map(|n| Value::Vector(n.to_array())).collect()))
        .collect();
    let parameters = division
        .parameters
        .iter()
        .map(|row| Value::List(row.iter().map(|uv| Value::Vector(uv.to_array())).collect()))
        .collect();

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_POINTS.to_owned(), Value::List(points));
    outputs.insert(PIN_OUTPUT_NORMALS.to_owned(), Value::List(normals));
    outputs.insert(PIN_OUTPUT_PARAMETERS.to_owned(), Value::List(parameters));
    Ok(outputs)
}

fn coerce_base_surface(
    inputs: &[Value],
    component: &str,
) -> Result<FourPointSurface, ComponentError> {
    match inputs.first() {
        Some(value) if !value.is_null() => coerce_four_point_surface(value),
        _ => Err(ComponentError::new(format!(
            "{component} vereist een surface"
        ))),
    }
}

/// Breekpunten in de eenheidsparameterruimte van `surface` voor beide richtingen.
fn breakpoints(
    surface: &FourPointSurface,
    inputs: &[Value],
    source: Breakpoints,
    component: &str,
) -> Result<(Vec<f64>, Vec<f64>), ComponentError> {
    match source {
        Breakpoints::Count => {
            let u = coerce_count_or(inputs.get(1), DEFAULT_DIVISIONS, &format!("{component} U"))?;
            let v = coerce_count_or(inputs.get(2), DEFAULT_DIVISIONS, &format!("{component} V"))?;
            let divisions = GridDivisions::new(u, v)?;
            Ok((
                uniform_breakpoints(Interval::UNIT, divisions.u()),
                uniform_breakpoints(Interval::UNIT, divisions.v()),
            ))
        }
        Breakpoints::Numeric => {
            let u = require_breakpoints(&coerce_number_list(inputs.get(1))?)?;
            let v = require_breakpoints(&coerce_number_list(inputs.get(2))?)?;
            Ok((u, v))
        }
        Breakpoints::Points => {
            let unit = Reparameterized::unit(surface);
            let u_points = coerce_point_list(inputs.get(1))?;
            let v_points = coerce_point_list(inputs.get(2))?;
            Ok((
                surface_point_parameters(&unit, &u_points, Axis::U),
                surface_point_parameters(&unit, &v_points, Axis::V),
            ))
        }
    }
}

fn report_skipped(component: &str, diagnostics: PanelDiagnostics) {
    if diagnostics.skipped_degenerate > 0 {
        log::warn!(
            "{component}: {} van {} cellen leverden een ontaard paneel op",
            diagnostics.skipped_degenerate,
            diagnostics.cells_visited
        );
    }
}

fn panel_value(panel: &Panel) -> Value {
    let vertices: Vec<[f64; 3]> = panel.vertices().iter().map(|p| p.to_array()).collect();
    #[allow(clippy::cast_possible_truncation)]
    let face: Vec<u32> = (0..vertices.len() as u32).collect();
    Value::Surface {
        vertices,
        faces: vec![face],
    }
}

fn surface_value<S: Surface>(surface: &S) -> Value {
    Value::Surface {
        vertices: surface_corners(surface).map(|p| p.to_array()).to_vec(),
        faces: vec![vec![0, 1, 2, 3]],
    }
}

#[cfg(feature = "parallel")]
fn corner_panels_to_value(panels: Vec<Panel>) -> Value {
    Value::List(panels.into_par_iter().map(|panel| panel_value(&panel)).collect())
}

#[cfg(not(feature = "parallel"))]
fn corner_panels_to_value(panels: Vec<Panel>) -> Value {
    Value::List(panels.into_iter().map(|panel| panel_value(&panel)).collect())
}

#[cfg(feature = "parallel")]
fn surfaces_to_value(panels: Vec<FourPointSurface>) -> Value {
    Value::List(panels.into_par_iter().map(|panel| surface_value(&panel)).collect())
}

#[cfg(not(feature = "parallel"))]
fn surfaces_to_value(panels: Vec<FourPointSurface>) -> Value {
    Value::List(panels.into_iter().map(|panel| surface_value(&panel)).collect())
}

#[cfg(test)]
mod tests {
    use super::{
        Component, ComponentKind, PIN_OUTPUT_DIAMONDS, PIN_OUTPUT_NORMALS, PIN_OUTPUT_POINTS,
        PIN_OUTPUT_SURFACES, PIN_OUTPUT_TRIANGLES,
    };
    use crate::graph::meta::MetaMap;
    use crate::graph::value::Value;

    fn square(size: f64) -> Value {
        Value::Surface {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [size, 0.0, 0.0],
                [size, size, 0.0],
                [0.0, size, 0.0],
            ],
            faces: vec![vec![0, 1, 2, 3]],
        }
    }

    fn list_len(value: Option<&Value>) -> usize {
        value
            .and_then(|value| value.expect_list().ok())
            .map_or(0, <[Value]>::len)
    }

    #[test]
    fn diamond_subdivide_defaults_to_ten_divisions() {
        let outputs = ComponentKind::DiamondSubdivide
            .evaluate(&[square(10.0)], &MetaMap::new())
            .expect("diamonds");
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_DIAMONDS)), 41);
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_TRIANGLES)), 20);
    }

    #[test]
    fn diamond_numeric_four_by_four() {
        let breaks = Value::List(
            [0.0, 0.25, 0.5, 0.75, 1.0]
                .iter()
                .map(|&t| Value::Number(t))
                .collect(),
        );
        let outputs = ComponentKind::DiamondSubdivideNumeric
            .evaluate(&[square(4.0), breaks.clone(), breaks], &MetaMap::new())
            .expect("diamonds");
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_DIAMONDS)), 5);
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_TRIANGLES)), 8);
    }

    #[test]
    fn diamond_points_use_surface_pin() {
        let pts_u = Value::List(vec![Value::Point([2.0, 0.0, 0.0])]);
        let pts_v = Value::List(vec![Value::Point([0.0, 2.0, 0.0])]);
        let outputs = ComponentKind::DiamondSubdividePoints
            .evaluate(&[square(4.0), pts_u, pts_v], &MetaMap::new())
            .expect("diamonds");
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_SURFACES)), 1);
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_TRIANGLES)), 4);
    }

    #[test]
    fn quad_subdivide_reports_division_errors() {
        let err = ComponentKind::QuadSubdivide
            .evaluate(&[square(1.0), Value::Number(0.0), Value::Number(2.0)], &MetaMap::new())
            .unwrap_err();
        assert!(err.message().contains("division count"));
    }

    #[test]
    fn quad_subdivide_produces_quads() {
        let outputs = ComponentKind::QuadSubdivide
            .evaluate(&[square(3.0), Value::Number(3.0), Value::Number(2.0)], &MetaMap::new())
            .expect("quads");
        let panels = outputs
            .get(PIN_OUTPUT_SURFACES)
            .and_then(|value| value.expect_list().ok())
            .expect("panel list");
        assert_eq!(panels.len(), 6);
        let (vertices, faces) = panels[0].expect_surface().expect("surface");
        assert!((vertices[2][0] - 1.0).abs() < 1e-9);
        assert!((vertices[2][1] - 1.5).abs() < 1e-9);
        assert_eq!(faces, &[vec![0, 1, 2, 3]]);
    }

    #[test]
    fn quads_from_points_requires_matching_grid() {
        let points = Value::List(vec![Value::Point([0.0, 0.0, 0.0]); 5]);
        let err = ComponentKind::QuadsFromPoints
            .evaluate(&[points, Value::Number(1.0), Value::Number(1.0)], &MetaMap::new())
            .unwrap_err();
        assert!(err.message().contains("expected 4"));
    }

    #[test]
    fn huge_point_grid_counts_are_rejected() {
        let points = Value::List(vec![Value::Point([0.0, 0.0, 0.0]); 4]);
        for kind in [ComponentKind::DiamondsFromPoints, ComponentKind::QuadsFromPoints] {
            let err = kind
                .evaluate(
                    &[points.clone(), Value::Number(1e12), Value::Number(1e12)],
                    &MetaMap::new(),
                )
                .unwrap_err();
            assert!(err.message().contains("at most"), "{}", err.message());
        }
    }

    #[test]
    fn huge_division_counts_are_rejected() {
        for count in [1e300, 1e9] {
            assert!(
                ComponentKind::QuadSubdivide
                    .evaluate(&[square(1.0), Value::Number(count), Value::Number(2.0)], &MetaMap::new())
                    .is_err()
            );
            assert!(
                ComponentKind::DiamondSubdivide
                    .evaluate(&[square(1.0), Value::Number(2.0), Value::Number(count)], &MetaMap::new())
                    .is_err()
            );
        }
    }

    #[test]
    fn staggered_numeric_alternates_rows() {
        let us = Value::List(vec![Value::Number(0.0), Value::Number(0.5), Value::Number(1.0)]);
        let vs = Value::List(vec![
            Value::Number(0.0),
            Value::Number(1.0 / 3.0),
            Value::Number(2.0 / 3.0),
            Value::Number(1.0),
        ]);
        let outputs = ComponentKind::StaggeredQuadNumeric
            .evaluate(&[square(6.0), us, vs], &MetaMap::new())
            .expect("staggered");
        assert_eq!(list_len(outputs.get(PIN_OUTPUT_SURFACES)), 7);
    }

    #[test]
    fn numeric_breakpoints_need_two_values() {
        let us = Value::List(vec![Value::Number(0.5)]);
        let vs = Value::List(vec![Value::Number(0.0), Value::Number(1.0)]);
        assert!(
            ComponentKind::StaggeredQuadNumeric
                .evaluate(&[square(1.0), us, vs], &MetaMap::new())
                .is_err()
        );
    }

    #[test]
    fn divide_surface_numeric_groups_by_u() {
        let us = Value::List(vec![Value::Number(0.0), Value::Number(1.0)]);
        let vs = Value::List(vec![
            Value::Number(0.0),
            Value::Number(0.5),
            Value::Number(1.0),
        ]);
        let outputs = ComponentKind::DivideSurfaceNumeric
            .evaluate(&[square(2.0), us, vs], &MetaMap::new())
            .expect("division");
        let points = outputs
            .get(PIN_OUTPUT_POINTS)
            .and_then(|value| value.expect_list().ok())
            .expect("points");
        assert_eq!(points.len(), 2);
        let second = points[1].expect_list().expect("row");
        let point = second[1].expect_point().expect("point");
        assert!((point[0] - 2.0).abs() < 1e-9 && (point[1] - 1.0).abs() < 1e-9);
        let normals = outputs
            .get(PIN_OUTPUT_NORMALS)
            .and_then(|value| value.expect_list().ok())
            .expect("normals");
        assert_eq!(normals[0].expect_list().expect("row").len(), 3);
    }

    #[test]
    fn missing_surface_is_an_error() {
        let err = ComponentKind::QuadSubdivide
            .evaluate(&[], &MetaMap::new())
            .unwrap_err();
        assert_eq!(err.message(), "Quad Subdivide vereist een surface");
    }
}
