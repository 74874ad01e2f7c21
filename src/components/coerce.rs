//! Hulpfuncties voor het converteren van `Value`-types.
//!
//! `Value::Null` en ontbrekende invoer gelden overal als "niet opgegeven" en
//! vallen terug op de standaardwaarde van de aanroeper.

use crate::geom::{FourPointSurface, Plane, Point3, Vec3};
use crate::graph::value::{Domain1D, Value};

use super::ComponentError;

pub fn coerce_number(value: &Value) -> Result<f64, ComponentError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse().map_err(|_| {
            ComponentError::new(format!("Kon tekst '{s}' niet naar een getal converteren"))
        }),
        Value::List(l) if l.len() == 1 => coerce_number(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een getal, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_integer(value: &Value) -> Result<i64, ComponentError> {
    match value {
        #[allow(clippy::cast_possible_truncation)]
        Value::Number(n) if n.is_finite() => Ok(n.round() as i64),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::Text(_) => {
            let number = coerce_number(value)?;
            coerce_integer(&Value::Number(number))
        }
        Value::List(l) if l.len() == 1 => coerce_integer(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een geheel getal, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_boolean(value: &Value) -> Result<bool, ComponentError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => Ok(n.abs() > 1e-9),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(ComponentError::new(format!(
                "Kon tekst '{s}' niet naar een booleaanse waarde converteren"
            ))),
        },
        Value::List(l) if l.len() == 1 => coerce_boolean(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een booleaanse waarde, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_point(value: &Value) -> Result<Point3, ComponentError> {
    match value {
        Value::Point(p) => Ok(Point3::from_array(*p)),
        Value::List(l) if l.len() == 1 => coerce_point(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een punt, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_vector(value: &Value) -> Result<Vec3, ComponentError> {
    match value {
        Value::Vector(v) | Value::Point(v) => Ok(Vec3::from_array(*v)),
        Value::CurveLine { p1, p2 } => {
            Ok(Point3::from_array(*p2).sub_point(Point3::from_array(*p1)))
        }
        Value::List(l) if l.len() == 1 => coerce_vector(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een vector, kreeg {}",
            other.kind()
        ))),
    }
}

/// Leest een optionele invoer; `Null` telt als ontbrekend.
#[must_use]
pub fn provided(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

pub fn coerce_number_or(value: Option<&Value>, default: f64) -> Result<f64, ComponentError> {
    provided(value).map_or(Ok(default), coerce_number)
}

pub fn coerce_boolean_or(value: Option<&Value>, default: bool) -> Result<bool, ComponentError> {
    provided(value).map_or(Ok(default), coerce_boolean)
}

pub fn coerce_vector_or(value: Option<&Value>, default: Vec3) -> Result<Vec3, ComponentError> {
    provided(value).map_or(Ok(default), coerce_vector)
}

/// Leest een aantal (bijv. een verdelingsaantal). Negatieve waarden zijn een fout;
/// nul wordt doorgegeven zodat de geometrielaag het met een eigen fout kan weigeren.
pub fn coerce_count_or(
    value: Option<&Value>,
    default: usize,
    context: &str,
) -> Result<usize, ComponentError> {
    let Some(value) = provided(value) else {
        return Ok(default);
    };
    let integer = coerce_integer(value)?;
    usize::try_from(integer).map_err(|_| {
        ComponentError::new(format!(
            "{context} moet een niet-negatief geheel getal zijn, kreeg {integer}"
        ))
    })
}

/// Vlakt een (geneste) lijst getallen af. Een domein levert zijn twee grenzen.
pub fn coerce_number_list(value: Option<&Value>) -> Result<Vec<f64>, ComponentError> {
    let mut numbers = Vec::new();
    if let Some(value) = provided(value) {
        collect_numbers(value, &mut numbers)?;
    }
    Ok(numbers)
}

fn collect_numbers(value: &Value, numbers: &mut Vec<f64>) -> Result<(), ComponentError> {
    match value {
        Value::Null => {}
        Value::List(values) => {
            for entry in values {
                collect_numbers(entry, numbers)?;
            }
        }
        Value::Domain(domain) => {
            numbers.push(domain.start);
            numbers.push(domain.end);
        }
        other => numbers.push(coerce_number(other)?),
    }
    Ok(())
}

/// Vlakt een (geneste) lijst punten af.
pub fn coerce_point_list(value: Option<&Value>) -> Result<Vec<Point3>, ComponentError> {
    let mut points = Vec::new();
    if let Some(value) = provided(value) {
        collect_points(value, &mut points)?;
    }
    Ok(points)
}

fn collect_points(value: &Value, points: &mut Vec<Point3>) -> Result<(), ComponentError> {
    match value {
        Value::Null => {}
        Value::Point(p) => points.push(Point3::from_array(*p)),
        Value::List(values) => {
            for entry in values {
                collect_points(entry, points)?;
            }
        }
        other => {
            return Err(ComponentError::new(format!(
                "Verwachtte een lijst met punten, kreeg {}",
                other.kind()
            )));
        }
    }
    Ok(())
}

/// Zet een curve-achtige invoer om naar de hoekpunten van een polyline.
///
/// Losse lijnen in een lijst worden aan elkaar geregen; een beginpunt dat
/// samenvalt met het vorige eindpunt wordt niet dubbel opgenomen.
pub fn coerce_polyline(value: &Value) -> Result<Vec<Point3>, ComponentError> {
    let mut vertices: Vec<Point3> = Vec::new();
    collect_polyline(value, &mut vertices)?;
    Ok(vertices)
}

fn push_distinct(point: Point3, vertices: &mut Vec<Point3>) {
    if vertices.last() != Some(&point) {
        vertices.push(point);
    }
}

fn collect_polyline(value: &Value, vertices: &mut Vec<Point3>) -> Result<(), ComponentError> {
    match value {
        Value::Null => {}
        Value::Point(p) => push_distinct(Point3::from_array(*p), vertices),
        Value::CurveLine { p1, p2 } => {
            push_distinct(Point3::from_array(*p1), vertices);
            push_distinct(Point3::from_array(*p2), vertices);
        }
        Value::Surface { vertices: points, .. } => {
            for p in points {
                push_distinct(Point3::from_array(*p), vertices);
            }
        }
        Value::List(values) => {
            for entry in values {
                collect_polyline(entry, vertices)?;
            }
        }
        other => {
            return Err(ComponentError::new(format!(
                "Verwachtte een curve-achtige invoer, kreeg {}",
                other.kind()
            )));
        }
    }
    Ok(())
}

/// Leest een vlak of paneel als bilineair oppervlak.
///
/// De hoekpunten volgen de volgorde van het eerste vlak (of de vertexvolgorde
/// als er geen vlakken zijn): `(0,0), (1,0), (1,1), (0,1)`. Een driehoek
/// krijgt als vierde hoek zijn eerste punt terug.
pub fn coerce_four_point_surface(value: &Value) -> Result<FourPointSurface, ComponentError> {
    match value {
        Value::Surface { vertices, faces } => {
            let order: Vec<usize> = match faces.first() {
                Some(face) if face.len() >= 3 => face.iter().map(|&i| i as usize).collect(),
                _ => (0..vertices.len()).collect(),
            };
            let corner = |slot: usize| -> Result<Point3, ComponentError> {
                order
                    .get(slot)
                    .and_then(|&index| vertices.get(index))
                    .map(|p| Point3::from_array(*p))
                    .ok_or_else(|| {
                        ComponentError::new("Surface-hoekpunt verwijst naar een onbekende vertex")
                    })
            };
            match order.len() {
                0..=2 => Err(ComponentError::new(format!(
                    "Surface vereist minstens 3 hoekpunten, kreeg {}",
                    order.len()
                ))),
                3 => Ok(FourPointSurface::new([
                    corner(0)?,
                    corner(1)?,
                    corner(2)?,
                    corner(0)?,
                ])),
                _ => Ok(FourPointSurface::new([
                    corner(0)?,
                    corner(1)?,
                    corner(2)?,
                    corner(3)?,
                ])),
            }
        }
        Value::List(l) if l.len() == 1 => coerce_four_point_surface(&l[0]),
        Value::List(l) if l.len() == 4 => {
            let corners = [
                coerce_point(&l[0])?,
                coerce_point(&l[1])?,
                coerce_point(&l[2])?,
                coerce_point(&l[3])?,
            ];
            Ok(FourPointSurface::new(corners))
        }
        other => Err(ComponentError::new(format!(
            "Verwachtte een surface, kreeg {}",
            other.kind()
        ))),
    }
}

/// Leest een vlak: drie punten (oorsprong, X-richting, XY-richting), een
/// surface (eerste drie hoekpunten) of een punt als oorsprong van een
/// wereld-XY-vlak. Zonder invoer wordt wereld-XY gebruikt.
pub fn coerce_plane_or_world_xy(value: Option<&Value>) -> Result<Plane, ComponentError> {
    let Some(value) = provided(value) else {
        return Ok(Plane::world_xy());
    };
    match value {
        Value::Point(p) => Ok(Plane::from_axes(Point3::from_array(*p), Vec3::X, Vec3::Y)),
        Value::Surface { vertices, .. } if vertices.len() >= 3 => {
            let origin = Point3::from_array(vertices[0]);
            let x_point = Point3::from_array(vertices[1]);
            let xy_point = Point3::from_array(vertices[vertices.len() - 1]);
            Ok(Plane::from_points(origin, x_point, xy_point))
        }
        Value::List(l) if l.len() >= 3 => Ok(Plane::from_points(
            coerce_point(&l[0])?,
            coerce_point(&l[1])?,
            coerce_point(&l[2])?,
        )),
        Value::List(l) if l.len() == 1 => coerce_plane_or_world_xy(l.first()),
        other => Err(ComponentError::new(format!(
            "Verwachtte een vlak, kreeg {}",
            other.kind()
        ))),
    }
}

/// Leest een 1D-domein. Een los getal `n` wordt `0 .. n`.
pub fn coerce_domain_or(
    value: Option<&Value>,
    default: Domain1D,
) -> Result<Domain1D, ComponentError> {
    let Some(value) = provided(value) else {
        return Ok(default);
    };
    match value {
        Value::Domain(domain) => Ok(*domain),
        Value::Number(n) => Ok(Domain1D::new(0.0, *n)),
        Value::List(l) if l.len() == 2 => {
            Ok(Domain1D::new(coerce_number(&l[0])?, coerce_number(&l[1])?))
        }
        Value::List(l) if l.len() == 1 => coerce_domain_or(l.first(), default),
        other => Err(ComponentError::new(format!(
            "Verwachtte een domein, kreeg {}",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_falls_back_to_defaults() {
        assert_eq!(coerce_count_or(Some(&Value::Null), 10, "U").unwrap(), 10);
        assert_eq!(coerce_count_or(None, 4, "U").unwrap(), 4);
        assert!(coerce_number_list(Some(&Value::Null)).unwrap().is_empty());
        assert_eq!(
            coerce_plane_or_world_xy(Some(&Value::Null)).unwrap(),
            Plane::world_xy()
        );
    }

    #[test]
    fn negative_counts_are_rejected() {
        let err = coerce_count_or(Some(&Value::Number(-2.0)), 10, "Diamond Subdivide U")
            .unwrap_err();
        assert!(err.message().contains("Diamond Subdivide U"));
    }

    #[test]
    fn nested_number_lists_are_flattened() {
        let value = Value::List(vec![
            Value::Number(0.0),
            Value::List(vec![Value::Number(0.5), Value::Text("1".into())]),
        ]);
        assert_eq!(coerce_number_list(Some(&value)).unwrap(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn polyline_chains_touching_lines() {
        let value = Value::List(vec![
            Value::CurveLine {
                p1: [0.0, 0.0, 0.0],
                p2: [1.0, 0.0, 0.0],
            },
            Value::CurveLine {
                p1: [1.0, 0.0, 0.0],
                p2: [1.0, 1.0, 0.0],
            },
        ]);
        let vertices = coerce_polyline(&value).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn surface_corners_follow_face_order() {
        let value = Value::Surface {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            faces: vec![vec![0, 2, 3, 1]],
        };
        let surface = coerce_four_point_surface(&value).unwrap();
        assert_eq!(surface.corners()[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(surface.corners()[3], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn triangle_surface_repeats_first_corner() {
        let value = Value::Surface {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
        };
        let corners = coerce_four_point_surface(&value).unwrap().corners();
        assert_eq!(corners[0], corners[3]);
    }

    #[test]
    fn surface_needs_three_corners() {
        let value = Value::Surface {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            faces: Vec::new(),
        };
        assert!(coerce_four_point_surface(&value).is_err());
    }

    #[test]
    fn domains_from_numbers_and_pairs() {
        let default = Domain1D::new(0.0, 10.0);
        assert_eq!(coerce_domain_or(None, default).unwrap(), default);
        assert_eq!(
            coerce_domain_or(Some(&Value::Number(4.0)), default).unwrap(),
            Domain1D::new(0.0, 4.0)
        );
        let pair = Value::List(vec![Value::Number(2.0), Value::Number(8.0)]);
        assert_eq!(
            coerce_domain_or(Some(&pair), default).unwrap(),
            Domain1D::new(2.0, 8.0)
        );
    }
}
