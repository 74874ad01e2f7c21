//! Waarden die tussen de host en de panelisatiecomponenten worden
//! uitgewisseld.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Beschikbare waardetypes aan de rand van de engine.
///
/// Wordt via serde uitgewisseld als `{ "type": ..., "value": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Ontbrekende of lege invoer.
    Null,
    Number(f64),
    Boolean(bool),
    Text(String),
    /// Een 3D-punt.
    Point([f64; 3]),
    /// Een 3D-vector.
    Vector([f64; 3]),
    /// Een lijnsegment tussen twee punten.
    CurveLine { p1: [f64; 3], p2: [f64; 3] },
    /// Een vlak of paneel als mesh. Een paneel heeft één vlak met drie of
    /// vier hoekpunten.
    Surface {
        vertices: Vec<[f64; 3]>,
        faces: Vec<Vec<u32>>,
    },
    /// Een numeriek 1D-domein.
    Domain(Domain1D),
    List(Vec<Value>),
}

impl Value {
    /// Geeft de variantnaam terug. Wordt gebruikt in foutmeldingen.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Text(_) => ValueKind::Text,
            Self::Point(_) => ValueKind::Point,
            Self::Vector(_) => ValueKind::Vector,
            Self::CurveLine { .. } => ValueKind::CurveLine,
            Self::Surface { .. } => ValueKind::Surface,
            Self::Domain(_) => ValueKind::Domain,
            Self::List(_) => ValueKind::List,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn expect_number(&self) -> Result<f64, ValueError> {
        match self {
            Self::Number(value) => Ok(*value),
            _ => Err(ValueError::type_mismatch("Number", self.kind())),
        }
    }

    pub fn expect_boolean(&self) -> Result<bool, ValueError> {
        match self {
            Self::Boolean(value) => Ok(*value),
            _ => Err(ValueError::type_mismatch("Boolean", self.kind())),
        }
    }

    pub fn expect_text(&self) -> Result<&str, ValueError> {
        match self {
            Self::Text(text) => Ok(text),
            _ => Err(ValueError::type_mismatch("Text", self.kind())),
        }
    }

    pub fn expect_point(&self) -> Result<[f64; 3], ValueError> {
        match self {
            Self::Point(point) => Ok(*point),
            _ => Err(ValueError::type_mismatch("Point", self.kind())),
        }
    }

    pub fn expect_vector(&self) -> Result<[f64; 3], ValueError> {
        match self {
            Self::Vector(vector) => Ok(*vector),
            _ => Err(ValueError::type_mismatch("Vector", self.kind())),
        }
    }

    /// Verwacht een `CurveLine` en retourneert de eindpunten.
    pub fn expect_curve_line(&self) -> Result<([f64; 3], [f64; 3]), ValueError> {
        match self {
            Self::CurveLine { p1, p2 } => Ok((*p1, *p2)),
            _ => Err(ValueError::type_mismatch("CurveLine", self.kind())),
        }
    }

    /// Verwacht een `Surface` en retourneert hoekpunten en vlakken.
    pub fn expect_surface(&self) -> Result<(&[[f64; 3]], &[Vec<u32>]), ValueError> {
        match self {
            Self::Surface { vertices, faces } => Ok((vertices, faces)),
            _ => Err(ValueError::type_mismatch("Surface", self.kind())),
        }
    }

    pub fn expect_domain(&self) -> Result<Domain1D, ValueError> {
        match self {
            Self::Domain(domain) => Ok(*domain),
            _ => Err(ValueError::type_mismatch("Domain", self.kind())),
        }
    }

    pub fn expect_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Self::List(values) => Ok(values),
            _ => Err(ValueError::type_mismatch("List", self.kind())),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

/// Typefout voor wanneer een `Value` naar het verkeerde type wordt
/// geconverteerd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    expected: &'static str,
    found: ValueKind,
}

impl ValueError {
    #[must_use]
    pub fn type_mismatch(expected: &'static str, found: ValueKind) -> Self {
        Self { expected, found }
    }

    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    #[must_use]
    pub fn found(&self) -> ValueKind {
        self.found
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verwachtte type `{}` maar kreeg `{}`",
            self.expected, self.found
        )
    }
}

impl std::error::Error for ValueError {}

/// Beschrijft het soort `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Number,
    Boolean,
    Text,
    Point,
    Vector,
    CurveLine,
    Surface,
    Domain,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "Null",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Text => "Text",
            Self::Point => "Point",
            Self::Vector => "Vector",
            Self::CurveLine => "CurveLine",
            Self::Surface => "Surface",
            Self::Domain => "Domain",
            Self::List => "List",
        };
        f.write_str(name)
    }
}

/// Een één-dimensionaal numeriek domein. De richting blijft behouden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain1D {
    pub start: f64,
    pub end: f64,
}

impl Domain1D {
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.start.min(self.end)
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.start.max(self.end)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::{Domain1D, Value, ValueKind};

    #[test]
    fn mismatch_reports_expected_and_found() {
        let err = Value::Text("S".to_owned()).expect_point().unwrap_err();
        assert_eq!(err.expected(), "Point");
        assert_eq!(err.found(), ValueKind::Text);
        assert_eq!(err.to_string(), "verwachtte type `Point` maar kreeg `Text`");
    }

    #[test]
    fn surface_panel_exposes_single_face() {
        let panel = Value::Surface {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
        };
        let (vertices, faces) = panel.expect_surface().unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(faces, &[vec![0, 1, 2]]);
        assert_eq!(panel.kind(), ValueKind::Surface);
    }

    #[test]
    fn domain_bounds_follow_direction() {
        let domain = Value::Domain(Domain1D::new(5.0, 2.0)).expect_domain().unwrap();
        assert_eq!(domain.min(), 2.0);
        assert_eq!(domain.max(), 5.0);
        assert_eq!(domain.length(), -3.0);
    }

    #[test]
    fn null_is_its_own_kind() {
        assert!(Value::Null.is_null());
        assert!(Value::Null.expect_list().is_err());
        assert_eq!(Value::from(vec![Value::from(1.0)]).expect_list().unwrap().len(), 1);
    }
}
