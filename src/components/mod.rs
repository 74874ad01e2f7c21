//! Component registry en evaluatie-logica.

use std::collections::HashMap;
use std::fmt;

use crate::geom::{CurveDivisionError, PanelError};
use crate::graph::meta::MetaMap;
use crate::graph::value::{Value, ValueError};

pub mod coerce;
pub mod curve_util;
pub mod maths_random;
pub mod panelize;
pub mod surface_util;

/// Output-map van een component: pinnickname → waarde.
pub type OutputMap = std::collections::BTreeMap<String, Value>;

/// Fouttype voor component-evaluaties.
#[derive(Debug, Clone)]
pub enum ComponentError {
    /// Een generieke fout met een bericht.
    Message(String),
}

impl ComponentError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Message(s) => s,
        }
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(s) => f.write_str(s),
        }
    }
}

impl std::error::Error for ComponentError {}

impl From<PanelError> for ComponentError {
    fn from(error: PanelError) -> Self {
        Self::Message(error.to_string())
    }
}

impl From<CurveDivisionError> for ComponentError {
    fn from(error: CurveDivisionError) -> Self {
        Self::Message(error.to_string())
    }
}

impl From<ValueError> for ComponentError {
    fn from(error: ValueError) -> Self {
        Self::Message(error.to_string())
    }
}

/// Resultaat van een component-executie.
pub type ComponentResult = Result<OutputMap, ComponentError>;

/// Trait die alle componentimplementaties dienen te implementeren.
pub trait Component {
    fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult;
}

/// Beschikbare componenttypen binnen de registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Panelize(panelize::ComponentKind),
    SurfaceUtil(surface_util::ComponentKind),
    CurveUtil(curve_util::ComponentKind),
    MathsRandom(maths_random::ComponentKind),
}

impl ComponentKind {
    pub fn evaluate(&self, inputs: &[Value], meta: &MetaMap) -> ComponentResult {
        match self {
            Self::Panelize(component) => component.evaluate(inputs, meta),
            Self::SurfaceUtil(component) => component.evaluate(inputs, meta),
            Self::CurveUtil(component) => component.evaluate(inputs, meta),
            Self::MathsRandom(component) => component.evaluate(inputs, meta),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Panelize(component) => component.name(),
            Self::SurfaceUtil(component) => component.name(),
            Self::CurveUtil(component) => component.name(),
            Self::MathsRandom(component) => component.name(),
        }
    }
}

/// Registry die componentimplementaties opzoekt op GUID of naam.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    by_guid: HashMap<String, ComponentKind>,
    by_name: HashMap<String, ComponentKind>,
    names: Vec<&'static str>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        for registration in panelize::REGISTRATIONS {
            let kind = ComponentKind::Panelize(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        for registration in surface_util::REGISTRATIONS {
            let kind = ComponentKind::SurfaceUtil(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        for registration in curve_util::REGISTRATIONS {
            let kind = ComponentKind::CurveUtil(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        for registration in maths_random::REGISTRATIONS {
            let kind = ComponentKind::MathsRandom(registration.kind);
            for guid in registration.guids {
                registry.register_guid(guid, kind);
            }
            registry.register_names(registration.names, kind);
        }

        registry
    }
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_guid: HashMap::new(),
            by_name: HashMap::new(),
            names: Vec::new(),
        }
    }

    pub fn register_guid(&mut self, guid: impl AsRef<str>, kind: ComponentKind) {
        let key = normalize_guid(guid.as_ref());
        self.by_guid.insert(key, kind);
    }

    pub fn register_names(&mut self, names: &[&str], kind: ComponentKind) {
        for name in names {
            let key = normalize_name(name);
            self.by_name.insert(key, kind);
        }
        if !self.names.contains(&kind.name()) {
            self.names.push(kind.name());
        }
    }

    #[must_use]
    pub fn resolve(
        &self,
        guid: Option<&str>,
        name: Option<&str>,
        nickname: Option<&str>,
    ) -> Option<ComponentKind> {
        if let Some(guid) = guid {
            if let Some(component) = self.by_guid.get(&normalize_guid(guid)) {
                return Some(*component);
            }
        }

        if let Some(name) = name {
            if let Some(component) = self.by_name.get(&normalize_name(name)) {
                return Some(*component);
            }
        }

        if let Some(nickname) = nickname {
            if let Some(component) = self.by_name.get(&normalize_name(nickname)) {
                return Some(*component);
            }
        }

        None
    }

    /// Zoekt een component op één sleutel: eerst als GUID, daarna als naam.
    #[must_use]
    pub fn lookup(&self, id_or_name: &str) -> Option<ComponentKind> {
        self.resolve(Some(id_or_name), Some(id_or_name), None)
    }

    /// Volledige namen van alle geregistreerde componenten, in registratievolgorde.
    #[must_use]
    pub fn component_names(&self) -> &[&'static str] {
        &self.names
    }
}

fn normalize_guid(guid: &str) -> String {
    guid.trim()
        .trim_matches(|c| c == '{' || c == '}')
        .to_lowercase()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
