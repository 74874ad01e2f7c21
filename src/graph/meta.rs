//! Meta-informatie die de host per component meegeeft (bv. hoekeenheden).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Waarde die meta-informatie over een component beschrijft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<MetaValue>),
}

impl MetaValue {
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            Self::Integer(value) => Some(*value != 0),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Self::List(values) if values.len() == 1 => values[0].as_boolean(),
            _ => None,
        }
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Alias voor een verzameling meta-informatie.
pub type MetaMap = BTreeMap<String, MetaValue>;

/// Hulpfuncties voor case-insensitieve meta-opzoekingen.
pub trait MetaLookupExt {
    /// Zoek een meta-item op zonder hoofdlettergevoeligheid.
    fn get_normalized(&self, key: &str) -> Option<&MetaValue>;

    /// Leest een booleaanse vlag; ontbrekende of onleesbare waarden geven `default`.
    fn flag_or(&self, key: &str, default: bool) -> bool {
        self.get_normalized(key)
            .and_then(MetaValue::as_boolean)
            .unwrap_or(default)
    }
}

impl MetaLookupExt for MetaMap {
    fn get_normalized(&self, key: &str) -> Option<&MetaValue> {
        if let Some(value) = self.get(key) {
            return Some(value);
        }

        let lower = key.to_ascii_lowercase();
        self.iter()
            .find(|(candidate, _)| candidate.to_ascii_lowercase() == lower)
            .map(|(_, value)| value)
    }
}
