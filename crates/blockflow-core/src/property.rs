//! Block property values and the per-block property table.
//!
//! Properties are keyed by name. Each name has an optional block-wide value
//! (what a [`Port::ANY`] query returns) and optional per-port overrides.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::port::Port;

/// A property value reported by a block.
///
/// `Null` is the conventional "this block does not constrain the property"
/// value used by negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Null
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Text(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PortValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block_wide: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    per_port: BTreeMap<u16, PropertyValue>,
}

/// Named properties of one block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyTable {
    entries: IndexMap<String, PortValues>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` on `port`, or block-wide when `port` is [`Port::ANY`].
    pub fn set(&mut self, name: &str, port: Port, value: PropertyValue) {
        let entry = self.entries.entry(name.to_string()).or_default();
        if port.is_any() {
            entry.block_wide = Some(value);
        } else {
            entry.per_port.insert(port.0, value);
        }
    }

    /// Looks up `name` on `port`.
    ///
    /// A concrete port falls back to the block-wide value when it has no
    /// override. [`Port::ANY`] only sees the block-wide value.
    pub fn get(&self, name: &str, port: Port) -> Option<&PropertyValue> {
        let entry = self.entries.get(name)?;
        match port.index() {
            Some(_) => entry
                .per_port
                .get(&port.0)
                .or(entry.block_wide.as_ref()),
            None => entry.block_wide.as_ref(),
        }
    }
}
