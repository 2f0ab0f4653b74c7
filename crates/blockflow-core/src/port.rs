//! Port numbers and traversal direction.
//!
//! A [`Port`] is a plain port number on one side of a block. The reserved
//! value [`Port::ANY`] means "no port restriction" wherever a port selects
//! edges (search frontiers, property queries).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A port number on one side of a block, or [`Port::ANY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Port(pub u16);

impl Port {
    /// Sentinel: matches every port.
    pub const ANY: Port = Port(u16::MAX);

    /// Returns `true` if this is the [`Port::ANY`] sentinel.
    pub fn is_any(self) -> bool {
        self == Port::ANY
    }

    /// Returns `true` if `self` selects `other`: either `self` is
    /// [`Port::ANY`] or the two are the same port.
    pub fn admits(self, other: Port) -> bool {
        self.is_any() || self == other
    }

    /// Index form for per-port tables. `None` for [`Port::ANY`].
    pub fn index(self) -> Option<usize> {
        if self.is_any() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

impl Default for Port {
    fn default() -> Self {
        Port::ANY
    }
}

impl From<u16> for Port {
    fn from(port: u16) -> Self {
        Port(port)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            write!(f, "ANY")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Traversal direction.
///
/// Upstream walks toward the signal source (through input ports), downstream
/// walks toward the sink (through output ports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upstream,
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upstream => write!(f, "upstream"),
            Direction::Downstream => write!(f, "downstream"),
        }
    }
}
