//! Capability tags and per-block capability sets.
//!
//! A block declares the roles it implements as [`Capability`] tags. The search
//! engine treats a capability both as its result filter and as the boundary
//! where traversal stops.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A role a block can implement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Produces samples into the chain (radio RX, file source, host TX streamer).
    Source,
    /// Consumes samples from the chain (radio TX, host RX streamer).
    Sink,
    /// Owns or depends on a tick (clock) rate.
    TickRate,
    /// Has input/output sample rates that downstream blocks depend on.
    SampleRate,
    /// Applies a scalar scaling factor to the samples passing through.
    ScaleFactor,
    /// Terminates a chain on the host side (streamer endpoint).
    Terminator,
    /// Integrator-defined capability.
    Custom(String),
}

impl Capability {
    /// Convenience constructor for [`Capability::Custom`].
    pub fn custom(name: impl Into<String>) -> Self {
        Capability::Custom(name.into())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Source => write!(f, "source"),
            Capability::Sink => write!(f, "sink"),
            Capability::TickRate => write!(f, "tick_rate"),
            Capability::SampleRate => write!(f, "sample_rate"),
            Capability::ScaleFactor => write!(f, "scale_factor"),
            Capability::Terminator => write!(f, "terminator"),
            Capability::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// The set of capabilities a block provides. Blocks rarely implement more
/// than a handful, so the set lives inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    tags: SmallVec<[Capability; 4]>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a capability. Returns `false` if it was already present.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.contains(&capability) {
            return false;
        }
        self.tags.push(capability);
        true
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.tags.iter().any(|c| c == capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}
