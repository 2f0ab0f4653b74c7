//! The block (graph vertex) model.
//!
//! A [`BlockNode`] is the control-plane view of one signal-processing block:
//! its identity, port counts, the capabilities it implements, per-port
//! streaming activity, how its input ports correlate to its output ports, and
//! its property table. Blocks hold no neighbor links themselves; connectivity
//! lives in [`BlockGraph`](crate::graph::BlockGraph) so that no block can own
//! another.

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilitySet};
use crate::error::CoreError;
use crate::port::{Direction, Port};
use crate::property::{PropertyTable, PropertyValue};

/// A block in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    /// Stable unique identity (e.g. "0/Radio#0").
    unique_id: String,
    num_inputs: u16,
    num_outputs: u16,
    capabilities: CapabilitySet,
    /// Streamer activity on input ports (active-rx, upstream direction).
    active_rx: Vec<bool>,
    /// Streamer activity on output ports (active-tx, downstream direction).
    active_tx: Vec<bool>,
    /// `routing[i]` is the output port that input port `i` feeds. `None`
    /// means the identity correlation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    routing: Option<Vec<u16>>,
    properties: PropertyTable,
}

impl BlockNode {
    /// Creates a block with no capabilities, no properties, every port
    /// inactive, and identity port routing.
    pub fn new(unique_id: impl Into<String>, num_inputs: u16, num_outputs: u16) -> Self {
        BlockNode {
            unique_id: unique_id.into(),
            num_inputs,
            num_outputs,
            capabilities: CapabilitySet::new(),
            active_rx: vec![false; num_inputs as usize],
            active_tx: vec![false; num_outputs as usize],
            routing: None,
            properties: PropertyTable::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Sets a property at construction time; see [`PropertyTable::set`].
    pub fn with_property(
        mut self,
        name: &str,
        port: Port,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.set(name, port, value.into());
        self
    }

    /// Replaces the identity input→output correlation.
    ///
    /// Entries that name a nonexistent output port make that input port
    /// unmappable (the correlation reports [`Port::ANY`] for it).
    pub fn with_routing(mut self, routing: Vec<u16>) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Marks every port on one side active.
    pub fn all_active(mut self, direction: Direction) -> Self {
        match direction {
            Direction::Upstream => self.active_rx.iter_mut().for_each(|a| *a = true),
            Direction::Downstream => self.active_tx.iter_mut().for_each(|a| *a = true),
        }
        self
    }

    // -----------------------------------------------------------------------
    // Identity and shape
    // -----------------------------------------------------------------------

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn num_inputs(&self) -> u16 {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> u16 {
        self.num_outputs
    }

    /// Number of ports on the side a traversal in `direction` leaves through:
    /// inputs for upstream, outputs for downstream.
    pub fn port_count(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Upstream => self.num_inputs,
            Direction::Downstream => self.num_outputs,
        }
    }

    /// Checks that `port` exists on the `direction` side.
    pub fn check_port(&self, direction: Direction, port: Port) -> Result<(), CoreError> {
        let count = self.port_count(direction);
        if port.is_any() || port.0 >= count {
            return Err(CoreError::PortOutOfRange {
                unique_id: self.unique_id.clone(),
                direction,
                port,
                count,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn provides(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Safe capability query: `Some(self)` if the block implements
    /// `capability`, `None` otherwise.
    pub fn as_capability(&self, capability: &Capability) -> Option<&BlockNode> {
        self.provides(capability).then_some(self)
    }

    // -----------------------------------------------------------------------
    // Port activity
    // -----------------------------------------------------------------------

    /// Whether a streamer is active on `port` for traversal in `direction`.
    ///
    /// Upstream consults the active-rx flags of the input ports, downstream
    /// the active-tx flags of the output ports. [`Port::ANY`] asks whether
    /// any port on that side is active. Out-of-range ports are inactive.
    pub fn is_port_active(&self, port: Port, direction: Direction) -> bool {
        let flags = match direction {
            Direction::Upstream => &self.active_rx,
            Direction::Downstream => &self.active_tx,
        };
        match port.index() {
            Some(i) => flags.get(i).copied().unwrap_or(false),
            None => flags.iter().any(|a| *a),
        }
    }

    pub fn set_port_active(
        &mut self,
        direction: Direction,
        port: Port,
        active: bool,
    ) -> Result<(), CoreError> {
        self.check_port(direction, port)?;
        let flags = match direction {
            Direction::Upstream => &mut self.active_rx,
            Direction::Downstream => &mut self.active_tx,
        };
        match flags.get_mut(port.0 as usize) {
            Some(flag) => {
                *flag = active;
                Ok(())
            }
            None => Err(CoreError::PortOutOfRange {
                unique_id: self.unique_id.clone(),
                direction,
                port,
                count: flags.len() as u16,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Port correlation
    // -----------------------------------------------------------------------

    /// Output port fed by `input_port`, or [`Port::ANY`] if there is none.
    pub fn downstream_port(&self, input_port: Port) -> Port {
        let Some(i) = input_port.index() else {
            return Port::ANY;
        };
        if input_port.0 >= self.num_inputs {
            return Port::ANY;
        }
        let output = match &self.routing {
            Some(routing) => match routing.get(i) {
                Some(&out) => out,
                None => return Port::ANY,
            },
            None => input_port.0,
        };
        if output < self.num_outputs {
            Port(output)
        } else {
            Port::ANY
        }
    }

    /// Input port feeding `output_port`, or [`Port::ANY`] if there is none.
    pub fn upstream_port(&self, output_port: Port) -> Port {
        if output_port.is_any() || output_port.0 >= self.num_outputs {
            return Port::ANY;
        }
        let input = match &self.routing {
            Some(routing) => match routing.iter().position(|&out| out == output_port.0) {
                Some(i) => i as u16,
                None => return Port::ANY,
            },
            None => output_port.0,
        };
        if input < self.num_inputs {
            Port(input)
        } else {
            Port::ANY
        }
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Reads a property; see [`PropertyTable::get`].
    pub fn get_property(&self, name: &str, port: Port) -> Option<&PropertyValue> {
        self.properties.get(name, port)
    }

    pub fn set_property(&mut self, name: &str, port: Port, value: PropertyValue) {
        self.properties.set(name, port, value);
    }
}
