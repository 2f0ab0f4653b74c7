//! Pass-through port correlation.
//!
//! When the search walks through a block that is not the target capability it
//! tries to keep following a single port. That is only attempted when the
//! block has as many inputs as outputs; anything else widens the search to
//! every port of the block's far side.

use blockflow_core::{BlockNode, Direction, Port};

/// Port through which the search leaves `node` after entering it on
/// `entry_port` while walking in `direction`.
///
/// Walking downstream, `entry_port` is one of the node's inputs and the result
/// one of its outputs; upstream is the mirror image. Returns [`Port::ANY`] when
/// the port counts differ or the node cannot correlate the port.
pub fn exit_port(node: &BlockNode, entry_port: Port, direction: Direction) -> Port {
    if node.num_inputs() != node.num_outputs() {
        return Port::ANY;
    }
    match direction {
        Direction::Downstream => node.downstream_port(entry_port),
        Direction::Upstream => node.upstream_port(entry_port),
    }
}
