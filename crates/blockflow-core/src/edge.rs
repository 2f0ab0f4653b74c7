//! Edge types.
//!
//! A [`Connection`] is the weight stored on a graph edge: the edge always runs
//! from the producing block (source port = one of its outputs) to the
//! consuming block (destination port = one of its inputs).
//!
//! A [`Link`] is the per-block view of a connection used by traversal: the
//! port on the block being expanded, the port on the far side, and a weak
//! handle to the far block.

use serde::{Deserialize, Serialize};

use crate::id::BlockRef;
use crate::port::Port;

/// Weight of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Output port of the upstream block.
    pub src_port: Port,
    /// Input port of the downstream block.
    pub dst_port: Port,
    /// Generation of the upstream block when the connection was made.
    pub src_generation: u32,
    /// Generation of the downstream block when the connection was made.
    pub dst_generation: u32,
}

/// One neighbor of a block, seen from that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Port on the block whose links these are: an output port for downstream
    /// links, an input port for upstream links.
    pub local_port: Port,
    /// Port on the neighbor through which it is entered.
    pub remote_port: Port,
    /// Non-owning handle to the neighbor.
    pub target: BlockRef,
}
