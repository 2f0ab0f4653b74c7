//! Core error types for blockflow-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of building and editing a block graph. Traversal itself never
//! fails with these; they only surface from session-side mutations.

use crate::id::{BlockId, EdgeId};
use crate::port::{Direction, Port};
use thiserror::Error;

/// Core errors produced by the blockflow-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A block index was not found in the graph.
    #[error("block not found: BlockId({id})", id = id.0)]
    BlockNotFound { id: BlockId },

    /// The block exists but has been torn down.
    #[error("block retired: '{unique_id}'")]
    BlockRetired { unique_id: String },

    /// Attempting to add a block whose unique id is already taken.
    #[error("duplicate block id: '{unique_id}'")]
    DuplicateBlockId { unique_id: String },

    /// A port number exceeds the block's declared port count.
    #[error("port {port} out of range for {direction} side of '{unique_id}' ({count} ports)")]
    PortOutOfRange {
        unique_id: String,
        direction: Direction,
        port: Port,
        count: u16,
    },

    /// An edge index was not found in the graph.
    #[error("edge not found: EdgeId({id})", id = id.0)]
    EdgeNotFound { id: EdgeId },
}
