//! Errors from the uniqueness-checking search helpers.

use blockflow_core::{BlockId, Capability, Direction};
use serde::{Deserialize, Serialize};

/// A search that had to produce exactly one block did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum SearchError {
    /// The start block is not live.
    #[error("start block {start} is not live")]
    StartNotLive {
        start: BlockId,
    },

    /// No block with the capability is reachable.
    #[error("no {capability} block {direction} of '{start}'")]
    NotFound {
        start: String,
        direction: Direction,
        capability: Capability,
    },

    /// More than one block with the capability is reachable.
    #[error("{count} {capability} blocks {direction} of '{start}': {candidates:?}", count = candidates.len())]
    Ambiguous {
        start: String,
        direction: Direction,
        capability: Capability,
        /// Unique ids of every match, in discovery order.
        candidates: Vec<String>,
    },
}
