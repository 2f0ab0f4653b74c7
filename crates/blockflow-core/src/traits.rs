//! The [`NodeGraph`] trait: the read-only surface the search engine walks.
//!
//! [`BlockGraph`](crate::graph::BlockGraph) is the in-tree implementation.
//! Device sessions that keep their own block registry can implement the trait
//! directly and reuse the engine unchanged.

use crate::edge::Link;
use crate::id::{BlockId, BlockRef};
use crate::node::BlockNode;
use crate::port::Direction;

/// Read-only access to a block graph.
///
/// Implementations must never hand out a block through [`resolve`] once it
/// has been torn down; that is what keeps traversal from treating a dead
/// block as live.
///
/// [`resolve`]: NodeGraph::resolve
pub trait NodeGraph {
    /// Returns the live block at `id`.
    fn block(&self, id: BlockId) -> Option<&BlockNode>;

    /// Resolves a weak neighbor handle. `None` means the handle expired.
    fn resolve(&self, target: BlockRef) -> Option<&BlockNode>;

    /// Links leaving `id` through its output ports, ordered by local port.
    fn downstream_links(&self, id: BlockId) -> Vec<Link>;

    /// Links leaving `id` through its input ports, ordered by local port.
    fn upstream_links(&self, id: BlockId) -> Vec<Link>;

    /// Links in the given traversal direction.
    fn links(&self, id: BlockId, direction: Direction) -> Vec<Link> {
        match direction {
            Direction::Downstream => self.downstream_links(id),
            Direction::Upstream => self.upstream_links(id),
        }
    }
}
