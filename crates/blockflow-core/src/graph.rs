//! BlockGraph: the arena that owns every block and every connection.
//!
//! Blocks live in a `StableGraph`, so a [`BlockId`] stays valid while other
//! blocks come and go. Edges hold indices, never ownership, which lets the
//! graph contain feedback loops and self-loops without any lifetime issues.
//!
//! # Liveness
//!
//! Every slot carries a generation (unique across the lifetime of the graph)
//! and a live flag. Neighbor handles ([`BlockRef`]) record the generation they
//! were created with, so:
//! - [`retire_block`](BlockGraph::retire_block) tears a block down but keeps
//!   its slot and links; every handle to it resolves to `None` from then on.
//! - [`remove_block`](BlockGraph::remove_block) drops the slot and its edges.
//!   If petgraph later reuses the index, the new block gets a fresh
//!   generation and stale handles still do not resolve.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::Directed;

use crate::edge::{Connection, Link};
use crate::error::CoreError;
use crate::id::{BlockId, BlockRef, EdgeId};
use crate::node::BlockNode;
use crate::port::{Direction, Port};
use crate::property::PropertyValue;
use crate::traits::NodeGraph;

#[derive(Debug, Clone)]
struct BlockSlot {
    node: BlockNode,
    generation: u32,
    live: bool,
}

/// The block graph container.
///
/// All mutations go through `BlockGraph` methods so that port bounds and
/// unique ids are checked once, at the edit, instead of during traversal.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: StableGraph<BlockSlot, Connection, Directed, u32>,
    /// Unique-id lookup for live blocks.
    by_unique_id: HashMap<String, BlockId>,
    next_generation: u32,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Block methods
    // -----------------------------------------------------------------------

    /// Adds a block and returns its id.
    ///
    /// Errors if a live block already uses the same unique id.
    pub fn add_block(&mut self, node: BlockNode) -> Result<BlockId, CoreError> {
        if self.by_unique_id.contains_key(node.unique_id()) {
            return Err(CoreError::DuplicateBlockId {
                unique_id: node.unique_id().to_string(),
            });
        }
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let unique_id = node.unique_id().to_string();
        let idx = self.blocks.add_node(BlockSlot {
            node,
            generation,
            live: true,
        });
        let id = BlockId::from(idx);
        self.by_unique_id.insert(unique_id, id);
        Ok(id)
    }

    /// Tears a block down without unlinking it.
    ///
    /// The slot and its connections stay in place, but the block no longer
    /// resolves through any handle and is invisible to [`get_block`].
    ///
    /// [`get_block`]: BlockGraph::get_block
    pub fn retire_block(&mut self, id: BlockId) -> Result<(), CoreError> {
        let slot = self.live_slot_mut(id)?;
        slot.live = false;
        let unique_id = slot.node.unique_id().to_string();
        self.by_unique_id.remove(&unique_id);
        tracing::debug!(block = %unique_id, "block retired");
        Ok(())
    }

    /// Removes a block (live or retired) and all its connections.
    pub fn remove_block(&mut self, id: BlockId) -> Result<BlockNode, CoreError> {
        let idx: NodeIndex<u32> = id.into();
        let slot = self
            .blocks
            .remove_node(idx)
            .ok_or(CoreError::BlockNotFound { id })?;
        if slot.live {
            self.by_unique_id.remove(slot.node.unique_id());
        }
        tracing::debug!(block = %slot.node.unique_id(), "block removed");
        Ok(slot.node)
    }

    /// Looks up a live block.
    pub fn get_block(&self, id: BlockId) -> Option<&BlockNode> {
        self.live_slot(id).map(|slot| &slot.node)
    }

    /// Looks up a live block by its unique id.
    pub fn find_by_unique_id(&self, unique_id: &str) -> Option<BlockId> {
        self.by_unique_id.get(unique_id).copied()
    }

    /// Returns a weak handle to a live block.
    pub fn block_ref(&self, id: BlockId) -> Option<BlockRef> {
        self.live_slot(id).map(|slot| BlockRef {
            id,
            generation: slot.generation,
        })
    }

    /// Sets a streamer activity flag on a live block.
    pub fn set_port_active(
        &mut self,
        id: BlockId,
        direction: Direction,
        port: Port,
        active: bool,
    ) -> Result<(), CoreError> {
        self.live_slot_mut(id)?
            .node
            .set_port_active(direction, port, active)
    }

    /// Sets a property on a live block.
    pub fn set_property(
        &mut self,
        id: BlockId,
        name: &str,
        port: Port,
        value: PropertyValue,
    ) -> Result<(), CoreError> {
        self.live_slot_mut(id)?.node.set_property(name, port, value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Edge methods
    // -----------------------------------------------------------------------

    /// Connects output `src_port` of `src` to input `dst_port` of `dst`.
    ///
    /// Both blocks must be live and both ports in range. Fan-out, fan-in,
    /// cycles and self-loops are all allowed.
    pub fn connect(
        &mut self,
        src: BlockId,
        src_port: Port,
        dst: BlockId,
        dst_port: Port,
    ) -> Result<EdgeId, CoreError> {
        let src_slot = self.live_slot(src).ok_or_else(|| self.missing(src))?;
        src_slot.node.check_port(Direction::Downstream, src_port)?;
        let src_generation = src_slot.generation;

        let dst_slot = self.live_slot(dst).ok_or_else(|| self.missing(dst))?;
        dst_slot.node.check_port(Direction::Upstream, dst_port)?;
        let dst_generation = dst_slot.generation;

        let edge = Connection {
            src_port,
            dst_port,
            src_generation,
            dst_generation,
        };
        let idx = self.blocks.add_edge(src.into(), dst.into(), edge);
        Ok(EdgeId::from(idx))
    }

    /// Removes a connection.
    pub fn disconnect(&mut self, id: EdgeId) -> Result<Connection, CoreError> {
        self.blocks
            .remove_edge(id.into())
            .ok_or(CoreError::EdgeNotFound { id })
    }

    // -----------------------------------------------------------------------
    // Query methods
    // -----------------------------------------------------------------------

    /// Ids of all live blocks.
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks
            .node_indices()
            .filter(|&idx| self.blocks[idx].live)
            .map(BlockId::from)
            .collect()
    }

    /// Number of live blocks.
    pub fn block_count(&self) -> usize {
        self.by_unique_id.len()
    }

    /// Number of connections, including those touching retired blocks.
    pub fn edge_count(&self) -> usize {
        self.blocks.edge_count()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn live_slot(&self, id: BlockId) -> Option<&BlockSlot> {
        self.blocks
            .node_weight(id.into())
            .filter(|slot| slot.live)
    }

    fn live_slot_mut(&mut self, id: BlockId) -> Result<&mut BlockSlot, CoreError> {
        match self.blocks.node_weight_mut(id.into()) {
            Some(slot) if slot.live => Ok(slot),
            Some(slot) => Err(CoreError::BlockRetired {
                unique_id: slot.node.unique_id().to_string(),
            }),
            None => Err(CoreError::BlockNotFound { id }),
        }
    }

    fn missing(&self, id: BlockId) -> CoreError {
        match self.blocks.node_weight(id.into()) {
            Some(slot) => CoreError::BlockRetired {
                unique_id: slot.node.unique_id().to_string(),
            },
            None => CoreError::BlockNotFound { id },
        }
    }

    fn collect_links(&self, id: BlockId, direction: Direction) -> Vec<Link> {
        let idx: NodeIndex<u32> = id.into();
        if self.blocks.node_weight(idx).is_none() {
            return Vec::new();
        }
        let petgraph_dir = match direction {
            Direction::Downstream => petgraph::Direction::Outgoing,
            Direction::Upstream => petgraph::Direction::Incoming,
        };

        // petgraph yields the newest edge first; sort back into
        // (port, insertion) order so discovery order is reproducible.
        let mut links: Vec<(u32, Link)> = self
            .blocks
            .edges_directed(idx, petgraph_dir)
            .map(|edge| {
                let conn = edge.weight();
                let link = match direction {
                    Direction::Downstream => Link {
                        local_port: conn.src_port,
                        remote_port: conn.dst_port,
                        target: BlockRef {
                            id: BlockId::from(edge.target()),
                            generation: conn.dst_generation,
                        },
                    },
                    Direction::Upstream => Link {
                        local_port: conn.dst_port,
                        remote_port: conn.src_port,
                        target: BlockRef {
                            id: BlockId::from(edge.source()),
                            generation: conn.src_generation,
                        },
                    },
                };
                (edge.id().index() as u32, link)
            })
            .collect();
        links.sort_by_key(|(edge_idx, link)| (link.local_port, *edge_idx));
        links.into_iter().map(|(_, link)| link).collect()
    }
}

impl NodeGraph for BlockGraph {
    fn block(&self, id: BlockId) -> Option<&BlockNode> {
        self.get_block(id)
    }

    fn resolve(&self, target: BlockRef) -> Option<&BlockNode> {
        self.live_slot(target.id)
            .filter(|slot| slot.generation == target.generation)
            .map(|slot| &slot.node)
    }

    fn downstream_links(&self, id: BlockId) -> Vec<Link> {
        self.collect_links(id, Direction::Downstream)
    }

    fn upstream_links(&self, id: BlockId) -> Vec<Link> {
        self.collect_links(id, Direction::Upstream)
    }
}
