//! Property negotiation across a discovered block chain.
//!
//! [`Negotiator::negotiate`] searches for every block of a capability from a
//! start block and asserts that all of them that constrain a property (report
//! something other than the caller's null value) agree on it. It returns the
//! agreed value, the null value when nobody constrains the property, or a
//! [`NegotiationError::PropertyConflict`] naming the first two blocks that
//! disagree.
//!
//! Property getters are always called with [`Port::ANY`]: negotiation is
//! block-wide. Getters that need per-port values must fold them into one
//! value themselves.

pub mod conflict;

pub use conflict::NegotiationError;

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use blockflow_core::{BlockId, BlockNode, Capability, Direction, NodeGraph, Port, PropertyValue};

use crate::search::{GraphSearch, SearchConfig, SearchOutcome, SearchStatus};

/// Configuration for [`Negotiator`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Search settings used to discover participating blocks.
    pub search: SearchConfig,
    /// Fail with [`NegotiationError::SearchTruncated`] instead of negotiating
    /// over a truncated search. Default: false (log a warning and continue).
    pub fail_on_truncation: bool,
}

/// Builds a getter that reads the named property from a block's property
/// table. Absent properties read as [`PropertyValue::Null`].
pub fn property_getter(name: &str) -> impl Fn(&BlockNode, Port) -> PropertyValue + '_ {
    move |node: &BlockNode, port: Port| {
        node.get_property(name, port)
            .cloned()
            .unwrap_or(PropertyValue::Null)
    }
}

/// The first block that reported a non-null value.
struct Reference<'g, T> {
    id: BlockId,
    block: &'g str,
    value: T,
}

/// Property negotiator bound to one graph.
pub struct Negotiator<'g, G: NodeGraph + ?Sized> {
    graph: &'g G,
    config: NegotiationConfig,
}

impl<'g, G: NodeGraph + ?Sized> Negotiator<'g, G> {
    pub fn new(graph: &'g G, config: NegotiationConfig) -> Self {
        Negotiator { graph, config }
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Negotiates one value across every `target` block reachable from
    /// `start` in `direction`.
    ///
    /// Blocks in `excluded` never participate. The search ignores streamer
    /// activity and port scoping.
    pub fn negotiate<T, F>(
        &self,
        start: BlockId,
        direction: Direction,
        target: &Capability,
        getter: F,
        null_value: T,
        excluded: &HashSet<BlockId>,
    ) -> Result<T, NegotiationError<T>>
    where
        T: PartialEq + Clone + fmt::Debug + fmt::Display,
        F: Fn(&BlockNode, Port) -> T,
    {
        let outcome = self
            .search()
            .find_nodes(start, direction, target, false, Port::ANY);
        self.check_truncation::<T>(&outcome)?;
        self.agree(&outcome.blocks, getter, null_value, excluded)
    }

    /// Like [`negotiate`](Self::negotiate), but over the union of the
    /// downstream and upstream searches (downstream blocks first).
    ///
    /// Used for properties every neighbor must share regardless of signal
    /// direction, such as a tick rate.
    pub fn negotiate_bidirectional<T, F>(
        &self,
        start: BlockId,
        target: &Capability,
        getter: F,
        null_value: T,
        excluded: &HashSet<BlockId>,
    ) -> Result<T, NegotiationError<T>>
    where
        T: PartialEq + Clone + fmt::Debug + fmt::Display,
        F: Fn(&BlockNode, Port) -> T,
    {
        let search = self.search();
        let down = search.find_nodes(start, Direction::Downstream, target, false, Port::ANY);
        self.check_truncation::<T>(&down)?;
        let up = search.find_nodes(start, Direction::Upstream, target, false, Port::ANY);
        self.check_truncation::<T>(&up)?;

        let blocks: IndexSet<BlockId> = down.blocks.into_iter().chain(up.blocks).collect();
        let blocks: Vec<BlockId> = blocks.into_iter().collect();
        self.agree(&blocks, getter, null_value, excluded)
    }

    fn search(&self) -> GraphSearch<'g, G> {
        GraphSearch::new(self.graph, self.config.search.clone())
    }

    fn check_truncation<T>(&self, outcome: &SearchOutcome) -> Result<(), NegotiationError<T>>
    where
        T: fmt::Debug + fmt::Display,
    {
        if let SearchStatus::Truncated { rounds } = outcome.status {
            if self.config.fail_on_truncation {
                return Err(NegotiationError::SearchTruncated { rounds });
            }
            tracing::warn!(
                rounds,
                found = outcome.blocks.len(),
                "negotiating over a truncated block search"
            );
        }
        Ok(())
    }

    fn agree<T, F>(
        &self,
        blocks: &[BlockId],
        getter: F,
        null_value: T,
        excluded: &HashSet<BlockId>,
    ) -> Result<T, NegotiationError<T>>
    where
        T: PartialEq + Clone + fmt::Debug + fmt::Display,
        F: Fn(&BlockNode, Port) -> T,
    {
        let mut reference: Option<Reference<'g, T>> = None;

        for &id in blocks {
            if excluded.contains(&id) {
                continue;
            }
            let Some(node) = self.graph.block(id) else {
                continue;
            };
            let value = getter(node, Port::ANY);
            if value == null_value {
                continue;
            }

            if let Some(first) = &reference {
                if first.value != value {
                    tracing::debug!(
                        reference = first.block,
                        reference_value = %first.value,
                        conflicting = node.unique_id(),
                        conflicting_value = %value,
                        "property conflict"
                    );
                    return Err(NegotiationError::PropertyConflict {
                        reference_block: first.block.to_string(),
                        reference_id: first.id,
                        reference_value: first.value.clone(),
                        conflicting_block: node.unique_id().to_string(),
                        conflicting_id: id,
                        conflicting_value: value,
                    });
                }
            } else {
                reference = Some(Reference {
                    id,
                    block: node.unique_id(),
                    value,
                });
            }
        }

        match reference {
            Some(first) => {
                tracing::debug!(source = first.block, value = %first.value, "property agreed");
                Ok(first.value)
            }
            None => Ok(null_value),
        }
    }
}
