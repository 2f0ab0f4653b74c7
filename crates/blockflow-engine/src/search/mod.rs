//! Capability search over a block graph.
//!
//! [`GraphSearch::find_nodes`] is a bounded breadth-first walk from a start
//! block that collects every reachable block providing a target
//! [`Capability`]. Matching blocks are collected but never expanded: the
//! capability is a stop boundary ("find the next block of this type").
//!
//! Per round, every frontier entry `(port, block)` is expanded once:
//! - the block is marked explored (a block is never expanded twice, which is
//!   what terminates the walk on feedback loops and self-loops);
//! - its links in the search direction are filtered by the entry port, by
//!   streamer activity when `active_only` is set, and by liveness of the
//!   neighbor handle;
//! - matching neighbors go to the result set, other neighbors go to the next
//!   frontier with the port [`port_map::exit_port`] derives for them.
//!
//! The walk stops when the frontier is empty ([`SearchStatus::Exhausted`]) or
//! when [`SearchConfig::max_rounds`] is used up with work left
//! ([`SearchStatus::Truncated`]).

pub mod config;
pub mod error;
pub mod port_map;

pub use config::SearchConfig;
pub use error::SearchError;

use std::collections::HashSet;

use indexmap::IndexSet;

use blockflow_core::{BlockId, Capability, Direction, NodeGraph, Port};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Every reachable block was considered.
    Exhausted,
    /// The round limit was hit with unexplored blocks left; results may be
    /// incomplete.
    Truncated { rounds: usize },
}

/// Result of a capability search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Matching blocks, deduplicated, in discovery order.
    pub blocks: Vec<BlockId>,
    pub status: SearchStatus,
    /// Number of rounds actually run.
    pub rounds: usize,
}

impl SearchOutcome {
    fn empty() -> Self {
        SearchOutcome {
            blocks: Vec::new(),
            status: SearchStatus::Exhausted,
            rounds: 0,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.status, SearchStatus::Truncated { .. })
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Capability search bound to one graph.
///
/// Holds nothing but a shared borrow of the graph, so the topology cannot
/// change while a search runs.
pub struct GraphSearch<'g, G: NodeGraph + ?Sized> {
    graph: &'g G,
    config: SearchConfig,
}

impl<'g, G: NodeGraph + ?Sized> GraphSearch<'g, G> {
    pub fn new(graph: &'g G, config: SearchConfig) -> Self {
        GraphSearch { graph, config }
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Finds every block providing `target` reachable from `start` in
    /// `direction`.
    ///
    /// `start_port` restricts the first hop to one port of `start`
    /// ([`Port::ANY`] for no restriction). With `active_only`, links leaving
    /// through a port without an active streamer are ignored. The start block
    /// itself is never part of the result. A start block that is not live
    /// yields an empty, exhausted outcome.
    pub fn find_nodes(
        &self,
        start: BlockId,
        direction: Direction,
        target: &Capability,
        active_only: bool,
        start_port: Port,
    ) -> SearchOutcome {
        let Some(start_node) = self.graph.block(start) else {
            tracing::debug!(start = %start, "search start block is not live");
            return SearchOutcome::empty();
        };
        tracing::debug!(
            start = start_node.unique_id(),
            %direction,
            capability = %target,
            active_only,
            %start_port,
            "searching for blocks"
        );

        let mut results: IndexSet<BlockId> = IndexSet::new();
        let mut explored: HashSet<BlockId> = HashSet::new();
        let mut frontier: IndexSet<(Port, BlockId)> = IndexSet::new();
        frontier.insert((start_port, start));

        let mut rounds = 0;
        loop {
            // Entries queued earlier in a round may have been expanded later
            // in that same round.
            frontier.retain(|(_, id)| !explored.contains(id));
            if frontier.is_empty() {
                break;
            }
            if rounds >= self.config.max_rounds {
                tracing::warn!(
                    start = start_node.unique_id(),
                    capability = %target,
                    rounds,
                    pending = frontier.len(),
                    "block search truncated"
                );
                return SearchOutcome {
                    blocks: results.into_iter().collect(),
                    status: SearchStatus::Truncated { rounds },
                    rounds,
                };
            }
            rounds += 1;
            tracing::trace!(round = rounds, frontier = frontier.len(), "search round");

            let mut next: IndexSet<(Port, BlockId)> = IndexSet::new();
            for &(port, id) in &frontier {
                if !explored.insert(id) {
                    continue;
                }
                let Some(node) = self.graph.block(id) else {
                    continue;
                };

                for link in self.graph.links(id, direction) {
                    if !port.admits(link.local_port) {
                        continue;
                    }
                    if active_only && !node.is_port_active(link.local_port, direction) {
                        continue;
                    }
                    let Some(neighbor) = self.graph.resolve(link.target) else {
                        continue;
                    };
                    let neighbor_id = link.target.id;
                    if explored.contains(&neighbor_id) {
                        continue;
                    }

                    if neighbor.provides(target) {
                        results.insert(neighbor_id);
                    } else {
                        let exit = port_map::exit_port(neighbor, link.remote_port, direction);
                        next.insert((exit, neighbor_id));
                    }
                }
            }
            frontier = next;
        }

        tracing::debug!(
            start = start_node.unique_id(),
            capability = %target,
            found = results.len(),
            rounds,
            "block search exhausted"
        );
        SearchOutcome {
            blocks: results.into_iter().collect(),
            status: SearchStatus::Exhausted,
            rounds,
        }
    }

    /// Downstream search with no port restriction.
    pub fn find_downstream(
        &self,
        start: BlockId,
        target: &Capability,
        active_only: bool,
    ) -> SearchOutcome {
        self.find_nodes(start, Direction::Downstream, target, active_only, Port::ANY)
    }

    /// Upstream search with no port restriction.
    pub fn find_upstream(
        &self,
        start: BlockId,
        target: &Capability,
        active_only: bool,
    ) -> SearchOutcome {
        self.find_nodes(start, Direction::Upstream, target, active_only, Port::ANY)
    }

    /// Finds the single block providing `target` in `direction`.
    ///
    /// Fails with [`SearchError::NotFound`] if there is none and
    /// [`SearchError::Ambiguous`] if there are several.
    pub fn find_unique(
        &self,
        start: BlockId,
        direction: Direction,
        target: &Capability,
        active_only: bool,
        start_port: Port,
    ) -> Result<BlockId, SearchError> {
        let start_node = self
            .graph
            .block(start)
            .ok_or(SearchError::StartNotLive { start })?;
        let outcome = self.find_nodes(start, direction, target, active_only, start_port);

        match outcome.blocks.as_slice() {
            [only] => Ok(*only),
            [] => Err(SearchError::NotFound {
                start: start_node.unique_id().to_string(),
                direction,
                capability: target.clone(),
            }),
            many => Err(SearchError::Ambiguous {
                start: start_node.unique_id().to_string(),
                direction,
                capability: target.clone(),
                candidates: many
                    .iter()
                    .filter_map(|id| self.graph.block(*id))
                    .map(|node| node.unique_id().to_string())
                    .collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockflow_core::{BlockGraph, BlockNode};

    fn rate() -> Capability {
        Capability::SampleRate
    }

    fn plain(graph: &mut BlockGraph, name: &str, ins: u16, outs: u16) -> BlockId {
        graph.add_block(BlockNode::new(name, ins, outs)).unwrap()
    }

    fn rated(graph: &mut BlockGraph, name: &str, ins: u16, outs: u16) -> BlockId {
        graph
            .add_block(BlockNode::new(name, ins, outs).with_capability(rate()))
            .unwrap()
    }

    fn link(graph: &mut BlockGraph, a: BlockId, ap: u16, b: BlockId, bp: u16) {
        graph.connect(a, Port(ap), b, Port(bp)).unwrap();
    }

    fn search(graph: &BlockGraph) -> GraphSearch<'_, BlockGraph> {
        GraphSearch::new(graph, SearchConfig::default())
    }

    #[test]
    fn finds_match_through_pass_through_chain() {
        let mut g = BlockGraph::new();
        let radio = plain(&mut g, "radio", 1, 1);
        let fifo = plain(&mut g, "fifo", 1, 1);
        let ddc = rated(&mut g, "ddc", 1, 1);
        link(&mut g, radio, 0, fifo, 0);
        link(&mut g, fifo, 0, ddc, 0);

        let outcome = search(&g).find_downstream(radio, &rate(), false);
        assert_eq!(outcome.blocks, vec![ddc]);
        assert_eq!(outcome.status, SearchStatus::Exhausted);

        let outcome = search(&g).find_upstream(ddc, &Capability::Source, false);
        assert!(outcome.is_empty());
    }

    #[test]
    fn start_block_is_not_reported() {
        let mut g = BlockGraph::new();
        let a = rated(&mut g, "a", 1, 1);
        let b = rated(&mut g, "b", 1, 1);
        link(&mut g, a, 0, b, 0);

        let outcome = search(&g).find_downstream(a, &rate(), false);
        assert_eq!(outcome.blocks, vec![b]);
    }

    #[test]
    fn terminates_on_cycle() {
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        let b = plain(&mut g, "b", 1, 1);
        let c = plain(&mut g, "c", 1, 1);
        link(&mut g, a, 0, b, 0);
        link(&mut g, b, 0, c, 0);
        link(&mut g, c, 0, a, 0);

        let outcome = search(&g).find_downstream(a, &rate(), false);
        assert!(outcome.is_empty());
        assert_eq!(outcome.status, SearchStatus::Exhausted);
        assert_eq!(outcome.rounds, 3);
    }

    #[test]
    fn terminates_on_self_loop() {
        let mut g = BlockGraph::new();
        let fb = plain(&mut g, "feedback", 1, 1);
        link(&mut g, fb, 0, fb, 0);

        let outcome = search(&g).find_downstream(fb, &rate(), false);
        assert!(outcome.is_empty());
        assert_eq!(outcome.status, SearchStatus::Exhausted);
    }

    #[test]
    fn matching_self_loop_start_finds_nothing() {
        let mut g = BlockGraph::new();
        let fb = rated(&mut g, "feedback", 1, 1);
        link(&mut g, fb, 0, fb, 0);

        assert!(search(&g).find_downstream(fb, &rate(), false).is_empty());
    }

    #[test]
    fn does_not_expand_past_match() {
        // a -> b(match) -> c(match): only b.
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        let b = rated(&mut g, "b", 1, 1);
        let c = rated(&mut g, "c", 1, 1);
        link(&mut g, a, 0, b, 0);
        link(&mut g, b, 0, c, 0);

        let outcome = search(&g).find_downstream(a, &rate(), false);
        assert_eq!(outcome.blocks, vec![b]);
    }

    #[test]
    fn match_reachable_around_another_match_is_found() {
        // a -> b(match) -> c(match) and a -> x -> c: both b and c.
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 2);
        let b = rated(&mut g, "b", 1, 1);
        let c = rated(&mut g, "c", 2, 1);
        let x = plain(&mut g, "x", 1, 1);
        link(&mut g, a, 0, b, 0);
        link(&mut g, b, 0, c, 0);
        link(&mut g, a, 1, x, 0);
        link(&mut g, x, 0, c, 1);

        let outcome = search(&g).find_downstream(a, &rate(), false);
        assert_eq!(outcome.blocks, vec![b, c]);
    }

    #[test]
    fn start_port_scopes_first_hop() {
        let mut g = BlockGraph::new();
        let split = plain(&mut g, "split", 1, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, split, 0, x, 0);
        link(&mut g, split, 1, y, 0);

        let s = search(&g);
        let p0 = s.find_nodes(split, Direction::Downstream, &rate(), false, Port(0));
        assert_eq!(p0.blocks, vec![x]);
        let p1 = s.find_nodes(split, Direction::Downstream, &rate(), false, Port(1));
        assert_eq!(p1.blocks, vec![y]);
        let any = s.find_nodes(split, Direction::Downstream, &rate(), false, Port::ANY);
        assert_eq!(any.blocks, vec![x, y]);
    }

    #[test]
    fn port_scope_follows_symmetric_pass_through() {
        // start(2 out) -> pass(2x2) -> x on pass port 0, y on pass port 1.
        let mut g = BlockGraph::new();
        let start = plain(&mut g, "start", 1, 2);
        let pass = plain(&mut g, "pass", 2, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, start, 0, pass, 0);
        link(&mut g, start, 1, pass, 1);
        link(&mut g, pass, 0, x, 0);
        link(&mut g, pass, 1, y, 0);

        let s = search(&g);
        let p1 = s.find_nodes(start, Direction::Downstream, &rate(), false, Port(1));
        assert_eq!(p1.blocks, vec![y]);
    }

    #[test]
    fn crossed_routing_is_honoured() {
        let mut g = BlockGraph::new();
        let start = plain(&mut g, "start", 1, 1);
        let swap = g
            .add_block(BlockNode::new("swap", 2, 2).with_routing(vec![1, 0]))
            .unwrap();
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, start, 0, swap, 0);
        link(&mut g, swap, 0, x, 0);
        link(&mut g, swap, 1, y, 0);

        let outcome = search(&g).find_downstream(start, &rate(), false);
        assert_eq!(outcome.blocks, vec![y]);
    }

    #[test]
    fn asymmetric_pass_through_widens_scope() {
        // start -> split(1x2) -> x, y. Entering split on port 0 cannot be
        // correlated, so both outputs are followed.
        let mut g = BlockGraph::new();
        let start = plain(&mut g, "start", 1, 1);
        let split = plain(&mut g, "split", 1, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, start, 0, split, 0);
        link(&mut g, split, 0, x, 0);
        link(&mut g, split, 1, y, 0);

        let outcome =
            search(&g).find_nodes(start, Direction::Downstream, &rate(), false, Port(0));
        assert_eq!(outcome.blocks, vec![x, y]);
    }

    #[test]
    fn upstream_search_mirrors_downstream() {
        let mut g = BlockGraph::new();
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        let pass = plain(&mut g, "pass", 2, 2);
        let sink = plain(&mut g, "sink", 2, 1);
        link(&mut g, x, 0, pass, 0);
        link(&mut g, y, 0, pass, 1);
        link(&mut g, pass, 0, sink, 0);
        link(&mut g, pass, 1, sink, 1);

        let s = search(&g);
        let p0 = s.find_nodes(sink, Direction::Upstream, &rate(), false, Port(0));
        assert_eq!(p0.blocks, vec![x]);
        let p1 = s.find_nodes(sink, Direction::Upstream, &rate(), false, Port(1));
        assert_eq!(p1.blocks, vec![y]);
    }

    #[test]
    fn block_reached_on_two_ports_is_expanded_once() {
        // Both sink inputs lead to `pass`, which enters the next frontier as
        // (0, pass) and (1, pass). Only the first entry is expanded, so only
        // the port-0 side of `pass` is searched.
        let mut g = BlockGraph::new();
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        let pass = plain(&mut g, "pass", 2, 2);
        let sink = plain(&mut g, "sink", 2, 1);
        link(&mut g, x, 0, pass, 0);
        link(&mut g, y, 0, pass, 1);
        link(&mut g, pass, 0, sink, 0);
        link(&mut g, pass, 1, sink, 1);

        let outcome = search(&g).find_upstream(sink, &rate(), false);
        assert_eq!(outcome.blocks, vec![x]);
    }

    #[test]
    fn active_only_skips_inactive_ports() {
        let mut g = BlockGraph::new();
        let split = plain(&mut g, "split", 1, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, split, 0, x, 0);
        link(&mut g, split, 1, y, 0);
        g.set_port_active(split, Direction::Downstream, Port(1), true)
            .unwrap();

        let s = search(&g);
        assert_eq!(s.find_downstream(split, &rate(), true).blocks, vec![y]);
        assert_eq!(s.find_downstream(split, &rate(), false).blocks, vec![x, y]);
    }

    #[test]
    fn active_only_applies_at_every_hop() {
        let mut g = BlockGraph::new();
        let start = g
            .add_block(BlockNode::new("start", 1, 1).all_active(Direction::Downstream))
            .unwrap();
        let idle = plain(&mut g, "idle", 1, 1);
        let x = rated(&mut g, "x", 1, 1);
        link(&mut g, start, 0, idle, 0);
        link(&mut g, idle, 0, x, 0);

        assert!(search(&g).find_downstream(start, &rate(), true).is_empty());
        g.set_port_active(idle, Direction::Downstream, Port(0), true)
            .unwrap();
        assert_eq!(search(&g).find_downstream(start, &rate(), true).blocks, vec![x]);
    }

    #[test]
    fn active_only_upstream_reads_input_flags() {
        // x -> merge.in0, y -> merge.in1
        let mut g = BlockGraph::new();
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        let merge = plain(&mut g, "merge", 2, 1);
        link(&mut g, x, 0, merge, 0);
        link(&mut g, y, 0, merge, 1);
        g.set_port_active(merge, Direction::Upstream, Port(1), true)
            .unwrap();
        // Output activity does not open an upstream walk.
        g.set_port_active(merge, Direction::Downstream, Port(0), true)
            .unwrap();

        assert_eq!(search(&g).find_upstream(merge, &rate(), true).blocks, vec![y]);

        g.set_port_active(merge, Direction::Upstream, Port(0), true)
            .unwrap();
        assert_eq!(
            search(&g).find_upstream(merge, &rate(), true).blocks,
            vec![x, y]
        );

        g.set_port_active(merge, Direction::Upstream, Port(1), false)
            .unwrap();
        assert_eq!(search(&g).find_upstream(merge, &rate(), true).blocks, vec![x]);
    }

    #[test]
    fn retired_neighbor_is_skipped() {
        let mut g = BlockGraph::new();
        let split = plain(&mut g, "split", 1, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, split, 0, x, 0);
        link(&mut g, split, 1, y, 0);

        g.retire_block(x).unwrap();

        let outcome = search(&g).find_downstream(split, &rate(), false);
        assert_eq!(outcome.blocks, vec![y]);
        assert_eq!(outcome.status, SearchStatus::Exhausted);
    }

    #[test]
    fn retired_pass_through_cuts_the_path() {
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        let fifo = plain(&mut g, "fifo", 1, 1);
        let x = rated(&mut g, "x", 1, 1);
        link(&mut g, a, 0, fifo, 0);
        link(&mut g, fifo, 0, x, 0);
        g.retire_block(fifo).unwrap();

        assert!(search(&g).find_downstream(a, &rate(), false).is_empty());
    }

    #[test]
    fn retired_start_yields_empty_outcome() {
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        let x = rated(&mut g, "x", 1, 1);
        link(&mut g, a, 0, x, 0);
        g.retire_block(a).unwrap();

        let outcome = search(&g).find_downstream(a, &rate(), false);
        assert!(outcome.is_empty());
        assert_eq!(outcome.rounds, 0);
    }

    #[test]
    fn round_limit_reports_truncation() {
        // a -> p1 -> p2 -> p3 -> x needs 4 rounds.
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        let p1 = plain(&mut g, "p1", 1, 1);
        let p2 = plain(&mut g, "p2", 1, 1);
        let p3 = plain(&mut g, "p3", 1, 1);
        let x = rated(&mut g, "x", 1, 1);
        link(&mut g, a, 0, p1, 0);
        link(&mut g, p1, 0, p2, 0);
        link(&mut g, p2, 0, p3, 0);
        link(&mut g, p3, 0, x, 0);

        let short = GraphSearch::new(&g, SearchConfig { max_rounds: 2 });
        let outcome = short.find_downstream(a, &rate(), false);
        assert!(outcome.is_empty());
        assert_eq!(outcome.status, SearchStatus::Truncated { rounds: 2 });

        let enough = GraphSearch::new(&g, SearchConfig { max_rounds: 4 });
        let outcome = enough.find_downstream(a, &rate(), false);
        assert_eq!(outcome.blocks, vec![x]);
        assert!(!outcome.is_truncated());
    }

    #[test]
    fn block_expanded_in_its_queueing_round_does_not_count_as_pending() {
        // s -> a -> b and s -> b: b is queued by a after it was already
        // queued by s, and both copies are handled in round 2.
        let mut g = BlockGraph::new();
        let s = plain(&mut g, "s", 1, 2);
        let a = plain(&mut g, "a", 1, 1);
        let b = plain(&mut g, "b", 2, 1);
        link(&mut g, s, 0, a, 0);
        link(&mut g, s, 1, b, 0);
        link(&mut g, a, 0, b, 1);

        let tight = GraphSearch::new(&g, SearchConfig { max_rounds: 2 });
        let outcome = tight.find_downstream(s, &rate(), false);
        assert!(outcome.is_empty());
        assert_eq!(outcome.status, SearchStatus::Exhausted);
        assert_eq!(outcome.rounds, 2);

        let strict = crate::NegotiationConfig {
            search: SearchConfig { max_rounds: 2 },
            fail_on_truncation: true,
        };
        let agreed = crate::Negotiator::new(&g, strict).negotiate(
            s,
            Direction::Downstream,
            &rate(),
            |_: &BlockNode, _: Port| 0i64,
            0,
            &HashSet::new(),
        );
        assert_eq!(agreed, Ok(0));
    }

    #[test]
    fn zero_round_limit_truncates_immediately() {
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        let search = GraphSearch::new(&g, SearchConfig { max_rounds: 0 });
        let outcome = search.find_downstream(a, &rate(), false);
        assert_eq!(outcome.status, SearchStatus::Truncated { rounds: 0 });
    }

    #[test]
    fn find_unique_variants() {
        let mut g = BlockGraph::new();
        let split = plain(&mut g, "split", 1, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, split, 0, x, 0);
        link(&mut g, split, 1, y, 0);

        let s = search(&g);
        assert_eq!(
            s.find_unique(split, Direction::Downstream, &rate(), false, Port(0)),
            Ok(x)
        );
        assert_eq!(
            s.find_unique(split, Direction::Downstream, &rate(), false, Port::ANY),
            Err(SearchError::Ambiguous {
                start: "split".into(),
                direction: Direction::Downstream,
                capability: rate(),
                candidates: vec!["x".into(), "y".into()],
            })
        );
        assert_eq!(
            s.find_unique(split, Direction::Upstream, &rate(), false, Port::ANY),
            Err(SearchError::NotFound {
                start: "split".into(),
                direction: Direction::Upstream,
                capability: rate(),
            })
        );
    }

    #[test]
    fn find_unique_from_retired_start() {
        let mut g = BlockGraph::new();
        let a = plain(&mut g, "a", 1, 1);
        g.retire_block(a).unwrap();
        assert_eq!(
            search(&g).find_unique(a, Direction::Downstream, &rate(), false, Port::ANY),
            Err(SearchError::StartNotLive { start: a })
        );
    }

    #[test]
    fn find_unique_error_messages() {
        let mut g = BlockGraph::new();
        let split = plain(&mut g, "split", 1, 2);
        let x = rated(&mut g, "x", 1, 1);
        let y = rated(&mut g, "y", 1, 1);
        link(&mut g, split, 0, x, 0);
        link(&mut g, split, 1, y, 0);
        let s = search(&g);

        let err = s
            .find_unique(split, Direction::Downstream, &rate(), false, Port::ANY)
            .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @r#"2 sample_rate blocks downstream of 'split': ["x", "y"]"#
        );

        let err = s
            .find_unique(split, Direction::Upstream, &Capability::Source, false, Port::ANY)
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"no source block upstream of 'split'");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        type Edges = Vec<(usize, u16, usize, u16)>;

        /// Random graph: `n` blocks with 2 inputs and 2 outputs, a random
        /// subset carrying the capability, and random (possibly cyclic,
        /// possibly self-looping) connections.
        fn arb_graph() -> impl Strategy<Value = (usize, Vec<bool>, Edges)> {
            (1usize..12).prop_flat_map(|n| {
                (
                    Just(n),
                    prop::collection::vec(any::<bool>(), n),
                    prop::collection::vec((0..n, 0u16..2, 0..n, 0u16..2), 0..40),
                )
            })
        }

        fn build(n: usize, matches: &[bool], edges: &Edges) -> (BlockGraph, Vec<BlockId>) {
            let mut g = BlockGraph::new();
            let ids: Vec<BlockId> = (0..n)
                .map(|i| {
                    let mut node = BlockNode::new(format!("b{}", i), 2, 2);
                    if matches[i] {
                        node = node.with_capability(Capability::SampleRate);
                    }
                    g.add_block(node).unwrap()
                })
                .collect();
            for &(a, ap, b, bp) in edges {
                g.connect(ids[a], Port(ap), ids[b], Port(bp)).unwrap();
            }
            (g, ids)
        }

        proptest! {
            /// Property: with a round cap above the block count, every search
            /// on any graph is exhausted, reports only matching blocks, never
            /// reports the start, and never reports duplicates.
            #[test]
            fn prop_search_terminates_with_matching_results(
                (n, matches, edges) in arb_graph(),
                start in 0usize..12,
                downstream in any::<bool>(),
            ) {
                let (g, ids) = build(n, &matches, &edges);
                let start = ids[start % n];
                let direction = if downstream { Direction::Downstream } else { Direction::Upstream };

                let search = GraphSearch::new(&g, SearchConfig { max_rounds: n + 1 });
                let outcome = search.find_nodes(start, direction, &Capability::SampleRate, false, Port::ANY);

                prop_assert_eq!(outcome.status, SearchStatus::Exhausted);
                prop_assert!(!outcome.contains(start));
                let unique: HashSet<BlockId> = outcome.blocks.iter().copied().collect();
                prop_assert_eq!(unique.len(), outcome.blocks.len());
                for id in &outcome.blocks {
                    prop_assert!(g.get_block(*id).unwrap().provides(&Capability::SampleRate));
                }
            }

            /// Property: every reported block is reachable from the start
            /// along connections in the search direction.
            #[test]
            fn prop_results_are_reachable(
                (n, matches, edges) in arb_graph(),
                start in 0usize..12,
                port in prop::option::of(0u16..2),
            ) {
                let (g, ids) = build(n, &matches, &edges);
                let start = ids[start % n];
                let start_port = port.map(Port).unwrap_or(Port::ANY);
                let search = GraphSearch::new(&g, SearchConfig { max_rounds: n + 1 });

                let outcome = search.find_nodes(start, Direction::Downstream, &Capability::SampleRate, false, start_port);

                let mut reachable: HashSet<BlockId> = HashSet::new();
                let mut stack = vec![start];
                while let Some(id) = stack.pop() {
                    for link in g.downstream_links(id) {
                        if reachable.insert(link.target.id) {
                            stack.push(link.target.id);
                        }
                    }
                }
                for id in &outcome.blocks {
                    prop_assert!(reachable.contains(id));
                }
            }
        }
    }
}
