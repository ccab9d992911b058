//! Insertion-only exact maintenance for ordinary graphs, driven by a total
//! order per core level.
//!
//! For every level K the engine keeps `O[K]`, a linked list of the level's
//! nodes in an order where removing a node cannot raise the core of any node
//! before it, and `A[K]`, a positional splay tree over the same nodes giving
//! O(log n) rank queries. An insertion walks `O[K]` from the cheaper endpoint
//! onward, collecting promotion candidates and evicting the ones whose
//! support collapses, then promotes the survivors to level K+1.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use dhc_core::errors::{DhcError, ErrorInfo};
use dhc_core::{CoreMap, CoreMaintenance, NodeId};
use dhc_graph::{Hyperedge, Hypergraph};

use crate::splay::{SplayForest, SplayHandle, SplayTree};

/// Cell of the intrusive node lists. Every graph node owns exactly one cell,
/// threaded into either its level's order list or the candidate list.
#[derive(Debug, Clone)]
struct Cell {
    prev: Option<usize>,
    next: Option<usize>,
    node: NodeId,
}

#[derive(Debug, Clone, Default)]
struct CellArena {
    cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeList {
    head: Option<usize>,
    tail: Option<usize>,
}

impl CellArena {
    fn alloc(&mut self, node: NodeId) -> usize {
        self.cells.push(Cell {
            prev: None,
            next: None,
            node,
        });
        self.cells.len() - 1
    }

    fn node_of(&self, cell: usize) -> NodeId {
        self.cells[cell].node
    }

    fn next_of(&self, cell: usize) -> Option<usize> {
        self.cells[cell].next
    }

    fn prev_of(&self, cell: usize) -> Option<usize> {
        self.cells[cell].prev
    }

    fn push_front(&mut self, list: &mut NodeList, cell: usize) {
        self.cells[cell].prev = None;
        self.cells[cell].next = list.head;
        if let Some(head) = list.head {
            self.cells[head].prev = Some(cell);
        } else {
            list.tail = Some(cell);
        }
        list.head = Some(cell);
    }

    fn push_back(&mut self, list: &mut NodeList, cell: usize) {
        self.cells[cell].next = None;
        self.cells[cell].prev = list.tail;
        if let Some(tail) = list.tail {
            self.cells[tail].next = Some(cell);
        } else {
            list.head = Some(cell);
        }
        list.tail = Some(cell);
    }

    /// Inserts `cell` before `position`; `None` appends at the tail.
    fn insert_before(&mut self, list: &mut NodeList, position: Option<usize>, cell: usize) {
        match position {
            None => self.push_back(list, cell),
            Some(position) => match self.cells[position].prev {
                None => self.push_front(list, cell),
                Some(prev) => {
                    self.cells[cell].prev = Some(prev);
                    self.cells[cell].next = Some(position);
                    self.cells[prev].next = Some(cell);
                    self.cells[position].prev = Some(cell);
                }
            },
        }
    }

    fn remove(&mut self, list: &mut NodeList, cell: usize) {
        let prev = self.cells[cell].prev;
        let next = self.cells[cell].next;
        match prev {
            Some(prev) => self.cells[prev].next = next,
            None => list.head = next,
        }
        match next {
            Some(next) => self.cells[next].prev = prev,
            None => list.tail = prev,
        }
        self.cells[cell].prev = None;
        self.cells[cell].next = None;
    }

    fn nodes(&self, list: &NodeList) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = list.head;
        while let Some(cell) = cursor {
            out.push(self.cells[cell].node);
            cursor = self.cells[cell].next;
        }
        out
    }
}

#[derive(Debug, Default)]
struct LevelState {
    order: NodeList,
    tree: SplayTree,
}

#[derive(Debug, Clone, Copy)]
struct NodeState {
    cell: usize,
    splay: SplayHandle,
    deg_plus: u32,
    deg_star: u32,
    in_vc: bool,
}

/// Insertion-only exact engine for ordinary graphs.
#[derive(Debug)]
pub struct OrderEngine {
    graph: Hypergraph,
    cores: CoreMap,
    forest: SplayForest,
    cells: CellArena,
    levels: Vec<LevelState>,
    states: HashMap<NodeId, NodeState>,
    vc: NodeList,
    pending: BTreeSet<(usize, NodeId)>,
    changes_in_a: Vec<(NodeId, NodeId)>,
}

impl Default for OrderEngine {
    fn default() -> Self {
        Self {
            graph: Hypergraph::new(),
            cores: CoreMap::new(),
            forest: SplayForest::new(),
            cells: CellArena::default(),
            levels: vec![LevelState::default()],
            states: HashMap::new(),
            vc: NodeList::default(),
            pending: BTreeSet::new(),
            changes_in_a: Vec::new(),
        }
    }
}

impl OrderEngine {
    /// Creates an engine over an empty substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the maintained substrate.
    pub fn graph(&self) -> &Hypergraph {
        &self.graph
    }

    /// Returns the maintained core numbers.
    pub fn cores(&self) -> &CoreMap {
        &self.cores
    }

    /// Returns the nodes of level `k` in their maintained order.
    pub fn level_order(&self, k: usize) -> Vec<NodeId> {
        self.levels
            .get(k)
            .map(|level| self.cells.nodes(&level.order))
            .unwrap_or_default()
    }

    /// Returns the number of materialized levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Returns the 1-based rank of `node` within its level's order structure.
    pub fn rank_in_level(&mut self, k: usize, node: NodeId) -> Option<usize> {
        if k >= self.levels.len() || self.cores.get(node) as usize != k {
            return None;
        }
        let handle = self.states.get(&node)?.splay;
        Some(self.forest.rank(&mut self.levels[k].tree, handle))
    }

    fn rank_at(&mut self, k: usize, node: NodeId) -> usize {
        let handle = self.states[&node].splay;
        self.forest.rank(&mut self.levels[k].tree, handle)
    }

    fn materialize(&mut self, node: NodeId) {
        if self.states.contains_key(&node) {
            return;
        }
        let cell = self.cells.alloc(node);
        self.cells.push_front(&mut self.levels[0].order, cell);
        let splay = self.forest.alloc();
        self.forest.insert_first(&mut self.levels[0].tree, splay);
        self.states.insert(
            node,
            NodeState {
                cell,
                splay,
                deg_plus: 0,
                deg_star: 0,
                in_vc: false,
            },
        );
    }

    /// Collects the pair neighbors of `node` via the XOR trick (valid for
    /// arity-2 edges only).
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.graph
            .incident(node)
            .map(|edge_id| {
                let edge = self.graph.edge(edge_id).expect("incident edge is live");
                pair_neighbor(edge, node)
            })
            .collect()
    }

    fn insert(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        if nodes.len() != 2 {
            return Err(DhcError::Engine(
                ErrorInfo::new("non-pair-edge", "the order-based engine handles pair edges only")
                    .with_context("arity", nodes.len().to_string()),
            ));
        }
        for node in nodes {
            self.materialize(*node);
        }
        self.graph.insert(Hyperedge::new(nodes.to_vec()));

        let (a, b) = (nodes[0], nodes[1]);
        let (core_a, core_b) = (self.cores.get(a), self.cores.get(b));
        let k = core_a.min(core_b);
        let lesser = if core_a > core_b {
            b
        } else if core_a < core_b {
            a
        } else if self.rank_at(core_a as usize, a) > self.rank_at(core_b as usize, b) {
            b
        } else {
            a
        };
        let k_idx = k as usize;

        let state = self.states.get_mut(&lesser).expect("materialized above");
        state.deg_plus += 1;
        if state.deg_plus <= k {
            return Ok(());
        }

        let seed_rank = self.rank_at(k_idx, lesser);
        self.pending.insert((seed_rank, lesser));
        self.walk_level(k_idx, k);
        self.promote_candidates(k_idx);
        Ok(())
    }

    /// Walks `O[K]` classifying nodes into candidates (case 1), skippable
    /// stretches (case 2a) and failed candidates whose support must be torn
    /// back down (case 2b).
    fn walk_level(&mut self, k_idx: usize, k: u32) {
        let mut cursor = self.levels[k_idx].order.head;
        while let Some(cell) = cursor {
            let visited = self.cells.node_of(cell);
            let next = self.cells.next_of(cell);
            let state = self.states[&visited];
            if state.deg_star + state.deg_plus > k {
                // Case 1: candidate. Leaves O[K] for the candidate list; its
                // later-ranked co-level neighbors gain optimistic support.
                self.cells.remove(&mut self.levels[k_idx].order, cell);
                self.cells.push_back(&mut self.vc, cell);
                self.states.get_mut(&visited).expect("known node").in_vc = true;
                let rank_visited = self.rank_at(k_idx, visited);
                for neighbor in self.neighbors(visited) {
                    if self.cores.get(neighbor) != k {
                        continue;
                    }
                    let rank_neighbor = self.rank_at(k_idx, neighbor);
                    if rank_visited < rank_neighbor {
                        let neighbor_state = self.states.get_mut(&neighbor).expect("known node");
                        if neighbor_state.deg_star == 0 {
                            self.pending.insert((rank_neighbor, neighbor));
                        }
                        neighbor_state.deg_star += 1;
                    }
                }
                cursor = next;
            } else if state.deg_star == 0 {
                // Case 2a: nothing ahead until the next pending node.
                let Some(&(_, jump)) = self.pending.iter().next() else {
                    break;
                };
                cursor = Some(self.states[&jump].cell);
            } else {
                // Case 2b: the optimistic support failed; fold it back and
                // evict the candidates that relied on this node.
                let state = self.states.get_mut(&visited).expect("known node");
                state.deg_plus += state.deg_star;
                state.deg_star = 0;
                self.remove_candidates(next, visited, k_idx, k);
                cursor = next;
            }
            let rank_visited = self.rank_at(k_idx, visited);
            if let Some(&(head_rank, head_node)) = self.pending.iter().next() {
                if rank_visited >= head_rank {
                    self.pending.remove(&(head_rank, head_node));
                }
            }
        }
        self.pending.clear();
    }

    /// Moves the surviving candidates to level K+1 and repairs `A[K]` to
    /// match the adjusted order.
    fn promote_candidates(&mut self, k_idx: usize) {
        let promoted = self.cells.nodes(&self.vc);
        for node in &promoted {
            self.states.get_mut(node).expect("known node").deg_star = 0;
            self.cores.increment(*node);
        }
        if !promoted.is_empty() && self.levels.len() <= k_idx + 1 {
            self.levels.push(LevelState::default());
        }
        for node in promoted.iter().rev() {
            let state = self.states[node];
            self.cells.remove(&mut self.vc, state.cell);
            self.cells
                .push_front(&mut self.levels[k_idx + 1].order, state.cell);
            self.forest.remove(&mut self.levels[k_idx].tree, state.splay);
            self.forest
                .insert_first(&mut self.levels[k_idx + 1].tree, state.splay);
            self.states.get_mut(node).expect("known node").in_vc = false;
        }
        for (node, predecessor) in std::mem::take(&mut self.changes_in_a) {
            let handle = self.states[&node].splay;
            let pivot = self.states[&predecessor].splay;
            self.forest.remove(&mut self.levels[k_idx].tree, handle);
            self.forest
                .insert_after(&mut self.levels[k_idx].tree, handle, pivot);
        }
        debug_assert!(self.vc.head.is_none());
    }

    /// Evicts from the candidate list every node whose support broke when
    /// `failed` stayed at level K, cascading through the candidates that
    /// depended on the evicted ones. Evicted nodes return to `O[K]` just
    /// before `position`; their `A[K]` moves are deferred to the post-pass.
    fn remove_candidates(
        &mut self,
        position: Option<usize>,
        failed: NodeId,
        k_idx: usize,
        k: u32,
    ) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let mut queued: HashSet<NodeId> = HashSet::new();
        for neighbor in self.neighbors(failed) {
            let state = self.states.get_mut(&neighbor).expect("known node");
            if !state.in_vc {
                continue;
            }
            debug_assert!(state.deg_plus > 0);
            state.deg_plus -= 1;
            if state.deg_plus + state.deg_star <= k && queued.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }

        let rank_failed = self.rank_at(k_idx, failed);
        while let Some(evicted) = queue.pop_front() {
            queued.remove(&evicted);
            let state = self.states.get_mut(&evicted).expect("known node");
            state.deg_plus += state.deg_star;
            state.deg_star = 0;
            state.in_vc = false;
            let cell = state.cell;
            self.cells.remove(&mut self.vc, cell);
            self.cells
                .insert_before(&mut self.levels[k_idx].order, position, cell);
            let predecessor = self
                .cells
                .prev_of(cell)
                .expect("evicted candidates rejoin after the walk head");
            self.changes_in_a
                .push((evicted, self.cells.node_of(predecessor)));

            let rank_evicted = self.rank_at(k_idx, evicted);
            for neighbor in self.neighbors(evicted) {
                if self.cores.get(neighbor) != k {
                    continue;
                }
                let rank_neighbor = self.rank_at(k_idx, neighbor);
                if rank_failed < rank_neighbor {
                    let neighbor_state = self.states.get_mut(&neighbor).expect("known node");
                    debug_assert!(neighbor_state.deg_star > 0);
                    neighbor_state.deg_star -= 1;
                    if neighbor_state.deg_star == 0 {
                        self.pending.remove(&(rank_neighbor, neighbor));
                    }
                } else if self.states[&neighbor].in_vc {
                    let neighbor_state = self.states.get_mut(&neighbor).expect("known node");
                    if rank_evicted < rank_neighbor {
                        debug_assert!(neighbor_state.deg_star > 0);
                        neighbor_state.deg_star -= 1;
                    } else {
                        debug_assert!(neighbor_state.deg_plus > 0);
                        neighbor_state.deg_plus -= 1;
                    }
                    if neighbor_state.deg_plus + neighbor_state.deg_star <= k
                        && queued.insert(neighbor)
                    {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }
}

impl CoreMaintenance for OrderEngine {
    fn insert_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        self.insert(nodes)
    }

    fn delete_edge(&mut self, _nodes: &[NodeId]) -> Result<(), DhcError> {
        Err(DhcError::Engine(ErrorInfo::new(
            "deletion-unsupported",
            "the order-based engine is insertion-only",
        )))
    }

    fn core_of(&self, node: NodeId) -> u32 {
        self.cores.get(node)
    }
}

/// Other endpoint of a pair edge containing `node`. Valid for pairs only.
fn pair_neighbor(edge: &Hyperedge, node: NodeId) -> NodeId {
    let nodes = edge.nodes();
    debug_assert_eq!(nodes.len(), 2);
    NodeId::from_raw(nodes[0].as_raw() ^ nodes[1].as_raw() ^ node.as_raw())
}
