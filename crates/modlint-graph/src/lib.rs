//! Dependency graph over data-file keys.
//!
//! Aggregates per-file reference sets into a directed graph (file ->
//! depends-on file), detects circular dependencies, and computes a
//! deterministic load order.
//!
//! # Determinism
//!
//! Every observable output is reproducible across runs over the same
//! input: cycle-detection start nodes and successor visits iterate in
//! ascending file-key order, Kahn ties break by ascending file-key
//! order, and files caught in cycles are appended to the load order in
//! sorted-key order.
//!
//! The graph is built once per analysis run and discarded after the
//! cycle and load-order results are extracted; it is never long-lived
//! mutable state.

use modlint_core::key::FileKey;
use modlint_core::report::LoadOrderEntry;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::collections::{BTreeMap, BTreeSet};

new_key_type! {
    /// Identifies a file node in the dependency graph.
    pub struct FileNodeId;

    /// Identifies a dependency edge.
    pub struct DepEdgeId;
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Where a dependency edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Discovered inside record attribute values at parse time.
    Content,
    /// Declared as a load-order hint (`depends_on`).
    Load,
}

/// Adjacency lists for a single node, tracking incoming and outgoing edges.
#[derive(Debug, Clone, Default)]
struct NodeAdjacency {
    /// Edges whose destination is this node.
    inputs: Vec<DepEdgeId>,
    /// Edges whose source is this node.
    outputs: Vec<DepEdgeId>,
}

/// Per-node data stored in the graph.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub key: FileKey,
}

/// Per-edge data. `from` depends on `to`.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub from: FileNodeId,
    pub to: FileNodeId,
    pub kind: EdgeKind,
}

/// The per-file input to graph building: the union of the file's record
/// reference sets, plus any declared load-order hints.
#[derive(Debug, Clone, Default)]
pub struct FileDependencies {
    pub key: FileKey,
    /// Targets discovered in attribute values.
    pub content: BTreeSet<FileKey>,
    /// Targets declared via `depends_on`.
    pub load_hints: BTreeSet<FileKey>,
}

impl FileDependencies {
    pub fn new(key: FileKey) -> Self {
        FileDependencies {
            key,
            content: BTreeSet::new(),
            load_hints: BTreeSet::new(),
        }
    }

    pub fn with_content(mut self, targets: impl IntoIterator<Item = FileKey>) -> Self {
        self.content.extend(targets);
        self
    }

    pub fn with_load_hints(mut self, targets: impl IntoIterator<Item = FileKey>) -> Self {
        self.load_hints.extend(targets);
        self
    }
}

/// The extracted results of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphAnalysis {
    /// Disjoint circular-dependency groups, each spanning >= 2 files.
    pub cycles: Vec<Vec<FileKey>>,
    /// Topological load order; cycle members flagged at the tail.
    pub load_order: Vec<LoadOrderEntry>,
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// Directed dependency graph with forward and reverse adjacency.
///
/// Adjacency is stored in a `SecondaryMap` keyed by `FileNodeId`, which
/// guarantees key synchronization with the primary `nodes` SlotMap; the
/// `by_key` index gives sorted, deterministic iteration over file keys.
#[derive(Debug)]
pub struct DependencyGraph {
    nodes: SlotMap<FileNodeId, NodeData>,
    edges: SlotMap<DepEdgeId, EdgeData>,
    adjacency: SecondaryMap<FileNodeId, NodeAdjacency>,
    by_key: BTreeMap<FileKey, FileNodeId>,
}

impl DependencyGraph {
    /// Build the graph from per-file dependency sets.
    ///
    /// Every input file becomes a node; referenced targets that are not
    /// themselves inputs become nodes too, so edges always resolve.
    /// Duplicate `(from, to, kind)` edges collapse to one. A file may
    /// reference its own entities -- the resulting self-loop is kept but
    /// never treated as a cycle.
    pub fn build(files: &[FileDependencies]) -> Self {
        let mut graph = DependencyGraph {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            adjacency: SecondaryMap::new(),
            by_key: BTreeMap::new(),
        };

        // Sort inputs by key so node and edge insertion order is stable.
        let mut sorted: Vec<&FileDependencies> = files.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));

        for file in &sorted {
            graph.ensure_node(&file.key);
        }

        let mut seen: BTreeSet<(FileKey, FileKey, EdgeKind)> = BTreeSet::new();
        for file in &sorted {
            for (targets, kind) in [
                (&file.content, EdgeKind::Content),
                (&file.load_hints, EdgeKind::Load),
            ] {
                for target in targets.iter() {
                    if !seen.insert((file.key.clone(), target.clone(), kind)) {
                        continue;
                    }
                    let from = graph.ensure_node(&file.key);
                    let to = graph.ensure_node(target);
                    let edge = graph.edges.insert(EdgeData { from, to, kind });
                    graph.adjacency[from].outputs.push(edge);
                    graph.adjacency[to].inputs.push(edge);
                }
            }
        }

        graph
    }

    fn ensure_node(&mut self, key: &FileKey) -> FileNodeId {
        if let Some(&id) = self.by_key.get(key) {
            return id;
        }
        let id = self.nodes.insert(NodeData { key: key.clone() });
        self.adjacency.insert(id, NodeAdjacency::default());
        self.by_key.insert(key.clone(), id);
        id
    }

    // -- Queries --

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, key: &FileKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Files this file depends on, sorted and deduplicated across edge
    /// kinds.
    pub fn dependencies_of(&self, key: &FileKey) -> Vec<FileKey> {
        self.neighbor_keys(key, |adj| &adj.outputs, |e| e.to)
    }

    /// Files that depend on this file (reverse adjacency), sorted.
    pub fn dependents_of(&self, key: &FileKey) -> Vec<FileKey> {
        self.neighbor_keys(key, |adj| &adj.inputs, |e| e.from)
    }

    fn neighbor_keys(
        &self,
        key: &FileKey,
        select: impl Fn(&NodeAdjacency) -> &Vec<DepEdgeId>,
        endpoint: impl Fn(&EdgeData) -> FileNodeId,
    ) -> Vec<FileKey> {
        let Some(&id) = self.by_key.get(key) else {
            return Vec::new();
        };
        let mut keys: Vec<FileKey> = select(&self.adjacency[id])
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .map(|e| self.nodes[endpoint(e)].key.clone())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// The full forward adjacency as a sorted map, for callers that want
    /// the raw structure.
    pub fn adjacency_map(&self) -> BTreeMap<FileKey, Vec<FileKey>> {
        self.by_key
            .keys()
            .map(|key| (key.clone(), self.dependencies_of(key)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Cycle detection (three-color DFS)
    // -----------------------------------------------------------------------

    /// Find circular-dependency groups.
    ///
    /// Depth-first search with white/gray/black coloring; a back-edge to
    /// a gray node records the current path trimmed to the cycle. Start
    /// nodes and successors are visited in ascending key order, so the
    /// first group found is deterministic. A node belongs to at most one
    /// reported group per run; self-loops never form a group.
    pub fn find_cycles(&self) -> Vec<Vec<FileKey>> {
        let mut color: SecondaryMap<FileNodeId, Color> = SecondaryMap::new();
        for (id, _) in &self.nodes {
            color.insert(id, Color::White);
        }

        let mut cycles = Vec::new();
        let mut claimed: BTreeSet<FileNodeId> = BTreeSet::new();
        let mut path: Vec<FileNodeId> = Vec::new();

        for &start in self.by_key.values() {
            if color[start] == Color::White {
                self.dfs_visit(start, &mut color, &mut path, &mut cycles, &mut claimed);
            }
        }

        cycles
    }

    fn dfs_visit(
        &self,
        node: FileNodeId,
        color: &mut SecondaryMap<FileNodeId, Color>,
        path: &mut Vec<FileNodeId>,
        cycles: &mut Vec<Vec<FileKey>>,
        claimed: &mut BTreeSet<FileNodeId>,
    ) {
        color[node] = Color::Gray;
        path.push(node);

        for next in self.sorted_successors(node) {
            match color[next] {
                Color::White => self.dfs_visit(next, color, path, cycles, claimed),
                Color::Gray => {
                    // Back-edge: the path from `next` to the top is a cycle.
                    let pos = path
                        .iter()
                        .position(|&n| n == next)
                        .expect("gray node must be on the current path");
                    let group = &path[pos..];
                    if group.len() >= 2 && group.iter().all(|n| !claimed.contains(n)) {
                        claimed.extend(group.iter().copied());
                        cycles.push(group.iter().map(|&n| self.nodes[n].key.clone()).collect());
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        color[node] = Color::Black;
    }

    /// Distinct successors of a node in ascending key order, self-loops
    /// excluded.
    fn sorted_successors(&self, node: FileNodeId) -> Vec<FileNodeId> {
        let mut targets: Vec<FileNodeId> = self.adjacency[node]
            .outputs
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .filter(|e| e.to != node)
            .map(|e| e.to)
            .collect();
        targets.sort_by(|&a, &b| self.nodes[a].key.cmp(&self.nodes[b].key));
        targets.dedup();
        targets
    }

    // -----------------------------------------------------------------------
    // Load order (Kahn's algorithm)
    // -----------------------------------------------------------------------

    /// Compute the load order given the already-detected cycle groups.
    ///
    /// Kahn's algorithm over the subgraph induced by non-cycle nodes:
    /// edges touching a cycle member (and self-loops) are excluded so the
    /// acyclic remainder still produces a usable order. A file is ready
    /// when all of its dependencies are placed; ties among ready files
    /// break by ascending key. Cycle members are appended at the end in
    /// sorted order, flagged unordered.
    pub fn load_order(&self, cycles: &[Vec<FileKey>]) -> Vec<LoadOrderEntry> {
        let cycle_keys: BTreeSet<&FileKey> = cycles.iter().flatten().collect();

        // Count each non-cycle file's unplaced dependencies.
        let mut remaining: BTreeMap<&FileKey, usize> = self
            .by_key
            .keys()
            .filter(|k| !cycle_keys.contains(k))
            .map(|k| (k, 0))
            .collect();

        for (_, edge) in &self.edges {
            if edge.from == edge.to {
                continue;
            }
            let from = &self.nodes[edge.from].key;
            let to = &self.nodes[edge.to].key;
            if cycle_keys.contains(from) || cycle_keys.contains(to) {
                continue;
            }
            *remaining.get_mut(from).expect("endpoint interned at build") += 1;
        }

        let mut ready: BTreeSet<&FileKey> = remaining
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&k, _)| k)
            .collect();

        let mut order = Vec::with_capacity(self.by_key.len());

        while let Some(key) = ready.pop_first() {
            order.push(LoadOrderEntry::ordered(key.clone()));

            // Placing `key` satisfies one dependency of each dependent.
            let id = self.by_key[key];
            for &edge_id in &self.adjacency[id].inputs {
                let edge = &self.edges[edge_id];
                if edge.from == edge.to {
                    continue;
                }
                let dependent = &self.nodes[edge.from].key;
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        for &key in &cycle_keys {
            order.push(LoadOrderEntry::unordered(key.clone()));
        }

        order
    }

    /// One-shot extraction of cycles and load order.
    pub fn analyze(&self) -> GraphAnalysis {
        let cycles = self.find_cycles();
        let load_order = self.load_order(&cycles);
        GraphAnalysis { cycles, load_order }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

// ===========================================================================
// Tests
// ===========================================================================
