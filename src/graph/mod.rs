//! Reactive cell graph
//!
//! An explicit DAG of named computations over a single state struct `S`.
//!
//! ```text
//! GraphBuilder ──build──► CellGraph<S>
//!   .parameter("sigma")      │  order: topological (Kahn), declaration order breaks ties
//!   .cell("data", ["sigma"]) │  dirty: one flag per node
//!   .cell("r", ["data"])     │
//!                            └─ update("sigma", apply)
//!                                 1. apply mutation to a staged copy of S
//!                                 2. flag every transitive dependent dirty
//!                                 3. walk the order, run each dirty cell once
//!                                 4. commit staged state, or discard it on failure
//! ```
//!
//! Cells write their output into their own field of `S`; they see `&mut S`
//! and nothing else, so a cell cannot mutate a parameter of the graph that
//! is running it.
//!
//! ## Example
//!
//! ```rust
//! use relationship_explorer::graph::GraphBuilder;
//!
//! #[derive(Clone, Default)]
//! struct State { a: i64, doubled: i64, constant: i64 }
//!
//! let mut graph = GraphBuilder::new()
//!     .parameter("a")
//!     .cell("doubled", &["a"], |s: &mut State| { s.doubled = s.a * 2; Ok(()) })
//!     .cell("constant", &[], |s: &mut State| { s.constant = 7; Ok(()) })
//!     .build(State::default())?;
//!
//! let pass = graph.update("a", |s| { s.a = 21; Ok(()) })?;
//! assert_eq!(graph.state().doubled, 42);
//! assert_eq!(pass.recomputed(), ["doubled"]);
//! assert_eq!(graph.run_count("constant"), Some(1));
//! # Ok::<(), relationship_explorer::Error>(())
//! ```

mod pass;

pub use pass::PassRecord;

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use chrono::Utc;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Pass history is capped to the most recent records.
pub const HISTORY_LIMIT: usize = 256;

/// Trigger name recorded for the initial pass run by [`GraphBuilder::build`].
pub const BUILD_TRIGGER: &str = "build";

/// Trigger name recorded for [`CellGraph::recompute_all`].
pub const ALL_TRIGGER: &str = "all";

/// Boxed cell computation.
pub type CellFn<S> = Box<dyn Fn(&mut S) -> Result<()>>;

enum NodeKind<S> {
    Parameter,
    Cell(CellFn<S>),
}

struct Declaration<S> {
    name: String,
    inputs: Vec<String>,
    kind: NodeKind<S>,
}

struct Node<S> {
    name: String,
    inputs: Vec<usize>,
    dependents: Vec<usize>,
    kind: NodeKind<S>,
    dirty: bool,
    runs: u64,
}

impl<S> Node<S> {
    const fn is_parameter(&self) -> bool {
        matches!(self.kind, NodeKind::Parameter)
    }
}

/// Declares parameters and cells, then validates and builds a [`CellGraph`].
pub struct GraphBuilder<S> {
    declarations: Vec<Declaration<S>>,
}

impl<S> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }
}

impl<S: Clone> GraphBuilder<S> {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter: a source node set from outside via
    /// [`CellGraph::update`].
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.declarations.push(Declaration {
            name: name.into(),
            inputs: Vec::new(),
            kind: NodeKind::Parameter,
        });
        self
    }

    /// Declare a cell with its inputs and computation.
    ///
    /// Inputs may name parameters or other cells, declared before or after.
    #[must_use]
    pub fn cell<F>(mut self, name: impl Into<String>, inputs: &[&str], compute: F) -> Self
    where
        F: Fn(&mut S) -> Result<()> + 'static,
    {
        self.declarations.push(Declaration {
            name: name.into(),
            inputs: inputs.iter().map(|s| (*s).to_string()).collect(),
            kind: NodeKind::Cell(Box::new(compute)),
        });
        self
    }

    /// Validate the declarations, order them, and run every cell once.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` for an empty name
    /// - `Error::DuplicateCell` if a name is declared twice
    /// - `Error::UnknownCell` if an input names nothing declared
    /// - `Error::CycleDetected` if the dependencies are not acyclic
    /// - `Error::CellFailed` if a cell fails during the initial pass
    pub fn build(self, initial: S) -> Result<CellGraph<S>> {
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        for (id, decl) in self.declarations.iter().enumerate() {
            if decl.name.is_empty() {
                return Err(Error::InvalidInput("cell name must not be empty".to_string()));
            }
            if index.insert(decl.name.clone(), id).is_some() {
                return Err(Error::DuplicateCell(decl.name.clone()));
            }
        }

        let mut nodes = Vec::with_capacity(self.declarations.len());
        for decl in self.declarations {
            let mut inputs = Vec::with_capacity(decl.inputs.len());
            for input in &decl.inputs {
                let id = *index
                    .get(input)
                    .ok_or_else(|| Error::UnknownCell(input.clone()))?;
                if !inputs.contains(&id) {
                    inputs.push(id);
                }
            }
            nodes.push(Node {
                name: decl.name,
                inputs,
                dependents: Vec::new(),
                kind: decl.kind,
                dirty: false,
                runs: 0,
            });
        }

        for id in 0..nodes.len() {
            for input in nodes[id].inputs.clone() {
                nodes[input].dependents.push(id);
            }
        }

        let order = topological_order(&nodes)?;

        let mut graph = CellGraph {
            state: initial,
            nodes,
            index,
            order,
            history: VecDeque::new(),
            next_pass: 0,
        };

        for node in &mut graph.nodes {
            node.dirty = !node.is_parameter();
        }
        let staged = graph.state.clone();
        graph.run_pass(staged, BUILD_TRIGGER)?;

        info!(nodes = graph.nodes.len(), "cell graph built");
        Ok(graph)
    }
}

/// Kahn's algorithm; the lowest declaration index among ready nodes goes first.
fn topological_order<S>(nodes: &[Node<S>]) -> Result<Vec<usize>> {
    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.inputs.len()).collect();
    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(id) = ready.pop_first() {
        order.push(id);
        for &dependent in &nodes[id].dependents {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < nodes.len() {
        let stuck = (0..nodes.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| nodes[i].name.clone())
            .collect();
        return Err(Error::CycleDetected(stuck));
    }
    Ok(order)
}

/// A built, always-consistent reactive graph over state `S`.
pub struct CellGraph<S> {
    state: S,
    nodes: Vec<Node<S>>,
    index: FxHashMap<String, usize>,
    order: Vec<usize>,
    history: VecDeque<PassRecord>,
    next_pass: u64,
}

impl<S: Clone> CellGraph<S> {
    /// Committed state: every cell output is consistent with current inputs.
    #[must_use]
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Number of nodes (parameters and cells)
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if a parameter or cell with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Node names in evaluation order.
    #[must_use]
    pub fn order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&id| self.nodes[id].name.as_str())
            .collect()
    }

    /// Declared inputs of a node.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCell` if the name is not declared
    pub fn inputs_of(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.lookup(name)?;
        Ok(self.nodes[id]
            .inputs
            .iter()
            .map(|&i| self.nodes[i].name.as_str())
            .collect())
    }

    /// Every node transitively downstream of `name`, in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCell` if the name is not declared
    pub fn dependents_of(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.lookup(name)?;
        let affected = self.affected_by(id);
        Ok(self
            .order
            .iter()
            .filter(|&&i| affected[i])
            .map(|&i| self.nodes[i].name.as_str())
            .collect())
    }

    /// How many committed passes have run this cell (`None` if unknown).
    #[must_use]
    pub fn run_count(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|&id| self.nodes[id].runs)
    }

    /// Dirty flag of a node (`None` if unknown). Always `false` between passes.
    #[must_use]
    pub fn is_dirty(&self, name: &str) -> Option<bool> {
        self.index.get(name).map(|&id| self.nodes[id].dirty)
    }

    /// Recent committed passes, oldest first.
    pub fn passes(&self) -> impl Iterator<Item = &PassRecord> {
        self.history.iter()
    }

    /// Most recent committed pass
    #[must_use]
    pub fn last_pass(&self) -> Option<&PassRecord> {
        self.history.back()
    }

    /// Mutate a parameter and recompute everything downstream of it.
    ///
    /// `apply` writes the new parameter value into the state. It runs on a
    /// staged copy, as does every recomputed cell; the copy replaces the
    /// committed state only if the whole pass succeeds.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownCell` / `Error::InvalidInput` if `param` is not a
    ///   declared parameter
    /// - any error returned by `apply`, unchanged
    /// - `Error::CellFailed` if a downstream cell fails
    ///
    /// On every error the committed state, run counts and dirty flags are
    /// exactly as before the call.
    pub fn update<F>(&mut self, param: &str, apply: F) -> Result<PassRecord>
    where
        F: FnOnce(&mut S) -> Result<()>,
    {
        let id = self.lookup(param)?;
        if !self.nodes[id].is_parameter() {
            return Err(Error::InvalidInput(format!(
                "'{param}' is a cell, not a parameter"
            )));
        }

        let mut staged = self.state.clone();
        apply(&mut staged)?;

        let affected = self.affected_by(id);
        for (node, hit) in self.nodes.iter_mut().zip(affected) {
            node.dirty = hit;
        }
        self.run_pass(staged, param)
    }

    /// Recompute every cell, e.g. after an external resource changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::CellFailed` if a cell fails; nothing is committed
    pub fn recompute_all(&mut self) -> Result<PassRecord> {
        for node in &mut self.nodes {
            node.dirty = !node.is_parameter();
        }
        let staged = self.state.clone();
        self.run_pass(staged, ALL_TRIGGER)
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownCell(name.to_string()))
    }

    /// Flags for every node strictly downstream of `root`.
    fn affected_by(&self, root: usize) -> Vec<bool> {
        let mut affected = vec![false; self.nodes.len()];
        let mut queue: VecDeque<usize> = self.nodes[root].dependents.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if !affected[id] {
                affected[id] = true;
                queue.extend(self.nodes[id].dependents.iter().copied());
            }
        }
        affected
    }

    fn run_pass(&mut self, mut staged: S, trigger: &str) -> Result<PassRecord> {
        let started_at = Utc::now();
        let mut recomputed = Vec::new();

        for &id in &self.order {
            let node = &self.nodes[id];
            if !node.dirty {
                continue;
            }
            if let NodeKind::Cell(compute) = &node.kind {
                debug!(cell = %node.name, trigger, "recomputing cell");
                if let Err(source) = compute(&mut staged) {
                    let cell = node.name.clone();
                    for node in &mut self.nodes {
                        node.dirty = false;
                    }
                    warn!(%cell, trigger, error = %source, "cell failed, pass discarded");
                    return Err(Error::CellFailed {
                        cell,
                        source: Box::new(source),
                    });
                }
                recomputed.push(id);
            }
        }

        self.state = staged;
        for node in &mut self.nodes {
            node.dirty = false;
        }
        for &id in &recomputed {
            self.nodes[id].runs += 1;
        }

        let names = recomputed
            .iter()
            .map(|&id| self.nodes[id].name.clone())
            .collect::<Vec<_>>();
        let record = PassRecord::new(self.next_pass, trigger, names, started_at);
        self.next_pass += 1;

        info!(
            pass = record.pass(),
            trigger,
            recomputed = record.recomputed().len(),
            "recomputation pass committed"
        );

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(record.clone());
        Ok(record)
    }
}

impl<S> fmt::Debug for CellGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order: Vec<&str> = self
            .order
            .iter()
            .map(|&id| self.nodes[id].name.as_str())
            .collect();
        f.debug_struct("CellGraph")
            .field("order", &order)
            .field("passes", &self.next_pass)
            .finish_non_exhaustive()
    }
}
