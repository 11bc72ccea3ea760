//! Parent/child relationships between states.
//!
//! The hierarchy is an arena of nodes addressed by stable indices. A state
//! gets a node the first time it is placed into a relationship; states that
//! were never placed are treated as isolated roots. Nodes are never removed,
//! only re-parented.

mod error;

pub use error::HierarchyError;

use crate::core::State;
use std::collections::{HashMap, HashSet};

type NodeId = usize;

#[derive(Clone, Debug)]
struct Node<S> {
    state: S,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Index of state positions in a forest of hierarchy trees.
///
/// # Example
///
/// ```rust
/// use statetree::hierarchy::HierarchyIndex;
///
/// let mut index = HierarchyIndex::new();
/// index.set_parent("Walk", Some("Move")).unwrap();
/// index.set_parent("Run", Some("Move")).unwrap();
///
/// assert_eq!(index.common_ancestor(&"Walk", &"Run"), Some("Move"));
/// assert_eq!(index.path_up(&"Walk", Some(&"Move")), vec!["Walk"]);
/// assert_eq!(index.path_down(None, &"Run"), vec!["Move", "Run"]);
/// ```
#[derive(Clone, Debug)]
pub struct HierarchyIndex<S: State> {
    nodes: Vec<Node<S>>,
    index: HashMap<S, NodeId>,
}

impl<S: State> HierarchyIndex<S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of states that have been placed into the hierarchy.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    /// Make `parent` the parent of `child`, or detach `child` with `None`.
    ///
    /// Fails without modifying anything if `parent` is `child` itself or
    /// one of its descendants.
    pub fn set_parent(&mut self, child: S, parent: Option<S>) -> Result<(), HierarchyError> {
        if let Some(parent) = &parent {
            if self.is_ancestor_or_self(&child, parent) {
                return Err(HierarchyError::Cycle {
                    child: format!("{child:?}"),
                    parent: format!("{parent:?}"),
                });
            }
        }

        let child_id = self.node_id(child);
        let parent_id = parent.map(|p| self.node_id(p));

        if self.nodes[child_id].parent == parent_id {
            return Ok(());
        }

        if let Some(old) = self.nodes[child_id].parent.take() {
            self.nodes[old].children.retain(|&id| id != child_id);
        }
        if let Some(new) = parent_id {
            self.nodes[new].children.push(child_id);
        }
        self.nodes[child_id].parent = parent_id;
        Ok(())
    }

    pub fn parent_of(&self, state: &S) -> Option<S> {
        let id = *self.index.get(state)?;
        let parent = self.nodes[id].parent?;
        Some(self.nodes[parent].state.clone())
    }

    /// Direct children of `state`, in the order they were attached.
    pub fn children_of(&self, state: &S) -> Vec<S> {
        match self.index.get(state) {
            Some(&id) => self.nodes[id]
                .children
                .iter()
                .map(|&c| self.nodes[c].state.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ancestors of `state`, nearest first, excluding `state` itself.
    pub fn ancestors(&self, state: &S) -> Vec<S> {
        let mut chain = self.chain(state);
        chain.remove(0);
        chain
    }

    /// Number of ancestors above `state`.
    pub fn depth(&self, state: &S) -> usize {
        self.chain(state).len() - 1
    }

    /// True if `ancestor` is `state` or lies above it.
    pub fn is_ancestor_or_self(&self, ancestor: &S, state: &S) -> bool {
        self.chain(state).iter().any(|s| s == ancestor)
    }

    /// Nearest state that is an ancestor-or-self of both `a` and `b`.
    ///
    /// Returns `None` when the two states live in different trees. A state
    /// never placed into the hierarchy is its own isolated root.
    pub fn common_ancestor(&self, a: &S, b: &S) -> Option<S> {
        let above_a: HashSet<S> = self.chain(a).into_iter().collect();
        self.chain(b).into_iter().find(|s| above_a.contains(s))
    }

    /// States from `from` up to, but excluding, `to_ancestor`, nearest first.
    ///
    /// With `None` (or an ancestor not on the chain) the path runs to the root.
    pub fn path_up(&self, from: &S, to_ancestor: Option<&S>) -> Vec<S> {
        let chain = self.chain(from);
        match to_ancestor {
            Some(stop) => chain.into_iter().take_while(|s| s != stop).collect(),
            None => chain,
        }
    }

    /// The mirror of [`path_up`](Self::path_up): ancestor-first, ending at
    /// and including `to`, excluding `from_ancestor`.
    pub fn path_down(&self, from_ancestor: Option<&S>, to: &S) -> Vec<S> {
        let mut path = self.path_up(to, from_ancestor);
        path.reverse();
        path
    }

    fn node_id(&mut self, state: S) -> NodeId {
        if let Some(&id) = self.index.get(&state) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            state: state.clone(),
            parent: None,
            children: Vec::new(),
        });
        self.index.insert(state, id);
        id
    }

    /// `state` followed by its ancestors, nearest first.
    fn chain(&self, state: &S) -> Vec<S> {
        let mut chain = vec![state.clone()];
        let mut cursor = self.index.get(state).and_then(|&id| self.nodes[id].parent);
        while let Some(id) = cursor {
            chain.push(self.nodes[id].state.clone());
            cursor = self.nodes[id].parent;
        }
        chain
    }
}

impl<S: State> Default for HierarchyIndex<S> {
    fn default() -> Self {
        Self::new()
    }
}
