//! Arena-backed binary cluster tree.
//!
//! Nodes are appended bottom-up, the way a clustering run emits merges, and
//! addressed by [`NodeId`]. A parent can only refer to nodes that already
//! exist and that no other parent has claimed, so the arena never contains
//! cycles or shared subtrees.

use std::fmt;

use crate::error::{Error, Result};

/// Stable index of a node inside a [`ClusterTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Centroid of the data point a leaf stands for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn new(x: f64, y: f64) -> Self {
        Centroid { x, y }
    }

    /// Text drawn next to a leaf, e.g. `1.5x2`.
    pub fn label(&self) -> String {
        format!("{}x{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClusterNode {
    Leaf { centroid: Centroid },
    Merge { child1: NodeId, child2: NodeId },
    /// A merge that lost one of its children. Kept representable so the
    /// layout can apply its single-child policy instead of guessing.
    Unary { child: NodeId },
}

impl ClusterNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, ClusterNode::Leaf { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterTree {
    nodes: Vec<ClusterNode>,
    has_parent: Vec<bool>,
}

impl ClusterTree {
    pub fn new() -> Self {
        ClusterTree {
            nodes: Vec::new(),
            has_parent: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The most recently added node, i.e. the final merge.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1).map(NodeId)
    }

    /// # Panics
    ///
    /// If `id` was not handed out by this tree. Use [`ClusterTree::get`] for
    /// ids of unknown origin.
    pub fn node(&self, id: NodeId) -> &ClusterNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ClusterNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ClusterNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn add_leaf(&mut self, x: f64, y: f64) -> NodeId {
        self.push(ClusterNode::Leaf {
            centroid: Centroid::new(x, y),
        })
    }

    pub fn add_merge(&mut self, child1: NodeId, child2: NodeId) -> Result<NodeId> {
        self.check_orphan(child1)?;
        self.check_orphan(child2)?;
        if child1 == child2 {
            return Err(Error::InvalidInput(format!(
                "node {} cannot be merged with itself",
                child1
            )));
        }
        self.has_parent[child1.0] = true;
        self.has_parent[child2.0] = true;
        Ok(self.push(ClusterNode::Merge { child1, child2 }))
    }

    pub fn add_unary(&mut self, child: NodeId) -> Result<NodeId> {
        self.check_orphan(child)?;
        self.has_parent[child.0] = true;
        Ok(self.push(ClusterNode::Unary { child }))
    }

    fn push(&mut self, node: ClusterNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.has_parent.push(false);
        id
    }

    /// A child must exist and must not belong to another merge yet.
    fn check_orphan(&self, id: NodeId) -> Result<()> {
        match self.has_parent.get(id.0) {
            None => Err(Error::InvalidInput(format!("unknown child node {}", id))),
            Some(true) => Err(Error::InvalidInput(format!("node {} already has a parent", id))),
            Some(false) => Ok(()),
        }
    }
}
