//! Scale factors and node positions for a right-to-left dendrogram.
//!
//! Leaves sit in one column near the right edge, one row each, in
//! child1-before-child2 order. Every merge moves one `width_per_level`
//! further left and sits halfway between its children. All coordinates here
//! are relative to the margin; the renderer applies the translation.

use log::debug;

use crate::error::{Error, Result};
use crate::tree::{ClusterNode, ClusterTree, NodeId};

pub const DEFAULT_MARGIN: u32 = 25;
pub const DEFAULT_MIN_HEIGHT_PER_LEAF: i32 = 4;

/// What to do with a node that has exactly one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleChildPolicy {
    /// Fail with [`Error::MalformedNode`].
    #[default]
    Reject,
    /// Treat the node as its child: same anchor, no extra level, no drawing.
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub margin: u32,
    pub min_height_per_leaf: i32,
    /// `None` keeps the unclamped column width, which collapses every
    /// connector onto one vertical line when the canvas is too narrow.
    pub min_width_per_level: Option<i32>,
    pub single_child: SingleChildPolicy,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            margin: DEFAULT_MARGIN,
            min_height_per_leaf: DEFAULT_MIN_HEIGHT_PER_LEAF,
            min_width_per_level: None,
            single_child: SingleChildPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        CanvasSize { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Per-render quantities derived from tree shape and canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub leaves: usize,
    pub levels: usize,
    pub height_per_leaf: i32,
    pub width_per_level: i32,
    /// Canvas height that shows every leaf row without clipping.
    pub preferred_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub canvas: CanvasSize,
    pub margin: u32,
    pub metrics: Metrics,
    anchors: Vec<Option<Point>>,
    order: Vec<NodeId>,
    leaf_order: Vec<NodeId>,
}

impl Layout {
    /// Anchor of a node reachable from the root, margin-relative.
    pub fn anchor(&self, id: NodeId) -> Option<Point> {
        self.anchors.get(id.index()).copied().flatten()
    }

    /// Post-order visiting sequence: child1 subtree, child2 subtree, node.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Leaves from top row to bottom row.
    pub fn leaf_order(&self) -> &[NodeId] {
        &self.leaf_order
    }
}

/// Java-style `Math.round`: halves go up, also for negative values.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn lookup(tree: &ClusterTree, id: NodeId) -> Result<&ClusterNode> {
    tree.get(id)
        .ok_or_else(|| Error::InvalidInput(format!("node {} is not part of this tree", id)))
}

fn collapse_or_reject(policy: SingleChildPolicy, node: NodeId, child: NodeId) -> Result<NodeId> {
    match policy {
        SingleChildPolicy::Collapse => Ok(child),
        SingleChildPolicy::Reject => Err(Error::MalformedNode { node }),
    }
}

pub fn count_leaves(tree: &ClusterTree, node: NodeId, policy: SingleChildPolicy) -> Result<usize> {
    let mut count = 0;
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        match *lookup(tree, id)? {
            ClusterNode::Leaf { .. } => count += 1,
            ClusterNode::Merge { child1, child2 } => {
                stack.push(child1);
                stack.push(child2);
            }
            ClusterNode::Unary { child } => stack.push(collapse_or_reject(policy, id, child)?),
        }
    }
    Ok(count)
}

/// Longest root-to-leaf path, counting the root's own level.
pub fn count_levels(tree: &ClusterTree, node: NodeId, policy: SingleChildPolicy) -> Result<usize> {
    let mut levels = 0;
    let mut stack = vec![(node, 1usize)];
    while let Some((id, depth)) = stack.pop() {
        match *lookup(tree, id)? {
            ClusterNode::Leaf { .. } => levels = levels.max(depth),
            ClusterNode::Merge { child1, child2 } => {
                stack.push((child1, depth + 1));
                stack.push((child2, depth + 1));
            }
            ClusterNode::Unary { child } => {
                stack.push((collapse_or_reject(policy, id, child)?, depth));
            }
        }
    }
    Ok(levels)
}

pub fn height_per_leaf(
    canvas_height: u32,
    margin: u32,
    leaves: usize,
    min_height_per_leaf: i32,
) -> Result<i32> {
    if leaves == 0 {
        return Err(Error::InvalidInput("cannot lay out a tree without leaves".into()));
    }
    let usable = canvas_height as f64 - 2.0 * margin as f64;
    Ok(round_half_up(usable / leaves as f64).max(min_height_per_leaf))
}

pub fn width_per_level(
    canvas_width: u32,
    margin: u32,
    levels: usize,
    min_width_per_level: Option<i32>,
) -> Result<i32> {
    if levels == 0 {
        return Err(Error::InvalidInput("cannot lay out a tree without levels".into()));
    }
    let usable = canvas_width as f64 - 2.0 * margin as f64;
    let width = round_half_up(usable / levels as f64);
    Ok(match min_width_per_level {
        Some(min) => width.max(min),
        None => width,
    })
}

fn root_of(tree: &ClusterTree) -> Result<NodeId> {
    tree.root().ok_or(Error::EmptyTree)
}

fn check_canvas(canvas: CanvasSize) -> Result<()> {
    if canvas.width > i32::MAX as u32 || canvas.height > i32::MAX as u32 {
        return Err(Error::InvalidInput(format!(
            "canvas {}x{} exceeds the coordinate range",
            canvas.width, canvas.height
        )));
    }
    if canvas.width == 0 || canvas.height == 0 {
        return Err(Error::InvalidInput(format!(
            "canvas {}x{} has no drawable area",
            canvas.width, canvas.height
        )));
    }
    Ok(())
}

pub fn measure(tree: &ClusterTree, canvas: CanvasSize, params: &LayoutParams) -> Result<Metrics> {
    check_canvas(canvas)?;
    if params.min_height_per_leaf < 1 {
        return Err(Error::InvalidInput(format!(
            "minimum height per leaf must be at least 1px, got {}",
            params.min_height_per_leaf
        )));
    }
    let root = root_of(tree)?;
    let leaves = count_leaves(tree, root, params.single_child)?;
    let levels = count_levels(tree, root, params.single_child)?;
    let height_per_leaf = height_per_leaf(canvas.height, params.margin, leaves, params.min_height_per_leaf)?;
    let width_per_level = width_per_level(canvas.width, params.margin, levels, params.min_width_per_level)?;
    let rows = (height_per_leaf.max(0) as u64) * leaves as u64 + 2 * params.margin as u64;
    let preferred_height = u32::try_from(rows).unwrap_or(u32::MAX);

    debug!(
        "{} leaves, {} levels, {}px per leaf, {}px per level",
        leaves, levels, height_per_leaf, width_per_level
    );

    Ok(Metrics {
        leaves,
        levels,
        height_per_leaf,
        width_per_level,
        preferred_height,
    })
}

/// Grow the canvas height to the preferred height when the clamped row height
/// no longer fits. Width is left alone and the canvas never shrinks.
pub fn fit_canvas(tree: &ClusterTree, canvas: CanvasSize, params: &LayoutParams) -> Result<CanvasSize> {
    let metrics = measure(tree, canvas, params)?;
    Ok(CanvasSize::new(canvas.width, canvas.height.max(metrics.preferred_height)))
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

fn resolved(anchors: &[Option<Point>], id: NodeId) -> Result<Point> {
    anchors[id.index()]
        .ok_or_else(|| Error::InvalidInput(format!("node {} has no position yet", id)))
}

pub fn compute_layout(tree: &ClusterTree, canvas: CanvasSize, params: &LayoutParams) -> Result<Layout> {
    let metrics = measure(tree, canvas, params)?;
    let root = root_of(tree)?;

    let overflow = || Error::InvalidInput("layout leaves the 32-bit coordinate range".into());
    let leaf_x = i32::try_from(canvas.width)
        .map_err(|_| overflow())?
        .checked_sub(metrics.width_per_level)
        .ok_or_else(overflow)?;
    let mut current_y = 0i32;
    let mut anchors: Vec<Option<Point>> = vec![None; tree.len()];
    let mut order = Vec::with_capacity(tree.len());
    let mut leaf_order = Vec::with_capacity(metrics.leaves);

    let mut stack = vec![Visit::Enter(root)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(id) => match *tree.node(id) {
                ClusterNode::Leaf { .. } => {
                    anchors[id.index()] = Some(Point::new(leaf_x, current_y));
                    current_y = current_y
                        .checked_add(metrics.height_per_leaf)
                        .ok_or_else(overflow)?;
                    order.push(id);
                    leaf_order.push(id);
                }
                ClusterNode::Merge { child1, child2 } => {
                    stack.push(Visit::Exit(id));
                    stack.push(Visit::Enter(child2));
                    stack.push(Visit::Enter(child1));
                }
                ClusterNode::Unary { child } => {
                    let child = collapse_or_reject(params.single_child, id, child)?;
                    stack.push(Visit::Exit(id));
                    stack.push(Visit::Enter(child));
                }
            },
            Visit::Exit(id) => {
                let anchor = match *tree.node(id) {
                    ClusterNode::Merge { child1, child2 } => {
                        let p0 = resolved(&anchors, child1)?;
                        let p1 = resolved(&anchors, child2)?;
                        let vx = p0
                            .x
                            .min(p1.x)
                            .checked_sub(metrics.width_per_level)
                            .ok_or_else(overflow)?;
                        Point::new(vx, p0.y + (p1.y - p0.y) / 2)
                    }
                    ClusterNode::Unary { child } => resolved(&anchors, child)?,
                    ClusterNode::Leaf { .. } => continue,
                };
                anchors[id.index()] = Some(anchor);
                order.push(id);
            }
        }
    }

    Ok(Layout {
        canvas,
        margin: params.margin,
        metrics,
        anchors,
        order,
        leaf_order,
    })
}
