//! Turn a [`Layout`] into drawing primitives and replay them on a surface.

use log::debug;

use crate::error::Result;
use crate::layout::{compute_layout, CanvasSize, Layout, LayoutParams, Metrics, Point};
use crate::tree::{ClusterNode, ClusterTree};

/// Offset of a leaf label from its anchor, on both axes.
pub const LABEL_OFFSET: i32 = 8;
/// Side of the square tick drawn on each child anchor of a merge.
pub const MARKER_SIZE: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Text { text: String, x: i32, y: i32 },
    Line { x0: i32, y0: i32, x1: i32, y1: i32 },
    FillRect { x: i32, y: i32, width: i32, height: i32 },
}

/// The drawing capabilities the renderer needs from a host.
pub trait Surface {
    /// `y` is the text baseline.
    fn draw_text(&mut self, text: &str, x: i32, y: i32);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32);
}

/// Records commands instead of drawing them.
impl Surface for Vec<DrawCommand> {
    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.push(DrawCommand::Line { x0, y0, x1, y1 });
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.push(DrawCommand::FillRect { x, y, width, height });
    }
}

impl DrawCommand {
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) {
        match self {
            DrawCommand::Text { text, x, y } => surface.draw_text(text, *x, *y),
            DrawCommand::Line { x0, y0, x1, y1 } => surface.draw_line(*x0, *y0, *x1, *y1),
            DrawCommand::FillRect { x, y, width, height } => surface.fill_rect(*x, *y, *width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { show_labels: true }
    }
}

fn marker(center: Point, margin: i32) -> DrawCommand {
    DrawCommand::FillRect {
        x: center.x + margin - MARKER_SIZE / 2,
        y: center.y + margin - MARKER_SIZE / 2,
        width: MARKER_SIZE,
        height: MARKER_SIZE,
    }
}

fn line(from: Point, to: Point, margin: i32) -> DrawCommand {
    DrawCommand::Line {
        x0: from.x + margin,
        y0: from.y + margin,
        x1: to.x + margin,
        y1: to.y + margin,
    }
}

/// Primitives for every node, in layout order, translated by the margin.
pub fn emit_draw_commands(tree: &ClusterTree, layout: &Layout, options: &RenderOptions) -> Vec<DrawCommand> {
    let margin = layout.margin as i32;
    let mut commands = Vec::with_capacity(layout.order().len() * 5);

    for &id in layout.order() {
        match tree.node(id) {
            ClusterNode::Leaf { centroid } => {
                if !options.show_labels {
                    continue;
                }
                if let Some(p) = layout.anchor(id) {
                    commands.push(DrawCommand::Text {
                        text: centroid.label(),
                        x: p.x + margin + LABEL_OFFSET,
                        y: p.y + margin + LABEL_OFFSET,
                    });
                }
            }
            ClusterNode::Merge { child1, child2 } => {
                let (Some(p0), Some(p1)) = (layout.anchor(*child1), layout.anchor(*child2)) else {
                    continue;
                };
                let vx = p0.x.min(p1.x) - layout.metrics.width_per_level;
                commands.push(marker(p0, margin));
                commands.push(marker(p1, margin));
                commands.push(line(Point::new(vx, p0.y), p0, margin));
                commands.push(line(Point::new(vx, p1.y), p1, margin));
                commands.push(line(Point::new(vx, p0.y), Point::new(vx, p1.y), margin));
            }
            // collapsed: drawn through its child
            ClusterNode::Unary { .. } => {}
        }
    }

    commands
}

/// Tab-separated table of leaves from top row to bottom row, with the
/// absolute y of each row.
pub fn leaf_order_tsv(tree: &ClusterTree, layout: &Layout) -> String {
    let mut content = String::from("leaf.label\trow\ty\n");
    for (row, &id) in layout.leaf_order().iter().enumerate() {
        if let (ClusterNode::Leaf { centroid }, Some(p)) = (tree.node(id), layout.anchor(id)) {
            content.push_str(&format!("{}\t{}\t{}\n", centroid.label(), row, p.y + layout.margin as i32));
        }
    }
    content
}

/// Lay out `tree` on `canvas` and draw it on `surface`.
pub fn render<S: Surface + ?Sized>(
    tree: &ClusterTree,
    canvas: CanvasSize,
    params: &LayoutParams,
    options: &RenderOptions,
    surface: &mut S,
) -> Result<Metrics> {
    let layout = compute_layout(tree, canvas, params)?;
    let commands = emit_draw_commands(tree, &layout, options);
    debug!("Drawing {} primitives", commands.len());
    for command in &commands {
        command.apply(surface);
    }
    Ok(layout.metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SingleChildPolicy;

    fn balanced_four() -> ClusterTree {
        let mut tree = ClusterTree::new();
        let l: Vec<_> = (0..4).map(|i| tree.add_leaf(i as f64, i as f64)).collect();
        let left = tree.add_merge(l[0], l[1]).unwrap();
        let right = tree.add_merge(l[2], l[3]).unwrap();
        tree.add_merge(left, right).unwrap();
        tree
    }

    fn texts(commands: &[DrawCommand]) -> Vec<(String, i32, i32)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, x, y } => Some((text.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_balanced_scenario() {
        let tree = balanced_four();
        let layout = compute_layout(&tree, CanvasSize::new(1000, 800), &LayoutParams::default()).unwrap();
        let commands = emit_draw_commands(&tree, &layout, &RenderOptions::default());

        let labels: Vec<String> = texts(&commands).into_iter().map(|(t, _, _)| t).collect();
        assert_eq!(labels, vec!["0x0", "1x1", "2x2", "3x3"]);

        let lines = commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count();
        let markers = commands.iter().filter(|c| matches!(c, DrawCommand::FillRect { .. })).count();
        assert_eq!(lines, 9);
        assert_eq!(markers, 6);

        let root = layout.anchor(tree.root().unwrap()).unwrap();
        for &leaf in layout.leaf_order() {
            assert!(root.x < layout.anchor(leaf).unwrap().x);
        }
    }

    #[test]
    fn test_single_leaf_draws_only_its_label() {
        let mut tree = ClusterTree::new();
        tree.add_leaf(2.5, 7.0);
        let layout = compute_layout(&tree, CanvasSize::new(400, 300), &LayoutParams::default()).unwrap();
        let wpl = layout.metrics.width_per_level;
        assert_eq!(wpl, 350);
        assert_eq!(layout.anchor(tree.root().unwrap()), Some(Point::new(400 - wpl, 0)));

        let commands = emit_draw_commands(&tree, &layout, &RenderOptions::default());
        assert_eq!(
            commands,
            vec![DrawCommand::Text {
                text: "2.5x7".to_string(),
                x: 400 - wpl + 25 + LABEL_OFFSET,
                y: 25 + LABEL_OFFSET,
            }]
        );
    }

    #[test]
    fn test_merge_emits_markers_then_bracket() {
        let mut tree = ClusterTree::new();
        let a = tree.add_leaf(0.0, 0.0);
        let b = tree.add_leaf(1.0, 0.0);
        tree.add_merge(a, b).unwrap();
        let params = LayoutParams { margin: 10, ..LayoutParams::default() };
        // usable 180x180: 90px per leaf, 90px per level
        let layout = compute_layout(&tree, CanvasSize::new(200, 200), &params).unwrap();
        let commands = emit_draw_commands(&tree, &layout, &RenderOptions { show_labels: false });

        let (leaf_x, vx) = (200 - 90 + 10, 200 - 180 + 10);
        let (y0, y1) = (10, 100);
        assert_eq!(
            commands,
            vec![
                DrawCommand::FillRect { x: leaf_x - 2, y: y0 - 2, width: 4, height: 4 },
                DrawCommand::FillRect { x: leaf_x - 2, y: y1 - 2, width: 4, height: 4 },
                DrawCommand::Line { x0: vx, y0, x1: leaf_x, y1: y0 },
                DrawCommand::Line { x0: vx, y0: y1, x1: leaf_x, y1 },
                DrawCommand::Line { x0: vx, y0, x1: vx, y1 },
            ]
        );
    }

    #[test]
    fn test_labels_follow_rows() {
        let tree = balanced_four();
        let layout = compute_layout(&tree, CanvasSize::new(1000, 800), &LayoutParams::default()).unwrap();
        let hpl = layout.metrics.height_per_leaf;
        let labels = texts(&emit_draw_commands(&tree, &layout, &RenderOptions::default()));
        for pair in labels.windows(2) {
            assert_eq!(pair[1].2 - pair[0].2, hpl);
            assert_eq!(pair[1].1, pair[0].1);
        }
    }

    #[test]
    fn test_leaf_order_table() {
        let tree = balanced_four();
        let layout = compute_layout(&tree, CanvasSize::new(1000, 800), &LayoutParams::default()).unwrap();
        let table = leaf_order_tsv(&tree, &layout);
        assert_eq!(table, "leaf.label\trow\ty\n0x0\t0\t25\n1x1\t1\t213\n2x2\t2\t401\n3x3\t3\t589\n");
    }

    #[test]
    fn test_render_is_idempotent() {
        let tree = balanced_four();
        let canvas = CanvasSize::new(640, 480);
        let params = LayoutParams::default();
        let mut first: Vec<DrawCommand> = Vec::new();
        let mut second: Vec<DrawCommand> = Vec::new();
        let m1 = render(&tree, canvas, &params, &RenderOptions::default(), &mut first).unwrap();
        let m2 = render(&tree, canvas, &params, &RenderOptions::default(), &mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_collapsed_unary_draws_nothing_extra() {
        let mut tree = ClusterTree::new();
        let a = tree.add_leaf(0.0, 0.0);
        let b = tree.add_leaf(1.0, 1.0);
        let lone = tree.add_unary(b).unwrap();
        tree.add_merge(a, lone).unwrap();
        let params = LayoutParams {
            single_child: SingleChildPolicy::Collapse,
            ..LayoutParams::default()
        };
        let mut commands: Vec<DrawCommand> = Vec::new();
        render(&tree, CanvasSize::new(300, 300), &params, &RenderOptions::default(), &mut commands).unwrap();
        assert_eq!(texts(&commands).len(), 2);
        assert_eq!(commands.len(), 2 + 5);
    }
}
