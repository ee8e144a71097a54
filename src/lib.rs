//! Dendrogram layout and rendering for binary hierarchical-clustering trees.
//!
//! Leaves are stacked in a column near the right edge of the canvas, one row
//! each; every merge is a bracket one column further left, halfway between
//! the two clusters it joins. Layout ([`compute_layout`]) and drawing
//! ([`emit_draw_commands`], [`render`]) are separate passes, so geometry can
//! be inspected without any drawing surface.

pub mod draw;
pub mod error;
pub mod layout;
pub mod parse;
pub mod raster;
pub mod svg;
pub mod tree;

pub use draw::{emit_draw_commands, leaf_order_tsv, render, DrawCommand, RenderOptions, Surface};
pub use error::{Error, Result};
pub use layout::{
    compute_layout, count_leaves, count_levels, fit_canvas, height_per_leaf, measure, width_per_level,
    CanvasSize, Layout, LayoutParams, Metrics, Point, SingleChildPolicy,
};
pub use parse::{load_merge_file, parse_merges};
pub use raster::RasterSurface;
pub use svg::SvgSurface;
pub use tree::{Centroid, ClusterNode, ClusterTree, NodeId};
