use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};

use dendrolook::{
    compute_layout, emit_draw_commands, fit_canvas, leaf_order_tsv, load_merge_file, CanvasSize, ClusterTree,
    LayoutParams, RasterSurface, RenderOptions, SingleChildPolicy, Surface, SvgSurface,
};

#[derive(Parser)]
#[command(name = "dendrolook")]
#[command(about = "Draw a hierarchical clustering tree as a dendrogram.", long_about = None)]
struct Args {
    // MANDATORY OPTIONS
    /// Load the cluster tree from this merge FILE.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Write the dendrogram to this FILE (PNG or SVG based on extension).
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: PathBuf,

    // Canvas Options
    /// Set the width in pixels of the output image.
    #[arg(short = 'x', long = "width", value_name = "N", default_value_t = 1000)]
    width: u32,

    /// Set the height in pixels of the output image; grown when the tree needs more rows.
    #[arg(short = 'y', long = "height", value_name = "N", default_value_t = 800)]
    height: u32,

    /// Blank border in pixels around the dendrogram.
    #[arg(short = 'm', long = "margin", value_name = "N", default_value_t = dendrolook::layout::DEFAULT_MARGIN)]
    margin: u32,

    /// Smallest height in pixels of a leaf row.
    #[arg(short = 'e', long = "min-height-per-leaf", value_name = "N",
          value_parser = clap::value_parser!(i32).range(1..),
          default_value_t = dendrolook::layout::DEFAULT_MIN_HEIGHT_PER_LEAF)]
    min_height_per_leaf: i32,

    /// Smallest width in pixels of a tree level (unclamped if not given).
    #[arg(short = 'w', long = "min-width-per-level", value_name = "N")]
    min_width_per_level: Option<i32>,

    // Tree Options
    /// Draw single-child nodes as their child instead of failing.
    #[arg(short = 'c', long = "collapse-single-child")]
    collapse_single_child: bool,

    // Label Options
    /// Hide the centroid labels next to the leaves.
    #[arg(short = 'H', long = "hide-labels")]
    hide_labels: bool,

    /// Also write the leaf rows to <out>.leaves.tsv.
    #[arg(short = 'l', long = "leaf-order")]
    leaf_order: bool,

    // Logging
    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1)]
    verbose: u8,
}

impl Args {
    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            margin: self.margin,
            min_height_per_leaf: self.min_height_per_leaf,
            min_width_per_level: self.min_width_per_level,
            single_child: if self.collapse_single_child {
                SingleChildPolicy::Collapse
            } else {
                SingleChildPolicy::Reject
            },
        }
    }
}

/// Write the leaf rows next to the output: foo.png -> foo.leaves.tsv
fn write_leaf_tsv(output_path: &Path, content: String) -> dendrolook::Result<()> {
    let tsv_path = output_path.with_extension("leaves.tsv");
    std::fs::write(&tsv_path, content)?;
    info!("Leaf order saved to {:?}", tsv_path);
    Ok(())
}

fn draw_into<S: Surface>(surface: &mut S, commands: &[dendrolook::DrawCommand]) {
    for command in commands {
        command.apply(surface);
    }
}

fn run(args: &Args, tree: &ClusterTree) -> dendrolook::Result<()> {
    let params = args.layout_params();
    let options = RenderOptions {
        show_labels: !args.hide_labels,
    };

    let requested = CanvasSize::new(args.width, args.height);
    let canvas = fit_canvas(tree, requested, &params)?;
    if canvas != requested {
        info!(
            "Growing canvas from {}x{} to {}x{} to fit every leaf",
            requested.width, requested.height, canvas.width, canvas.height
        );
    }

    let layout = compute_layout(tree, canvas, &params)?;
    let commands = emit_draw_commands(tree, &layout, &options);
    debug!(
        "{} leaves over {} levels, {} primitives",
        layout.metrics.leaves,
        layout.metrics.levels,
        commands.len()
    );

    // Detect output format by file extension
    let is_svg = args
        .out
        .extension()
        .map(|ext| ext.to_ascii_lowercase() == "svg")
        .unwrap_or(false);

    if is_svg {
        info!("Rendering SVG...");
        let mut surface = SvgSurface::new(canvas.width, canvas.height);
        draw_into(&mut surface, &commands);
        surface.save(&args.out)?;
    } else {
        info!("Rendering image...");
        let mut surface = RasterSurface::new(canvas.width, canvas.height);
        draw_into(&mut surface, &commands);
        surface.save(&args.out)?;
    }

    if args.leaf_order {
        write_leaf_tsv(&args.out, leaf_order_tsv(tree, &layout))?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    info!("Starting dendrogram...");

    let tree = match load_merge_file(&args.input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error loading merge file: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &tree) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("Done.");
}
