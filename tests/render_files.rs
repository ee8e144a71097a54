use std::fs;

use dendrolook::{
    fit_canvas, load_merge_file, render, CanvasSize, DrawCommand, Error, LayoutParams, RasterSurface,
    RenderOptions, SingleChildPolicy, SvgSurface,
};

const FOUR_POINTS: &str = "\
# balanced tree over four centroids
L\ta\t0\t0
L\tb\t1\t1
M\tab\ta\tb
L\tc\t2\t2
L\td\t3\t3
M\tcd\tc\td
M\troot\tab\tcd
";

fn write_merge_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn png_output_has_canvas_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_merge_file(&dir, "four.tsv", FOUR_POINTS);
    let tree = load_merge_file(&input).unwrap();

    let canvas = CanvasSize::new(1000, 800);
    let mut surface = RasterSurface::new(canvas.width, canvas.height);
    let metrics = render(&tree, canvas, &LayoutParams::default(), &RenderOptions::default(), &mut surface).unwrap();
    assert_eq!(metrics.leaves, 4);
    assert_eq!(metrics.levels, 3);

    let out = dir.path().join("four.png");
    surface.save(&out).unwrap();
    let img = image::open(&out).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (1000, 800));

    // the root bracket's vertical line: leaves at x=1000-317, root two levels left
    let vx = 1000 - 3 * 317 + 25;
    let mid_of_left_pair = 25 + 188 / 2;
    assert_eq!(img.get_pixel(vx as u32, (mid_of_left_pair + 50) as u32).0, [0, 0, 0]);
    assert_eq!(img.get_pixel(5, 5).0, [255, 255, 255]);
}

#[test]
fn svg_output_lists_every_primitive() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_merge_file(&dir, "four.tsv", FOUR_POINTS);
    let tree = load_merge_file(&input).unwrap();

    let canvas = CanvasSize::new(600, 400);
    let mut recorded: Vec<DrawCommand> = Vec::new();
    let mut surface = SvgSurface::new(canvas.width, canvas.height);
    render(&tree, canvas, &LayoutParams::default(), &RenderOptions::default(), &mut recorded).unwrap();
    render(&tree, canvas, &LayoutParams::default(), &RenderOptions::default(), &mut surface).unwrap();

    let out = dir.path().join("four.svg");
    surface.save(&out).unwrap();
    let svg = fs::read_to_string(&out).unwrap();

    assert_eq!(svg.matches("<line ").count(), 9);
    assert_eq!(svg.matches("<text ").count(), 4);
    // background plus one marker per merged child
    assert_eq!(svg.matches("<rect ").count(), 1 + 6);
    for label in ["0x0", "1x1", "2x2", "3x3"] {
        assert!(svg.contains(&format!(">{}</text>", label)));
    }
    assert_eq!(recorded.len(), 9 + 4 + 6);
}

#[test]
fn tall_trees_grow_the_canvas() {
    let mut content = String::from("L\tn0\t0\t0\n");
    let mut previous = "n0".to_string();
    for i in 1..300 {
        content.push_str(&format!("L\tl{i}\t{i}\t0\nM\tn{i}\t{previous}\tl{i}\n"));
        previous = format!("n{i}");
    }
    let dir = tempfile::tempdir().unwrap();
    let input = write_merge_file(&dir, "chain.tsv", &content);
    let tree = load_merge_file(&input).unwrap();

    let params = LayoutParams::default();
    let canvas = fit_canvas(&tree, CanvasSize::new(1000, 800), &params).unwrap();
    assert_eq!(canvas, CanvasSize::new(1000, 300 * 4 + 50));

    let mut recorded: Vec<DrawCommand> = Vec::new();
    let metrics = render(&tree, canvas, &params, &RenderOptions::default(), &mut recorded).unwrap();
    assert_eq!(metrics.height_per_leaf, 4);
    let last_label_y = recorded
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { y, .. } => Some(*y),
            _ => None,
        })
        .max()
        .unwrap();
    assert!(last_label_y < canvas.height as i32);
}

#[test]
fn single_child_nodes_follow_the_policy() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_merge_file(&dir, "lone.tsv", "L\ta\t0\t0\nL\tb\t1\t1\nM\tbb\tb\nM\troot\ta\tbb\n");
    let tree = load_merge_file(&input).unwrap();
    let canvas = CanvasSize::new(300, 200);

    let mut recorded: Vec<DrawCommand> = Vec::new();
    let rejected = render(&tree, canvas, &LayoutParams::default(), &RenderOptions::default(), &mut recorded);
    assert!(matches!(rejected, Err(Error::MalformedNode { .. })));
    assert!(recorded.is_empty());

    let params = LayoutParams {
        single_child: SingleChildPolicy::Collapse,
        ..LayoutParams::default()
    };
    let metrics = render(&tree, canvas, &params, &RenderOptions::default(), &mut recorded).unwrap();
    assert_eq!(metrics.leaves, 2);
    assert_eq!(recorded.len(), 2 + 5);
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.tsv");
    assert!(matches!(load_merge_file(&missing), Err(Error::Io(_))));
}
