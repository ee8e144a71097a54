use std::path::Path;

use log::info;

use crate::draw::Surface;
use crate::error::Result;

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Collects primitives as SVG elements.
pub struct SvgSurface {
    width: u32,
    height: u32,
    body: String,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        SvgSurface {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn finish(self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 512);
        svg.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<style>
  .leaf-label {{ font-family: 'DejaVu Sans Mono', 'Courier New', monospace; font-size: 10px; }}
</style>
<rect width="100%" height="100%" fill="white"/>
"#,
            w = self.width,
            h = self.height
        ));
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }

    pub fn save(self, path: &Path) -> Result<()> {
        info!("Saving to {:?}...", path);
        std::fs::write(path, self.finish())?;
        Ok(())
    }
}

impl Surface for SvgSurface {
    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.body.push_str(&format!(
            r#"<text x="{}" y="{}" class="leaf-label" fill="black">{}</text>"#,
            x,
            y,
            escape_xml(text)
        ));
        self.body.push('\n');
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.body.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" stroke-width="1"/>"#,
            x0, y0, x1, y1
        ));
        self.body.push('\n');
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.body.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="black"/>"#,
            x, y, width, height
        ));
        self.body.push('\n');
    }
}
