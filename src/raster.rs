//! Pixel surface with a tiny built-in bitmap font, saved as PNG.

use std::path::Path;

use log::info;

use crate::draw::Surface;
use crate::error::{Error, Result};

/// Rows of a 5x8 glyph, most significant bit leftmost. Row 7 is below the
/// baseline.
type Glyph = [u8; 8];

const GLYPH_HEIGHT: i32 = 8;
const GLYPH_ADVANCE: i32 = 6;

/// Covers what centroid labels can contain: digits, sign, decimal point,
/// the `x` separator and the letters of `NaN` and `inf`.
fn glyph(c: char) -> &'static Glyph {
    match c {
        '0' => &[0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70, 0x00],
        '1' => &[0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00],
        '2' => &[0x70, 0x88, 0x08, 0x30, 0x40, 0x80, 0xF8, 0x00],
        '3' => &[0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70, 0x00],
        '4' => &[0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x00],
        '5' => &[0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70, 0x00],
        '6' => &[0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70, 0x00],
        '7' => &[0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40, 0x00],
        '8' => &[0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70, 0x00],
        '9' => &[0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60, 0x00],
        '-' => &[0x00, 0x00, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00],
        '.' => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x20, 0x00],
        'x' => &[0x00, 0x00, 0x88, 0x50, 0x20, 0x50, 0x88, 0x00],
        'N' => &[0x88, 0xC8, 0xA8, 0x98, 0x88, 0x88, 0x88, 0x00],
        'a' => &[0x00, 0x00, 0x70, 0x08, 0x78, 0x88, 0x78, 0x00],
        'i' => &[0x20, 0x00, 0x60, 0x20, 0x20, 0x20, 0x70, 0x00],
        'n' => &[0x00, 0x00, 0xB0, 0xC8, 0x88, 0x88, 0x88, 0x00],
        'f' => &[0x30, 0x48, 0x40, 0xE0, 0x40, 0x40, 0x40, 0x00],
        ' ' => &[0x00; 8],
        _ => &[0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20, 0x00], // '?'
    }
}

pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    ink: [u8; 3],
}

impl RasterSurface {
    /// White canvas drawn in black.
    pub fn new(width: u32, height: u32) -> Self {
        RasterSurface {
            width,
            height,
            pixels: vec![255u8; width as usize * height as usize * 3],
            ink: [0, 0, 0],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        let idx = self.index(x, y)?;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 3)
    }

    fn put(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx..idx + 3].copy_from_slice(&self.ink);
        }
    }

    fn write_glyph(&mut self, base_x: i32, top_y: i32, glyph: &Glyph) {
        for (j, row) in glyph.iter().enumerate() {
            for bit in 0..8 {
                if (row >> (7 - bit)) & 1 == 1 {
                    self.put(base_x + bit, top_y + j as i32);
                }
            }
        }
    }

    pub fn into_image(self) -> Result<image::RgbImage> {
        let (width, height) = (self.width, self.height);
        image::RgbImage::from_raw(width, height, self.pixels).ok_or_else(|| {
            Error::InvalidInput(format!("pixel buffer does not match {}x{}", width, height))
        })
    }

    pub fn save(self, path: &Path) -> Result<()> {
        info!("Saving to {:?}...", path);
        self.into_image()?.save(path)?;
        Ok(())
    }
}

impl Surface for RasterSurface {
    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        let top_y = y - (GLYPH_HEIGHT - 1);
        for (i, c) in text.chars().enumerate() {
            self.write_glyph(x + i as i32 * GLYPH_ADVANCE, top_y, glyph(c));
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        // Bresenham
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.put(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        for py in y..y + height {
            for px in x..x + width {
                self.put(px, py);
            }
        }
    }
}
