// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label font resolution
//!
//! Tries an explicit `FONT_PATH` override first, then a list of known
//! platform TrueType paths. If nothing resolves, falls back to a built-in
//! 8x8 bitmap font so annotation always works; the failure is logged and
//! never surfaced to the caller.

use ab_glyph::{FontVec, PxScale};
use font8x8::legacy::BASIC_LEGACY;
use image::{Rgb, RgbImage};
use imageproc::drawing;
use std::path::Path;
use tracing::{info, warn};

/// Known scalable font locations, tried in order.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "arial.ttf",
];

/// Glyph cell size of the bitmap fallback font.
const BITMAP_GLYPH_SIZE: u32 = 8;

/// Font used for label rendering: a scalable TrueType font when one
/// resolves, otherwise a built-in bitmap font.
pub enum LabelFont {
    Scalable(FontVec),
    Bitmap,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::Scalable(_) => write!(f, "LabelFont::Scalable"),
            LabelFont::Bitmap => write!(f, "LabelFont::Bitmap"),
        }
    }
}

impl LabelFont {
    /// Resolve a label font. `override_path` wins when set and loadable.
    pub fn resolve(override_path: Option<&Path>) -> Self {
        if let Some(path) = override_path {
            match Self::load_scalable(path) {
                Some(font) => {
                    info!("Label font loaded from override {}", path.display());
                    return LabelFont::Scalable(font);
                }
                None => {
                    warn!("Font override {} did not load, trying defaults", path.display());
                }
            }
        }

        for candidate in FONT_CANDIDATES {
            if let Some(font) = Self::load_scalable(Path::new(candidate)) {
                info!("Label font loaded from {}", candidate);
                return LabelFont::Scalable(font);
            }
        }

        warn!("No scalable font found, falling back to built-in bitmap font");
        LabelFont::Bitmap
    }

    fn load_scalable(path: &Path) -> Option<FontVec> {
        let bytes = std::fs::read(path).ok()?;
        FontVec::try_from_vec(bytes).ok()
    }

    pub fn is_scalable(&self) -> bool {
        matches!(self, LabelFont::Scalable(_))
    }

    /// Rendered size of `text` at `px` pixels, as (width, height).
    pub fn text_size(&self, px: f32, text: &str) -> (u32, u32) {
        match self {
            LabelFont::Scalable(font) => drawing::text_size(PxScale::from(px), font, text),
            LabelFont::Bitmap => {
                let scale = bitmap_scale(px);
                let chars = text.chars().count() as u32;
                (chars * BITMAP_GLYPH_SIZE * scale, BITMAP_GLYPH_SIZE * scale)
            }
        }
    }

    /// Draw `text` onto `image` with its top-left corner at (x, y).
    /// Pixels outside the image are clipped.
    pub fn draw_text(
        &self,
        image: &mut RgbImage,
        color: Rgb<u8>,
        x: i32,
        y: i32,
        px: f32,
        text: &str,
    ) {
        match self {
            LabelFont::Scalable(font) => {
                drawing::draw_text_mut(image, color, x, y, PxScale::from(px), font, text);
            }
            LabelFont::Bitmap => {
                draw_bitmap_text(image, color, x, y, bitmap_scale(px), text);
            }
        }
    }
}

/// Integer magnification for the 8x8 bitmap font at a target pixel size.
fn bitmap_scale(px: f32) -> u32 {
    ((px / BITMAP_GLYPH_SIZE as f32).round() as u32).max(1)
}

fn draw_bitmap_text(image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let (width, height) = (image.width() as i32, image.height() as i32);

    for (ci, ch) in text.chars().enumerate() {
        let glyph = if (ch as usize) < BASIC_LEGACY.len() {
            BASIC_LEGACY[ch as usize]
        } else {
            BASIC_LEGACY[b'?' as usize]
        };

        let glyph_x = x + (ci as u32 * BITMAP_GLYPH_SIZE * scale) as i32;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                // Magnify each font pixel to a scale x scale block
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px_x = glyph_x + (col * scale + dx) as i32;
                        let px_y = y + (row as u32 * scale + dy) as i32;
                        if px_x >= 0 && px_x < width && px_y >= 0 && px_y < height {
                            image.put_pixel(px_x as u32, px_y as u32, color);
                        }
                    }
                }
            }
        }
    }
}
