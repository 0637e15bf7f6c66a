//! Text rasterization with fontdue.
//!
//! Each label owns an exact-size RGBA bitmap: glyphs are rasterized onto a
//! single baseline, tinted by the entity color at rasterization time, and
//! uploaded as one linear-sampled texture. Changing the content or color
//! marks the label dirty and the bitmap is rebuilt on the next tick.

use std::collections::HashMap;

use crate::color::Color;

/// Parsed fonts by registered name.
pub(crate) struct FontStore {
    fonts: HashMap<String, fontdue::Font>,
}

/// An RGBA bitmap ready for upload.
pub(crate) struct TextBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FontStore {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Parses font bytes under a name. A parse failure is logged and the
    /// name stays unregistered; labels using it simply never draw.
    pub fn insert(&mut self, name: &str, bytes: &[u8]) {
        match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
            Ok(font) => {
                log::info!("font {name:?} loaded");
                self.fonts.insert(name.to_owned(), font);
            }
            Err(err) => log::warn!("font {name:?} failed to parse: {err}"),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// Rasterizes a single line of text at `px` into a tinted RGBA bitmap.
    /// Returns `None` when the font is missing or the text has no area.
    pub fn rasterize(&self, name: &str, text: &str, px: f32, color: Color) -> Option<TextBitmap> {
        let font = self.fonts.get(name)?;

        if text.is_empty() {
            return None;
        }
        let (ascent, height) = match font.horizontal_line_metrics(px) {
            Some(m) => (m.ascent, (m.ascent - m.descent).ceil().max(1.0) as u32),
            None => (px, px.ceil().max(1.0) as u32),
        };

        let width = text
            .chars()
            .map(|ch| font.metrics(ch, px).advance_width)
            .sum::<f32>()
            .ceil()
            .max(1.0) as u32;

        let mut data = vec![0u8; (width * height * 4) as usize];
        let mut cursor = 0.0f32;
        for ch in text.chars() {
            let (glyph, coverage) = font.rasterize(ch, px);
            let origin_x = (cursor + glyph.xmin as f32).round() as i32;
            let origin_y = (ascent - glyph.ymin as f32 - glyph.height as f32).round() as i32;
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let x = origin_x + gx as i32;
                    let y = origin_y + gy as i32;
                    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                        continue;
                    }
                    let alpha = coverage[gy * glyph.width + gx];
                    if alpha == 0 {
                        continue;
                    }
                    let i = ((y as u32 * width + x as u32) * 4) as usize;
                    data[i] = color.r;
                    data[i + 1] = color.g;
                    data[i + 2] = color.b;
                    data[i + 3] = (alpha as u16 * color.a as u16 / 255) as u8;
                }
            }
            cursor += font.metrics(ch, px).advance_width;
        }

        Some(TextBitmap {
            width,
            height,
            data,
        })
    }
}
