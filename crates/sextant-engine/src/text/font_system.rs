use std::fmt;

use fontdue::layout::{CoordinateSystem, GlyphPosition, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;
use crate::render::AlphaImage;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// One string rendered into a power-of-two coverage bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedText {
    pub image: AlphaImage,
    /// Width of the used area, top-left aligned in `image`.
    pub content_width: u32,
    pub content_height: u32,
    /// Distance from the top of the content to the baseline, in pixels.
    pub ascent: f32,
}

impl RasterizedText {
    /// Used area as a fraction of the bitmap, for texture coordinates.
    pub fn tex_size(&self) -> Vec2 {
        Vec2::new(
            self.content_width as f32 / self.image.width as f32,
            self.content_height as f32 / self.image.height as f32,
        )
    }
}

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. Labels are rasterized one whole line at
/// a time; the text texture cache calls [`rasterize_line`](Self::rasterize_line)
/// on a miss.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("FontSystem: loaded font #{} ({} glyphs)", id.0, self.fonts[id.0].glyph_count());
        Ok(id)
    }

    /// Reads and loads a font file.
    pub fn load_font_file(&mut self, path: impl AsRef<std::path::Path>) -> anyhow::Result<FontId> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("reading font {}: {e}", path.display()))?;
        Ok(self.load_font(&bytes)?)
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Horizontal advance of one character at `px`; zero for unknown fonts.
    pub fn advance(&self, id: FontId, ch: char, px: f32) -> f32 {
        self.get(id).map_or(0.0, |f| f.metrics(ch, px).advance_width)
    }

    /// Mean advance of the lowercase latin letters at `px`.
    pub fn average_char_width(&self, id: FontId, px: f32) -> f32 {
        let Some(font) = self.get(id) else {
            return 0.0;
        };
        let sum: f32 = ('a'..='z').map(|c| font.metrics(c, px).advance_width).sum();
        sum / 26.0
    }

    /// Extent of a single line of `text` at `size`, in pixels.
    ///
    /// Unknown fonts and empty strings measure zero wide and one line high.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32) -> Vec2 {
        let Some(font) = self.get(id) else {
            return Vec2::new(0.0, size * 1.2);
        };
        let layout = line_layout(font, text, size);
        Vec2::new(line_width(font, layout.glyphs(), size), line_height(font, size))
    }

    /// Renders `text` on one line at `raster_px` into a power-of-two bitmap.
    ///
    /// The used area is the advance width plus a small right margin, one line
    /// high, anchored at the top-left texel. `None` for an unknown font, an
    /// empty string or a non-positive size.
    pub fn rasterize_line(&self, text: &str, id: FontId, raster_px: f32) -> Option<RasterizedText> {
        let font = self.get(id)?;
        if text.is_empty() || raster_px <= 0.0 {
            return None;
        }

        let layout = line_layout(font, text, raster_px);
        let glyphs = layout.glyphs();
        let advance = line_width(font, glyphs, raster_px);
        // Italic overhang and antialiasing bleed past the last advance.
        let content_width = advance.ceil() as u32 + 1 + (0.02 * advance) as u32;
        let content_height = line_height(font, raster_px).ceil().max(1.0) as u32;

        let mut image = AlphaImage::new(content_width.next_power_of_two(), content_height.next_power_of_two());
        for g in glyphs {
            if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                continue;
            }
            let (metrics, bitmap) = font.rasterize_config(g.key);
            blit_max(&mut image, &bitmap, metrics.width, g.x.round() as i32, g.y.round() as i32);
        }

        Some(RasterizedText {
            image,
            content_width,
            content_height,
            ascent: ascent(font, raster_px),
        })
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn line_layout(font: &fontdue::Font, text: &str, px: f32) -> Layout<()> {
    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(std::slice::from_ref(font), &TextStyle::new(text, px, 0));
    layout
}

/// Pen position after the last glyph, or its bitmap edge when that is further.
fn line_width(font: &fontdue::Font, glyphs: &[GlyphPosition<()>], px: f32) -> f32 {
    glyphs
        .iter()
        .map(|g| {
            let m = font.metrics_indexed(g.key.glyph_index, px);
            (g.x - m.xmin as f32 + m.advance_width).max(g.x + g.width as f32)
        })
        .fold(0.0f32, f32::max)
}

fn line_height(font: &fontdue::Font, px: f32) -> f32 {
    font.horizontal_line_metrics(px).map_or(px * 1.2, |m| m.ascent - m.descent)
}

fn ascent(font: &fontdue::Font, px: f32) -> f32 {
    font.horizontal_line_metrics(px).map_or(px, |m| m.ascent)
}

/// Copies a glyph bitmap into `dst` at `(x, y)`, keeping the larger coverage
/// where glyphs overlap. Texels outside `dst` are dropped.
fn blit_max(dst: &mut AlphaImage, src: &[u8], src_width: usize, x: i32, y: i32) {
    if src_width == 0 {
        return;
    }
    let (dw, dh) = (dst.width as i32, dst.height as i32);
    for (row, line) in src.chunks_exact(src_width).enumerate() {
        let ty = y + row as i32;
        if ty < 0 || ty >= dh {
            continue;
        }
        for (col, &value) in line.iter().enumerate() {
            let tx = x + col as i32;
            if tx < 0 || tx >= dw {
                continue;
            }
            let texel = &mut dst.pixels[(ty * dw + tx) as usize];
            *texel = (*texel).max(value);
        }
    }
}
