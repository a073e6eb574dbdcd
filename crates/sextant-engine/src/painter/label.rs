//! Labels: flat rotated text and gravity text curving around the view center.

use crate::coords::{Vec2, Vec3};
use crate::paint::BlendFunc;
use crate::render::{ArrayDesc, Backend, DrawRequest, Topology, VertexArrays};
use crate::text::{layout_gravity, FontId, GlyphTexture, GravityParams, TextKey};

use super::painter::window;
use super::Painter;

/// Angles below this many degrees draw pixel-aligned and unrotated.
const MIN_ROTATION_DEG: f32 = 1.0 * std::f32::consts::PI / 180.0;

impl<B: Backend> Painter<'_, B> {
    /// Draws `text` with its baseline origin at window position `(x, y)`.
    ///
    /// `angle_deg` turns the label counter-clockwise on screen; the shifts
    /// move it along its own axes, +y pointing down. Projectors that ask for
    /// gravity labels curve the text around the view center unless
    /// `no_gravity` is set.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        angle_deg: f32,
        xshift: f32,
        yshift: f32,
        no_gravity: bool,
    ) {
        if text.is_empty() {
            return;
        }
        let Some(font) = self.font else {
            if !self.warned_no_font {
                log::warn!("Painter: no font set; labels are skipped");
                self.warned_no_font = true;
            }
            return;
        };

        if self.prj.gravity_labels() && !no_gravity {
            self.draw_text_gravity(font, x, y, text, xshift, yshift);
        } else {
            let angle = if no_gravity { angle_deg } else { angle_deg + self.prj.default_angle_for_gravity_text() };
            self.draw_text_flat(font, x, y, text, angle, xshift, yshift);
        }
    }

    /// Projects `v` and draws `text` there. Returns whether it was visible.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_at(
        &mut self,
        v: Vec3,
        text: &str,
        angle_deg: f32,
        xshift: f32,
        yshift: f32,
        no_gravity: bool,
    ) -> bool {
        let mut win = v.normalized();
        let visible = self.prj.project_in_place(&mut win);
        if visible {
            self.draw_text(win.x as f32, win.y as f32, text, angle_deg, xshift, yshift, no_gravity);
        }
        visible
    }

    /// Cached texture of `text` at the current size, rendered on a miss.
    fn text_texture(&mut self, font: FontId, text: &str) -> Option<GlyphTexture<B::Texture>> {
        let pixel_size = (self.font_size * self.prj.device_pixels_per_pixel()).round() as u32;
        if pixel_size == 0 {
            return None;
        }

        let key = TextKey::new(text, pixel_size);
        let fonts = self.fonts;
        let backend = &mut *self.backend;
        self.text_cache
            .get_or_insert_with(&key, || {
                let raster = fonts.rasterize_line(text, font, pixel_size as f32)?;
                match backend.upload_alpha(&raster.image) {
                    Ok(texture) => Some(GlyphTexture {
                        texture,
                        width: raster.content_width,
                        height: raster.content_height,
                        tex_size: raster.tex_size(),
                        ascent: raster.ascent,
                        pixel_size,
                    }),
                    Err(err) => {
                        log::warn!("Painter: text texture upload failed for {text:?}: {err:#}");
                        None
                    }
                }
            })
            .cloned()
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text_flat(
        &mut self,
        font: FontId,
        x: f32,
        y: f32,
        text: &str,
        angle_deg: f32,
        xshift: f32,
        yshift: f32,
    ) {
        let Some(glyph) = self.text_texture(font, text) else {
            return;
        };

        let vertices = text_quad(
            Vec2::new(x, y),
            Vec2::new(glyph.width as f32, glyph.height as f32),
            glyph.ascent,
            angle_deg,
            Vec2::new(xshift, yshift),
        );
        let (tw, th) = (glyph.tex_size.x, glyph.tex_size.y);
        let tex = [Vec2::zero(), Vec2::new(tw, 0.0), Vec2::new(0.0, th), Vec2::new(tw, th)];

        let (old_blend, old_func) = self.blending();
        self.set_blending(true, BlendFunc::ALPHA);
        let arrays = VertexArrays::new(ArrayDesc::vec3(&vertices)).with_tex_coords(ArrayDesc::vec2(&tex));
        self.draw_from_array(
            DrawRequest::new(Topology::TriangleStrip, arrays)
                .unprojected()
                .with_texture(Some(&glyph.texture))
                .coverage(),
        );
        self.set_blending(old_blend, old_func);
    }

    fn draw_text_gravity(&mut self, font: FontId, x: f32, y: f32, text: &str, xshift: f32, yshift: f32) {
        let chars: Vec<char> = text.chars().collect();
        let advances: Vec<f32> = chars.iter().map(|&c| self.fonts.advance(font, c, self.font_size)).collect();
        let params = GravityParams {
            center: self.prj.viewport_center(),
            viewport_size: self.prj.viewport().size,
            device_pixels_per_pixel: self.prj.device_pixels_per_pixel(),
            shift: Vec2::new(xshift, yshift),
            average_char_width: self.fonts.average_char_width(font, self.font_size),
            right_to_left: self.sky_rtl,
        };

        let mut buf = [0u8; 4];
        for g in layout_gravity(Vec2::new(x, y), &advances, &params) {
            let ch = chars[g.index].encode_utf8(&mut buf);
            self.draw_text_flat(font, g.pos.x, g.pos.y, ch, g.angle_deg, 0.0, 0.0);
        }
    }
}

/// Corners of a text quad as a strip: top-left, top-right, bottom-left,
/// bottom-right before rotation.
///
/// `size` and `ascent` are in pixels; `anchor` is the baseline origin.
/// Unrotated quads snap to whole pixels.
fn text_quad(anchor: Vec2, size: Vec2, ascent: f32, angle_deg: f32, shift: Vec2) -> [Vec3; 4] {
    let (u0, u1) = (shift.x, shift.x + size.x);
    let (v0, v1) = (shift.y - ascent, shift.y - ascent + size.y);
    let corners = [(u0, v0), (u1, v0), (u0, v1), (u1, v1)];

    if angle_deg.abs() > MIN_ROTATION_DEG {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        corners.map(|(u, v)| window(anchor.x + u * cos + v * sin, anchor.y - u * sin + v * cos))
    } else {
        corners.map(|(u, v)| window((anchor.x + u).trunc(), (anchor.y + v).trunc()))
    }
}
