//! Layout of labels that curve around the viewport center.
//!
//! Geometry is solved in a y-up frame, where angles grow counter-clockwise,
//! then mapped back to window coordinates.

use crate::coords::Vec2;

/// Largest angle one average character may subtend, in radians.
pub const MAX_ANGLE_PER_CHAR: f32 = 10.0 * std::f32::consts::PI / 180.0;

/// Where one character of a gravity label goes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GravityGlyph {
    /// Index of the character in the source string.
    pub index: usize,
    /// Window position of the character's baseline origin.
    pub pos: Vec2,
    /// Counter-clockwise rotation on screen, in degrees.
    pub angle_deg: f32,
}

/// Inputs of [`layout_gravity`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GravityParams {
    /// Viewport center in window coordinates.
    pub center: Vec2,
    /// Viewport size; labels further than twice its larger side are skipped.
    pub viewport_size: Vec2,
    pub device_pixels_per_pixel: f32,
    /// Offset of the arc center, window convention (+y down).
    pub shift: Vec2,
    pub average_char_width: f32,
    /// Lay characters out last to first.
    pub right_to_left: bool,
}

/// Places the characters of a label anchored at `anchor` along a circle
/// around the viewport center.
///
/// `advances` holds one horizontal advance per character, in string order.
/// When an average character would span more than [`MAX_ANGLE_PER_CHAR`],
/// the circle center moves away from the anchor so the label flattens.
/// Returns nothing for empty labels and for anchors far outside the
/// viewport.
pub fn layout_gravity(anchor: Vec2, advances: &[f32], p: &GravityParams) -> Vec<GravityGlyph> {
    let dx = anchor.x - p.center.x;
    let dy = p.center.y - anchor.y;
    let mut d = (dx * dx + dy * dy).sqrt();

    let limit = p.viewport_size.x.max(p.viewport_size.y) * 2.0;
    if advances.is_empty() || d > limit {
        return Vec::new();
    }

    let ppx = p.device_pixels_per_pixel;
    let mut angle_per_unit = ppx / d;
    let mut theta = (dy - 1.0).atan2(dx);

    // Arc center, y-up.
    let mut xc = p.center.x + p.shift.x;
    let mut yc = -p.center.y - p.shift.y;

    if p.average_char_width * angle_per_unit > MAX_ANGLE_PER_CHAR {
        let (sin, cos) = theta.sin_cos();
        let x0 = d * cos + xc;
        let y0 = d * sin + yc;

        angle_per_unit = MAX_ANGLE_PER_CHAR / p.average_char_width;
        d = ppx / angle_per_unit;

        xc = x0 - d * cos;
        yc = y0 - d * sin;
    }

    let order: Box<dyn Iterator<Item = usize>> = if p.right_to_left {
        Box::new((0..advances.len()).rev())
    } else {
        Box::new(0..advances.len())
    };

    let mut out = Vec::with_capacity(advances.len());
    for index in order {
        let (sin, cos) = theta.sin_cos();
        out.push(GravityGlyph {
            index,
            pos: Vec2::new(d * cos + xc, -(d * sin + yc)),
            angle_deg: 90.0 + theta.to_degrees(),
        });
        theta += advances[index] * angle_per_unit;
    }
    out
}
