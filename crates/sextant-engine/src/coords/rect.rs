use super::Vec2;

/// Axis-aligned rectangle in screen pixels (top-left origin).
///
/// Projectors use it as their viewport.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < max.x && p.y < max.y
    }

    /// Closed containment: [min, max]. Points on the far edges count as inside.
    #[inline]
    pub fn contains_inclusive(self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x <= max.x && p.y <= max.y
    }

    /// True when the two rectangles share interior area.
    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        let a = self.max();
        let b = other.max();
        self.origin.x < b.x && other.origin.x < a.x && self.origin.y < b.y && other.origin.y < a.y
    }

    /// Point where the segment `from → to` first leaves (or enters) the
    /// rectangle boundary.
    ///
    /// Returns `None` when the segment never touches the boundary.
    pub fn boundary_crossing(self, from: Vec2, to: Vec2) -> Option<Vec2> {
        let d = to - from;
        let max = self.max();
        let mut best: Option<f32> = None;
        let mut consider = |t: f32, p: Vec2| {
            if !(0.0..=1.0).contains(&t) || !self.contains_inclusive(p) {
                return;
            }
            if best.is_none_or(|b| t < b) {
                best = Some(t);
            }
        };
        if d.x != 0.0 {
            for edge in [self.origin.x, max.x] {
                let t = (edge - from.x) / d.x;
                consider(t, Vec2::new(edge, from.y + d.y * t));
            }
        }
        if d.y != 0.0 {
            for edge in [self.origin.y, max.y] {
                let t = (edge - from.y) / d.y;
                consider(t, Vec2::new(from.x + d.x * t, edge));
            }
        }
        best.map(|t| from + d * t)
    }
}
