use crate::coords::{assert_unit, Vec3};

/// Spherical cap: every direction `p` with `p · n >= d`.
///
/// `d = cos(angular radius)`. Caps with `d < 0` cover more than a hemisphere
/// and are not convex; the containment tests below handle both cases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphericalCap {
    pub n: Vec3,
    pub d: f64,
}

impl SphericalCap {
    #[track_caller]
    pub fn new(n: Vec3, d: f64) -> Self {
        assert_unit(n);
        Self { n, d: d.clamp(-1.0, 1.0) }
    }

    /// Cap of angular `radius` (radians) around `n`.
    #[track_caller]
    pub fn from_radius(n: Vec3, radius: f64) -> Self {
        Self::new(n, radius.cos())
    }

    /// Cap covering the whole sphere.
    pub const fn full_sphere() -> Self {
        Self { n: Vec3::Z, d: -1.0 }
    }

    #[inline]
    pub fn is_full_sphere(&self) -> bool {
        self.d <= -1.0
    }

    /// Angular radius in radians.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.d.acos()
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.dot(self.n) >= self.d
    }

    pub fn intersects_cap(&self, other: &SphericalCap) -> bool {
        if self.is_full_sphere() || other.is_full_sphere() {
            return true;
        }
        self.n.angle(other.n) <= self.radius() + other.radius()
    }

    /// True when every point of the triangle (edges are minor great-circle arcs)
    /// lies inside the cap.
    pub fn contains_triangle(&self, t: &[Vec3; 3]) -> bool {
        if !t.iter().all(|v| self.contains(*v)) {
            return false;
        }
        if self.d >= 0.0 {
            return true;
        }
        // Non-convex cap: edges may dip into the complement, or the whole
        // complement may sit inside the triangle.
        edges(t).iter().all(|(a, b)| arc_dot_range(self.n, *a, *b).0 >= self.d)
            && !triangle_contains_point(t, -self.n)
    }

    /// True when the triangle and the cap share at least one point.
    pub fn intersects_triangle(&self, t: &[Vec3; 3]) -> bool {
        if t.iter().any(|v| self.contains(*v)) {
            return true;
        }
        if edges(t).iter().any(|(a, b)| arc_dot_range(self.n, *a, *b).1 >= self.d) {
            return true;
        }
        triangle_contains_point(t, self.n)
    }

    /// Clips the minor great-circle arc `a → b` to the cap.
    ///
    /// Returns the clipped endpoints, or `None` when no part of the arc is
    /// inside. For caps larger than a hemisphere an arc whose endpoints are both
    /// inside is returned whole.
    pub fn clip_great_circle(&self, a: Vec3, b: Vec3) -> Option<(Vec3, Vec3)> {
        let a_in = self.contains(a);
        let b_in = self.contains(b);
        if a_in && b_in {
            return Some((a, b));
        }

        let mut hits = self.boundary_hits(a, b);
        hits.sort_by(|p, q| a.angle(*p).total_cmp(&a.angle(*q)));

        match (a_in, b_in, hits.as_slice()) {
            (true, false, [first, ..]) => Some((a, *first)),
            (false, true, [.., last]) => Some((*last, b)),
            (false, false, [first, second]) => Some((*first, *second)),
            _ => None,
        }
    }

    /// Points where the arc `a → b` crosses the cap boundary (0, 1 or 2).
    fn boundary_hits(&self, a: Vec3, b: Vec3) -> Vec<Vec3> {
        let axis = a.cross(b);
        if axis.norm_squared() < 1e-24 {
            return Vec::new();
        }
        let c = axis.normalized();
        let k = self.n.dot(c);
        let denom = 1.0 - k * k;
        if denom < 1e-15 {
            return Vec::new();
        }
        let r2 = 1.0 - self.d * self.d / denom;
        if r2 < 0.0 {
            return Vec::new();
        }
        let p0 = (self.n - c * k) * (self.d / denom);
        let u = c.cross(self.n).normalized() * r2.sqrt();
        [p0 + u, p0 - u]
            .into_iter()
            .filter(|p| on_minor_arc(a, b, c, *p))
            .collect()
    }
}

fn edges(t: &[Vec3; 3]) -> [(Vec3, Vec3); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// `p` is on the plane of `a`, `b` (unit normal `c = a × b / |a × b|`);
/// tests whether it lies between them on the minor arc.
fn on_minor_arc(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> bool {
    const EPS: f64 = -1e-12;
    a.cross(p).dot(c) >= EPS && p.cross(b).dot(c) >= EPS
}

/// Maximum of `n · p` for `p` on the minor arc `a → b`.
pub(crate) fn arc_max_dot(n: Vec3, a: Vec3, b: Vec3) -> f64 {
    arc_dot_range(n, a, b).1
}

/// Minimum and maximum of `n · p` for `p` on the minor arc `a → b`.
fn arc_dot_range(n: Vec3, a: Vec3, b: Vec3) -> (f64, f64) {
    let (mut lo, mut hi) = {
        let (da, db) = (n.dot(a), n.dot(b));
        (da.min(db), da.max(db))
    };
    let axis = a.cross(b);
    if axis.norm_squared() < 1e-24 {
        return (lo, hi);
    }
    let c = axis.normalized();
    let q = n - c * n.dot(c);
    let q_len = q.norm();
    if q_len < 1e-12 {
        return (lo, hi);
    }
    let u = q / q_len;
    if on_minor_arc(a, b, c, u) {
        hi = hi.max(q_len);
    }
    if on_minor_arc(a, b, c, -u) {
        lo = lo.min(-q_len);
    }
    (lo, hi)
}

/// Whether direction `p` is inside the spherical triangle `t`.
pub(crate) fn triangle_contains_point(t: &[Vec3; 3], p: Vec3) -> bool {
    let orient = t[0].cross(t[1]).dot(t[2]);
    if orient == 0.0 {
        return false;
    }
    let s = orient.signum();
    edges(t).iter().all(|(a, b)| a.cross(*b).dot(p) * s >= 0.0)
}
