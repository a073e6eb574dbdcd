//! Adaptive tessellation of spherical triangles.
//!
//! A triangle on the unit sphere is projected and split along the edges whose
//! projected midpoint strays too far from the straight screen-space chord, or
//! that cross a seam of the projection. [`subdivide_step`] decides one level;
//! [`tessellate_triangle`] drives it to completion and hands flat, projected
//! triangles to a sink.

use crate::coords::{assert_unit, Vec2, Vec3};
use crate::paint::Color;
use crate::projector::Projector;

use super::SphericalCap;

/// Three unit vectors plus optional per-vertex texture coordinates and colors.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalTriangle {
    pub vertices: [Vec3; 3],
    pub tex_coords: Option<[Vec2; 3]>,
    pub colors: Option<[Color; 3]>,
}

impl SphericalTriangle {
    pub const fn new(vertices: [Vec3; 3]) -> Self {
        Self { vertices, tex_coords: None, colors: None }
    }

    pub const fn with_tex_coords(mut self, tex_coords: [Vec2; 3]) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    pub const fn with_colors(mut self, colors: [Color; 3]) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Corners followed by the edge midpoints `m01`, `m12`, `m20`.
    fn extended(&self) -> Extended {
        let [a, b, c] = self.vertices;
        let vertices = [
            a,
            b,
            c,
            (a + b).normalized(),
            (b + c).normalized(),
            (c + a).normalized(),
        ];
        let tex_coords = self
            .tex_coords
            .map(|[a, b, c]| [a, b, c, a.midpoint(b), b.midpoint(c), c.midpoint(a)]);
        let colors = self
            .colors
            .map(|[a, b, c]| [a, b, c, a.mean(b), b.mean(c), c.mean(a)]);
        Extended { vertices, tex_coords, colors }
    }
}

struct Extended {
    vertices: [Vec3; 6],
    tex_coords: Option<[Vec2; 6]>,
    colors: Option<[Color; 6]>,
}

impl Extended {
    fn pick(&self, [i, j, k]: [usize; 3]) -> SphericalTriangle {
        SphericalTriangle {
            vertices: [self.vertices[i], self.vertices[j], self.vertices[k]],
            tex_coords: self.tex_coords.map(|t| [t[i], t[j], t[k]]),
            colors: self.colors.map(|c| [c[i], c[j], c[k]]),
        }
    }
}

/// Which edges of a triangle are still tested. Edge `i` joins vertex `i` and
/// vertex `(i + 1) % 3`.
///
/// Edges produced by a split that lie inside the parent cannot cross a seam
/// the parent's edges did not, so the split turns their checks off.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EdgeChecks(pub [bool; 3]);

impl EdgeChecks {
    pub const ALL: EdgeChecks = EdgeChecks([true; 3]);

    #[inline]
    pub const fn new(e0: bool, e1: bool, e2: bool) -> Self {
        Self([e0, e1, e2])
    }

    #[inline]
    pub fn get(self, edge: usize) -> bool {
        self.0[edge]
    }
}

impl Default for EdgeChecks {
    fn default() -> Self {
        Self::ALL
    }
}

/// Tolerances for [`tessellate_triangle`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TessellationParams {
    /// Squared screen distance (px²) allowed between a projected edge midpoint
    /// and the mean of the projected endpoints.
    pub max_sq_distortion: f64,
    /// Recursion depth at which splitting stops.
    pub max_depth: u32,
}

impl TessellationParams {
    pub const fn new(max_sq_distortion: f64, max_depth: u32) -> Self {
        Self { max_sq_distortion, max_depth }
    }
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self { max_sq_distortion: 5.0, max_depth: 5 }
    }
}

/// A projected triangle ready for upload.
///
/// Positions are window coordinates; hidden corners keep their slot with a
/// negative `z`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTriangle {
    pub positions: [Vec3; 3],
    pub tex_coords: Option<[Vec2; 3]>,
    pub colors: Option<[Color; 3]>,
}

/// Outcome of one subdivision step.
#[derive(Debug, Clone, PartialEq)]
pub enum Subdivision {
    /// Nothing to draw: outside the clip cap, behind the viewer, or still
    /// straddling a seam at the depth ceiling.
    Culled,
    Emit(FlatTriangle),
    Split {
        children: Vec<(SphericalTriangle, EdgeChecks)>,
        /// False once the cap fully contains the parent; children skip the cap.
        clip_active: bool,
    },
}

const EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// Decides what happens to `tri` at recursion `depth`.
pub fn subdivide_step<P: Projector + ?Sized>(
    prj: &P,
    tri: &SphericalTriangle,
    cap: Option<&SphericalCap>,
    checks: EdgeChecks,
    depth: u32,
    params: &TessellationParams,
) -> Subdivision {
    let mut clip_active = cap.is_some();
    if let Some(cap) = cap {
        if cap.contains_triangle(&tri.vertices) {
            clip_active = false;
        } else if !cap.intersects_triangle(&tri.vertices) {
            return Subdivision::Culled;
        }
    }

    let projected = tri.vertices.map(|v| prj.project(v));
    if !projected.iter().any(|p| p.visible) {
        return Subdivision::Culled;
    }
    let win = projected.map(|p| p.win);

    let mut seams = [false; 3];
    let mut flags = [false; 3];
    for (edge, &(i, j)) in EDGES.iter().enumerate() {
        if !checks.get(edge) {
            continue;
        }
        let (a, b) = (tri.vertices[i], tri.vertices[j]);
        seams[edge] = prj.intersects_discontinuity(a, b);
        flags[edge] = seams[edge] || {
            let mid = prj.project((a + b).normalized()).win;
            let dx = mid.x - (win[i].x + win[j].x) * 0.5;
            let dy = mid.y - (win[i].y + win[j].y) * 0.5;
            dx * dx + dy * dy > params.max_sq_distortion
        };
    }

    let emit = || {
        Subdivision::Emit(FlatTriangle {
            positions: win,
            tex_coords: tri.tex_coords,
            colors: tri.colors,
        })
    };

    if flags == [false; 3] {
        return emit();
    }
    if depth >= params.max_depth {
        // Still distorted: draw it anyway. Still on a seam: drop it.
        return if seams.contains(&true) { Subdivision::Culled } else { emit() };
    }

    let ext = tri.extended();
    const ALL: EdgeChecks = EdgeChecks::ALL;
    let plan: &[([usize; 3], EdgeChecks)] = match flags {
        [true, false, false] => &[
            ([0, 3, 2], EdgeChecks::new(true, true, false)),
            ([3, 1, 2], EdgeChecks::new(true, false, true)),
        ],
        [false, true, false] => &[
            ([0, 1, 4], EdgeChecks::new(false, true, true)),
            ([0, 4, 2], EdgeChecks::new(true, true, false)),
        ],
        [false, false, true] => &[
            ([0, 1, 5], EdgeChecks::new(false, true, true)),
            ([5, 1, 2], EdgeChecks::new(true, false, true)),
        ],
        [true, true, false] => &[
            ([0, 3, 4], ALL),
            ([3, 1, 4], ALL),
            ([0, 4, 2], EdgeChecks::new(true, true, false)),
        ],
        [true, false, true] => &[
            ([0, 3, 5], ALL),
            ([3, 2, 5], ALL),
            ([3, 1, 2], EdgeChecks::new(true, false, true)),
        ],
        [false, true, true] => &[
            ([0, 1, 4], EdgeChecks::new(false, true, true)),
            ([4, 2, 5], ALL),
            ([0, 4, 5], ALL),
        ],
        _ => &[([3, 4, 5], ALL), ([0, 3, 5], ALL), ([3, 1, 4], ALL), ([5, 4, 2], ALL)],
    };

    Subdivision::Split {
        children: plan.iter().map(|&(idx, checks)| (ext.pick(idx), checks)).collect(),
        clip_active,
    }
}

/// Tessellates `tri` and passes every resulting projected triangle to `sink`.
///
/// Panics if a vertex is not unit length.
#[track_caller]
pub fn tessellate_triangle<P, F>(
    prj: &P,
    tri: &SphericalTriangle,
    cap: Option<&SphericalCap>,
    params: &TessellationParams,
    sink: &mut F,
) where
    P: Projector + ?Sized,
    F: FnMut(FlatTriangle),
{
    for v in tri.vertices {
        assert_unit(v);
    }
    descend(prj, tri, cap, EdgeChecks::ALL, 0, params, sink);
}

fn descend<P, F>(
    prj: &P,
    tri: &SphericalTriangle,
    cap: Option<&SphericalCap>,
    checks: EdgeChecks,
    depth: u32,
    params: &TessellationParams,
    sink: &mut F,
) where
    P: Projector + ?Sized,
    F: FnMut(FlatTriangle),
{
    match subdivide_step(prj, tri, cap, checks, depth, params) {
        Subdivision::Culled => {}
        Subdivision::Emit(flat) => sink(flat),
        Subdivision::Split { children, clip_active } => {
            let cap = if clip_active { cap } else { None };
            for (child, checks) in &children {
                descend(prj, child, cap, *checks, depth + 1, params, sink);
            }
        }
    }
}

/// Collecting form of [`tessellate_triangle`].
#[track_caller]
pub fn tessellate<P: Projector + ?Sized>(
    prj: &P,
    tri: &SphericalTriangle,
    cap: Option<&SphericalCap>,
    params: &TessellationParams,
) -> Vec<FlatTriangle> {
    let mut out = Vec::new();
    tessellate_triangle(prj, tri, cap, params, &mut |t| out.push(t));
    out
}

/// Flat vertex lists built from many tessellated triangles, three vertices per
/// triangle. The optional streams stay index-aligned with `positions`.
#[derive(Debug, Clone, Default)]
pub struct TessellationOutput {
    pub positions: Vec<Vec3>,
    pub tex_coords: Option<Vec<Vec2>>,
    pub colors: Option<Vec<Color>>,
}

impl TessellationOutput {
    pub fn new(textured: bool, colored: bool) -> Self {
        Self {
            positions: Vec::new(),
            tex_coords: textured.then(Vec::new),
            colors: colored.then(Vec::new),
        }
    }

    /// Appends one triangle. Panics if it lacks a stream this output carries.
    #[track_caller]
    pub fn push(&mut self, tri: FlatTriangle) {
        self.positions.extend_from_slice(&tri.positions);
        if let Some(out) = &mut self.tex_coords {
            let Some(tex) = tri.tex_coords else {
                panic!("textured output needs texture coordinates");
            };
            out.extend_from_slice(&tex);
        }
        if let Some(out) = &mut self.colors {
            let Some(colors) = tri.colors else {
                panic!("colored output needs vertex colors");
            };
            out.extend_from_slice(&colors);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        if let Some(t) = &mut self.tex_coords {
            t.clear();
        }
        if let Some(c) = &mut self.colors {
            c.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{AzimuthalKind, AzimuthalProjector, ViewFrame};
    use crate::coords::Rect;
    use crate::testing::MockProjector;

    const OCTANT: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

    fn loose() -> TessellationParams {
        TessellationParams::new(f64::INFINITY, 5)
    }

    fn seam_on(a: Vec3, b: Vec3) -> impl Fn(Vec3, Vec3) -> bool + Send + Sync {
        move |p, q| (p == a && q == b) || (p == b && q == a)
    }

    // ── flat cases ────────────────────────────────────────────────────────

    #[test]
    fn infinite_tolerance_returns_the_input_triangle() {
        let prj = MockProjector::new();
        let out = tessellate(&prj, &SphericalTriangle::new(OCTANT), None, &loose());
        assert_eq!(out.len(), 1);
        let expected = OCTANT.map(|v| prj.project(v).win);
        assert_eq!(out[0].positions, expected);
    }

    #[test]
    fn fully_hidden_triangle_is_culled() {
        let prj = MockProjector::new().with_hidden(|_| true);
        let out = tessellate(&prj, &SphericalTriangle::new(OCTANT), None, &loose());
        assert!(out.is_empty());
    }

    #[test]
    fn partially_hidden_triangle_keeps_marker() {
        let prj = MockProjector::new().with_hidden(|v| v.z > 0.5);
        let out = tessellate(&prj, &SphericalTriangle::new(OCTANT), None, &loose());
        assert_eq!(out.len(), 1);
        assert!(out[0].positions[2].z < 0.0);
    }

    // ── seams ─────────────────────────────────────────────────────────────

    #[test]
    fn seam_on_one_edge_splits_in_two_sharing_midpoint() {
        let prj = MockProjector::new().with_seam(seam_on(Vec3::X, Vec3::Y));
        let tri = SphericalTriangle::new(OCTANT);
        let out = tessellate(&prj, &tri, None, &loose());
        assert_eq!(out.len(), 2);

        let mid = prj.project((Vec3::X + Vec3::Y).normalized()).win;
        assert!(out.iter().all(|t| t.positions.contains(&mid)));
    }

    #[test]
    fn persistent_seam_is_dropped_at_depth_ceiling() {
        // Every checked edge touching X reports a seam, forever.
        let prj = MockProjector::new().with_seam(|a, b| a == Vec3::X || b == Vec3::X);
        let out = tessellate(&prj, &SphericalTriangle::new(OCTANT), None, &loose());
        // Only pieces away from X survive.
        assert!(!out.is_empty());
        let x = prj.project(Vec3::X).win;
        assert!(out.iter().all(|t| !t.positions.contains(&x)));
    }

    #[test]
    fn step_reports_split_children_and_checks() {
        let prj = MockProjector::new().with_seam(seam_on(Vec3::Y, Vec3::Z));
        let tri = SphericalTriangle::new(OCTANT);
        match subdivide_step(&prj, &tri, None, EdgeChecks::ALL, 0, &loose()) {
            Subdivision::Split { children, clip_active } => {
                assert!(!clip_active);
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].1, EdgeChecks::new(false, true, true));
                assert_eq!(children[1].1, EdgeChecks::new(true, true, false));
                let m12 = (Vec3::Y + Vec3::Z).normalized();
                assert_eq!(children[0].0.vertices, [Vec3::X, Vec3::Y, m12]);
            }
            other => panic!("expected a split, got {other:?}"),
        }
    }

    #[test]
    fn unchecked_edge_is_not_split() {
        let prj = MockProjector::new().with_seam(seam_on(Vec3::X, Vec3::Y));
        let tri = SphericalTriangle::new(OCTANT);
        let step = subdivide_step(&prj, &tri, None, EdgeChecks::new(false, true, true), 0, &loose());
        assert!(matches!(step, Subdivision::Emit(_)));
    }

    // ── distortion ────────────────────────────────────────────────────────

    #[test]
    fn output_count_bounded_by_depth() {
        let prj = AzimuthalProjector::new(
            AzimuthalKind::Stereographic,
            ViewFrame::default(),
            3.0,
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        let params = TessellationParams::new(1e-9, 5);
        let out = tessellate(&prj, &SphericalTriangle::new(OCTANT), None, &params);
        assert!(out.len() > 1);
        assert!(out.len() <= 4usize.pow(5));
    }

    #[test]
    fn attributes_are_interpolated_by_mean() {
        let prj = MockProjector::new().with_seam(seam_on(Vec3::X, Vec3::Y));
        let tri = SphericalTriangle::new(OCTANT)
            .with_tex_coords([Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)])
            .with_colors([Color::BLACK, Color::WHITE, Color::BLACK]);
        let out = tessellate(&prj, &tri, None, &loose());
        let first = &out[0];
        assert_eq!(first.tex_coords.unwrap()[1], Vec2::new(0.5, 0.0));
        assert_eq!(first.colors.unwrap()[1], Color::new(0.5, 0.5, 0.5, 1.0));
    }

    // ── clipping cap ──────────────────────────────────────────────────────

    #[test]
    fn disjoint_cap_culls() {
        let prj = MockProjector::new();
        let cap = SphericalCap::from_radius(-Vec3::new(1.0, 1.0, 1.0).normalized(), 0.1);
        let out = tessellate(&prj, &SphericalTriangle::new(OCTANT), Some(&cap), &loose());
        assert!(out.is_empty());
    }

    #[test]
    fn containing_cap_disables_clipping_for_children() {
        let prj = MockProjector::new().with_seam(seam_on(Vec3::X, Vec3::Y));
        let cap = SphericalCap::new(Vec3::new(1.0, 1.0, 1.0).normalized(), 0.0);
        let tri = SphericalTriangle::new(OCTANT);
        match subdivide_step(&prj, &tri, Some(&cap), EdgeChecks::ALL, 0, &loose()) {
            Subdivision::Split { clip_active, .. } => assert!(!clip_active),
            other => panic!("expected a split, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "unit length")]
    fn non_unit_vertex_panics() {
        let prj = MockProjector::new();
        let tri = SphericalTriangle::new([Vec3::X * 2.0, Vec3::Y, Vec3::Z]);
        tessellate(&prj, &tri, None, &loose());
    }

    // ── output accumulation ───────────────────────────────────────────────

    #[test]
    fn output_streams_stay_aligned() {
        let prj = MockProjector::new().with_seam(seam_on(Vec3::X, Vec3::Y));
        let tri = SphericalTriangle::new(OCTANT).with_colors([Color::WHITE; 3]);
        let mut out = TessellationOutput::new(false, true);
        tessellate_triangle(&prj, &tri, None, &loose(), &mut |t| out.push(t));
        assert_eq!(out.len(), 6);
        assert_eq!(out.colors.as_ref().map(Vec::len), Some(6));
        assert!(out.tex_coords.is_none());
    }
}
