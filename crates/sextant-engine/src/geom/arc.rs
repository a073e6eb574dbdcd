//! Adaptive tessellation of great- and small-circle arcs.
//!
//! Arcs are bisected until each projected piece looks straight, then split
//! into drawable runs: a run breaks wherever both ends of a piece are hidden
//! or off screen, and at seams.

use std::ops::Range;

use crate::coords::{Vec2, Vec3};
use crate::projector::Projector;

use super::segment_polyline;

/// `z` marker of a tessellated point that projected successfully.
pub const ARC_VISIBLE_Z: f64 = 1.0;
/// `z` marker of a point behind the viewer.
pub const ARC_HIDDEN_Z: f64 = -1.0;
/// `z` marker of the two ends of a piece still straddling a seam after the
/// last bisection.
pub const ARC_SEAM_Z: f64 = -2.0;

/// Default bisection depth; at most `2^10` pieces per arc.
pub const MAX_ARC_ITERATIONS: u32 = 10;

const STRAIGHT_COS: f32 = -0.999;
const MAX_SPAN_PX2: f32 = 50.0 * 50.0;

/// One tessellated arc point in window coordinates; `z` holds a marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcPoint {
    pub win: Vec3,
}

impl ArcPoint {
    fn marked(mut win: Vec3, visible: bool) -> Self {
        win.z = if visible { ARC_VISIBLE_Z } else { ARC_HIDDEN_Z };
        Self { win }
    }

    #[inline]
    pub fn is_visible(self) -> bool {
        self.win.z > 0.0
    }

    #[inline]
    pub fn screen(self) -> Vec2 {
        Vec2::new(self.win.x as f32, self.win.y as f32)
    }
}

/// Viewport-edge crossing found while splitting an arc into runs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeCrossing {
    /// Window position on the viewport boundary.
    pub screen_pos: Vec3,
    /// Screen direction pointing out of the viewport.
    pub direction: Vec3,
}

struct ArcTessellator<'a, P: ?Sized> {
    prj: &'a P,
    center: Vec3,
    radius: f64,
    max_iterations: u32,
    out: Vec<ArcPoint>,
}

impl<P: Projector + ?Sized> ArcTessellator<'_, P> {
    fn refine(&mut self, p1: Vec3, p2: Vec3, win1: Vec3, win2: Vec3, depth: u32, check_seam: bool) {
        let crosses = check_seam
            && self.prj.intersects_discontinuity(p1 + self.center, p2 + self.center);
        if crosses && depth >= self.max_iterations {
            self.out.push(ArcPoint { win: Vec3::new(win1.x, win1.y, ARC_SEAM_Z) });
            self.out.push(ArcPoint { win: Vec3::new(win2.x, win2.y, ARC_SEAM_Z) });
            return;
        }

        let mid = (p1 + p2).normalized() * self.radius;
        let projected = self.prj.project(mid + self.center);
        let win3 = projected.win;

        let v1 = Vec2::new((win1.x - win3.x) as f32, (win1.y - win3.y) as f32);
        let v2 = Vec2::new((win2.x - win3.x) as f32, (win2.y - win3.y) as f32);
        let span = (v1.length_squared() * v2.length_squared()).sqrt();
        // Coincident points count as straight.
        let cos = if span > 0.0 { v1.dot(v2) / span } else { -1.0 };

        if (cos > STRAIGHT_COS || span > MAX_SPAN_PX2 || crosses) && depth < self.max_iterations {
            let mid_point = ArcPoint::marked(win3, projected.visible);
            let check = crosses || span > MAX_SPAN_PX2;
            self.refine(p1, mid, win1, mid_point.win, depth + 1, check);
            self.out.push(mid_point);
            self.refine(mid, p2, mid_point.win, win2, depth + 1, check);
        }
    }
}

/// Tessellates the arc from `start` to `stop` (unit vectors).
///
/// A zero `rot_center` selects the great circle through both points. Any
/// other value is the 3D center of the small circle the arc lies on, with
/// the rotation axis through it.
pub fn tessellate_arc<P: Projector + ?Sized>(
    prj: &P,
    start: Vec3,
    stop: Vec3,
    rot_center: Vec3,
    max_iterations: u32,
) -> Vec<ArcPoint> {
    let first = prj.project(start);
    let last = prj.project(stop);
    let win1 = ArcPoint::marked(first.win, first.visible);
    let win2 = ArcPoint::marked(last.win, last.visible);

    let (center, radius, p1, p2) = if rot_center.norm_squared() < 1e-11 {
        (Vec3::ZERO, 1.0, start, stop)
    } else {
        let radius = rot_center.cross(start).norm() / rot_center.norm();
        (rot_center, radius, start - rot_center, stop - rot_center)
    };

    let mut tess = ArcTessellator { prj, center, radius, max_iterations, out: vec![win1] };
    tess.refine(p1, p2, win1.win, win2.win, 0, true);
    tess.out.push(win2);
    tess.out
}

/// Splits tessellated arc points into drawable runs.
///
/// A piece is drawn when either end is visible and inside the viewport.
/// Crossings of the viewport edge by drawn pieces are reported alongside.
pub fn arc_runs<P: Projector + ?Sized>(
    prj: &P,
    points: &[ArcPoint],
) -> (Vec<Range<usize>>, Vec<EdgeCrossing>) {
    let in_viewport: Vec<bool> = points.iter().map(|p| prj.check_in_viewport(p.win)).collect();
    let drawn = |i: usize| points[i].is_visible() && in_viewport[i];

    let mut crossings = Vec::new();
    let runs = segment_polyline(
        points.len(),
        |i, j| {
            let keep = drawn(i) || drawn(j);
            if keep && in_viewport[i] != in_viewport[j] {
                let (inside, outside) = if in_viewport[i] { (i, j) } else { (j, i) };
                let (a, b) = (points[inside].win, points[outside].win);
                crossings.push(EdgeCrossing {
                    screen_pos: prj.viewport_intersect(a, b),
                    direction: b - a,
                });
            }
            !keep
        },
        |_| true,
    );
    (runs, crossings)
}
