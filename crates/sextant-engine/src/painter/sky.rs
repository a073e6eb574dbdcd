//! Sky primitives: arcs, paths, vertex arrays and regions given as directions.

use std::sync::Arc;

use crate::coords::Vec3;
use crate::geom::{
    arc_runs, segment_polyline, tessellate_arc, tessellate_triangle, EdgeCrossing, RegionDrawMode,
    SkyVertexArray, SphericalCap, SphericalRegion, SphericalTriangle, TessellationOutput,
    TessellationParams,
};
use crate::paint::Color;
use crate::projector::Projected;
use crate::render::{ArrayDesc, Backend, DrawRequest, Topology, VertexArrays};

use super::Painter;

impl<B: Backend> Painter<'_, B> {
    /// Draws the minor great-circle arc `start → stop`, clipped to `clip_cap`.
    ///
    /// `on_edge` receives every viewport-edge crossing of the drawn pieces.
    /// Returns whether anything was drawn.
    pub fn draw_great_circle_arc(
        &mut self,
        start: Vec3,
        stop: Vec3,
        clip_cap: Option<&SphericalCap>,
        on_edge: Option<&mut dyn FnMut(EdgeCrossing)>,
    ) -> bool {
        let (start, stop) = match clip_cap {
            Some(cap) => match cap.clip_great_circle(start, stop) {
                Some(clipped) => clipped,
                None => return false,
            },
            None => (start, stop),
        };
        self.draw_small_circle_arc(start, stop, Vec3::ZERO, on_edge)
    }

    /// Draws the arc `start → stop` around `rot_center`; a zero center means
    /// the great circle through both points.
    pub fn draw_small_circle_arc(
        &mut self,
        start: Vec3,
        stop: Vec3,
        rot_center: Vec3,
        on_edge: Option<&mut dyn FnMut(EdgeCrossing)>,
    ) -> bool {
        let points = tessellate_arc(&*self.prj, start, stop, rot_center, self.config.max_arc_iterations);
        let (runs, crossings) = arc_runs(&*self.prj, &points);
        if let Some(on_edge) = on_edge {
            for crossing in crossings {
                on_edge(crossing);
            }
        }

        for run in &runs {
            let win: Vec<Vec3> = points[run.clone()].iter().map(|p| p.win).collect();
            self.draw_window(Topology::LineStrip, VertexArrays::new(ArrayDesc::vec3(&win)));
        }
        !runs.is_empty()
    }

    /// Draws every edge of a line array as a great-circle arc.
    ///
    /// Panics on indexed arrays, single vertices and non-line topologies.
    #[track_caller]
    pub fn draw_great_circle_arcs(&mut self, arr: &SkyVertexArray, clip_cap: Option<&SphericalCap>) {
        assert!(!arr.is_indexed(), "great circle arcs need a non-indexed array");
        let v = &arr.vertices;
        assert!(v.len() != 1, "great circle arcs need at least two vertices");

        match arr.topology {
            Topology::Lines => {
                assert!(v.len() % 2 == 0, "line pairs need an even vertex count");
                for pair in v.chunks_exact(2) {
                    self.draw_great_circle_arc(pair[0], pair[1], clip_cap, None);
                }
            }
            Topology::LineStrip => {
                for pair in v.windows(2) {
                    self.draw_great_circle_arc(pair[0], pair[1], clip_cap, None);
                }
            }
            Topology::LineLoop => {
                for pair in v.windows(2) {
                    self.draw_great_circle_arc(pair[0], pair[1], clip_cap, None);
                }
                if let (Some(&first), Some(&last)) = (v.first(), v.last()) {
                    self.draw_great_circle_arc(last, first, clip_cap, None);
                }
            }
            other => panic!("great circle arcs need a line topology, got {other:?}"),
        }
    }

    /// Polyline through `points` with one color per point, broken at seams.
    ///
    /// Projectors that flag hidden points reliably also break it at them.
    #[track_caller]
    pub fn draw_path(&mut self, points: &[Vec3], colors: &[Color]) {
        assert_eq!(points.len(), colors.len(), "one color per path point");
        let prj = Arc::clone(&self.prj);
        let projected: Vec<Projected> = points.iter().map(|v| prj.project(v.normalized())).collect();
        let cull = prj.supports_hidden_point_culling();

        let runs = segment_polyline(
            points.len(),
            |i, j| prj.intersects_discontinuity(points[i], points[j]),
            |i| !cull || projected[i].visible,
        );
        for run in runs {
            let win: Vec<Vec3> = projected[run.clone()].iter().map(|p| p.win).collect();
            let arrays = VertexArrays::new(ArrayDesc::vec3(&win)).with_colors(ArrayDesc::colors(&colors[run]));
            self.draw_window(Topology::LineStrip, arrays);
        }
    }

    /// Draws `arr` with all its streams.
    ///
    /// With `check_discontinuity`, triangles crossing a seam are dropped.
    /// A non-zero `aberration` shifts every direction before projecting.
    pub fn draw_sky_vertex_array(&mut self, arr: &SkyVertexArray, check_discontinuity: bool, aberration: Vec3) {
        self.draw_sky_arrays(arr, true, true, check_discontinuity, aberration);
    }

    fn draw_sky_arrays(
        &mut self,
        arr: &SkyVertexArray,
        textured: bool,
        colored: bool,
        check_discontinuity: bool,
        aberration: Vec3,
    ) {
        if check_discontinuity && self.prj.has_discontinuity() && arr.topology.is_triangle() {
            let kept = arr.remove_discontinuous_triangles(&*self.prj);
            if !kept.indices.is_empty() {
                self.draw_sky_arrays(&kept, textured, colored, false, aberration);
            }
            return;
        }
        if aberration != Vec3::ZERO {
            let shifted = arr.with_aberration(aberration);
            self.draw_sky_arrays(&shifted, textured, colored, false, Vec3::ZERO);
            return;
        }

        // Texture coordinates only matter with something to sample.
        let textured = textured && self.texture.is_some();
        let mut req = DrawRequest::new(arr.topology, arr.arrays(textured, colored));
        if arr.is_indexed() {
            req = req.indexed(&arr.indices);
        }
        self.draw_from_array(req);
    }

    /// Draws the triangles of `arr` as spherical triangles.
    ///
    /// With `subdivide`, each triangle is refined until its projection bends
    /// less than `max_sq_distortion` (px², config default when `None`) and
    /// clipped to `clip_cap`.
    #[allow(clippy::too_many_arguments)]
    #[track_caller]
    pub fn draw_spherical_triangles(
        &mut self,
        arr: &SkyVertexArray,
        textured: bool,
        colored: bool,
        clip_cap: Option<&SphericalCap>,
        subdivide: bool,
        max_sq_distortion: Option<f64>,
    ) {
        if arr.is_empty() {
            return;
        }
        assert!(arr.vertices.len() > 2, "spherical triangles need at least three vertices");
        if !subdivide {
            self.draw_sky_arrays(arr, textured, colored, true, Vec3::ZERO);
            return;
        }

        let params = TessellationParams::new(
            max_sq_distortion.unwrap_or(self.config.default_max_sq_distortion),
            self.config.max_triangle_depth,
        );
        let textured = textured && self.texture.is_some();
        if textured {
            assert!(arr.is_textured(), "textured triangles need texture coordinates");
        }
        if colored {
            assert!(arr.is_colored(), "colored triangles need vertex colors");
        }

        let prj = Arc::clone(&self.prj);
        let mut out = TessellationOutput::new(textured, colored);
        for corners in arr.triangles() {
            let mut tri = SphericalTriangle::new(corners.map(|i| arr.vertices[i].normalized()));
            if textured {
                tri = tri.with_tex_coords(corners.map(|i| arr.tex_coords[i]));
            }
            if colored {
                tri = tri.with_colors(corners.map(|i| arr.colors[i]));
            }
            tessellate_triangle(&*prj, &tri, clip_cap, &params, &mut |flat| out.push(flat));
        }
        if out.is_empty() {
            return;
        }

        let mut arrays = VertexArrays::new(ArrayDesc::vec3(&out.positions));
        if let Some(tex) = &out.tex_coords {
            arrays = arrays.with_tex_coords(ArrayDesc::vec2(tex));
        }
        if let Some(colors) = &out.colors {
            arrays = arrays.with_colors(ArrayDesc::colors(colors));
        }
        self.draw_window(Topology::Triangles, arrays);
    }

    /// Outlines or fills `region`. Regions outside the projector's bounding
    /// cap are skipped. Fills cull back faces while drawing and never keep a
    /// triangle that crosses a seam.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_spherical_region(
        &mut self,
        region: &dyn SphericalRegion,
        mode: RegionDrawMode,
        clip_cap: Option<&SphericalCap>,
        subdivide: bool,
        max_sq_distortion: Option<f64>,
        aberration: Vec3,
    ) {
        let bounds = region.bounding_cap();
        if !self.prj.bounding_cap().intersects_cap(&bounds) {
            return;
        }

        if mode == RegionDrawMode::Boundary {
            let outline = region.outline();
            if subdivide || self.prj.cap_intersects_discontinuity(&bounds) {
                self.draw_great_circle_arcs(&outline, clip_cap);
            } else {
                self.draw_sky_arrays(&outline, false, false, false, Vec3::ZERO);
            }
            return;
        }

        let old_cull = self.state.cull_face;
        self.set_cull_face(true);
        let mut fill = region.fill();
        if aberration != Vec3::ZERO {
            fill = fill.with_aberration(aberration);
        }
        self.draw_spherical_triangles(&fill, mode.textured(), mode.colored(), clip_cap, subdivide, max_sq_distortion);
        self.set_cull_face(old_cull);
    }
}
