use crate::coords::{Vec2, Vec3};
use crate::paint::Color;
use crate::projector::Projector;
use crate::render::{ArrayDesc, Topology, VertexArrays};

/// Owned vertex data on the sphere, ready to be drawn or tessellated.
///
/// `tex_coords` and `colors` are either empty or as long as `vertices`.
/// `indices` is empty for non-indexed arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyVertexArray {
    pub topology: Topology,
    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub colors: Vec<Color>,
    pub indices: Vec<u16>,
}

impl SkyVertexArray {
    pub fn new(topology: Topology, vertices: Vec<Vec3>) -> Self {
        Self {
            topology,
            vertices,
            tex_coords: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
        }
    }

    #[track_caller]
    pub fn with_tex_coords(mut self, tex_coords: Vec<Vec2>) -> Self {
        assert_eq!(tex_coords.len(), self.vertices.len(), "one texture coordinate per vertex");
        self.tex_coords = tex_coords;
        self
    }

    #[track_caller]
    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        assert_eq!(colors.len(), self.vertices.len(), "one color per vertex");
        self.colors = colors;
        self
    }

    #[track_caller]
    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        assert!(
            indices.iter().all(|&i| (i as usize) < self.vertices.len()),
            "index out of range"
        );
        self.indices = indices;
        self
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    #[inline]
    pub fn is_textured(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    #[inline]
    pub fn is_colored(&self) -> bool {
        !self.colors.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of elements the topology walks: indices when indexed, vertices otherwise.
    #[inline]
    pub fn element_count(&self) -> usize {
        if self.is_indexed() { self.indices.len() } else { self.vertices.len() }
    }

    /// Vertex index triplets of every triangle, for triangle topologies.
    ///
    /// Strips alternate winding so every triangle keeps the orientation of
    /// the first one. Other topologies yield nothing.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let n = self.element_count();
        let (count, topology) = match self.topology {
            Topology::Triangles => (n / 3, self.topology),
            Topology::TriangleStrip | Topology::TriangleFan => (n.saturating_sub(2), self.topology),
            _ => (0, self.topology),
        };
        let at = move |k: usize| if self.is_indexed() { self.indices[k] as usize } else { k };
        (0..count).map(move |t| {
            let [a, b, c] = match topology {
                Topology::Triangles => [3 * t, 3 * t + 1, 3 * t + 2],
                Topology::TriangleStrip if t % 2 == 1 => [t + 1, t, t + 2],
                Topology::TriangleStrip => [t, t + 1, t + 2],
                _ => [0, t + 1, t + 2],
            };
            [at(a), at(b), at(c)]
        })
    }

    /// Indexed triangle list of the triangles with no edge on a seam.
    ///
    /// Panics if the array has more vertices than 16-bit indices address.
    #[track_caller]
    pub fn remove_discontinuous_triangles<P: Projector + ?Sized>(&self, prj: &P) -> SkyVertexArray {
        let v = &self.vertices;
        assert!(
            v.len() <= u16::MAX as usize + 1,
            "seam removal exceeds 16-bit indices ({} vertices)",
            v.len()
        );
        let crosses = |a: usize, b: usize| prj.intersects_discontinuity(v[a], v[b]);
        let indices = self
            .triangles()
            .filter(|&[a, b, c]| !(crosses(a, b) || crosses(b, c) || crosses(c, a)))
            .flat_map(|t| t.map(|i| i as u16))
            .collect();
        SkyVertexArray {
            topology: Topology::Triangles,
            vertices: self.vertices.clone(),
            tex_coords: self.tex_coords.clone(),
            colors: self.colors.clone(),
            indices,
        }
    }

    /// Directions shifted by `velocity` (aberration) and renormalized.
    pub fn with_aberration(&self, velocity: Vec3) -> SkyVertexArray {
        let mut out = self.clone();
        for v in &mut out.vertices {
            *v = (*v + velocity).normalized();
        }
        out
    }

    /// Borrowed stream descriptors for the dispatcher.
    pub fn arrays(&self, textured: bool, colored: bool) -> VertexArrays<'_> {
        let mut arrays = VertexArrays::new(ArrayDesc::vec3(&self.vertices));
        if textured && self.is_textured() {
            arrays = arrays.with_tex_coords(ArrayDesc::vec2(&self.tex_coords));
        }
        if colored && self.is_colored() {
            arrays = arrays.with_colors(ArrayDesc::colors(&self.colors));
        }
        arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::projector::CylindricalProjector;

    fn quad() -> Vec<Vec3> {
        vec![Vec3::X, Vec3::Y, -Vec3::X, -Vec3::Y]
    }

    // ── triangle walk ─────────────────────────────────────────────────────

    #[test]
    fn strip_alternates_winding() {
        let arr = SkyVertexArray::new(Topology::TriangleStrip, quad());
        let tris: Vec<_> = arr.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn fan_pivots_on_first_vertex() {
        let arr = SkyVertexArray::new(Topology::TriangleFan, quad());
        let tris: Vec<_> = arr.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn indexed_list_resolves_indices() {
        let arr = SkyVertexArray::new(Topology::Triangles, quad()).with_indices(vec![3, 2, 1, 0, 1, 2]);
        let tris: Vec<_> = arr.triangles().collect();
        assert_eq!(tris, vec![[3, 2, 1], [0, 1, 2]]);
    }

    #[test]
    fn line_topologies_have_no_triangles() {
        let arr = SkyVertexArray::new(Topology::LineStrip, quad());
        assert_eq!(arr.triangles().count(), 0);
    }

    // ── seams and aberration ──────────────────────────────────────────────

    #[test]
    fn seam_triangles_are_removed() {
        let prj = CylindricalProjector::whole_sky(0.0, Rect::new(0.0, 0.0, 720.0, 360.0));
        let z = Vec3::Z;
        let near = |lon: f64| Vec3::from_spherical(lon.to_radians(), 0.0);
        // First triangle straddles lon 180°, second sits at lon 0°.
        let arr = SkyVertexArray::new(
            Topology::Triangles,
            vec![near(170.0), near(-170.0), z, near(-10.0), near(10.0), z],
        );
        let cleaned = arr.remove_discontinuous_triangles(&prj);
        assert_eq!(cleaned.topology, Topology::Triangles);
        assert_eq!(cleaned.indices, vec![3, 4, 5]);
        assert_eq!(cleaned.vertices.len(), 6);
    }

    #[test]
    fn aberration_keeps_unit_length() {
        let arr = SkyVertexArray::new(Topology::Points, vec![Vec3::X, Vec3::Z]);
        let shifted = arr.with_aberration(Vec3::new(0.0, 1e-4, 0.0));
        assert!(shifted.vertices.iter().all(|v| v.is_unit()));
        assert!(shifted.vertices[0].y > 0.0);
    }

    #[test]
    #[should_panic(expected = "16-bit indices")]
    fn seam_removal_rejects_unindexable_arrays() {
        let arr = SkyVertexArray::new(Topology::Triangles, vec![Vec3::Z; 3 * 21_846]);
        let _ = arr.remove_discontinuous_triangles(&CylindricalProjector::whole_sky(0.0, Rect::new(0.0, 0.0, 720.0, 360.0)));
    }

    #[test]
    #[should_panic(expected = "one color per vertex")]
    fn short_color_stream_panics() {
        let _ = SkyVertexArray::new(Topology::Points, quad()).with_colors(vec![Color::WHITE]);
    }
}
