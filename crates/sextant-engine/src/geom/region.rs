use crate::coords::{assert_unit, Vec2, Vec3};
use crate::render::Topology;

use super::{SkyVertexArray, SphericalCap};

/// How a spherical region is drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RegionDrawMode {
    /// Outline only.
    Boundary,
    /// Flat color fill.
    #[default]
    Fill,
    /// Textured fill.
    TextureFill,
    /// Textured fill modulated by per-vertex colors.
    TextureFillColormodulated,
}

impl RegionDrawMode {
    #[inline]
    pub fn textured(self) -> bool {
        matches!(self, Self::TextureFill | Self::TextureFillColormodulated)
    }

    #[inline]
    pub fn colored(self) -> bool {
        self == Self::TextureFillColormodulated
    }
}

/// A region of the sphere the painter can outline or fill.
pub trait SphericalRegion {
    /// Cap containing the whole region.
    fn bounding_cap(&self) -> SphericalCap;

    /// Closed outline, as a `LineLoop`.
    fn outline(&self) -> SkyVertexArray;

    /// Interior, as a triangle topology.
    fn fill(&self) -> SkyVertexArray;
}

/// Convex polygon with great-circle edges, corners in counter-clockwise order
/// seen from outside the sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalConvexPolygon {
    corners: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
}

impl SphericalConvexPolygon {
    #[track_caller]
    pub fn new(corners: Vec<Vec3>) -> Self {
        assert!(corners.len() >= 3, "a polygon needs at least 3 corners");
        for c in &corners {
            assert_unit(*c);
        }
        Self { corners, tex_coords: Vec::new() }
    }

    #[track_caller]
    pub fn with_tex_coords(mut self, tex_coords: Vec<Vec2>) -> Self {
        assert_eq!(tex_coords.len(), self.corners.len(), "one texture coordinate per corner");
        self.tex_coords = tex_coords;
        self
    }

    pub fn corners(&self) -> &[Vec3] {
        &self.corners
    }

    fn array(&self, topology: Topology) -> SkyVertexArray {
        let arr = SkyVertexArray::new(topology, self.corners.clone());
        if self.tex_coords.is_empty() {
            arr
        } else {
            arr.with_tex_coords(self.tex_coords.clone())
        }
    }
}

impl SphericalRegion for SphericalConvexPolygon {
    fn bounding_cap(&self) -> SphericalCap {
        let sum = self.corners.iter().fold(Vec3::ZERO, |acc, c| acc + *c);
        if sum.norm_squared() < 1e-24 {
            return SphericalCap::full_sphere();
        }
        let n = sum.normalized();
        let d = self.corners.iter().map(|c| c.dot(n)).fold(1.0, f64::min);
        // Below a hemisphere the cap is convex and holds the edges too.
        if d < 0.0 { SphericalCap::full_sphere() } else { SphericalCap::new(n, d) }
    }

    fn outline(&self) -> SkyVertexArray {
        self.array(Topology::LineLoop)
    }

    fn fill(&self) -> SkyVertexArray {
        self.array(Topology::TriangleFan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octant() -> SphericalConvexPolygon {
        SphericalConvexPolygon::new(vec![Vec3::X, Vec3::Y, Vec3::Z])
    }

    #[test]
    fn bounding_cap_holds_corners_and_edges() {
        let poly = octant();
        let cap = poly.bounding_cap();
        assert!(poly.corners().iter().all(|c| cap.contains(*c)));
        assert!(cap.contains((Vec3::X + Vec3::Y).normalized()));
        assert!(cap.d > 0.5);
    }

    #[test]
    fn outline_is_a_loop_and_fill_a_fan() {
        let poly = octant();
        assert_eq!(poly.outline().topology, Topology::LineLoop);
        let fill = poly.fill();
        assert_eq!(fill.triangles().count(), 1);
    }

    #[test]
    fn texture_coordinates_follow_corners() {
        let poly = octant().with_tex_coords(vec![Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);
        assert!(poly.fill().is_textured());
        assert!(poly.outline().is_textured());
    }

    #[test]
    fn mode_streams() {
        assert!(!RegionDrawMode::Fill.textured());
        assert!(RegionDrawMode::TextureFill.textured());
        assert!(!RegionDrawMode::TextureFill.colored());
        assert!(RegionDrawMode::TextureFillColormodulated.colored());
    }

    #[test]
    #[should_panic(expected = "at least 3 corners")]
    fn degenerate_polygon_panics() {
        let _ = SphericalConvexPolygon::new(vec![Vec3::X, Vec3::Y]);
    }
}
