//! Spherical geometry: caps, adaptive tessellation and mesh generation.
//!
//! Everything here is pure CPU work against a [`Projector`](crate::projector::Projector);
//! nothing touches the GPU. The painter feeds the results to the draw dispatcher.

mod cap;

pub mod arc;
pub mod mesh;
pub mod region;
pub mod segment;
pub mod triangle;
pub mod vertex_array;

pub use arc::{
    arc_runs, tessellate_arc, ArcPoint, EdgeCrossing, ARC_HIDDEN_Z, ARC_SEAM_Z, ARC_VISIBLE_Z,
    MAX_ARC_ITERATIONS,
};
pub use cap::SphericalCap;
pub use region::{RegionDrawMode, SphericalConvexPolygon, SphericalRegion};
pub use segment::{segment_by_discontinuity, segment_polyline};
pub use triangle::{
    subdivide_step, tessellate, tessellate_triangle, EdgeChecks, FlatTriangle, SphericalTriangle,
    Subdivision, TessellationOutput, TessellationParams,
};
pub use mesh::SphereParams;
pub use vertex_array::SkyVertexArray;

pub(crate) use cap::arc_max_dot;
