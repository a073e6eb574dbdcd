//! Coordinate and geometry types shared by projectors, tessellators and the painter.
//!
//! Screen space:
//! - Physical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Sky space: unit direction vectors in double precision.

mod mat4;
mod rect;
mod vec2;
mod vec3;

pub use mat4::Mat4;
pub use rect::Rect;
pub use vec2::Vec2;
pub use vec3::{assert_unit, Vec3, UNIT_NORM_TOLERANCE};
