//! Sextant engine crate.
//!
//! Projection-aware immediate-mode painter for sky rendering: projectors,
//! spherical tessellation, draw dispatch over a pluggable GPU backend, and
//! cached text textures.

pub mod logging;
pub mod coords;
pub mod paint;
pub mod projector;
pub mod geom;
pub mod render;
pub mod text;
pub mod painter;

#[cfg(test)]
mod testing;
