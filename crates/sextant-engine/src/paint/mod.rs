//! Color and blending vocabulary shared by the painter and GPU backends.

mod blend;
mod color;

pub use blend::{BlendFactor, BlendFunc};
pub use color::Color;
