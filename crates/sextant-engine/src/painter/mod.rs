//! The painter facade and the long-lived context that hands painters out.

mod config;
mod context;
mod guard;
mod label;
mod mesh;
#[allow(clippy::module_inception)]
mod painter;
mod sky;

pub use config::PainterConfig;
pub use context::RenderContext;
pub use painter::Painter;
