//! Label text: loaded fonts, whole-string rasterization, the texture cache
//! and curved (gravity) layout.

mod cache;
mod font_system;
mod gravity;

pub use cache::{GlyphTexture, TextCacheStats, TextKey, TextTextureCache, DEFAULT_TEXT_CACHE_MAX_COST};
pub use font_system::{FontId, FontLoadError, FontSystem, RasterizedText};
pub use gravity::{layout_gravity, GravityGlyph, GravityParams, MAX_ANGLE_PER_CHAR};
