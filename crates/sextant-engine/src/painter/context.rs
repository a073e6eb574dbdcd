use std::sync::Arc;

use crate::projector::Projector;
use crate::render::{Backend, Dispatcher};
use crate::text::{FontSystem, TextCacheStats, TextTextureCache};

use super::{Painter, PainterConfig};

/// Everything painters share across frames: the backend, loaded fonts, the
/// text texture cache and the dispatcher's scratch buffers.
///
/// Lifecycle:
/// 1. [`new`](Self::new) with a config; fonts may be loaded right away.
/// 2. [`initialize`](Self::initialize) once a graphics backend exists.
/// 3. [`painter`](Self::painter) per frame or per layer.
/// 4. [`teardown`](Self::teardown) before the graphics device goes away; it
///    drops every cached texture and hands the backend back.
pub struct RenderContext<B: Backend> {
    config: PainterConfig,
    backend: Option<B>,
    fonts: FontSystem,
    text_cache: TextTextureCache<B::Texture>,
    dispatcher: Dispatcher,
}

impl<B: Backend> RenderContext<B> {
    pub fn new(config: PainterConfig) -> Self {
        let text_cache = TextTextureCache::new(config.text_cache_max_cost);
        let dispatcher = Dispatcher::new(config.force_wide_line_emulation);
        Self { config, backend: None, fonts: FontSystem::new(), text_cache, dispatcher }
    }

    /// Attaches the backend. Panics if one is already attached.
    #[track_caller]
    pub fn initialize(&mut self, backend: B) {
        assert!(self.backend.is_none(), "render context is already initialized");
        let caps = backend.capabilities();
        log::info!(
            "RenderContext: initialized (wide lines: {}, line smoothing: {})",
            caps.wide_lines,
            caps.line_smooth
        );
        self.backend = Some(backend);
    }

    /// Clears the text cache and detaches the backend.
    ///
    /// Cached textures are released before the backend is returned, so the
    /// caller may destroy the device right after.
    pub fn teardown(&mut self) -> Option<B> {
        self.text_cache.clear();
        let backend = self.backend.take();
        if backend.is_some() {
            log::info!("RenderContext: torn down");
        }
        backend
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn config(&self) -> &PainterConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontSystem {
        &mut self.fonts
    }

    pub fn text_cache_stats(&self) -> TextCacheStats {
        self.text_cache.stats()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// Starts painting through `prj`.
    ///
    /// Panics if the context is not initialized, or (debug builds) if another
    /// painter is alive.
    #[track_caller]
    pub fn painter(&mut self, prj: Arc<dyn Projector>) -> Painter<'_, B> {
        let Some(backend) = self.backend.as_mut() else {
            panic!("render context is not initialized");
        };
        Painter::new(
            backend,
            &self.fonts,
            &mut self.text_cache,
            &mut self.dispatcher,
            &self.config,
            prj,
        )
    }
}

impl<B: Backend> Drop for RenderContext<B> {
    fn drop(&mut self) {
        if self.backend.is_some() {
            log::debug!("RenderContext: dropped without teardown");
        }
    }
}
