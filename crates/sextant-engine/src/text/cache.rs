use lru::LruCache;

use crate::coords::Vec2;

/// Default cost ceiling, in bytes of RGB texture equivalent.
pub const DEFAULT_TEXT_CACHE_MAX_COST: usize = 7_000_000;

/// Cache key: the string and the pixel size it was rasterized at.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TextKey {
    pub text: String,
    pub pixel_size: u32,
}

impl TextKey {
    pub fn new(text: &str, pixel_size: u32) -> Self {
        Self { text: text.to_owned(), pixel_size }
    }
}

/// A rendered string owned by the cache.
#[derive(Debug, Clone)]
pub struct GlyphTexture<T> {
    pub texture: T,
    /// Used area of the texture, in pixels.
    pub width: u32,
    pub height: u32,
    /// Used area as a fraction of the texture.
    pub tex_size: Vec2,
    /// Distance from the top of the used area to the baseline, in pixels.
    pub ascent: f32,
    pub pixel_size: u32,
}

impl<T> GlyphTexture<T> {
    /// Bookkeeping cost: three bytes per used texel.
    #[inline]
    pub fn cost(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Counters reported by [`TextTextureCache::stats`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TextCacheStats {
    pub entries: usize,
    pub cost: usize,
    pub max_cost: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Least-recently-used cache of rendered strings bounded by total cost.
///
/// Entries above the ceiling are evicted oldest first after each insert.
/// The newest entry always survives, even when it alone is over the ceiling.
pub struct TextTextureCache<T> {
    entries: LruCache<TextKey, GlyphTexture<T>>,
    total_cost: usize,
    max_cost: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<T> TextTextureCache<T> {
    pub fn new(max_cost: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            total_cost: 0,
            max_cost,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Returns the entry for `key`, creating it with `make` on a miss.
    ///
    /// `make` returning `None` (nothing to draw, upload failure) caches
    /// nothing.
    pub fn get_or_insert_with(
        &mut self,
        key: &TextKey,
        make: impl FnOnce() -> Option<GlyphTexture<T>>,
    ) -> Option<&GlyphTexture<T>> {
        if self.entries.contains(key) {
            self.hits += 1;
            return self.entries.get(key);
        }

        self.misses += 1;
        let entry = make()?;
        self.total_cost += entry.cost();
        self.entries.put(key.clone(), entry);
        self.evict();
        self.entries.get(key)
    }

    fn evict(&mut self) {
        while self.total_cost > self.max_cost && self.entries.len() > 1 {
            let Some((key, old)) = self.entries.pop_lru() else {
                break;
            };
            self.total_cost -= old.cost();
            self.evictions += 1;
            log::trace!("TextTextureCache: evicted {:?} @ {}px", key.text, key.pixel_size);
        }
    }

    pub fn contains(&self, key: &TextKey) -> bool {
        self.entries.contains(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn total_cost(&self) -> usize {
        self.total_cost
    }

    #[inline]
    pub fn max_cost(&self) -> usize {
        self.max_cost
    }

    /// Drops every entry and its texture.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("TextTextureCache: clearing {} entries ({} bytes)", self.entries.len(), self.total_cost);
        }
        self.entries.clear();
        self.total_cost = 0;
    }

    pub fn stats(&self) -> TextCacheStats {
        TextCacheStats {
            entries: self.entries.len(),
            cost: self.total_cost,
            max_cost: self.max_cost,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

impl<T> Default for TextTextureCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_CACHE_MAX_COST)
    }
}
