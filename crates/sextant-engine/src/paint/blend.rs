/// Blend factor applied to source or destination color.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Source/destination factor pair for additive blending equations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Classic "over" for straight-alpha colors.
    pub const ALPHA: BlendFunc = BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    /// Light accumulation (halos, sprites, milky way).
    pub const ADDITIVE: BlendFunc = BlendFunc::new(BlendFactor::One, BlendFactor::One);
    /// Additive with source alpha weighting.
    pub const ADDITIVE_ALPHA: BlendFunc = BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::One);

    #[inline]
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }
}

impl Default for BlendFunc {
    fn default() -> Self {
        Self::ALPHA
    }
}
