//! Texture loading options.

/// How to treat the colour space of loaded pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadFlags {
    /// Use sRGB when the file declares it.
    #[default]
    Default,
    /// Always pick the sRGB variant of the format when there is one.
    ForceSrgb,
    /// Never use sRGB formats, even when the file declares them.
    IgnoreSrgb,
}

/// Options controlling how a [`crate::TextureLoader`] builds textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Largest width/height (and depth) to keep; 0 means the 2D texture limit.
    pub max_size: u32,
    /// Colour-space handling.
    pub flags: LoadFlags,
}

impl LoadOptions {
    /// Options with a size cap.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Options with the given colour-space handling.
    pub fn with_flags(mut self, flags: LoadFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The effective size cap.
    pub fn effective_max_size(&self) -> u32 {
        if self.max_size == 0 {
            mipkit_dds::limits::MAX_TEXTURE2D_SIZE
        } else {
            self.max_size
        }
    }
}
