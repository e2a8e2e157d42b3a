//! Validated texture description derived from DDS headers.

use std::fmt;

use log::{debug, warn};

use crate::format::DxgiFormat;
use crate::header::{caps, flags, DdsHeader, DdsHeaderDxt10, FourCC};
use crate::{Error, Result};

/// Direct3D 11 resource limits.
///
/// File metadata larger than what the hardware is required to support is
/// rejected before any layout is computed.
pub mod limits {
    /// Maximum mip levels of any resource.
    pub const MAX_MIP_LEVELS: u32 = 15;
    /// Maximum width of a 1D texture.
    pub const MAX_TEXTURE1D_SIZE: u32 = 16384;
    /// Maximum array size of a 1D texture.
    pub const MAX_TEXTURE1D_ARRAY_SIZE: u32 = 2048;
    /// Maximum width or height of a 2D texture.
    pub const MAX_TEXTURE2D_SIZE: u32 = 16384;
    /// Maximum array size of a 2D texture.
    pub const MAX_TEXTURE2D_ARRAY_SIZE: u32 = 2048;
    /// Maximum face size of a cube map.
    pub const MAX_TEXTURECUBE_SIZE: u32 = 16384;
    /// Maximum width, height or depth of a 3D texture.
    pub const MAX_TEXTURE3D_SIZE: u32 = 2048;
}

/// Texture dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResourceDimension {
    Texture1D,
    Texture2D,
    Texture3D,
}

impl ResourceDimension {
    /// Decode the `D3D11_RESOURCE_DIMENSION` value of a DX10 header.
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            2 => Some(Self::Texture1D),
            3 => Some(Self::Texture2D),
            4 => Some(Self::Texture3D),
            _ => None,
        }
    }

    /// The `D3D11_RESOURCE_DIMENSION` value.
    pub const fn raw(self) -> u32 {
        match self {
            Self::Texture1D => 2,
            Self::Texture2D => 3,
            Self::Texture3D => 4,
        }
    }
}

impl fmt::Display for ResourceDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Texture1D => "1D",
            Self::Texture2D => "2D",
            Self::Texture3D => "3D",
        })
    }
}

/// How the alpha channel should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AlphaMode {
    #[default]
    Unknown,
    Straight,
    Premultiplied,
    Opaque,
    Custom,
}

impl AlphaMode {
    /// Decode the alpha-mode bits of a DX10 header's `misc_flags2`.
    pub const fn from_raw(value: u32) -> Self {
        match value {
            1 => Self::Straight,
            2 => Self::Premultiplied,
            3 => Self::Opaque,
            4 => Self::Custom,
            _ => Self::Unknown,
        }
    }

    /// The encoded value.
    pub const fn raw(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Straight => 1,
            Self::Premultiplied => 2,
            Self::Opaque => 3,
            Self::Custom => 4,
        }
    }

    /// Alpha mode declared by a pair of headers.
    ///
    /// Legacy DXT2/DXT4 files are premultiplied by definition.
    pub fn from_headers(header: &DdsHeader, dx10: Option<&DdsHeaderDxt10>) -> Self {
        match dx10 {
            Some(ext) => Self::from_raw(ext.misc_flags2 & DdsHeaderDxt10::ALPHA_MODE_MASK),
            None => match header.pixel_format.four_cc {
                FourCC::DXT2 | FourCC::DXT4 => Self::Premultiplied,
                _ => Self::Unknown,
            },
        }
    }
}

/// A validated texture description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DdsMetadata {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Mip levels per array item, at least 1.
    pub mip_levels: u32,
    /// Array items; for cube maps this counts faces (six per cube).
    pub array_size: u32,
    pub format: DxgiFormat,
    pub dimension: ResourceDimension,
    pub is_cubemap: bool,
    pub alpha_mode: AlphaMode,
}

impl DdsMetadata {
    /// Validate a header pair and derive the texture description.
    ///
    /// Anything the headers declare that no texture could be is reported as
    /// [`Error::InvalidArgument`].
    pub fn from_headers(header: &DdsHeader, dx10: Option<&DdsHeaderDxt10>) -> Result<Self> {
        let width = header.width;
        let mut height = header.height;
        let mut depth = header.depth;
        let mip_levels = header.mipmap_count.max(1);
        let mut array_size = 1;
        let mut is_cubemap = false;

        let format;
        let dimension;

        if let Some(ext) = dx10 {
            array_size = ext.array_size;
            if array_size == 0 {
                return Err(Error::invalid("array size is zero"));
            }

            format = ext.dxgi_format;
            if format.is_palettized() {
                return Err(Error::invalid(format!("palettized format {format}")));
            }
            if format.bits_per_pixel() == 0 {
                return Err(Error::invalid(format!("unsupported format {format}")));
            }

            dimension = ResourceDimension::from_raw(ext.resource_dimension).ok_or_else(|| {
                Error::invalid(format!("resource dimension {}", ext.resource_dimension))
            })?;

            match dimension {
                ResourceDimension::Texture1D => {
                    // D3DX writes 1D textures with a fixed height of 1.
                    if header.has_flag(flags::HEIGHT) && height != 1 {
                        return Err(Error::invalid(format!("1D texture with height {height}")));
                    }
                    height = 1;
                    depth = 1;
                }
                ResourceDimension::Texture2D => {
                    if ext.is_cubemap() {
                        array_size = array_size
                            .checked_mul(6)
                            .ok_or_else(|| Error::invalid("cube array size overflows"))?;
                        is_cubemap = true;
                    }
                    depth = 1;
                }
                ResourceDimension::Texture3D => {
                    if !header.has_flag(flags::DEPTH) {
                        return Err(Error::invalid("3D texture without depth flag"));
                    }
                    if array_size > 1 {
                        return Err(Error::invalid("3D texture arrays are not supported"));
                    }
                }
            }
        } else {
            format = header.pixel_format.dxgi_format();
            if format.is_unknown() || format.bits_per_pixel() == 0 {
                warn!("no DXGI equivalent for legacy pixel format {:?}", header.pixel_format);
                return Err(Error::invalid(format!(
                    "unrecognized legacy pixel format (fourcc {}, {} bpp)",
                    header.pixel_format.four_cc, header.pixel_format.rgb_bit_count
                )));
            }

            if header.has_flag(flags::DEPTH) {
                dimension = ResourceDimension::Texture3D;
            } else {
                if header.caps2 & caps::CUBEMAP != 0 {
                    // Legacy files can describe partial cube maps; textures cannot.
                    if header.caps2 & caps::CUBEMAP_ALL_FACES != caps::CUBEMAP_ALL_FACES {
                        return Err(Error::invalid("cube map is missing faces"));
                    }
                    array_size = 6;
                    is_cubemap = true;
                }
                depth = 1;
                dimension = ResourceDimension::Texture2D;
            }
        }

        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::invalid(format!(
                "zero-sized texture {width}x{height}x{depth}"
            )));
        }

        let metadata = Self {
            width,
            height,
            depth,
            mip_levels,
            array_size,
            format,
            dimension,
            is_cubemap,
            alpha_mode: AlphaMode::from_headers(header, dx10),
        };
        metadata.check_limits()?;

        debug!(
            "DDS {} {}x{}x{} {} mips={} array={} cube={}",
            dimension, width, height, depth, format, mip_levels, array_size, is_cubemap
        );

        Ok(metadata)
    }

    /// Reject sizes beyond the Direct3D 11 hardware requirements.
    pub fn check_limits(&self) -> Result<()> {
        use limits::*;

        if self.mip_levels > MAX_MIP_LEVELS {
            return Err(Error::invalid(format!(
                "{} mip levels exceeds {MAX_MIP_LEVELS}",
                self.mip_levels
            )));
        }

        let ok = match self.dimension {
            ResourceDimension::Texture1D => {
                self.array_size <= MAX_TEXTURE1D_ARRAY_SIZE && self.width <= MAX_TEXTURE1D_SIZE
            }
            ResourceDimension::Texture2D if self.is_cubemap => {
                // Array size counts faces; the limit counts faces too.
                self.array_size <= MAX_TEXTURE2D_ARRAY_SIZE
                    && self.width <= MAX_TEXTURECUBE_SIZE
                    && self.height <= MAX_TEXTURECUBE_SIZE
            }
            ResourceDimension::Texture2D => {
                self.array_size <= MAX_TEXTURE2D_ARRAY_SIZE
                    && self.width <= MAX_TEXTURE2D_SIZE
                    && self.height <= MAX_TEXTURE2D_SIZE
            }
            ResourceDimension::Texture3D => {
                self.array_size <= 1
                    && self.width <= MAX_TEXTURE3D_SIZE
                    && self.height <= MAX_TEXTURE3D_SIZE
                    && self.depth <= MAX_TEXTURE3D_SIZE
            }
        };

        if !ok {
            return Err(Error::invalid(format!(
                "{} texture {}x{}x{} (array {}) exceeds hardware limits",
                self.dimension, self.width, self.height, self.depth, self.array_size
            )));
        }
        Ok(())
    }

    /// Number of cubes in a cube map (array) texture.
    pub fn cube_count(&self) -> u32 {
        if self.is_cubemap {
            self.array_size / 6
        } else {
            0
        }
    }
}
