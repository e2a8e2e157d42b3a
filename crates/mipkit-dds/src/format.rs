//! DXGI pixel formats and their storage classes.

use std::fmt;

/// A DXGI format enumerator.
///
/// Stored as the raw numeric value so unrecognised values read from a file
/// survive decoding; they are rejected later by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct DxgiFormat(pub u32);

macro_rules! dxgi_formats {
    ($($name:ident = $value:literal),* $(,)?) => {
        #[allow(missing_docs)]
        impl DxgiFormat {
            $(pub const $name: Self = Self($value);)*

            /// The canonical name of this format, if it is a known one.
            pub const fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

dxgi_formats! {
    UNKNOWN = 0,
    R32G32B32A32_TYPELESS = 1,
    R32G32B32A32_FLOAT = 2,
    R32G32B32A32_UINT = 3,
    R32G32B32A32_SINT = 4,
    R32G32B32_TYPELESS = 5,
    R32G32B32_FLOAT = 6,
    R32G32B32_UINT = 7,
    R32G32B32_SINT = 8,
    R16G16B16A16_TYPELESS = 9,
    R16G16B16A16_FLOAT = 10,
    R16G16B16A16_UNORM = 11,
    R16G16B16A16_UINT = 12,
    R16G16B16A16_SNORM = 13,
    R16G16B16A16_SINT = 14,
    R32G32_TYPELESS = 15,
    R32G32_FLOAT = 16,
    R32G32_UINT = 17,
    R32G32_SINT = 18,
    R32G8X24_TYPELESS = 19,
    D32_FLOAT_S8X24_UINT = 20,
    R32_FLOAT_X8X24_TYPELESS = 21,
    X32_TYPELESS_G8X24_UINT = 22,
    R10G10B10A2_TYPELESS = 23,
    R10G10B10A2_UNORM = 24,
    R10G10B10A2_UINT = 25,
    R11G11B10_FLOAT = 26,
    R8G8B8A8_TYPELESS = 27,
    R8G8B8A8_UNORM = 28,
    R8G8B8A8_UNORM_SRGB = 29,
    R8G8B8A8_UINT = 30,
    R8G8B8A8_SNORM = 31,
    R8G8B8A8_SINT = 32,
    R16G16_TYPELESS = 33,
    R16G16_FLOAT = 34,
    R16G16_UNORM = 35,
    R16G16_UINT = 36,
    R16G16_SNORM = 37,
    R16G16_SINT = 38,
    R32_TYPELESS = 39,
    D32_FLOAT = 40,
    R32_FLOAT = 41,
    R32_UINT = 42,
    R32_SINT = 43,
    R24G8_TYPELESS = 44,
    D24_UNORM_S8_UINT = 45,
    R24_UNORM_X8_TYPELESS = 46,
    X24_TYPELESS_G8_UINT = 47,
    R8G8_TYPELESS = 48,
    R8G8_UNORM = 49,
    R8G8_UINT = 50,
    R8G8_SNORM = 51,
    R8G8_SINT = 52,
    R16_TYPELESS = 53,
    R16_FLOAT = 54,
    D16_UNORM = 55,
    R16_UNORM = 56,
    R16_UINT = 57,
    R16_SNORM = 58,
    R16_SINT = 59,
    R8_TYPELESS = 60,
    R8_UNORM = 61,
    R8_UINT = 62,
    R8_SNORM = 63,
    R8_SINT = 64,
    A8_UNORM = 65,
    R1_UNORM = 66,
    R9G9B9E5_SHAREDEXP = 67,
    R8G8_B8G8_UNORM = 68,
    G8R8_G8B8_UNORM = 69,
    BC1_TYPELESS = 70,
    BC1_UNORM = 71,
    BC1_UNORM_SRGB = 72,
    BC2_TYPELESS = 73,
    BC2_UNORM = 74,
    BC2_UNORM_SRGB = 75,
    BC3_TYPELESS = 76,
    BC3_UNORM = 77,
    BC3_UNORM_SRGB = 78,
    BC4_TYPELESS = 79,
    BC4_UNORM = 80,
    BC4_SNORM = 81,
    BC5_TYPELESS = 82,
    BC5_UNORM = 83,
    BC5_SNORM = 84,
    B5G6R5_UNORM = 85,
    B5G5R5A1_UNORM = 86,
    B8G8R8A8_UNORM = 87,
    B8G8R8X8_UNORM = 88,
    R10G10B10_XR_BIAS_A2_UNORM = 89,
    B8G8R8A8_TYPELESS = 90,
    B8G8R8A8_UNORM_SRGB = 91,
    B8G8R8X8_TYPELESS = 92,
    B8G8R8X8_UNORM_SRGB = 93,
    BC6H_TYPELESS = 94,
    BC6H_UF16 = 95,
    BC6H_SF16 = 96,
    BC7_TYPELESS = 97,
    BC7_UNORM = 98,
    BC7_UNORM_SRGB = 99,
    AYUV = 100,
    Y410 = 101,
    Y416 = 102,
    NV12 = 103,
    P010 = 104,
    P016 = 105,
    OPAQUE_420 = 106,
    YUY2 = 107,
    Y210 = 108,
    Y216 = 109,
    NV11 = 110,
    AI44 = 111,
    IA44 = 112,
    P8 = 113,
    A8P8 = 114,
    B4G4R4A4_UNORM = 115,
}

/// How a format lays its texels out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    /// 4x4 block compression (BC1-BC7).
    BlockCompressed { bytes_per_block: u32 },
    /// Two horizontally adjacent pixels share one element (4:2:2).
    Packed { bytes_per_element: u32 },
    /// Luma plane followed by a half-height chroma plane (4:2:0).
    Planar { bytes_per_element: u32 },
    /// 4:1:1 planar video.
    Nv11,
    /// One element per pixel.
    Linear { bits_per_pixel: u32 },
}

impl DxgiFormat {
    /// The raw enumerator value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is the "format unknown" sentinel.
    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Bits per pixel, or 0 for formats with no defined size.
    ///
    /// Block-compressed formats report their effective rate (4 or 8).
    pub const fn bits_per_pixel(self) -> u32 {
        match self.0 {
            1..=4 => 128,
            5..=8 => 96,
            9..=22 | 102 | 108 | 109 => 64,
            23..=47 | 67..=69 | 87..=93 | 100 | 101 | 107 => 32,
            104 | 105 => 24,
            48..=59 | 85 | 86 | 114 | 115 => 16,
            103 | 106 | 110 => 12,
            60..=65 | 111..=113 => 8,
            66 => 1,
            70..=72 | 79..=81 => 4,
            73..=78 | 82..=84 | 94..=99 => 8,
            _ => 0,
        }
    }

    /// The memory layout class of this format.
    pub const fn class(self) -> FormatClass {
        match self.0 {
            70..=72 | 79..=81 => FormatClass::BlockCompressed { bytes_per_block: 8 },
            73..=78 | 82..=84 | 94..=99 => FormatClass::BlockCompressed { bytes_per_block: 16 },
            68 | 69 | 107 => FormatClass::Packed { bytes_per_element: 4 },
            108 | 109 => FormatClass::Packed { bytes_per_element: 8 },
            103 | 106 => FormatClass::Planar { bytes_per_element: 2 },
            104 | 105 => FormatClass::Planar { bytes_per_element: 4 },
            110 => FormatClass::Nv11,
            _ => FormatClass::Linear {
                bits_per_pixel: self.bits_per_pixel(),
            },
        }
    }

    /// Check if this is a BC1-BC7 block-compressed format.
    #[inline]
    pub const fn is_block_compressed(self) -> bool {
        matches!(self.class(), FormatClass::BlockCompressed { .. })
    }

    /// Check if this is a palettized format, which textures cannot use.
    #[inline]
    pub const fn is_palettized(self) -> bool {
        matches!(self, Self::AI44 | Self::IA44 | Self::P8 | Self::A8P8)
    }

    /// Check if this is an sRGB format.
    pub const fn is_srgb(self) -> bool {
        matches!(
            self,
            Self::R8G8B8A8_UNORM_SRGB
                | Self::BC1_UNORM_SRGB
                | Self::BC2_UNORM_SRGB
                | Self::BC3_UNORM_SRGB
                | Self::B8G8R8A8_UNORM_SRGB
                | Self::B8G8R8X8_UNORM_SRGB
                | Self::BC7_UNORM_SRGB
        )
    }

    /// The sRGB counterpart of this format, or the format itself if it has none.
    pub const fn to_srgb(self) -> Self {
        match self {
            Self::R8G8B8A8_UNORM => Self::R8G8B8A8_UNORM_SRGB,
            Self::BC1_UNORM => Self::BC1_UNORM_SRGB,
            Self::BC2_UNORM => Self::BC2_UNORM_SRGB,
            Self::BC3_UNORM => Self::BC3_UNORM_SRGB,
            Self::B8G8R8A8_UNORM => Self::B8G8R8A8_UNORM_SRGB,
            Self::B8G8R8X8_UNORM => Self::B8G8R8X8_UNORM_SRGB,
            Self::BC7_UNORM => Self::BC7_UNORM_SRGB,
            other => other,
        }
    }

    /// The linear (UNORM) counterpart of an sRGB format.
    pub const fn to_linear(self) -> Self {
        match self {
            Self::R8G8B8A8_UNORM_SRGB => Self::R8G8B8A8_UNORM,
            Self::BC1_UNORM_SRGB => Self::BC1_UNORM,
            Self::BC2_UNORM_SRGB => Self::BC2_UNORM,
            Self::BC3_UNORM_SRGB => Self::BC3_UNORM,
            Self::B8G8R8A8_UNORM_SRGB => Self::B8G8R8A8_UNORM,
            Self::B8G8R8X8_UNORM_SRGB => Self::B8G8R8X8_UNORM,
            Self::BC7_UNORM_SRGB => Self::BC7_UNORM,
            other => other,
        }
    }
}

impl From<u32> for DxgiFormat {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for DxgiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "DXGI_FORMAT({})", self.0),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DxgiFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
