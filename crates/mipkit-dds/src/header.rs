//! DDS header structures.
//!
//! Headers are decoded field by field from little-endian bytes and encoded
//! the same way; nothing here reinterprets memory as a struct.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use mipkit_common::BinaryReader;

use crate::format::DxgiFormat;
use crate::Result;

/// Header flags (`dwFlags`).
pub mod flags {
    /// Required in every file.
    pub const CAPS: u32 = 0x1;
    /// Required in every file.
    pub const HEIGHT: u32 = 0x2;
    /// Required in every file.
    pub const WIDTH: u32 = 0x4;
    /// Pitch is provided for an uncompressed texture.
    pub const PITCH: u32 = 0x8;
    /// Required in every file.
    pub const PIXEL_FORMAT: u32 = 0x1000;
    /// Required in a mipmapped texture.
    pub const MIPMAP_COUNT: u32 = 0x20000;
    /// Pitch is provided for a compressed texture.
    pub const LINEAR_SIZE: u32 = 0x80000;
    /// Required in a volume texture.
    pub const DEPTH: u32 = 0x800000;

    pub const TEXTURE: u32 = CAPS | HEIGHT | WIDTH | PIXEL_FORMAT;
}

/// Pixel format flags (`ddspf.dwFlags`).
pub mod pixel_flags {
    pub const ALPHA_PIXELS: u32 = 0x1;
    pub const ALPHA: u32 = 0x2;
    pub const FOURCC: u32 = 0x4;
    pub const RGB: u32 = 0x40;
    pub const YUV: u32 = 0x200;
    pub const LUMINANCE: u32 = 0x20000;
}

/// Surface capability flags (`dwCaps`, `dwCaps2`).
pub mod caps {
    pub const COMPLEX: u32 = 0x8;
    pub const TEXTURE: u32 = 0x1000;
    pub const MIPMAP: u32 = 0x400000;

    pub const CUBEMAP: u32 = 0x200;
    pub const CUBEMAP_POSITIVE_X: u32 = 0x400;
    pub const CUBEMAP_NEGATIVE_X: u32 = 0x800;
    pub const CUBEMAP_POSITIVE_Y: u32 = 0x1000;
    pub const CUBEMAP_NEGATIVE_Y: u32 = 0x2000;
    pub const CUBEMAP_POSITIVE_Z: u32 = 0x4000;
    pub const CUBEMAP_NEGATIVE_Z: u32 = 0x8000;
    pub const CUBEMAP_ALL_FACES: u32 = CUBEMAP_POSITIVE_X
        | CUBEMAP_NEGATIVE_X
        | CUBEMAP_POSITIVE_Y
        | CUBEMAP_NEGATIVE_Y
        | CUBEMAP_POSITIVE_Z
        | CUBEMAP_NEGATIVE_Z;
    pub const VOLUME: u32 = 0x200000;
}

/// DDS file header (the 124 bytes following the magic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Decode a header from the reader.
    ///
    /// The size field is not checked here; see [`crate::Dds::parse`].
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            size: reader.read_u32()?,
            flags: reader.read_u32()?,
            height: reader.read_u32()?,
            width: reader.read_u32()?,
            pitch_or_linear_size: reader.read_u32()?,
            depth: reader.read_u32()?,
            mipmap_count: reader.read_u32()?,
            reserved1: reader.read_u32_array()?,
            pixel_format: DdsPixelFormat::read(reader)?,
            caps: reader.read_u32()?,
            caps2: reader.read_u32()?,
            caps3: reader.read_u32()?,
            caps4: reader.read_u32()?,
            reserved2: reader.read_u32()?,
        })
    }

    /// Encode the header (without the magic).
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.size)?;
        w.write_u32::<LittleEndian>(self.flags)?;
        w.write_u32::<LittleEndian>(self.height)?;
        w.write_u32::<LittleEndian>(self.width)?;
        w.write_u32::<LittleEndian>(self.pitch_or_linear_size)?;
        w.write_u32::<LittleEndian>(self.depth)?;
        w.write_u32::<LittleEndian>(self.mipmap_count)?;
        for word in self.reserved1 {
            w.write_u32::<LittleEndian>(word)?;
        }
        self.pixel_format.write_to(w)?;
        w.write_u32::<LittleEndian>(self.caps)?;
        w.write_u32::<LittleEndian>(self.caps2)?;
        w.write_u32::<LittleEndian>(self.caps3)?;
        w.write_u32::<LittleEndian>(self.caps4)?;
        w.write_u32::<LittleEndian>(self.reserved2)?;
        Ok(())
    }

    /// Check if this header is followed by a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.has_flag(pixel_flags::FOURCC) && self.pixel_format.four_cc == FourCC::DX10
    }

    /// Check if a header flag is set.
    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Expected structure size.
    pub const SIZE: u32 = 32;

    /// Pixel format announcing a DX10 extended header.
    pub const DX10: Self = Self {
        size: Self::SIZE,
        flags: pixel_flags::FOURCC,
        four_cc: FourCC::DX10,
        rgb_bit_count: 0,
        r_bit_mask: 0,
        g_bit_mask: 0,
        b_bit_mask: 0,
        a_bit_mask: 0,
    };

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            size: reader.read_u32()?,
            flags: reader.read_u32()?,
            four_cc: FourCC(reader.read_array()?),
            rgb_bit_count: reader.read_u32()?,
            r_bit_mask: reader.read_u32()?,
            g_bit_mask: reader.read_u32()?,
            b_bit_mask: reader.read_u32()?,
            a_bit_mask: reader.read_u32()?,
        })
    }

    fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.size)?;
        w.write_u32::<LittleEndian>(self.flags)?;
        w.write_all(&self.four_cc.0)?;
        w.write_u32::<LittleEndian>(self.rgb_bit_count)?;
        w.write_u32::<LittleEndian>(self.r_bit_mask)?;
        w.write_u32::<LittleEndian>(self.g_bit_mask)?;
        w.write_u32::<LittleEndian>(self.b_bit_mask)?;
        w.write_u32::<LittleEndian>(self.a_bit_mask)?;
        Ok(())
    }

    /// Check if a pixel format flag is set.
    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    fn is_bit_mask(&self, r: u32, g: u32, b: u32, a: u32) -> bool {
        self.r_bit_mask == r && self.g_bit_mask == g && self.b_bit_mask == b && self.a_bit_mask == a
    }

    /// Map a legacy (pre-DX10) pixel format to a DXGI format.
    ///
    /// Combinations with no DXGI equivalent (24-bit RGB, X1R5G5B5, palettes
    /// and so on) return [`DxgiFormat::UNKNOWN`].
    pub fn dxgi_format(&self) -> DxgiFormat {
        if self.has_flag(pixel_flags::RGB) {
            // sRGB formats are only expressible through the DX10 header.
            match self.rgb_bit_count {
                32 => {
                    if self.is_bit_mask(0x000000ff, 0x0000ff00, 0x00ff0000, 0xff000000) {
                        return DxgiFormat::R8G8B8A8_UNORM;
                    }
                    if self.is_bit_mask(0x00ff0000, 0x0000ff00, 0x000000ff, 0xff000000) {
                        return DxgiFormat::B8G8R8A8_UNORM;
                    }
                    if self.is_bit_mask(0x00ff0000, 0x0000ff00, 0x000000ff, 0) {
                        return DxgiFormat::B8G8R8X8_UNORM;
                    }
                    // D3DX writes 10:10:10:2 with red and blue swapped.
                    if self.is_bit_mask(0x3ff00000, 0x000ffc00, 0x000003ff, 0xc0000000) {
                        return DxgiFormat::R10G10B10A2_UNORM;
                    }
                    if self.is_bit_mask(0x0000ffff, 0xffff0000, 0, 0) {
                        return DxgiFormat::R16G16_UNORM;
                    }
                    if self.is_bit_mask(0xffffffff, 0, 0, 0) {
                        return DxgiFormat::R32_FLOAT;
                    }
                }
                16 => {
                    if self.is_bit_mask(0x7c00, 0x03e0, 0x001f, 0x8000) {
                        return DxgiFormat::B5G5R5A1_UNORM;
                    }
                    if self.is_bit_mask(0xf800, 0x07e0, 0x001f, 0) {
                        return DxgiFormat::B5G6R5_UNORM;
                    }
                    if self.is_bit_mask(0x0f00, 0x00f0, 0x000f, 0xf000) {
                        return DxgiFormat::B4G4R4A4_UNORM;
                    }
                }
                _ => {}
            }
        } else if self.has_flag(pixel_flags::LUMINANCE) {
            match self.rgb_bit_count {
                8 if self.is_bit_mask(0xff, 0, 0, 0) => return DxgiFormat::R8_UNORM,
                16 if self.is_bit_mask(0xffff, 0, 0, 0) => return DxgiFormat::R16_UNORM,
                16 if self.is_bit_mask(0xff, 0, 0, 0xff00) => return DxgiFormat::R8G8_UNORM,
                _ => {}
            }
        } else if self.has_flag(pixel_flags::ALPHA) {
            if self.rgb_bit_count == 8 {
                return DxgiFormat::A8_UNORM;
            }
        } else if self.has_flag(pixel_flags::FOURCC) {
            return self.four_cc.dxgi_format();
        }

        DxgiFormat::UNKNOWN
    }
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT2 (premultiplied DXT3).
    pub const DXT2: Self = Self(*b"DXT2");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT4 (premultiplied DXT5).
    pub const DXT4: Self = Self(*b"DXT4");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
    /// ATI1, an alias of BC4U.
    pub const ATI1: Self = Self(*b"ATI1");
    /// BC4U compression.
    pub const BC4U: Self = Self(*b"BC4U");
    /// BC4S compression.
    pub const BC4S: Self = Self(*b"BC4S");
    /// ATI2, an alias of BC5U.
    pub const ATI2: Self = Self(*b"ATI2");
    /// BC5U compression.
    pub const BC5U: Self = Self(*b"BC5U");
    /// BC5S compression.
    pub const BC5S: Self = Self(*b"BC5S");
    /// Packed R8G8_B8G8.
    pub const RGBG: Self = Self(*b"RGBG");
    /// Packed G8R8_G8B8.
    pub const GRGB: Self = Self(*b"GRGB");
    /// Packed YUY2 video.
    pub const YUY2: Self = Self(*b"YUY2");

    /// The code as a little-endian integer.
    ///
    /// Some writers store a D3D9 `D3DFORMAT` number here instead of text.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    fn dxgi_format(self) -> DxgiFormat {
        match self {
            Self::DXT1 => DxgiFormat::BC1_UNORM,
            Self::DXT2 | Self::DXT3 => DxgiFormat::BC2_UNORM,
            Self::DXT4 | Self::DXT5 => DxgiFormat::BC3_UNORM,
            Self::ATI1 | Self::BC4U => DxgiFormat::BC4_UNORM,
            Self::BC4S => DxgiFormat::BC4_SNORM,
            Self::ATI2 | Self::BC5U => DxgiFormat::BC5_UNORM,
            Self::BC5S => DxgiFormat::BC5_SNORM,
            Self::RGBG => DxgiFormat::R8G8_B8G8_UNORM,
            Self::GRGB => DxgiFormat::G8R8_G8B8_UNORM,
            Self::YUY2 => DxgiFormat::YUY2,
            other => match other.as_u32() {
                36 => DxgiFormat::R16G16B16A16_UNORM,  // D3DFMT_A16B16G16R16
                110 => DxgiFormat::R16G16B16A16_SNORM, // D3DFMT_Q16W16V16U16
                111 => DxgiFormat::R16_FLOAT,          // D3DFMT_R16F
                112 => DxgiFormat::R16G16_FLOAT,       // D3DFMT_G16R16F
                113 => DxgiFormat::R16G16B16A16_FLOAT, // D3DFMT_A16B16G16R16F
                114 => DxgiFormat::R32_FLOAT,          // D3DFMT_R32F
                115 => DxgiFormat::R32G32_FLOAT,       // D3DFMT_G32R32F
                116 => DxgiFormat::R32G32B32A32_FLOAT, // D3DFMT_A32B32G32R32F
                _ => DxgiFormat::UNKNOWN,
            },
        }
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "{}", self.as_u32())
        }
    }
}

/// DX10 extended header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeaderDxt10 {
    /// DXGI format.
    pub dxgi_format: DxgiFormat,
    /// Resource dimension (2 = 1D, 3 = 2D, 4 = 3D).
    pub resource_dimension: u32,
    /// Misc flags.
    pub misc_flag: u32,
    /// Array size (in cubes for cube maps).
    pub array_size: u32,
    /// Misc flags 2 (alpha mode in the low bits).
    pub misc_flags2: u32,
}

impl DdsHeaderDxt10 {
    /// Encoded size in bytes.
    pub const SIZE: usize = 20;

    /// `misc_flag` bit marking a cube map.
    pub const MISC_TEXTURE_CUBE: u32 = 0x4;

    /// `misc_flags2` mask holding the alpha mode.
    pub const ALPHA_MODE_MASK: u32 = 0x7;

    /// Decode an extended header from the reader.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            dxgi_format: DxgiFormat(reader.read_u32()?),
            resource_dimension: reader.read_u32()?,
            misc_flag: reader.read_u32()?,
            array_size: reader.read_u32()?,
            misc_flags2: reader.read_u32()?,
        })
    }

    /// Encode the extended header.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.dxgi_format.raw())?;
        w.write_u32::<LittleEndian>(self.resource_dimension)?;
        w.write_u32::<LittleEndian>(self.misc_flag)?;
        w.write_u32::<LittleEndian>(self.array_size)?;
        w.write_u32::<LittleEndian>(self.misc_flags2)?;
        Ok(())
    }

    /// Check if the cube-map bit is set.
    #[inline]
    pub fn is_cubemap(&self) -> bool {
        self.misc_flag & Self::MISC_TEXTURE_CUBE != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_format(flags: u32, bits: u32, masks: [u32; 4]) -> DdsPixelFormat {
        DdsPixelFormat {
            size: DdsPixelFormat::SIZE,
            flags,
            four_cc: FourCC([0; 4]),
            rgb_bit_count: bits,
            r_bit_mask: masks[0],
            g_bit_mask: masks[1],
            b_bit_mask: masks[2],
            a_bit_mask: masks[3],
        }
    }

    fn four_cc_format(code: FourCC) -> DdsPixelFormat {
        DdsPixelFormat {
            four_cc: code,
            ..pixel_format(pixel_flags::FOURCC, 0, [0; 4])
        }
    }

    #[test]
    fn test_rgb_masks() {
        let rgba = pixel_format(
            pixel_flags::RGB | pixel_flags::ALPHA_PIXELS,
            32,
            [0xff, 0xff00, 0xff0000, 0xff000000],
        );
        assert_eq!(rgba.dxgi_format(), DxgiFormat::R8G8B8A8_UNORM);

        let bgrx = pixel_format(pixel_flags::RGB, 32, [0xff0000, 0xff00, 0xff, 0]);
        assert_eq!(bgrx.dxgi_format(), DxgiFormat::B8G8R8X8_UNORM);

        let r5g6b5 = pixel_format(pixel_flags::RGB, 16, [0xf800, 0x07e0, 0x001f, 0]);
        assert_eq!(r5g6b5.dxgi_format(), DxgiFormat::B5G6R5_UNORM);
    }

    #[test]
    fn test_unmatched_masks_are_unknown() {
        // D3DFMT_X8B8G8R8 has no DXGI equivalent.
        let xbgr = pixel_format(pixel_flags::RGB, 32, [0xff, 0xff00, 0xff0000, 0]);
        assert_eq!(xbgr.dxgi_format(), DxgiFormat::UNKNOWN);

        let rgb24 = pixel_format(pixel_flags::RGB, 24, [0xff0000, 0xff00, 0xff, 0]);
        assert_eq!(rgb24.dxgi_format(), DxgiFormat::UNKNOWN);

        assert_eq!(pixel_format(0, 0, [0; 4]).dxgi_format(), DxgiFormat::UNKNOWN);
    }

    #[test]
    fn test_luminance_and_alpha() {
        let l8 = pixel_format(pixel_flags::LUMINANCE, 8, [0xff, 0, 0, 0]);
        assert_eq!(l8.dxgi_format(), DxgiFormat::R8_UNORM);

        let a8l8 = pixel_format(
            pixel_flags::LUMINANCE | pixel_flags::ALPHA_PIXELS,
            16,
            [0xff, 0, 0, 0xff00],
        );
        assert_eq!(a8l8.dxgi_format(), DxgiFormat::R8G8_UNORM);

        let a8 = pixel_format(pixel_flags::ALPHA, 8, [0, 0, 0, 0xff]);
        assert_eq!(a8.dxgi_format(), DxgiFormat::A8_UNORM);
    }

    #[test]
    fn test_four_cc_formats() {
        assert_eq!(four_cc_format(FourCC::DXT1).dxgi_format(), DxgiFormat::BC1_UNORM);
        assert_eq!(four_cc_format(FourCC::DXT4).dxgi_format(), DxgiFormat::BC3_UNORM);
        assert_eq!(four_cc_format(FourCC::ATI2).dxgi_format(), DxgiFormat::BC5_UNORM);
        assert_eq!(four_cc_format(FourCC::BC4S).dxgi_format(), DxgiFormat::BC4_SNORM);
        assert_eq!(four_cc_format(FourCC::YUY2).dxgi_format(), DxgiFormat::YUY2);
        assert_eq!(
            four_cc_format(FourCC(*b"ZZZZ")).dxgi_format(),
            DxgiFormat::UNKNOWN
        );
    }

    #[test]
    fn test_d3d9_numeric_codes() {
        let half4 = four_cc_format(FourCC(113u32.to_le_bytes()));
        assert_eq!(half4.dxgi_format(), DxgiFormat::R16G16B16A16_FLOAT);

        let unorm16 = four_cc_format(FourCC(36u32.to_le_bytes()));
        assert_eq!(unorm16.dxgi_format(), DxgiFormat::R16G16B16A16_UNORM);
        assert_eq!(FourCC(36u32.to_le_bytes()).to_string(), "36");
    }

    #[test]
    fn test_header_encode_decode() {
        let header = DdsHeader {
            size: DdsHeader::SIZE,
            flags: flags::TEXTURE | flags::MIPMAP_COUNT,
            height: 64,
            width: 32,
            pitch_or_linear_size: 0,
            depth: 0,
            mipmap_count: 6,
            reserved1: [0; 11],
            pixel_format: four_cc_format(FourCC::DXT5),
            caps: caps::TEXTURE | caps::MIPMAP | caps::COMPLEX,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        };

        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), DdsHeader::SIZE as usize);
        // dwMipMapCount sits at offset 24, ddspf.dwFourCC at 80.
        assert_eq!(&bytes[24..28], &6u32.to_le_bytes());
        assert_eq!(&bytes[80..84], b"DXT5");

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(DdsHeader::read(&mut reader).unwrap(), header);
        assert!(!header.is_dx10());
    }

    #[test]
    fn test_dx10_requires_fourcc_flag() {
        let mut pf = DdsPixelFormat::DX10;
        let mut header = DdsHeader {
            size: DdsHeader::SIZE,
            flags: flags::TEXTURE,
            height: 1,
            width: 1,
            pitch_or_linear_size: 0,
            depth: 0,
            mipmap_count: 0,
            reserved1: [0; 11],
            pixel_format: pf,
            caps: caps::TEXTURE,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        };
        assert!(header.is_dx10());

        pf.flags = 0;
        header.pixel_format = pf;
        assert!(!header.is_dx10());
    }
}
