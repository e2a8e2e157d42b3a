//! DDS encoding.

use std::io::Write;

use log::debug;

use crate::header::{caps, flags, DdsHeader, DdsHeaderDxt10, DdsPixelFormat};
use crate::layout::mip_chain;
use crate::metadata::{DdsMetadata, ResourceDimension};
use crate::surface::surface_info;
use crate::{Error, Result, DDS_MAGIC};

/// Writes texture data as a DDS container with a DX10 extended header.
#[derive(Debug, Clone, Copy)]
pub struct DdsWriter {
    metadata: DdsMetadata,
}

impl DdsWriter {
    /// Create a writer for textures described by `metadata`.
    ///
    /// The description is checked against the same rules the parser applies,
    /// so anything written here parses back to the same metadata.
    pub fn new(metadata: DdsMetadata) -> Result<Self> {
        let m = &metadata;
        if m.format.bits_per_pixel() == 0 || m.format.is_palettized() {
            return Err(Error::invalid(format!("cannot write format {}", m.format)));
        }
        if m.width == 0 || m.height == 0 || m.depth == 0 {
            return Err(Error::invalid(format!(
                "zero-sized texture {}x{}x{}",
                m.width, m.height, m.depth
            )));
        }
        if m.mip_levels == 0 {
            return Err(Error::invalid("mip level count is zero"));
        }
        if m.array_size == 0 {
            return Err(Error::invalid("array size is zero"));
        }
        match m.dimension {
            ResourceDimension::Texture1D if m.height != 1 || m.depth != 1 => {
                return Err(Error::invalid(format!(
                    "1D texture with size {}x{}x{}",
                    m.width, m.height, m.depth
                )));
            }
            ResourceDimension::Texture2D if m.depth != 1 => {
                return Err(Error::invalid(format!("2D texture with depth {}", m.depth)));
            }
            _ => {}
        }
        if m.is_cubemap && (m.dimension != ResourceDimension::Texture2D || m.array_size % 6 != 0) {
            return Err(Error::invalid("cube maps need a multiple of six 2D faces"));
        }
        m.check_limits()?;
        Ok(Self { metadata })
    }

    /// Build the pair of headers describing the texture.
    pub fn headers(&self) -> Result<(DdsHeader, DdsHeaderDxt10)> {
        let m = &self.metadata;
        let top = surface_info(m.width, m.height, m.format)?;

        let mut header_flags = flags::TEXTURE;
        let pitch_or_linear_size = if m.format.is_block_compressed() {
            header_flags |= flags::LINEAR_SIZE;
            top.slice_pitch
        } else {
            header_flags |= flags::PITCH;
            top.row_pitch
        };

        let mut surface_caps = caps::TEXTURE;
        if m.mip_levels > 1 {
            header_flags |= flags::MIPMAP_COUNT;
            surface_caps |= caps::COMPLEX | caps::MIPMAP;
        }
        if m.array_size > 1 {
            surface_caps |= caps::COMPLEX;
        }

        let mut caps2 = 0;
        let mut misc_flag = 0;
        let mut array_size = m.array_size;
        if m.is_cubemap {
            caps2 |= caps::CUBEMAP | caps::CUBEMAP_ALL_FACES;
            misc_flag |= DdsHeaderDxt10::MISC_TEXTURE_CUBE;
            array_size /= 6;
        }
        if m.dimension == ResourceDimension::Texture3D {
            header_flags |= flags::DEPTH;
            caps2 |= caps::VOLUME;
        }

        let header = DdsHeader {
            size: DdsHeader::SIZE,
            flags: header_flags,
            height: m.height,
            width: m.width,
            pitch_or_linear_size: u32::try_from(pitch_or_linear_size)
                .map_err(|_| Error::Overflow("pitch"))?,
            depth: if m.dimension == ResourceDimension::Texture3D {
                m.depth
            } else {
                0
            },
            mipmap_count: m.mip_levels,
            reserved1: [0; 11],
            pixel_format: DdsPixelFormat::DX10,
            caps: surface_caps,
            caps2,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        };

        let ext = DdsHeaderDxt10 {
            dxgi_format: m.format,
            resource_dimension: m.dimension.raw(),
            misc_flag,
            array_size,
            misc_flags2: m.alpha_mode.raw(),
        };

        Ok((header, ext))
    }

    /// Write the magic, headers and payload.
    ///
    /// The payload must hold exactly the mip chain the metadata describes.
    pub fn write<W: Write>(&self, w: &mut W, payload: &[u8]) -> Result<()> {
        let expected = mip_chain(&self.metadata, usize::MAX, 0)?.total_bytes;
        if expected != payload.len() as u64 {
            return Err(Error::PayloadSizeMismatch {
                expected,
                actual: payload.len() as u64,
            });
        }

        let (header, ext) = self.headers()?;
        w.write_all(DDS_MAGIC)?;
        header.write_to(w)?;
        ext.write_to(w)?;
        w.write_all(payload)?;

        debug!(
            "wrote DDS {}x{} {} ({} payload bytes)",
            header.width, header.height, ext.dxgi_format, expected
        );
        Ok(())
    }

    /// Encode into a new buffer.
    pub fn to_vec(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(148 + payload.len());
        self.write(&mut out, payload)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{parse, Dds};
    use crate::format::DxgiFormat;
    use crate::metadata::AlphaMode;

    fn metadata(width: u32, height: u32, mips: u32, format: DxgiFormat) -> DdsMetadata {
        DdsMetadata {
            width,
            height,
            depth: 1,
            mip_levels: mips,
            array_size: 1,
            format,
            dimension: ResourceDimension::Texture2D,
            is_cubemap: false,
            alpha_mode: AlphaMode::Straight,
        }
    }

    #[test]
    fn test_written_file_parses_back() {
        let meta = metadata(8, 4, 3, DxgiFormat::R8G8B8A8_UNORM_SRGB);
        let payload = vec![7u8; 8 * 4 * 4 + 4 * 2 * 4 + 2 * 4];
        let bytes = DdsWriter::new(meta).unwrap().to_vec(&payload).unwrap();

        assert_eq!(parse(&bytes).unwrap(), meta);
        let dds = Dds::parse(&bytes).unwrap();
        assert_eq!(dds.payload(), &payload[..]);
        assert_eq!(dds.header().pitch_or_linear_size, 32);
    }

    #[test]
    fn test_cube_map_counts_cubes_in_extension() {
        let mut meta = metadata(4, 4, 1, DxgiFormat::BC7_UNORM);
        meta.array_size = 6;
        meta.is_cubemap = true;
        let writer = DdsWriter::new(meta).unwrap();

        let (header, ext) = writer.headers().unwrap();
        assert_eq!(ext.array_size, 1);
        assert!(ext.is_cubemap());
        assert_eq!(header.pitch_or_linear_size, 16);

        let bytes = writer.to_vec(&[0u8; 6 * 16]).unwrap();
        assert_eq!(parse(&bytes).unwrap(), meta);
    }

    #[test]
    fn test_payload_mismatch() {
        let writer = DdsWriter::new(metadata(4, 4, 1, DxgiFormat::R8_UNORM)).unwrap();
        let err = writer.to_vec(&[0u8; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::PayloadSizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_rejects_unwritable_formats() {
        assert!(DdsWriter::new(metadata(4, 4, 1, DxgiFormat::UNKNOWN)).is_err());
        assert!(DdsWriter::new(metadata(4, 4, 1, DxgiFormat::A8P8)).is_err());
        assert!(DdsWriter::new(metadata(4, 4, 20, DxgiFormat::R8_UNORM)).is_err());
    }

    #[test]
    fn test_rejects_shapes_the_parser_rejects() {
        let invalid = |meta: DdsMetadata| {
            matches!(DdsWriter::new(meta), Err(Error::InvalidArgument(_)))
        };

        assert!(invalid(metadata(0, 4, 1, DxgiFormat::R8_UNORM)));
        assert!(invalid(metadata(4, 0, 1, DxgiFormat::R8_UNORM)));
        assert!(invalid(metadata(4, 4, 0, DxgiFormat::R8_UNORM)));

        let mut meta = metadata(4, 4, 1, DxgiFormat::R8_UNORM);
        meta.depth = 0;
        assert!(invalid(meta));

        meta.depth = 2;
        assert!(invalid(meta));

        meta = metadata(4, 1, 1, DxgiFormat::R8_UNORM);
        meta.array_size = 0;
        assert!(invalid(meta));

        meta = metadata(16, 4, 1, DxgiFormat::R8_UNORM);
        meta.dimension = ResourceDimension::Texture1D;
        assert!(invalid(meta));

        meta.height = 1;
        meta.depth = 2;
        assert!(invalid(meta));
    }

    #[test]
    fn test_texture_1d_round_trip() {
        let mut meta = metadata(16, 1, 1, DxgiFormat::R8_UNORM);
        meta.dimension = ResourceDimension::Texture1D;
        let bytes = DdsWriter::new(meta).unwrap().to_vec(&[3u8; 16]).unwrap();
        assert_eq!(parse(&bytes).unwrap(), meta);
    }

    #[test]
    fn test_volume_round_trip() {
        let mut meta = metadata(4, 4, 2, DxgiFormat::R8_UNORM);
        meta.depth = 4;
        meta.dimension = ResourceDimension::Texture3D;
        let payload = vec![0u8; 4 * 4 * 4 + 2 * 2 * 2];
        let bytes = DdsWriter::new(meta).unwrap().to_vec(&payload).unwrap();
        assert_eq!(parse(&bytes).unwrap(), meta);
    }
}
