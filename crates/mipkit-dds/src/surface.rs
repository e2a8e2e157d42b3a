//! Per-surface pitch and size computation.

use crate::format::{DxgiFormat, FormatClass};
use crate::{Error, Result};

/// Memory footprint of one 2D surface (a single mip level of a single slice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SurfaceInfo {
    /// Bytes per row (of pixels, or of blocks for compressed formats).
    pub row_pitch: u64,
    /// Bytes in the whole surface.
    pub slice_pitch: u64,
    /// Number of rows (block rows for compressed formats).
    pub num_rows: u64,
}

/// Compute the pitch and size of a `width` x `height` surface in `format`.
///
/// # Example
///
/// ```
/// use mipkit_dds::{surface_info, DxgiFormat};
///
/// let info = surface_info(10, 10, DxgiFormat::BC1_UNORM).unwrap();
/// assert_eq!(info.row_pitch, 24);
/// assert_eq!(info.slice_pitch, 72);
/// ```
pub fn surface_info(width: u32, height: u32, format: DxgiFormat) -> Result<SurfaceInfo> {
    let w = u64::from(width);
    let h = u64::from(height);

    let info = match format.class() {
        FormatClass::BlockCompressed { bytes_per_block } => {
            let blocks_wide = if w > 0 { ((w + 3) / 4).max(1) } else { 0 };
            let blocks_high = if h > 0 { ((h + 3) / 4).max(1) } else { 0 };
            let row_pitch = blocks_wide * u64::from(bytes_per_block);
            SurfaceInfo {
                row_pitch,
                slice_pitch: mul(row_pitch, blocks_high)?,
                num_rows: blocks_high,
            }
        }
        FormatClass::Packed { bytes_per_element } => {
            let row_pitch = ((w + 1) >> 1) * u64::from(bytes_per_element);
            SurfaceInfo {
                row_pitch,
                slice_pitch: mul(row_pitch, h)?,
                num_rows: h,
            }
        }
        FormatClass::Nv11 => {
            let row_pitch = ((w + 3) >> 2) * 4;
            // Direct3D overestimates 4:1:1 as two full-height planes.
            let num_rows = h * 2;
            SurfaceInfo {
                row_pitch,
                slice_pitch: mul(row_pitch, num_rows)?,
                num_rows,
            }
        }
        FormatClass::Planar { bytes_per_element } => {
            let row_pitch = ((w + 1) >> 1) * u64::from(bytes_per_element);
            let luma = mul(row_pitch, h)?;
            SurfaceInfo {
                row_pitch,
                slice_pitch: luma
                    .checked_add(luma.div_ceil(2))
                    .ok_or(Error::Overflow("surface size"))?,
                num_rows: h + ((h + 1) >> 1),
            }
        }
        FormatClass::Linear { bits_per_pixel } => {
            let row_pitch = (w * u64::from(bits_per_pixel) + 7) / 8;
            SurfaceInfo {
                row_pitch,
                slice_pitch: mul(row_pitch, h)?,
                num_rows: h,
            }
        }
    };

    Ok(info)
}

fn mul(a: u64, b: u64) -> Result<u64> {
    a.checked_mul(b).ok_or(Error::Overflow("surface size"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bc_8_byte_blocks() {
        for format in [DxgiFormat::BC1_UNORM, DxgiFormat::BC4_UNORM] {
            let info = surface_info(10, 10, format).unwrap();
            assert_eq!(info.row_pitch, 24);
            assert_eq!(info.slice_pitch, 72);
            assert_eq!(info.num_rows, 3);
        }
    }

    #[test]
    fn test_bc_16_byte_blocks() {
        // 4x4 block minimum
        assert_eq!(surface_info(1, 1, DxgiFormat::BC3_UNORM).unwrap().slice_pitch, 16);
        assert_eq!(surface_info(4, 4, DxgiFormat::BC3_UNORM).unwrap().slice_pitch, 16);
        assert_eq!(surface_info(8, 8, DxgiFormat::BC7_UNORM).unwrap().slice_pitch, 64);
        assert_eq!(
            surface_info(1024, 1024, DxgiFormat::BC5_UNORM).unwrap().slice_pitch,
            1024 * 1024
        );
    }

    #[test]
    fn test_bc_zero_width() {
        let info = surface_info(0, 8, DxgiFormat::BC1_UNORM).unwrap();
        assert_eq!(info.row_pitch, 0);
        assert_eq!(info.slice_pitch, 0);
    }

    #[test]
    fn test_linear_rounds_to_bytes() {
        let info = surface_info(17, 3, DxgiFormat::R8G8B8A8_UNORM).unwrap();
        assert_eq!(info.row_pitch, 68);
        assert_eq!(info.slice_pitch, 204);

        // 1-bit rows round up to whole bytes.
        assert_eq!(surface_info(9, 1, DxgiFormat::R1_UNORM).unwrap().row_pitch, 2);
    }

    #[test]
    fn test_packed_and_planar() {
        let yuy2 = surface_info(5, 4, DxgiFormat::YUY2).unwrap();
        assert_eq!(yuy2.row_pitch, 12);
        assert_eq!(yuy2.slice_pitch, 48);

        let nv12 = surface_info(4, 4, DxgiFormat::NV12).unwrap();
        assert_eq!(nv12.row_pitch, 4);
        assert_eq!(nv12.slice_pitch, 16 + 8);
        assert_eq!(nv12.num_rows, 6);

        let nv11 = surface_info(6, 2, DxgiFormat::NV11).unwrap();
        assert_eq!(nv11.row_pitch, 8);
        assert_eq!(nv11.num_rows, 4);
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = surface_info(u32::MAX, u32::MAX, DxgiFormat::R32G32B32A32_FLOAT).unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }
}
