//! Sub-resource layout of the pixel payload.
//!
//! A DDS payload stores every array item in turn, each as a full mip chain
//! from the largest level down. Volume levels store all their depth slices
//! back to back.

use log::{debug, warn};

use crate::metadata::DdsMetadata;
use crate::surface::surface_info;
use crate::{Error, Result};

/// One mip level of one array item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Subresource {
    /// Array item (cube face for cube maps).
    pub item: u32,
    /// Mip level within the file's chain.
    pub mip_level: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub row_pitch: u64,
    pub slice_pitch: u64,
    /// Offset from the start of the payload.
    pub offset: u64,
    /// Bytes occupied (`slice_pitch * depth`).
    pub len: u64,
}

impl Subresource {
    /// Borrow this sub-resource's bytes out of the payload it was computed for.
    pub fn bytes<'a>(&self, payload: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.offset).ok()?;
        let end = start.checked_add(usize::try_from(self.len).ok()?)?;
        payload.get(start..end)
    }
}

/// The complete layout of a texture payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MipLayout {
    /// Width of the first kept level.
    pub width: u32,
    /// Height of the first kept level.
    pub height: u32,
    /// Depth of the first kept level.
    pub depth: u32,
    /// Mip levels kept per item.
    pub mip_levels: u32,
    /// Leading mip levels dropped by the size cap.
    pub skipped_mips: u32,
    pub array_size: u32,
    /// Kept sub-resources, item-major.
    pub subresources: Vec<Subresource>,
    /// Bytes spanned by the whole chain, kept or not.
    pub total_bytes: u64,
}

impl MipLayout {
    /// Look up a kept sub-resource by item and kept-level index.
    pub fn get(&self, item: u32, level: u32) -> Option<&Subresource> {
        if item >= self.array_size || level >= self.mip_levels {
            return None;
        }
        self.subresources
            .get(item as usize * self.mip_levels as usize + level as usize)
    }
}

/// Walk the mip chain of every array item and locate each level in the payload.
///
/// With `max_size > 0` and more than one mip level, leading levels whose
/// width, height or depth exceed `max_size` are skipped. Every level is
/// bounds-checked against `payload_len` before it is recorded.
pub fn mip_chain(metadata: &DdsMetadata, payload_len: usize, max_size: u32) -> Result<MipLayout> {
    let available = payload_len as u64;
    let capped = max_size > 0 && metadata.mip_levels > 1;

    let mut subresources = Vec::new();
    let mut offset: u64 = 0;
    let mut top: Option<(u32, u32, u32)> = None;
    let mut skipped_mips = 0;

    for item in 0..metadata.array_size {
        let mut w = metadata.width;
        let mut h = metadata.height;
        let mut d = metadata.depth;

        for mip_level in 0..metadata.mip_levels {
            let info = surface_info(w, h, metadata.format)?;
            let len = info
                .slice_pitch
                .checked_mul(u64::from(d))
                .ok_or(Error::Overflow("mip level size"))?;
            let end = offset
                .checked_add(len)
                .ok_or(Error::Overflow("payload offset"))?;
            if end > available {
                return Err(Error::Truncated {
                    needed: end,
                    available,
                });
            }

            if !capped || (w <= max_size && h <= max_size && d <= max_size) {
                top.get_or_insert((w, h, d));
                subresources.push(Subresource {
                    item,
                    mip_level,
                    width: w,
                    height: h,
                    depth: d,
                    row_pitch: info.row_pitch,
                    slice_pitch: info.slice_pitch,
                    offset,
                    len,
                });
            } else if item == 0 {
                skipped_mips += 1;
            }

            offset = end;
            w = (w >> 1).max(1);
            h = (h >> 1).max(1);
            d = (d >> 1).max(1);
        }
    }

    let Some((width, height, depth)) = top else {
        return Err(Error::invalid(format!(
            "no mip level fits within {max_size} pixels"
        )));
    };

    if skipped_mips > 0 {
        warn!("skipped {skipped_mips} mip level(s) larger than {max_size}");
    }
    if offset < available {
        debug!("{} trailing byte(s) after the mip chain", available - offset);
    }

    Ok(MipLayout {
        width,
        height,
        depth,
        mip_levels: metadata.mip_levels - skipped_mips,
        skipped_mips,
        array_size: metadata.array_size,
        subresources,
        total_bytes: offset,
    })
}
