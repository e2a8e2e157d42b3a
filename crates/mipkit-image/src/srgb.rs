//! Colour-space hints embedded in image containers.

use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use image::{ImageDecoder, ImageFormat, ImageReader};
use log::debug;
use mipkit_common::BinaryReader;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

const EXIF_IFD_POINTER: u16 = 0x8769;
const COLOR_SPACE: u16 = 0xA001;

/// Check if an encoded image declares sRGB content.
///
/// PNG declares it with an `sRGB` chunk; other containers with an EXIF
/// `ColorSpace` tag.
pub fn declares_srgb(data: &[u8], format: ImageFormat) -> bool {
    if format == ImageFormat::Png {
        return png_declares_srgb(data);
    }

    let exif = ImageReader::with_format(Cursor::new(data), format)
        .into_decoder()
        .and_then(|mut decoder| decoder.exif_metadata());
    match exif {
        Ok(Some(exif)) => exif_declares_color_space(&exif),
        Ok(None) => false,
        Err(e) => {
            debug!("no EXIF metadata: {e}");
            false
        }
    }
}

/// Check if a PNG stream carries an `sRGB` chunk.
///
/// Only the chunks ahead of the first `IDAT` are inspected. Anything that is
/// not a well-formed PNG prefix yields `false`.
pub fn png_declares_srgb(data: &[u8]) -> bool {
    let mut reader = BinaryReader::new(data);
    if reader.expect_magic(PNG_SIGNATURE).is_err() {
        return false;
    }

    while let Ok(chunk) = reader.read_bytes(8) {
        let len = BigEndian::read_u32(&chunk[..4]) as usize;
        match &chunk[4..8] {
            b"sRGB" => return true,
            b"IDAT" | b"IEND" => return false,
            _ => {}
        }
        // chunk data + CRC
        if reader.skip(len.saturating_add(4)).is_err() {
            return false;
        }
    }
    false
}

/// Check if an EXIF block carries a `ColorSpace` tag, in IFD0 or the EXIF
/// sub-IFD. The block may start with the `Exif\0\0` APP1 prefix.
pub fn exif_declares_color_space(exif: &[u8]) -> bool {
    let tiff = exif.strip_prefix(b"Exif\0\0").unwrap_or(exif);
    match tiff.get(..2) {
        Some(b"II") => tiff_has_color_space::<LittleEndian>(tiff),
        Some(b"MM") => tiff_has_color_space::<BigEndian>(tiff),
        _ => false,
    }
}

fn tiff_has_color_space<E: ByteOrder>(tiff: &[u8]) -> bool {
    if tiff.get(2..4).map(E::read_u16) != Some(42) {
        return false;
    }
    let Some(ifd0) = tiff.get(4..8).map(E::read_u32) else {
        return false;
    };

    let mut exif_ifd = None;
    for (tag, value) in ifd_entries::<E>(tiff, ifd0) {
        match tag {
            COLOR_SPACE => return true,
            EXIF_IFD_POINTER => exif_ifd = Some(value),
            _ => {}
        }
    }

    exif_ifd.is_some_and(|offset| ifd_entries::<E>(tiff, offset).any(|(tag, _)| tag == COLOR_SPACE))
}

/// Tag and raw value field of each entry in the IFD at `offset`.
fn ifd_entries<E: ByteOrder>(tiff: &[u8], offset: u32) -> impl Iterator<Item = (u16, u32)> + '_ {
    let mut reader = BinaryReader::new(tiff.get(offset as usize..).unwrap_or_default());
    let count = reader.read_bytes(2).map(E::read_u16).unwrap_or(0);
    (0..count).map_while(move |_| {
        let entry = reader.read_bytes(12).ok()?;
        Some((E::read_u16(&entry[..2]), E::read_u32(&entry[8..12])))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        out.extend_from_slice(&[0; 4]);
        out
    }

    #[test]
    fn test_srgb_chunk_detected() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(chunk(b"IHDR", &[0; 13]));
        png.extend(chunk(b"sRGB", &[0]));
        png.extend(chunk(b"IDAT", &[1, 2, 3]));
        assert!(png_declares_srgb(&png));
    }

    #[test]
    fn test_srgb_after_idat_ignored() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(chunk(b"IHDR", &[0; 13]));
        png.extend(chunk(b"IDAT", &[1, 2, 3]));
        png.extend(chunk(b"sRGB", &[0]));
        assert!(!png_declares_srgb(&png));
    }

    /// Little-endian TIFF with an EXIF sub-IFD holding `tag`.
    fn exif_with_tag(tag: u16) -> Vec<u8> {
        let mut tiff = b"II".to_vec();
        tiff.extend(42u16.to_le_bytes());
        tiff.extend(8u32.to_le_bytes());
        // IFD0: one entry pointing at the EXIF IFD at offset 26.
        tiff.extend(1u16.to_le_bytes());
        tiff.extend(EXIF_IFD_POINTER.to_le_bytes());
        tiff.extend(4u16.to_le_bytes());
        tiff.extend(1u32.to_le_bytes());
        tiff.extend(26u32.to_le_bytes());
        tiff.extend(0u32.to_le_bytes());
        // EXIF IFD: one SHORT entry.
        tiff.extend(1u16.to_le_bytes());
        tiff.extend(tag.to_le_bytes());
        tiff.extend(3u16.to_le_bytes());
        tiff.extend(1u32.to_le_bytes());
        tiff.extend(1u32.to_le_bytes());
        tiff.extend(0u32.to_le_bytes());
        tiff
    }

    #[test]
    fn test_exif_color_space_in_sub_ifd() {
        assert!(exif_declares_color_space(&exif_with_tag(COLOR_SPACE)));
        assert!(!exif_declares_color_space(&exif_with_tag(0x9000)));

        let mut prefixed = b"Exif\0\0".to_vec();
        prefixed.extend(exif_with_tag(COLOR_SPACE));
        assert!(exif_declares_color_space(&prefixed));
    }

    #[test]
    fn test_exif_big_endian_ifd0() {
        let mut tiff = b"MM".to_vec();
        tiff.extend(42u16.to_be_bytes());
        tiff.extend(8u32.to_be_bytes());
        tiff.extend(1u16.to_be_bytes());
        tiff.extend(COLOR_SPACE.to_be_bytes());
        tiff.extend(3u16.to_be_bytes());
        tiff.extend(1u32.to_be_bytes());
        tiff.extend([0, 1, 0, 0]);
        tiff.extend(0u32.to_be_bytes());
        assert!(exif_declares_color_space(&tiff));
    }

    #[test]
    fn test_malformed_exif() {
        assert!(!exif_declares_color_space(b""));
        assert!(!exif_declares_color_space(b"II*\0\xff\xff\xff\xff"));
        // IFD count larger than the data.
        assert!(!exif_declares_color_space(b"II*\0\x08\0\0\0\x40\0"));
    }

    #[test]
    fn test_not_png() {
        assert!(!png_declares_srgb(b"DDS \x7c\0\0\0"));
        assert!(!png_declares_srgb(&PNG_SIGNATURE[..4]));
    }
}
