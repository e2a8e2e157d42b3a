//! Texture loading from image and DDS files.

use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use log::{debug, info};
use mipkit_dds::{
    mip_chain, AlphaMode, Dds, DdsMetadata, DdsWriter, DxgiFormat, MipLayout, ResourceDimension,
};

use crate::options::{LoadFlags, LoadOptions};
use crate::srgb::declares_srgb;
use crate::{Error, Result};

/// A decoded texture ready for upload: description, layout and pixels.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// The texture description.
    pub metadata: DdsMetadata,
    /// Where each sub-resource lives in `pixels`.
    pub layout: MipLayout,
    /// Tightly packed pixel data.
    pub pixels: Vec<u8>,
}

impl TextureData {
    fn new(metadata: DdsMetadata, pixels: Vec<u8>) -> Result<Self> {
        let layout = mip_chain(&metadata, pixels.len(), 0)?;
        Ok(Self {
            metadata,
            layout,
            pixels,
        })
    }

    /// Encode the texture as a DDS file.
    pub fn to_dds(&self) -> Result<Vec<u8>> {
        Ok(DdsWriter::new(self.metadata)?.to_vec(&self.pixels)?)
    }

    /// Write the texture to disk as a DDS file.
    pub fn save_dds<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_dds()?)?;
        Ok(())
    }
}

/// Decoder context for turning files into [`TextureData`].
///
/// The loader is created and owned by the caller and carries nothing but its
/// options, so several loaders with different settings can coexist.
///
/// # Example
///
/// ```no_run
/// use mipkit_image::{LoadFlags, LoadOptions, TextureLoader};
///
/// let loader = TextureLoader::new(LoadOptions::default().with_flags(LoadFlags::ForceSrgb));
/// let texture = loader.load_from_path("albedo.png")?;
/// println!("{} {}x{}", texture.metadata.format, texture.metadata.width, texture.metadata.height);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextureLoader {
    options: LoadOptions,
}

impl TextureLoader {
    /// Create a loader with the given options.
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// The loader's options.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a texture from a file on disk.
    pub fn load_from_path<P: AsRef<Path>>(&self, path: P) -> Result<TextureData> {
        let path = path.as_ref();
        info!("loading texture {}", path.display());
        let data = fs::read(path)?;
        self.load_from_memory(&data)
    }

    /// Load a texture from an in-memory file.
    ///
    /// DDS input keeps its format and mip chain; other formats are decoded
    /// into a single-level 2D texture.
    pub fn load_from_memory(&self, data: &[u8]) -> Result<TextureData> {
        if mipkit_dds::is_dds(data) {
            self.load_dds(data)
        } else {
            self.load_image(data)
        }
    }

    fn load_dds(&self, data: &[u8]) -> Result<TextureData> {
        let dds = Dds::parse(data)?;
        let source = dds.metadata()?;
        let layout = dds.layout(self.options.max_size)?;

        // Skipped levels are the same for every item, so the kept ones stay
        // item-major once concatenated.
        let mut pixels = Vec::new();
        for sub in &layout.subresources {
            let bytes = sub.bytes(dds.payload()).ok_or(mipkit_dds::Error::Truncated {
                needed: sub.offset + sub.len,
                available: dds.payload().len() as u64,
            })?;
            pixels.extend_from_slice(bytes);
        }

        let metadata = DdsMetadata {
            width: layout.width,
            height: layout.height,
            depth: layout.depth,
            mip_levels: layout.mip_levels,
            format: self.apply_srgb(source.format, false),
            ..source
        };
        debug!(
            "DDS texture {}x{} {} ({} of {} mips kept)",
            metadata.width, metadata.height, metadata.format, metadata.mip_levels, source.mip_levels
        );

        TextureData::new(metadata, pixels)
    }

    fn load_image(&self, data: &[u8]) -> Result<TextureData> {
        let format = image::guess_format(data)
            .map_err(|_| Error::UnsupportedFormat("unrecognized file signature".into()))?;
        let mut img = image::load_from_memory_with_format(data, format)?;

        let (width, height) = (img.width(), img.height());
        let (target_width, target_height) =
            fit_within(width, height, self.options.effective_max_size());
        if (target_width, target_height) != (width, height) {
            info!("resizing {width}x{height} image to {target_width}x{target_height}");
            img = img.resize_exact(target_width, target_height, FilterType::Triangle);
        }

        let declared = declares_srgb(data, format);
        let alpha_mode = if img.color().has_alpha() {
            AlphaMode::Straight
        } else {
            AlphaMode::Opaque
        };
        let (dxgi_format, pixels) = image_pixels(img);

        let metadata = DdsMetadata {
            width: target_width,
            height: target_height,
            depth: 1,
            mip_levels: 1,
            array_size: 1,
            format: self.apply_srgb(dxgi_format, declared),
            dimension: ResourceDimension::Texture2D,
            is_cubemap: false,
            alpha_mode,
        };
        debug!(
            "decoded {:?} image as {} {}x{}",
            format, metadata.format, metadata.width, metadata.height
        );

        TextureData::new(metadata, pixels)
    }

    fn apply_srgb(&self, format: DxgiFormat, declared: bool) -> DxgiFormat {
        match self.options.flags {
            LoadFlags::ForceSrgb => format.to_srgb(),
            LoadFlags::IgnoreSrgb => format.to_linear(),
            LoadFlags::Default if declared => format.to_srgb(),
            LoadFlags::Default => format,
        }
    }
}

/// Scale `width` x `height` down so neither side exceeds `max_size`,
/// preserving the aspect ratio.
pub fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width <= max_size && height <= max_size {
        return (width, height);
    }

    let ratio = f64::from(height) / f64::from(width);
    if width > height {
        let h = (f64::from(max_size) * ratio).round() as u32;
        (max_size, h.max(1))
    } else {
        let w = (f64::from(max_size) / ratio).round() as u32;
        (w.max(1), max_size)
    }
}

/// Pick the DXGI format closest to the decoded pixels and flatten them to
/// little-endian bytes.
fn image_pixels(img: DynamicImage) -> (DxgiFormat, Vec<u8>) {
    match img {
        DynamicImage::ImageLuma8(buf) => (DxgiFormat::R8_UNORM, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => (DxgiFormat::R16_UNORM, le_bytes_u16(buf.as_raw())),
        DynamicImage::ImageRgba16(buf) => {
            (DxgiFormat::R16G16B16A16_UNORM, le_bytes_u16(buf.as_raw()))
        }
        img @ (DynamicImage::ImageRgb16(_) | DynamicImage::ImageLumaA16(_)) => {
            let buf = img.to_rgba16();
            (DxgiFormat::R16G16B16A16_UNORM, le_bytes_u16(buf.as_raw()))
        }
        DynamicImage::ImageRgb32F(buf) => (DxgiFormat::R32G32B32_FLOAT, le_bytes_f32(buf.as_raw())),
        DynamicImage::ImageRgba32F(buf) => {
            (DxgiFormat::R32G32B32A32_FLOAT, le_bytes_f32(buf.as_raw()))
        }
        other => (DxgiFormat::R8G8B8A8_UNORM, other.to_rgba8().into_raw()),
    }
}

fn le_bytes_u16(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn le_bytes_f32(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn rgba_png(width: u32, height: u32) -> Vec<u8> {
        png_bytes(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 20, 30, 255]),
        )))
    }

    #[test]
    fn test_png_decodes_to_rgba8() {
        let loader = TextureLoader::new(LoadOptions::default().with_flags(LoadFlags::IgnoreSrgb));
        let texture = loader.load_from_memory(&rgba_png(4, 2)).unwrap();

        assert_eq!(texture.metadata.format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!((texture.metadata.width, texture.metadata.height), (4, 2));
        assert_eq!(texture.pixels.len(), 4 * 2 * 4);
        assert_eq!(&texture.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(texture.layout.subresources[0].row_pitch, 16);
    }

    #[test]
    fn test_force_srgb() {
        let loader = TextureLoader::new(LoadOptions::default().with_flags(LoadFlags::ForceSrgb));
        let texture = loader.load_from_memory(&rgba_png(2, 2)).unwrap();
        assert_eq!(texture.metadata.format, DxgiFormat::R8G8B8A8_UNORM_SRGB);
    }

    #[test]
    fn test_grayscale_png() {
        let png = png_bytes(DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([7]))));
        let texture = TextureLoader::default().load_from_memory(&png).unwrap();
        assert_eq!(texture.metadata.format, DxgiFormat::R8_UNORM);
        assert_eq!(texture.metadata.alpha_mode, AlphaMode::Opaque);
        assert_eq!(texture.pixels, vec![7; 9]);
    }

    #[test]
    fn test_16_bit_rgb_keeps_precision() {
        let buf: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Rgb([1000, 40000, 65535]));
        let png = png_bytes(DynamicImage::ImageRgb16(buf));

        let texture = TextureLoader::default().load_from_memory(&png).unwrap();
        assert_eq!(texture.metadata.format, DxgiFormat::R16G16B16A16_UNORM);
        assert_eq!(texture.metadata.alpha_mode, AlphaMode::Opaque);
        assert_eq!(texture.pixels.len(), 2 * 2 * 8);
        assert_eq!(
            &texture.pixels[..8],
            &[0xE8, 0x03, 0x40, 0x9C, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    fn jpeg_bytes(exif: Option<&[u8]>) -> Vec<u8> {
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])))
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        if let Some(exif) = exif {
            // APP1 segment right after SOI.
            let mut app1 = vec![0xFF, 0xE1];
            app1.extend(((2 + 6 + exif.len()) as u16).to_be_bytes());
            app1.extend_from_slice(b"Exif\0\0");
            app1.extend_from_slice(exif);
            jpeg.splice(2..2, app1);
        }
        jpeg
    }

    /// Little-endian TIFF whose IFD0 holds a single `ColorSpace` entry.
    fn color_space_exif() -> Vec<u8> {
        let mut tiff = b"II*\0".to_vec();
        tiff.extend(8u32.to_le_bytes());
        tiff.extend(1u16.to_le_bytes());
        tiff.extend(0xA001u16.to_le_bytes());
        tiff.extend(3u16.to_le_bytes());
        tiff.extend(1u32.to_le_bytes());
        tiff.extend(1u32.to_le_bytes());
        tiff.extend(0u32.to_le_bytes());
        tiff
    }

    #[test]
    fn test_jpeg_exif_color_space_means_srgb() {
        let loader = TextureLoader::default();

        let plain = loader.load_from_memory(&jpeg_bytes(None)).unwrap();
        assert_eq!(plain.metadata.format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(plain.metadata.alpha_mode, AlphaMode::Opaque);

        let exif = color_space_exif();
        let tagged = loader.load_from_memory(&jpeg_bytes(Some(&exif))).unwrap();
        assert_eq!(tagged.metadata.format, DxgiFormat::R8G8B8A8_UNORM_SRGB);

        let ignored = TextureLoader::new(LoadOptions::default().with_flags(LoadFlags::IgnoreSrgb))
            .load_from_memory(&jpeg_bytes(Some(&exif)))
            .unwrap();
        assert_eq!(ignored.metadata.format, DxgiFormat::R8G8B8A8_UNORM);
    }

    #[test]
    fn test_oversized_image_is_resized() {
        let loader = TextureLoader::new(
            LoadOptions::default()
                .with_max_size(8)
                .with_flags(LoadFlags::IgnoreSrgb),
        );
        let texture = loader.load_from_memory(&rgba_png(32, 16)).unwrap();
        assert_eq!((texture.metadata.width, texture.metadata.height), (8, 4));
        assert_eq!(texture.pixels.len(), 8 * 4 * 4);
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(100, 50, 200), (100, 50));
        assert_eq!(fit_within(1000, 10, 100), (100, 1));
        assert_eq!(fit_within(300, 600, 100), (50, 100));
        assert_eq!(fit_within(4000, 1, 16), (16, 1));
    }

    #[test]
    fn test_unrecognized_input() {
        let err = TextureLoader::default()
            .load_from_memory(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_dds_passthrough_with_mip_cap() {
        let source = DdsMetadata {
            width: 8,
            height: 8,
            depth: 1,
            mip_levels: 3,
            array_size: 1,
            format: DxgiFormat::R8_UNORM,
            dimension: ResourceDimension::Texture2D,
            is_cubemap: false,
            alpha_mode: AlphaMode::Unknown,
        };
        let mut payload = vec![1u8; 64];
        payload.extend(vec![2u8; 16]);
        payload.extend(vec![3u8; 4]);
        let dds = DdsWriter::new(source).unwrap().to_vec(&payload).unwrap();

        let loader = TextureLoader::new(LoadOptions::default().with_max_size(4));
        let texture = loader.load_from_memory(&dds).unwrap();
        assert_eq!((texture.metadata.width, texture.metadata.mip_levels), (4, 2));
        assert_eq!(texture.pixels.len(), 20);
        assert_eq!(texture.pixels[0], 2);

        // Round trip through the writer.
        let reencoded = texture.to_dds().unwrap();
        assert_eq!(mipkit_dds::parse(&reencoded).unwrap(), texture.metadata);
    }

    #[test]
    fn test_ignore_srgb_demotes_dds() {
        let source = DdsMetadata {
            width: 4,
            height: 4,
            depth: 1,
            mip_levels: 1,
            array_size: 1,
            format: DxgiFormat::BC1_UNORM_SRGB,
            dimension: ResourceDimension::Texture2D,
            is_cubemap: false,
            alpha_mode: AlphaMode::Unknown,
        };
        let dds = DdsWriter::new(source).unwrap().to_vec(&[0u8; 8]).unwrap();

        let loader = TextureLoader::new(LoadOptions::default().with_flags(LoadFlags::IgnoreSrgb));
        let texture = loader.load_from_memory(&dds).unwrap();
        assert_eq!(texture.metadata.format, DxgiFormat::BC1_UNORM);
    }
}
