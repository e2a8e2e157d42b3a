//! Texture loading for mipkit.
//!
//! [`TextureLoader`] turns PNG, JPEG, BMP and DDS files into [`TextureData`]:
//! a validated [`mipkit_dds::DdsMetadata`], the payload layout, and tightly
//! packed pixels. DDS input keeps its format and mip chain; other formats are
//! decoded with the `image` crate into a single-level 2D texture, scaled down
//! to fit the configured size cap.

mod error;
mod loader;
mod options;
mod srgb;

pub use error::{Error, Result};
pub use loader::{fit_within, TextureData, TextureLoader};
pub use options::{LoadFlags, LoadOptions};
pub use srgb::{declares_srgb, exif_declares_color_space, png_declares_srgb};
