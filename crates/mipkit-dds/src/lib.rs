//! DDS (DirectDraw Surface) texture container handling.
//!
//! A DDS file is the magic `"DDS "`, a 124-byte header, an optional 20-byte
//! DX10 extension (present when the pixel format's FourCC is `"DX10"`), and
//! the pixel payload: every array item's full mip chain, one after another.
//!
//! This crate provides:
//! - [`Dds`] - header decoding from a borrowed byte buffer
//! - [`DdsMetadata`] - validated texture description (format, dimension,
//!   array size, cube maps, hardware limits)
//! - [`surface_info`] and [`mip_chain`] - pitch and sub-resource layout
//! - [`DdsWriter`] - encoding with a DX10 header
//!
//! # Example
//!
//! ```no_run
//! use mipkit_dds::Dds;
//!
//! let data = std::fs::read("texture.dds")?;
//! let dds = Dds::parse(&data)?;
//! let meta = dds.metadata()?;
//! println!("{}x{} {} ({} mips)", meta.width, meta.height, meta.format, meta.mip_levels);
//!
//! for sub in dds.layout(0)?.subresources {
//!     println!("item {} mip {}: {} bytes", sub.item, sub.mip_level, sub.len);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod file;
mod format;
mod header;
mod layout;
mod metadata;
mod surface;
mod writer;

pub use error::{Error, Result};
pub use file::{is_dds, parse, parse_reader, read_metadata, Dds};
pub use format::{DxgiFormat, FormatClass};
pub use header::{caps, flags, pixel_flags, DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC};
pub use layout::{mip_chain, MipLayout, Subresource};
pub use metadata::{limits, AlphaMode, DdsMetadata, ResourceDimension};
pub use surface::{surface_info, SurfaceInfo};
pub use writer::DdsWriter;

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
