//! Mipkit - DDS texture inspection, validation and loading library.
//!
//! This crate provides a unified interface to the mipkit crates.
//!
//! # Crates
//!
//! - [`mipkit_common`] - Common utilities (binary reading)
//! - [`mipkit_dds`] - DDS header parsing, format table, layout and writing
//! - [`mipkit_image`] - Texture loading from PNG, JPEG, BMP and DDS
//!
//! # Example
//!
//! ```no_run
//! use mipkit::prelude::*;
//!
//! // Describe a DDS file without touching its pixels
//! let meta = read_metadata("sky.dds")?;
//! println!("{} {}x{} cube: {}", meta.format, meta.width, meta.height, meta.is_cubemap);
//!
//! // Decode a PNG into a texture and save it as DDS
//! let loader = TextureLoader::new(LoadOptions::default().with_max_size(1024));
//! let texture = loader.load_from_path("albedo.png")?;
//! texture.save_dds("albedo.dds")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use mipkit_common as common;
pub use mipkit_dds as dds;
pub use mipkit_image as image;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use mipkit_common::BinaryReader;
    pub use mipkit_dds::{
        is_dds, mip_chain, parse, read_metadata, surface_info, AlphaMode, Dds, DdsMetadata,
        DdsWriter, DxgiFormat, MipLayout, ResourceDimension, Subresource,
    };
    pub use mipkit_image::{LoadFlags, LoadOptions, TextureData, TextureLoader};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
