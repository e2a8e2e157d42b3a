//! Common utilities for mipkit.
//!
//! This crate provides the foundational pieces shared by the mipkit crates:
//!
//! - [`BinaryReader`] - Bounds-checked little-endian reading from byte slices
//! - [`Error`] - Low-level read errors (end of buffer, magic mismatch, I/O)

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;
