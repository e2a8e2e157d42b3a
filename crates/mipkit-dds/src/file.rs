//! DDS container parsing.

use std::fs;
use std::io::Read;
use std::path::Path;

use log::debug;
use mipkit_common::BinaryReader;

use crate::header::{DdsHeader, DdsHeaderDxt10};
use crate::layout::{mip_chain, MipLayout};
use crate::metadata::{AlphaMode, DdsMetadata};
use crate::{Error, Result, DDS_MAGIC};

/// A parsed DDS container borrowing its pixel payload from the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct Dds<'a> {
    header: DdsHeader,
    dx10: Option<DdsHeaderDxt10>,
    payload: &'a [u8],
}

impl<'a> Dds<'a> {
    /// Parse the headers of a DDS container.
    ///
    /// Bad magic, a header size other than 124, or input too short for the
    /// headers all yield [`Error::NotDds`].
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        let magic: [u8; 4] = reader
            .read_array()
            .map_err(|_| Error::NotDds("file too small".into()))?;
        if &magic != DDS_MAGIC {
            return Err(Error::NotDds(format!("bad magic {magic:02x?}")));
        }

        let header = DdsHeader::read(&mut reader)
            .map_err(|_| Error::NotDds("truncated header".into()))?;
        if header.size != DdsHeader::SIZE {
            return Err(Error::NotDds(format!(
                "header size {} (expected {})",
                header.size,
                DdsHeader::SIZE
            )));
        }

        let dx10 = if header.is_dx10() {
            let ext = DdsHeaderDxt10::read(&mut reader)
                .map_err(|_| Error::NotDds("truncated DX10 header".into()))?;
            Some(ext)
        } else {
            None
        };

        debug!(
            "parsed DDS header: {}x{} fourcc={} dx10={}",
            header.width,
            header.height,
            header.pixel_format.four_cc,
            dx10.is_some()
        );

        Ok(Self {
            header,
            dx10,
            payload: reader.remaining_bytes(),
        })
    }

    /// The legacy header.
    pub fn header(&self) -> &DdsHeader {
        &self.header
    }

    /// The DX10 extended header, if present.
    pub fn dx10(&self) -> Option<&DdsHeaderDxt10> {
        self.dx10.as_ref()
    }

    /// Bytes following the headers.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Size of the magic plus headers.
    pub fn header_len(&self) -> usize {
        4 + DdsHeader::SIZE as usize + self.dx10.map_or(0, |_| DdsHeaderDxt10::SIZE)
    }

    /// The alpha mode declared by the headers.
    pub fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::from_headers(&self.header, self.dx10.as_ref())
    }

    /// Validate the headers and derive the texture description.
    pub fn metadata(&self) -> Result<DdsMetadata> {
        DdsMetadata::from_headers(&self.header, self.dx10.as_ref())
    }

    /// Validate the headers and locate every sub-resource in the payload.
    ///
    /// `max_size` caps the top mip level; pass 0 to keep them all.
    pub fn layout(&self, max_size: u32) -> Result<MipLayout> {
        mip_chain(&self.metadata()?, self.payload.len(), max_size)
    }
}

/// Parse a DDS buffer and return its validated texture description.
///
/// The whole mip chain is bounds-checked against the buffer.
pub fn parse(data: &[u8]) -> Result<DdsMetadata> {
    let dds = Dds::parse(data)?;
    let metadata = dds.metadata()?;
    mip_chain(&metadata, dds.payload().len(), 0)?;
    Ok(metadata)
}

/// Read a whole stream and parse it as a DDS container.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<DdsMetadata> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse(&data)
}

/// Read a DDS file from disk and return its validated texture description.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<DdsMetadata> {
    let data = fs::read(path)?;
    parse(&data)
}

/// Check if a buffer starts with the DDS magic.
pub fn is_dds(data: &[u8]) -> bool {
    data.starts_with(DDS_MAGIC)
}
