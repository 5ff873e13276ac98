use super::{Endian, TagId};
use std::fmt;
use std::io;

/// Errors raised while decoding one container file. All of these except
/// `ReadError` mean the file violates the format contract and will never
/// become readable by retrying.
#[derive(Debug)]
pub enum TiffError {
    ReadError(io::Error),
    BadMagicBytes,
    /// The declared byte order is valid TIFF but not the order this reader
    /// decodes with. No conversion is performed, by contract.
    EndianMismatch(Endian),
    BadHeaderConstant {
        offset: u64,
        expected: u32,
        found: u32,
    },
    TruncatedFile {
        offset: u64,
        length: usize,
    },
    MissingTag {
        ifd_offset: u64,
        tag: TagId,
    },
    BadJson(serde_json::Error),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for TiffError {}

impl From<io::Error> for TiffError {
    fn from(e: io::Error) -> Self {
        TiffError::ReadError(e)
    }
}

impl From<serde_json::Error> for TiffError {
    fn from(e: serde_json::Error) -> Self {
        TiffError::BadJson(e)
    }
}
