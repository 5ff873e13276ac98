use super::scan::Scan;
use super::{Endian, TagId, TagType, TiffError};

/// One parsed image file directory, reduced to the fields the indexed read
/// path needs. Directories are parsed lazily, per read, at the offset the
/// index map recorded for the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ifd {
    pub offset: u64,
    pub pixel_offset: u32,
    pub pixel_byte_count: u32,
    /// (offset, length) of the plane's JSON metadata, when the directory
    /// carries the custom metadata tag.
    pub metadata: Option<(u32, u32)>,
    /// Offset of the next directory in the chain. Read for completeness;
    /// navigation goes through the index map instead.
    pub next_ifd_offset: u32,
}

impl Ifd {
    pub fn parse(data: &[u8], offset: u64, endian: Endian) -> Result<Ifd, TiffError> {
        let mut scan = Scan::at(data, offset);
        let entry_count = scan.u16(endian)?;

        let mut pixel_offset = None;
        let mut pixel_byte_count = None;
        let mut metadata = None;

        for _ in 0..entry_count {
            let code = scan.u16(endian)?;
            let datatype: TagType = scan.u16(endian)?.into();
            let count = scan.u32(endian)?;
            let value_bytes = scan.take::<4>()?;

            // A single Short value is left-justified within the 4 byte
            // value field, in the file's own byte order.
            let value = if datatype == TagType::Short && count == 1 {
                endian.decode::<2, u16>([value_bytes[0], value_bytes[1]])? as u32
            } else {
                endian.decode(value_bytes)?
            };

            match TagId::try_from(code) {
                Ok(TagId::StripOffsets) => pixel_offset = Some(value),
                Ok(TagId::StripByteCounts) => pixel_byte_count = Some(value),
                Ok(TagId::MicroManagerMetadata) => metadata = Some((value, count)),
                Err(_) => {}
            }
        }

        let next_ifd_offset = scan.u32(endian)?;

        Ok(Ifd {
            offset,
            pixel_offset: pixel_offset.ok_or(TiffError::MissingTag {
                ifd_offset: offset,
                tag: TagId::StripOffsets,
            })?,
            pixel_byte_count: pixel_byte_count.ok_or(TiffError::MissingTag {
                ifd_offset: offset,
                tag: TagId::StripByteCounts,
            })?,
            metadata,
            next_ifd_offset,
        })
    }

    pub fn metadata_range(&self) -> Result<(u32, u32), TiffError> {
        self.metadata.ok_or(TiffError::MissingTag {
            ifd_offset: self.offset,
            tag: TagId::MicroManagerMetadata,
        })
    }
}
