use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};

/// Tags retained from a directory record. Everything else the writer emits
/// (resolution, photometric interpretation, ImageJ bookkeeping) is skipped,
/// since plane geometry comes from the summary metadata instead.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum TagId {
    StripOffsets = 0x0111,
    StripByteCounts = 0x0117,
    MicroManagerMetadata = 51123,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive, FromPrimitive)]
#[repr(u16)]
pub enum TagType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,

    #[num_enum(default)]
    Unknown = 0xFFFF,
}

impl TagType {
    pub fn size_in_bytes(&self) -> usize {
        match self {
            TagType::Byte => 1,
            TagType::Ascii => 1,
            TagType::Short => 2,
            TagType::Long => 4,
            TagType::Rational => 8,
            TagType::Unknown => 1,
        }
    }
}
