use super::scan::Scan;
use super::{Endian, TiffError};
use std::fmt::Display;

/// The 4-integer address of one image plane. The original writer serializes
/// axes in this order, matching the 20 byte index map record.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct PlaneKey {
    pub channel: i32,
    pub z: i32,
    pub time: i32,
    pub position: i32,
}

impl PlaneKey {
    pub fn new(channel: i32, z: i32, time: i32, position: i32) -> Self {
        Self {
            channel,
            z,
            time,
            position,
        }
    }

    /// (channel, z, time, position) tuple, the channel-major traversal order.
    pub fn channel_major(&self) -> (i32, i32, i32, i32) {
        (self.channel, self.z, self.time, self.position)
    }

    /// (position, time, z, channel) tuple, the position-major traversal order.
    pub fn position_major(&self) -> (i32, i32, i32, i32) {
        (self.position, self.time, self.z, self.channel)
    }
}

impl Display for PlaneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(c={} z={} t={} p={})",
            self.channel, self.z, self.time, self.position
        )
    }
}

pub const INDEX_RECORD_BYTES: usize = 20;

/// One entry of the custom index map appended to each container file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneIndexEntry {
    pub key: PlaneKey,
    pub ifd_offset: u32,
}

impl PlaneIndexEntry {
    pub fn parse(scan: &mut Scan, endian: Endian) -> Result<Self, TiffError> {
        let channel = scan.i32(endian)?;
        let z = scan.i32(endian)?;
        let time = scan.i32(endian)?;
        let position = scan.i32(endian)?;
        let ifd_offset = scan.u32(endian)?;
        Ok(Self {
            key: PlaneKey::new(channel, z, time, position),
            ifd_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record() {
        let endian = Endian::Little;
        let mut bytes = endian.encode_all(&[0i32, -2, 3, 1]);
        bytes.extend(endian.encode(1234u32));
        assert_eq!(bytes.len(), INDEX_RECORD_BYTES);

        let mut scan = Scan::new(&bytes);
        let entry = PlaneIndexEntry::parse(&mut scan, endian).unwrap();
        assert_eq!(entry.key, PlaneKey::new(0, -2, 3, 1));
        assert_eq!(entry.ifd_offset, 1234);
    }

    #[test]
    fn truncated_record() {
        let bytes = [0u8; 10];
        let mut scan = Scan::new(&bytes);
        assert!(matches!(
            PlaneIndexEntry::parse(&mut scan, Endian::Little),
            Err(TiffError::TruncatedFile { .. })
        ));
    }
}
