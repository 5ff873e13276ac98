use super::{Endian, TiffError};

/// Bounds-checked cursor over a mapped file. Out-of-range reads surface as
/// `TruncatedFile` with the offending offset, since a short file is a format
/// violation here, not an I/O condition.
pub struct Scan<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> Scan<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], offset: u64) -> Self {
        Self { data, pos: offset }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn bytes(&mut self, length: usize) -> Result<&'a [u8], TiffError> {
        let start = self.pos as usize;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= self.data.len())
            .ok_or(TiffError::TruncatedFile {
                offset: self.pos,
                length,
            })?;
        self.pos = end as u64;
        Ok(&self.data[start..end])
    }

    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], TiffError> {
        let offset = self.pos;
        let bytes = self.bytes(N)?;
        bytes.try_into().map_err(|_| TiffError::TruncatedFile {
            offset,
            length: N,
        })
    }

    pub fn u16(&mut self, endian: Endian) -> Result<u16, TiffError> {
        let value = endian.decode(self.take::<2>()?)?;
        Ok(value)
    }

    pub fn u32(&mut self, endian: Endian) -> Result<u32, TiffError> {
        let value = endian.decode(self.take::<4>()?)?;
        Ok(value)
    }

    pub fn i32(&mut self, endian: Endian) -> Result<i32, TiffError> {
        let value = endian.decode(self.take::<4>()?)?;
        Ok(value)
    }
}
