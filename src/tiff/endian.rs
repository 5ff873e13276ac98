use eio::{FromBytes, ReadExt, ToBytes};
use std::io::Result;
use std::mem;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn decode<const N: usize, T: FromBytes<N>>(&self, bytes: [u8; N]) -> Result<T> {
        match self {
            Endian::Big => bytes.as_slice().read_be(),
            Endian::Little => bytes.as_slice().read_le(),
        }
    }

    pub fn decode_all<const N: usize, T: FromBytes<N>>(&self, bytes: &[u8]) -> Option<Vec<T>> {
        bytes
            .chunks_exact(mem::size_of::<T>())
            .map(|chunk| {
                chunk
                    .try_into()
                    .ok()
                    .and_then(|arr| self.decode::<N, T>(arr).ok())
            })
            .collect()
    }

    pub fn encode<const N: usize, T: ToBytes<N>>(&self, value: T) -> [u8; N] {
        match self {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        }
    }

    pub fn encode_all<const N: usize, T: ToBytes<N> + Copy>(&self, values: &[T]) -> Vec<u8> {
        values.iter().flat_map(|v| self.encode(*v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_respects_byte_order() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        let big: u32 = Endian::Big.decode(bytes).unwrap();
        let little: u32 = Endian::Little.decode(bytes).unwrap();
        assert_eq!(big, 0x01020304);
        assert_eq!(little, 0x04030201);
    }

    #[test]
    fn encode_decode_round_trip() {
        for endian in [Endian::Big, Endian::Little] {
            let encoded = endian.encode(-7i32);
            let decoded: i32 = endian.decode(encoded).unwrap();
            assert_eq!(decoded, -7);
        }
    }

    #[test]
    fn decode_all_samples() {
        let bytes = Endian::Little.encode_all(&[1u16, 2, 512]);
        let values: Vec<u16> = Endian::Little.decode_all(&bytes).unwrap();
        assert_eq!(values, vec![1, 2, 512]);
    }
}
