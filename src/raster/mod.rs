use crate::tiff::Endian;
use std::fmt::Display;

#[derive(Debug)]
pub enum RasterError {
    /// Strip size matches neither an 8 bit nor a 16 bit plane of the
    /// declared dimensions.
    UnknownPixelEncoding {
        byte_count: usize,
        dimensions: (u32, u32),
    },
}

impl Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for RasterError {}

/// One decoded image plane: a flat strip of unsigned samples reshaped as
/// height rows of width samples, row-major. The buffer keeps the file's raw
/// sample bytes; multi-byte samples are in the file's byte order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    pub dimensions: (u32, u32),
    pub buffer: Vec<u8>,
    pub bits_per_sample: u16,
    pub endian: Endian,
}

impl Plane {
    /// Infer the sample depth from the strip size: width*height*2 bytes is a
    /// 16 bit plane, width*height bytes an 8 bit plane.
    pub fn from_strip(
        dimensions: (u32, u32),
        strip: Vec<u8>,
        endian: Endian,
    ) -> Result<Self, RasterError> {
        let pixels = dimensions.0 as usize * dimensions.1 as usize;
        let bits_per_sample = if strip.len() == pixels * 2 {
            16
        } else if strip.len() == pixels {
            8
        } else {
            return Err(RasterError::UnknownPixelEncoding {
                byte_count: strip.len(),
                dimensions,
            });
        };
        Ok(Self {
            dimensions,
            buffer: strip,
            bits_per_sample,
            endian,
        })
    }

    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    pub fn row_bytes(&self, y: u32) -> Option<&[u8]> {
        if y >= self.dimensions.1 {
            return None;
        }
        let row_size = self.dimensions.0 as usize * self.bytes_per_sample();
        let start = y as usize * row_size;
        Some(&self.buffer[start..start + row_size])
    }

    /// Sample at (x, y), widened to u16 for the 8 bit case.
    pub fn sample(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.dimensions.0 || y >= self.dimensions.1 {
            return None;
        }
        let i = (y as usize * self.dimensions.0 as usize + x as usize) * self.bytes_per_sample();
        match self.bits_per_sample {
            8 => Some(self.buffer[i] as u16),
            _ => self
                .endian
                .decode([self.buffer[i], self.buffer[i + 1]])
                .ok(),
        }
    }

    /// All samples in row-major order, widened to u16 for the 8 bit case.
    pub fn samples(&self) -> Vec<u16> {
        match self.bits_per_sample {
            8 => self.buffer.iter().map(|b| *b as u16).collect(),
            _ => self.endian.decode_all(&self.buffer).unwrap_or_default(),
        }
    }
}

impl Display for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plane({}x{}, {}bit, {:?} Endian)",
            self.dimensions.0, self.dimensions.1, self.bits_per_sample, self.endian
        )
    }
}
