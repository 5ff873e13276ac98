//! Synthesizes container files matching the on-disk layout the reader
//! expects, so tests can exercise real open/read paths against temp dirs.
#![allow(dead_code)] // each test binary uses a different subset

use serde_json::{json, Value};
use stacktiff::{
    Endian, PlaneKey, INDEX_MAP_HEADER, INDEX_MAP_OFFSET_HEADER, MAGIC, SUMMARY_MD_HEADER,
};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug)]
pub enum Pixels {
    U8(Vec<u8>),
    U16(Vec<u16>),
    /// Arbitrary strip bytes, for encodings the reader should reject.
    Raw(Vec<u8>),
}

#[derive(Clone, Debug)]
pub struct PlaneSpec {
    pub key: PlaneKey,
    pub pixels: Pixels,
    pub metadata: Option<Value>,
}

pub struct ContainerBuilder {
    endian: Endian,
    summary: Value,
    planes: Vec<PlaneSpec>,
}

impl ContainerBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            endian: Endian::Little,
            summary: json!({ "Width": width, "Height": height }),
            planes: Vec::new(),
        }
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn summary(mut self, summary: Value) -> Self {
        self.summary = summary;
        self
    }

    pub fn summary_field(mut self, key: &str, value: Value) -> Self {
        self.summary[key] = value;
        self
    }

    pub fn plane(mut self, key: PlaneKey, pixels: Pixels, metadata: Value) -> Self {
        self.planes.push(PlaneSpec {
            key,
            pixels,
            metadata: Some(metadata),
        });
        self
    }

    pub fn plane_without_metadata(mut self, key: PlaneKey, pixels: Pixels) -> Self {
        self.planes.push(PlaneSpec {
            key,
            pixels,
            metadata: None,
        });
        self
    }

    /// Byte offset one past the last index map record.
    pub fn index_map_end(&self) -> usize {
        let summary_json = serde_json::to_vec(&self.summary).unwrap();
        48 + summary_json.len() + 20 * self.planes.len()
    }

    pub fn bytes(&self) -> Vec<u8> {
        let e = self.endian;
        let summary_json = serde_json::to_vec(&self.summary).unwrap();

        let index_map_offset = 40 + summary_json.len() as u32;
        let planes_base = index_map_offset + 8 + 20 * self.planes.len() as u32;

        // Lay the per-plane blocks out first so the header and index map
        // can point at them.
        let mut blocks = Vec::new();
        let mut ifd_offsets = Vec::new();
        let mut cursor = planes_base;
        for plane in &self.planes {
            let strip = match &plane.pixels {
                Pixels::U8(samples) => samples.clone(),
                Pixels::U16(samples) => e.encode_all(samples),
                Pixels::Raw(bytes) => bytes.clone(),
            };
            let metadata_json = plane.metadata.as_ref().map(|m| serde_json::to_vec(m).unwrap());

            let entry_count: u16 = if metadata_json.is_some() { 3 } else { 2 };
            let ifd_size = 2 + 12 * entry_count as u32 + 4;
            let pixel_offset = cursor + ifd_size;
            let metadata_offset = pixel_offset + strip.len() as u32;

            let mut block = e.encode(entry_count).to_vec();
            // Entries in ascending tag order, single-strip planes.
            block.extend(ifd_entry(e, 0x0111, 4, 1, pixel_offset));
            block.extend(ifd_entry(e, 0x0117, 4, 1, strip.len() as u32));
            if let Some(md) = &metadata_json {
                block.extend(ifd_entry(e, 51123, 1, md.len() as u32, metadata_offset));
            }
            block.extend(e.encode(0u32)); // next IFD: unused by the reader
            block.extend_from_slice(&strip);
            if let Some(md) = &metadata_json {
                block.extend_from_slice(md);
            }

            ifd_offsets.push(cursor);
            cursor += block.len() as u32;
            blocks.push(block);
        }

        let mut out = Vec::new();
        out.extend(match e {
            Endian::Little => *b"II",
            Endian::Big => *b"MM",
        });
        out.extend(e.encode(MAGIC));
        out.extend(e.encode(ifd_offsets.first().copied().unwrap_or(0))); // first IFD
        out.extend(e.encode(INDEX_MAP_OFFSET_HEADER));
        out.extend(e.encode(index_map_offset));
        out.extend([0u8; 16]); // reserved region, bytes 16..32
        out.extend(e.encode(SUMMARY_MD_HEADER));
        out.extend(e.encode(summary_json.len() as u32));
        out.extend_from_slice(&summary_json);

        out.extend(e.encode(INDEX_MAP_HEADER));
        out.extend(e.encode(self.planes.len() as u32));
        for (plane, offset) in self.planes.iter().zip(&ifd_offsets) {
            let k = plane.key;
            out.extend(e.encode_all(&[k.channel, k.z, k.time, k.position]));
            out.extend(e.encode(*offset));
        }

        assert_eq!(out.len() as u32, planes_base);
        for block in blocks {
            out.extend(block);
        }
        out
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) {
        fs::write(path, self.bytes()).unwrap();
    }
}

/// Route library log output through the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn ifd_entry(e: Endian, tag: u16, datatype: u16, count: u32, value: u32) -> Vec<u8> {
    let mut entry = e.encode(tag).to_vec();
    entry.extend(e.encode(datatype));
    entry.extend(e.encode(count));
    entry.extend(e.encode(value));
    entry
}

pub fn plane_metadata(key: PlaneKey) -> Value {
    json!({
        "Channel": key.channel,
        "Slice": key.z,
        "Frame": key.time,
        "PositionIndex": key.position,
    })
}

/// Gradient test pattern, distinct per plane key.
pub fn gradient_u16(width: u32, height: u32, key: PlaneKey) -> Vec<u16> {
    let seed = (key.channel + 13 * key.z + 31 * key.time + 97 * key.position) as u16;
    (0..width * height)
        .map(|i| seed.wrapping_add(i as u16))
        .collect()
}

pub fn summary_with_channels(width: u32, height: u32, channels: &[&str]) -> Value {
    json!({
        "Width": width,
        "Height": height,
        "PixelSize_um": 0.65,
        "z-step_um": 1.0,
        "ChNames": channels,
    })
}
