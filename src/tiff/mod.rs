use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod endian;
mod error;
mod ifd;
mod index;
mod scan;
mod summary;
mod tag;

pub use endian::Endian;
pub use error::TiffError;
pub use ifd::Ifd;
pub use index::{PlaneIndexEntry, PlaneKey, INDEX_RECORD_BYTES};
pub use summary::{PositionEntry, SummaryMetadata};
pub use tag::{TagId, TagType};

use crate::error::{StackTiffError, StackTiffResult};
use crate::raster::Plane;
use scan::Scan;

pub const MAGIC: u16 = 42;
pub const INDEX_MAP_OFFSET_HEADER: u32 = 54773648;
pub const SUMMARY_MD_HEADER: u32 = 2355492;
pub const INDEX_MAP_HEADER: u32 = 3453623;

/// The byte order this reader decodes with. The writer emits the native
/// order of the acquisition machine and the reader performs no conversion,
/// so a file declaring the other order is rejected rather than converted.
pub const DECODE_ORDER: Endian = Endian::Little;

const SUMMARY_MD_HEADER_OFFSET: u64 = 32;

/// Random-access reader for one container file: a multipage TIFF with a
/// custom index map that locates every plane's directory without walking
/// the IFD chain.
#[derive(Debug)]
pub struct MultipageTiff {
    path: PathBuf,
    map: Mmap,
    endian: Endian,
    first_ifd_offset: u32,
    index_map_offset: u32,
    summary: SummaryMetadata,
    index: HashMap<PlaneKey, u32>,
}

impl MultipageTiff {
    /// Open and fully validate the file header, summary metadata and index
    /// map. Directories are not touched here; they are parsed per read.
    pub fn open<P: AsRef<Path>>(path: P) -> StackTiffResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(StackTiffError::ReadError)?;
        // Safety: the format assumes a finished, static acquisition; callers
        // must not mutate the file while the reader is open.
        let map = unsafe { Mmap::map(&file) }.map_err(StackTiffError::ReadError)?;

        match Self::parse(&path, &map) {
            Ok((endian, first_ifd_offset, index_map_offset, summary, index)) => Ok(Self {
                path,
                map,
                endian,
                first_ifd_offset,
                index_map_offset,
                summary,
                index,
            }),
            // The map and file handle drop here, so a failed open never
            // leaks the mapping.
            Err(error) => Err(StackTiffError::BadTiff { path, error }),
        }
    }

    fn parse(
        path: &Path,
        data: &[u8],
    ) -> Result<(Endian, u32, u32, SummaryMetadata, HashMap<PlaneKey, u32>), TiffError> {
        let mut scan = Scan::new(data);

        let endian = match scan.bytes(2)? {
            b"II" => Endian::Little,
            b"MM" => Endian::Big,
            _ => return Err(TiffError::BadMagicBytes),
        };
        if endian != DECODE_ORDER {
            return Err(TiffError::EndianMismatch(endian));
        }

        if scan.u16(endian)? != MAGIC {
            return Err(TiffError::BadMagicBytes);
        }

        // Kept for completeness; the index map supersedes both.
        let first_ifd_offset = scan.u32(endian)?;
        check_header(&mut scan, endian, INDEX_MAP_OFFSET_HEADER)?;
        let index_map_offset = scan.u32(endian)?;

        let mut scan = Scan::at(data, SUMMARY_MD_HEADER_OFFSET);
        check_header(&mut scan, endian, SUMMARY_MD_HEADER)?;
        let summary_length = scan.u32(endian)? as usize;
        let summary: SummaryMetadata = serde_json::from_slice(scan.bytes(summary_length)?)?;

        check_header(&mut scan, endian, INDEX_MAP_HEADER)?;
        let record_count = scan.u32(endian)? as usize;
        let mut index = HashMap::with_capacity(record_count);
        for _ in 0..record_count {
            let entry = PlaneIndexEntry::parse(&mut scan, endian)?;
            if let Some(previous) = index.insert(entry.key, entry.ifd_offset) {
                warn!(
                    "{}: plane {} indexed twice (offsets {} and {})",
                    path.display(),
                    entry.key,
                    previous,
                    entry.ifd_offset
                );
            }
        }

        debug!(
            "opened {}: {} planes, {}x{}",
            path.display(),
            index.len(),
            summary.width,
            summary.height
        );

        Ok((endian, first_ifd_offset, index_map_offset, summary, index))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn first_ifd_offset(&self) -> u32 {
        self.first_ifd_offset
    }

    pub fn index_map_offset(&self) -> u32 {
        self.index_map_offset
    }

    pub fn summary(&self) -> &SummaryMetadata {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: PlaneKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = PlaneKey> + '_ {
        self.index.keys().copied()
    }

    pub fn ifd_offset(&self, key: PlaneKey) -> Option<u32> {
        self.index.get(&key).copied()
    }

    /// Parse the directory the index recorded for this plane.
    fn ifd(&self, key: PlaneKey) -> StackTiffResult<Ifd> {
        let offset = self
            .index
            .get(&key)
            .ok_or(StackTiffError::PlaneNotFound(key))?;
        Ifd::parse(&self.map, *offset as u64, self.endian).map_err(|error| self.bad_tiff(error))
    }

    fn slice(&self, offset: u32, length: u32) -> StackTiffResult<&[u8]> {
        Scan::at(&self.map, offset as u64)
            .bytes(length as usize)
            .map_err(|error| self.bad_tiff(error))
    }

    fn bad_tiff(&self, error: TiffError) -> StackTiffError {
        StackTiffError::BadTiff {
            path: self.path.clone(),
            error,
        }
    }

    fn plane(&self, ifd: &Ifd, key: PlaneKey) -> StackTiffResult<Plane> {
        let strip = self.slice(ifd.pixel_offset, ifd.pixel_byte_count)?;
        let dimensions = (self.summary.width, self.summary.height);
        Plane::from_strip(dimensions, strip.to_vec(), self.endian).map_err(|error| {
            StackTiffError::BadRaster {
                path: self.path.clone(),
                key,
                error,
            }
        })
    }

    fn metadata(&self, ifd: &Ifd) -> StackTiffResult<serde_json::Value> {
        let (offset, length) = ifd.metadata_range().map_err(|e| self.bad_tiff(e))?;
        serde_json::from_slice(self.slice(offset, length)?)
            .map_err(|e| self.bad_tiff(TiffError::BadJson(e)))
    }

    /// Decode the plane's pixels.
    pub fn read_image(&self, key: PlaneKey) -> StackTiffResult<Plane> {
        let ifd = self.ifd(key)?;
        self.plane(&ifd, key)
    }

    /// Decode the plane's pixels and its JSON metadata from one directory
    /// parse.
    pub fn read_image_with_metadata(
        &self,
        key: PlaneKey,
    ) -> StackTiffResult<(Plane, serde_json::Value)> {
        let ifd = self.ifd(key)?;
        Ok((self.plane(&ifd, key)?, self.metadata(&ifd)?))
    }

    /// Parse the plane's JSON metadata without touching pixel data.
    pub fn read_metadata(&self, key: PlaneKey) -> StackTiffResult<serde_json::Value> {
        let ifd = self.ifd(key)?;
        self.metadata(&ifd)
    }

    /// Release the memory map and file handle. Dropping the reader has the
    /// same effect; this form exists for callers that close explicitly.
    pub fn close(self) -> StackTiffResult<()> {
        drop(self);
        Ok(())
    }
}

fn check_header(scan: &mut Scan, endian: Endian, expected: u32) -> Result<(), TiffError> {
    let offset = scan.position();
    let found = scan.u32(endian)?;
    if found != expected {
        return Err(TiffError::BadHeaderConstant {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}
