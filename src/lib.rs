mod dataset;
mod error;
mod raster;
mod tiff;

pub use dataset::{Channel, Dataset, Level, DOWNSAMPLE_DIR_PREFIX, FULL_RES_DIR, FULL_RES_FACTOR};
pub use error::{StackTiffError, StackTiffResult};
pub use raster::{Plane, RasterError};
pub use tiff::{
    Endian, Ifd, MultipageTiff, PlaneIndexEntry, PlaneKey, PositionEntry, SummaryMetadata, TagId,
    TagType, TiffError, DECODE_ORDER, INDEX_MAP_HEADER, INDEX_MAP_OFFSET_HEADER,
    INDEX_RECORD_BYTES, MAGIC, SUMMARY_MD_HEADER,
};
