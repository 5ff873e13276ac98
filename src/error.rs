use crate::raster::RasterError;
use crate::tiff::{PlaneKey, TiffError};
use std::fmt;
use std::io;
use std::path::PathBuf;

pub type StackTiffResult<T> = Result<T, StackTiffError>;

#[derive(Debug)]
pub enum StackTiffError {
    /// The file violates the container format. Fatal for the file; never
    /// retried.
    BadTiff { path: PathBuf, error: TiffError },
    ReadError(io::Error),
    BadRaster {
        path: PathBuf,
        key: PlaneKey,
        error: RasterError,
    },
    /// The requested plane is not in the index. Recoverable; guard with
    /// `has_image` when presence is uncertain.
    PlaneNotFound(PlaneKey),
    /// No resolution level with the requested downsample factor.
    LevelNotFound(u32),
    /// The dataset root has no full-resolution subdirectory.
    MissingResolutionLevel(PathBuf),
    /// Channel name not present in the summary metadata's channel list.
    InvalidChannel(String),
    /// Two files within one resolution level both claim the same plane.
    DuplicatePlane {
        key: PlaneKey,
        first: PathBuf,
        second: PathBuf,
    },
    /// A level directory with no container files in it.
    NoContainerFiles(PathBuf),
    CloseErrors(Vec<StackTiffError>),
}

impl fmt::Display for StackTiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for StackTiffError {}

impl From<io::Error> for StackTiffError {
    fn from(e: io::Error) -> Self {
        StackTiffError::ReadError(e)
    }
}
