use crate::error::{StackTiffError, StackTiffResult};
use crate::raster::Plane;
use crate::tiff::{MultipageTiff, PlaneKey, SummaryMetadata};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONTAINER_EXTENSIONS: [&str; 2] = ["tif", "TIF"];

/// One resolution of the dataset: every container file in one level
/// directory, addressed through a single merged plane index.
#[derive(Debug)]
pub struct Level {
    pub downsample_factor: u32,
    path: PathBuf,
    readers: Vec<MultipageTiff>,
    index: HashMap<PlaneKey, usize>,
}

impl Level {
    /// Open every container file directly inside `dir` (no recursion) and
    /// merge their indices. A plane claimed by two files is a
    /// data-integrity violation and fails the open.
    pub fn open<P: AsRef<Path>>(dir: P, downsample_factor: u32) -> StackTiffResult<Self> {
        let path = dir.as_ref().to_path_buf();

        let mut files: Vec<PathBuf> = std::fs::read_dir(&path)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| is_container_file(p))
            .collect();
        // Name order keeps reader numbering stable across opens.
        files.sort();

        if files.is_empty() {
            return Err(StackTiffError::NoContainerFiles(path));
        }

        let mut readers: Vec<MultipageTiff> = Vec::with_capacity(files.len());
        let mut index: HashMap<PlaneKey, usize> = HashMap::new();
        for file in files {
            let reader = MultipageTiff::open(&file)?;
            for key in reader.keys() {
                if let Some(owner) = index.get(&key) {
                    return Err(StackTiffError::DuplicatePlane {
                        key,
                        first: readers[*owner].path().to_path_buf(),
                        second: reader.path().to_path_buf(),
                    });
                }
                index.insert(key, readers.len());
            }
            readers.push(reader);
        }

        debug!(
            "level x{} at {}: {} planes in {} files",
            downsample_factor,
            path.display(),
            index.len(),
            readers.len()
        );

        Ok(Self {
            downsample_factor,
            path,
            readers,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Summary metadata of the level's first file (by name).
    pub fn summary(&self) -> &SummaryMetadata {
        self.readers[0].summary()
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

    fn reader(&self, key: PlaneKey) -> StackTiffResult<&MultipageTiff> {
        self.index
            .get(&key)
            .map(|i| &self.readers[*i])
            .ok_or(StackTiffError::PlaneNotFound(key))
    }

    pub fn read_image(&self, key: PlaneKey) -> StackTiffResult<Plane> {
        self.reader(key)?.read_image(key)
    }

    pub fn read_image_with_metadata(
        &self,
        key: PlaneKey,
    ) -> StackTiffResult<(Plane, serde_json::Value)> {
        self.reader(key)?.read_image_with_metadata(key)
    }

    pub fn read_metadata(&self, key: PlaneKey) -> StackTiffResult<serde_json::Value> {
        self.reader(key)?.read_metadata(key)
    }

    /// Close every reader, releasing all remaining readers even when one
    /// close fails.
    pub fn close(self) -> StackTiffResult<()> {
        let mut failures = Vec::new();
        for reader in self.readers {
            if let Err(e) = reader.close() {
                failures.push(e);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StackTiffError::CloseErrors(failures))
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Level(x{}, {} planes, {} files)",
            self.downsample_factor,
            self.index.len(),
            self.readers.len()
        )
    }
}

fn is_container_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    // AppleDouble resource forks shadow real files on some exports.
    if name.starts_with("._") {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CONTAINER_EXTENSIONS.contains(&e))
}
