use crate::error::{StackTiffError, StackTiffResult};
use crate::raster::Plane;
use crate::tiff::{PlaneKey, SummaryMetadata};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

mod level;

pub use level::Level;

pub const FULL_RES_DIR: &str = "Full resolution";
pub const DOWNSAMPLE_DIR_PREFIX: &str = "Downsampled_x";
pub const FULL_RES_FACTOR: u32 = 1;

/// Channel argument of the read surface: either a raw channel index or a
/// name resolved against the summary metadata's channel list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel<'a> {
    Index(i32),
    Name(&'a str),
}

impl From<i32> for Channel<'static> {
    fn from(index: i32) -> Self {
        Channel::Index(index)
    }
}

impl<'a> From<&'a str> for Channel<'a> {
    fn from(name: &'a str) -> Self {
        Channel::Name(name)
    }
}

/// Handle to one dataset root directory; the only entry point callers need.
///
/// All index structures are built once at open and never mutated, and the
/// underlying maps are read-only, so shared references can be used from
/// multiple threads without locking.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    levels: HashMap<u32, Level>,
    summary: SummaryMetadata,
    /// Full-resolution keys ordered (channel, z, time, position).
    channel_major: BTreeSet<(i32, i32, i32, i32)>,
    /// Full-resolution keys ordered (position, time, z, channel).
    position_major: BTreeSet<(i32, i32, i32, i32)>,
}

impl Dataset {
    /// Open a dataset root. The `Full resolution` subdirectory is required;
    /// with `full_resolution_only` the downsampled pyramid tiers are
    /// skipped entirely.
    pub fn open<P: AsRef<Path>>(path: P, full_resolution_only: bool) -> StackTiffResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut subdirs: Vec<PathBuf> = std::fs::read_dir(&path)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| p.is_dir())
            .collect();
        subdirs.sort();

        let full_res = subdirs
            .iter()
            .find(|p| p.file_name().is_some_and(|n| n == FULL_RES_DIR))
            .ok_or_else(|| StackTiffError::MissingResolutionLevel(path.clone()))?;

        let mut levels = HashMap::new();
        levels.insert(FULL_RES_FACTOR, Level::open(full_res, FULL_RES_FACTOR)?);

        if !full_resolution_only {
            for dir in &subdirs {
                if let Some(factor) = downsample_factor_of(dir) {
                    levels.insert(factor, Level::open(dir, factor)?);
                }
            }
        }

        let full = &levels[&FULL_RES_FACTOR];
        let summary = full.summary().clone();

        // One pass over the merged full-resolution index builds both
        // traversal orderings.
        let mut channel_major = BTreeSet::new();
        let mut position_major = BTreeSet::new();
        for key in full.keys() {
            channel_major.insert(key.channel_major());
            position_major.insert(key.position_major());
        }

        debug!(
            "opened dataset {}: {} levels, {} full-res planes",
            path.display(),
            levels.len(),
            channel_major.len()
        );

        Ok(Self {
            path,
            levels,
            summary,
            channel_major,
            position_major,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn summary(&self) -> &SummaryMetadata {
        &self.summary
    }

    pub fn width(&self) -> u32 {
        self.summary.width
    }

    pub fn height(&self) -> u32 {
        self.summary.height
    }

    pub fn pixel_size_um(&self) -> Option<f64> {
        self.summary.pixel_size_um
    }

    pub fn z_step_um(&self) -> Option<f64> {
        self.summary.z_step_um
    }

    pub fn channel_names(&self) -> &[String] {
        &self.summary.channel_names
    }

    /// Downsample factors of the opened levels, ascending; always contains 1.
    pub fn downsample_factors(&self) -> Vec<u32> {
        let mut factors: Vec<u32> = self.levels.keys().copied().collect();
        factors.sort_unstable();
        factors
    }

    /// Full-resolution planes in (channel, z, time, position) order.
    pub fn keys_channel_major(&self) -> impl Iterator<Item = PlaneKey> + '_ {
        self.channel_major
            .iter()
            .map(|(c, z, t, p)| PlaneKey::new(*c, *z, *t, *p))
    }

    /// Full-resolution planes in (position, time, z, channel) order.
    pub fn keys_position_major(&self) -> impl Iterator<Item = PlaneKey> + '_ {
        self.position_major
            .iter()
            .map(|(p, t, z, c)| PlaneKey::new(*c, *z, *t, *p))
    }

    pub fn level(&self, downsample_factor: u32) -> StackTiffResult<&Level> {
        self.levels
            .get(&downsample_factor)
            .ok_or(StackTiffError::LevelNotFound(downsample_factor))
    }

    fn resolve_channel(&self, channel: Channel) -> StackTiffResult<i32> {
        match channel {
            Channel::Index(index) => Ok(index),
            Channel::Name(name) => self
                .summary
                .channel_names
                .iter()
                .position(|n| n == name)
                .map(|i| i as i32)
                .ok_or_else(|| StackTiffError::InvalidChannel(name.to_string())),
        }
    }

    fn key<'a, C: Into<Channel<'a>>>(
        &self,
        channel: C,
        z: i32,
        time: i32,
        position: i32,
    ) -> StackTiffResult<PlaneKey> {
        let channel = self.resolve_channel(channel.into())?;
        Ok(PlaneKey::new(channel, z, time, position))
    }

    /// Pure index lookup, no I/O. False when the factor has no opened level
    /// or the channel name is unknown.
    pub fn has_image<'a, C: Into<Channel<'a>>>(
        &self,
        channel: C,
        z: i32,
        time: i32,
        position: i32,
        downsample_factor: u32,
    ) -> bool {
        let Ok(key) = self.key(channel, z, time, position) else {
            return false;
        };
        if downsample_factor == FULL_RES_FACTOR {
            self.channel_major.contains(&key.channel_major())
        } else {
            self.levels
                .get(&downsample_factor)
                .is_some_and(|level| level.contains(key))
        }
    }

    pub fn read_image<'a, C: Into<Channel<'a>>>(
        &self,
        channel: C,
        z: i32,
        time: i32,
        position: i32,
        downsample_factor: u32,
    ) -> StackTiffResult<Plane> {
        let key = self.key(channel, z, time, position)?;
        self.level(downsample_factor)?.read_image(key)
    }

    pub fn read_image_with_metadata<'a, C: Into<Channel<'a>>>(
        &self,
        channel: C,
        z: i32,
        time: i32,
        position: i32,
        downsample_factor: u32,
    ) -> StackTiffResult<(Plane, serde_json::Value)> {
        let key = self.key(channel, z, time, position)?;
        self.level(downsample_factor)?.read_image_with_metadata(key)
    }

    pub fn read_metadata<'a, C: Into<Channel<'a>>>(
        &self,
        channel: C,
        z: i32,
        time: i32,
        position: i32,
        downsample_factor: u32,
    ) -> StackTiffResult<serde_json::Value> {
        let key = self.key(channel, z, time, position)?;
        self.level(downsample_factor)?.read_metadata(key)
    }

    /// Ordered distinct z indices present for one (position, time) pair at
    /// full resolution. No I/O.
    pub fn z_slices_at(&self, position: i32, time: i32) -> Vec<i32> {
        let range = (position, time, i32::MIN, i32::MIN)..=(position, time, i32::MAX, i32::MAX);
        let mut slices: Vec<i32> = Vec::new();
        for (_, _, z, _) in self.position_major.range(range) {
            if slices.last() != Some(z) {
                slices.push(*z);
            }
        }
        slices
    }

    /// Minimum and maximum z index across all planes, or None for an empty
    /// index.
    pub fn min_max_z_index(&self) -> Option<(i32, i32)> {
        let mut bounds: Option<(i32, i32)> = None;
        for (_, z, _, _) in &self.channel_major {
            bounds = match bounds {
                None => Some((*z, *z)),
                Some((min, max)) => Some((min.min(*z), max.max(*z))),
            };
        }
        bounds
    }

    /// Count of distinct positions present in the full-resolution index.
    pub fn num_xy_positions(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        // position_major is ordered by position first.
        for (position, _, _, _) in &self.position_major {
            if last != Some(*position) {
                count += 1;
                last = Some(*position);
            }
        }
        count
    }

    /// Grid extent from the summary's position list: (max row + 1,
    /// max col + 1). Deliberately max-plus-one rather than a distinct
    /// count, since the position grid may have unfilled cells.
    pub fn num_rows_and_cols(&self) -> (i64, i64) {
        let rows = self.summary.positions.iter().map(|p| p.grid_row).max();
        let cols = self.summary.positions.iter().map(|p| p.grid_col).max();
        match (rows, cols) {
            (Some(r), Some(c)) => (r + 1, c + 1),
            _ => (0, 0),
        }
    }

    /// Max time index across all positions, plus one.
    pub fn num_frames(&self) -> i32 {
        self.position_major
            .iter()
            .map(|(_, time, _, _)| *time)
            .max()
            .map_or(0, |t| t + 1)
    }

    /// Close every owned resolution level, releasing the rest even when one
    /// close fails.
    pub fn close(self) -> StackTiffResult<()> {
        let mut failures = Vec::new();
        for (_, level) in self.levels {
            if let Err(e) = level.close() {
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

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dataset({}x{}, {} channels, {} levels)",
            self.summary.width,
            self.summary.height,
            self.summary.channel_names.len(),
            self.levels.len()
        )?;
        for factor in self.downsample_factors() {
            write!(f, "\n  {}", self.levels[&factor])?;
        }
        Ok(())
    }
}

fn downsample_factor_of(dir: &Path) -> Option<u32> {
    let name = dir.file_name()?.to_str()?;
    let factor: u32 = name.strip_prefix(DOWNSAMPLE_DIR_PREFIX)?.parse().ok()?;
    // x1 would shadow the mandatory full-resolution level.
    (factor > 1).then_some(factor)
}
