//! # Spatial Node Cache
//!
//! Persisted map of every resource node location ever observed, grouped per
//! zone and resource type. The in-memory copy is authoritative between saves;
//! the JSON file is read at startup and on an explicit reload.
//!
//! ## File Layout
//!
//! ```json
//! {
//!     "7004": {
//!         "301": [ { "location": { "x": 1.0, "y": 2.0, "z": 3.0 }, "safe": true } ]
//!     }
//! }
//! ```
//!
//! ## Invariants
//!
//! - A bucket never holds two records within [`LOCATION_TOLERANCE`] of each
//!   other on `x` and `y`.
//! - Records are never removed automatically; only [`SpatialCache::delete_at`]
//!   removes them.
//!
//! [`LOCATION_TOLERANCE`]: crate::types::LOCATION_TOLERANCE

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::AutogatherError;
use crate::types::{BucketKey, Location, ResourceTypeId, ZoneId};

fn default_safe() -> bool {
    true
}

/// A cached node location and its safety annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub location: Location,
    /// `false` once visiting this spot has drawn hostile attention.
    #[serde(default = "default_safe")]
    pub safe: bool,
}

impl NodeRecord {
    pub fn new(location: Location) -> Self {
        Self { location, safe: true }
    }
}

/// All buckets recorded for one zone.
pub type ZoneBuckets = BTreeMap<ResourceTypeId, Vec<NodeRecord>>;

/// Persisted per-zone, per-resource cache of node locations.
#[derive(Debug, Clone)]
pub struct SpatialCache {
    path: PathBuf,
    zones: BTreeMap<ZoneId, ZoneBuckets>,
}

impl SpatialCache {
    /// Creates an empty cache that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            zones: BTreeMap::new(),
        }
    }

    /// Loads the cache from `path`, substituting an empty cache on any failure.
    ///
    /// A missing or malformed file is logged and never fails startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(cache) => cache,
            Err(e) => {
                error!("🌿 {e}; initializing with empty node list");
                Self::new(path)
            }
        }
    }

    /// Loads the cache from `path`, reporting why it could not be read.
    pub fn try_load(path: &Path) -> Result<Self, AutogatherError> {
        let content = std::fs::read_to_string(path).map_err(|e| AutogatherError::CacheLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let zones = serde_json::from_str(&content).map_err(|e| AutogatherError::CacheLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!("🌿 Loaded node cache from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            zones,
        })
    }

    /// Replaces the in-memory cache with the file contents.
    pub fn reload(&mut self) {
        let path = self.path.clone();
        *self = Self::load(path);
    }

    /// Writes the cache to disk. Failures are logged and otherwise ignored;
    /// the next natural save retries.
    pub fn save(&self) {
        match self.try_save() {
            Ok(()) => debug!("🌿 Node cache at {} updated", self.path.display()),
            Err(e) => error!("🌿 {e}"),
        }
    }

    /// Writes the cache to disk as tab-indented JSON.
    pub fn try_save(&self) -> Result<(), AutogatherError> {
        let write_err = |reason: String| AutogatherError::CacheWrite {
            path: self.path.clone(),
            reason,
        };

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.zones
            .serialize(&mut serializer)
            .map_err(|e| write_err(e.to_string()))?;
        std::fs::write(&self.path, buf).map_err(|e| write_err(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Makes sure `zone` has an entry, even if no node was ever seen there.
    pub fn ensure_zone(&mut self, zone: ZoneId) {
        self.zones.entry(zone).or_default();
    }

    pub fn zone(&self, zone: ZoneId) -> Option<&ZoneBuckets> {
        self.zones.get(&zone)
    }

    pub fn get(&self, key: BucketKey) -> Option<&[NodeRecord]> {
        self.zones
            .get(&key.zone)
            .and_then(|buckets| buckets.get(&key.resource))
            .map(Vec::as_slice)
    }

    /// Number of records in a bucket; zero when the bucket does not exist.
    pub fn len(&self, key: BucketKey) -> usize {
        self.get(key).map_or(0, <[NodeRecord]>::len)
    }

    /// Records a node sighting. Returns `true` if a new record was created.
    ///
    /// The sighting is dropped when the bucket already holds a record within
    /// tolerance on `x` and `y`; height is not compared.
    pub fn record_sighting(&mut self, key: BucketKey, location: Location) -> bool {
        if !location.is_finite() {
            warn!("🌿 Ignoring sighting with invalid location {:?}", location);
            return false;
        }
        let bucket = self
            .zones
            .entry(key.zone)
            .or_default()
            .entry(key.resource)
            .or_default();
        if bucket.iter().any(|r| r.location.approx_eq(&location, false)) {
            return false;
        }
        debug!(
            "🌿 New node location for resource {} in zone {}: {}",
            key.resource, key.zone, location
        );
        bucket.push(NodeRecord::new(location));
        true
    }

    pub fn set_safety(&mut self, key: BucketKey, index: usize, safe: bool) -> Result<(), AutogatherError> {
        let record = self.record_mut(key, index)?;
        record.safe = safe;
        Ok(())
    }

    /// Marks every record of a bucket safe. Returns how many records exist.
    pub fn reset_safety(&mut self, key: BucketKey) -> usize {
        match self.bucket_mut(key) {
            Some(bucket) => {
                bucket.iter_mut().for_each(|r| r.safe = true);
                bucket.len()
            }
            None => 0,
        }
    }

    pub fn delete_at(&mut self, key: BucketKey, index: usize) -> Result<NodeRecord, AutogatherError> {
        let len = self.len(key);
        match self.bucket_mut(key) {
            Some(bucket) if index < bucket.len() => Ok(bucket.remove(index)),
            _ => Err(AutogatherError::IndexOutOfRange { index, len }),
        }
    }

    /// Orders a bucket west to east, then south to north (`x` ascending, then
    /// `y` ascending). Returns `false` if there was nothing to sort.
    ///
    /// Records tied on both axes keep their current relative order: the
    /// legacy tiebreak on the safety flag never compared anything, and the
    /// file format depends on that order staying put.
    pub fn sort(&mut self, key: BucketKey) -> bool {
        match self.bucket_mut(key) {
            Some(bucket) if !bucket.is_empty() => {
                bucket.sort_by(|a, b| {
                    a.location
                        .x
                        .total_cmp(&b.location.x)
                        .then_with(|| a.location.y.total_cmp(&b.location.y))
                });
                true
            }
            _ => false,
        }
    }

    pub fn unsafe_indices(&self, key: BucketKey) -> Vec<usize> {
        self.get(key)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.safe)
            .map(|(i, _)| i)
            .collect()
    }

    fn bucket_mut(&mut self, key: BucketKey) -> Option<&mut Vec<NodeRecord>> {
        self.zones
            .get_mut(&key.zone)
            .and_then(|buckets| buckets.get_mut(&key.resource))
    }

    fn record_mut(&mut self, key: BucketKey, index: usize) -> Result<&mut NodeRecord, AutogatherError> {
        let len = self.len(key);
        self.bucket_mut(key)
            .and_then(|bucket| bucket.get_mut(index))
            .ok_or(AutogatherError::IndexOutOfRange { index, len })
    }
}
