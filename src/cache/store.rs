use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest as _, Sha256};
use tracing::debug;

use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::geo::BBox;
use crate::geodata::provider::TagQuery;

/// Opaque deterministic cache key.
///
/// Built from the semantic components of a request (operation kind, spatial
/// extent, tag set) so that semantically distinct requests cannot collide.
/// Owned transiently by callers; never persisted itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for geocoded coordinates of a city/country pair.
    pub fn coordinates(city: &str, country: &str) -> Self {
        Self(format!(
            "coords_{}_{}",
            city.to_lowercase(),
            country.to_lowercase()
        ))
    }

    /// Key for a street-network graph fetched for `bbox`.
    pub fn street_graph(bbox: &BBox) -> Self {
        Self(format!(
            "graph_bbox_{}_{}_{}_{}",
            bbox.west, bbox.south, bbox.east, bbox.north
        ))
    }

    /// Key for a named feature layer fetched for `bbox` with `tags`.
    pub fn feature_layer(name: &str, bbox: &BBox, tags: &TagQuery) -> Self {
        let tag_keys: Vec<&str> = tags.pairs().iter().map(|(k, _)| *k).collect();
        Self(format!(
            "{name}_bbox_{}_{}_{}_{}_{}",
            bbox.west,
            bbox.south,
            bbox.east,
            bbox.north,
            tag_keys.join("_")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content-addressed, flat-directory persistence for fetched artifacts.
///
/// One JSON file per entry, named by the SHA-256 of the key. No expiry, no
/// invalidation, no concurrent-writer protection: the system is
/// single-process and sequential, so last writer wins.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `dir`. Nothing touches the filesystem until
    /// [`CacheStore::init`] or the first `set`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Idempotently create the cache directory.
    pub fn init(&self) -> PosterResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| PosterError::cache_io(format!("create '{}': {e}", self.dir.display())))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let digest = Sha256::digest(key.as_str().as_bytes());
        let mut name = String::with_capacity(digest.len() * 2 + 5);
        for byte in digest {
            name.push_str(&format!("{byte:02x}"));
        }
        name.push_str(".json");
        self.dir.join(name)
    }

    /// Retrieve a cached payload. A missing entry is `Ok(None)`, never an
    /// error; an unreadable or undecodable entry is treated as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let path = self.entry_path(key);
        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key = %key, "cache hit");
                Some(value)
            }
            Err(e) => {
                debug!(key = %key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Store a payload under `key`.
    ///
    /// Distinguishes serialization failures from I/O failures; callers may
    /// treat both as non-fatal since the cache is an optimization.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> PosterResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            PosterError::cache_serialization(format!("encoding payload for '{key}': {e}"))
        })?;

        let path = self.entry_path(key);
        std::fs::write(&path, bytes)
            .map_err(|e| PosterError::cache_io(format!("writing '{}': {e}", path.display())))?;
        debug!(key = %key, path = %path.display(), "cache write");
        Ok(())
    }
}
