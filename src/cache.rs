//! This module provides a local cache for server responses
//!
//! Each response is stored verbatim in its own file, named after a caller-chosen key.
//! Entries are written once and never expire: delete the file to force a new download.

use std::future::Future;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the application folder, inside the platform cache directory
const APP_NAME: &str = "axema-booking";


/// A folder of cached response payloads
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCache {
    folder: PathBuf,
}

impl ResponseCache {
    /// The default cache folder, e.g. `~/.cache/axema-booking/cache` on Linux
    pub fn default_folder() -> Result<PathBuf> {
        match dirs::cache_dir() {
            Some(dir) => Ok(dir.join(APP_NAME).join("cache")),
            None => Err(Error::NoCacheDir),
        }
    }

    /// Use `folder` as the cache folder. It will be created on the first write if it does not exist yet
    pub fn new(folder: &Path) -> Self {
        Self {
            folder: PathBuf::from(folder),
        }
    }

    /// The file that stores (or would store) the payload for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.folder.join(sanitize_filename::sanitize(key))
    }

    /// Returns the payload stored under `key`.
    ///
    /// If there is none yet, `producer` is called and its output is saved before being returned.
    /// When `producer` fails, its error is returned and nothing is saved, so that the next call tries again.
    pub async fn fetch_cached<F, Fut>(&self, key: &str, producer: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(content) => {
                log::debug!("Cache hit for {:?}", path);
                return Ok(content);
            },
            Err(err) if err.kind() == ErrorKind::NotFound => (),
            Err(err) => return Err(Error::Cache { path, source: err }),
        }

        log::info!("caching {:?}", path);
        let content = producer().await?;
        self.save(&path, &content)?;
        Ok(content)
    }

    fn save(&self, path: &Path, content: &[u8]) -> Result<()> {
        let to_cache_error = |source| Error::Cache { path: path.to_path_buf(), source };

        std::fs::create_dir_all(&self.folder).map_err(to_cache_error)?;

        let mut file = std::fs::File::create(path).map_err(to_cache_error)?;
        let written = file.write_all(content).and_then(|_| file.sync_all());
        if let Err(err) = written {
            // A truncated file would be served forever
            if let Err(rm_err) = std::fs::remove_file(path) {
                log::warn!("Unable to remove incomplete cache file {:?}: {}", path, rm_err);
            }
            return Err(to_cache_error(err));
        }
        Ok(())
    }
}
