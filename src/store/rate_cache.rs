//! Single-value on-disk cache for the last live USD→NPR rate

use crate::core::currency::is_usable_rate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A text file holding at most one decimal number.
///
/// Reads and writes are best-effort: every failure is logged and reported as
/// an absent value or silently dropped.
#[derive(Debug, Clone)]
pub struct RateCache {
    path: PathBuf,
}

impl RateCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        RateCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached rate if the file holds a positive finite number.
    pub fn read(&self) -> Option<f64> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                debug!("Rate cache MISS at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match text.trim().parse::<f64>() {
            Ok(value) if is_usable_rate(value) => {
                debug!("Rate cache HIT: {}", value);
                Some(value)
            }
            Ok(value) => {
                warn!("Ignoring unusable cached rate {} in {}", value, self.path.display());
                None
            }
            Err(e) => {
                warn!(
                    "Ignoring unparseable rate cache {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Overwrites the file with `value`.
    pub fn write(&self, value: f64) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create {}: {}", parent.display(), e);
                    return;
                }
            }
        }

        // Debug formatting keeps the fractional part, e.g. `131.0`.
        match fs::write(&self.path, format!("{value:?}")) {
            Ok(()) => debug!("Rate cache PUT: {}", value),
            Err(e) => warn!(
                "Failed to write rate cache {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("last_npr_rate.txt"));
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("last_npr_rate.txt"));

        cache.write(131.0);
        assert_eq!(fs::read_to_string(cache.path()).unwrap(), "131.0");
        assert_eq!(cache.read(), Some(131.0));

        cache.write(132.5);
        assert_eq!(fs::read_to_string(cache.path()).unwrap(), "132.5");
        assert_eq!(cache.read(), Some(132.5));
    }

    #[test]
    fn test_read_tolerates_surrounding_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_npr_rate.txt");
        fs::write(&path, "  129.25\n").unwrap();

        assert_eq!(RateCache::new(path).read(), Some(129.25));
    }

    #[test]
    fn test_read_rejects_garbage_and_non_positive_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_npr_rate.txt");
        let cache = RateCache::new(&path);

        for contents in ["not a number", "", "0", "-12.5", "NaN", "inf", "131.0 132.0"] {
            fs::write(&path, contents).unwrap();
            assert_eq!(cache.read(), None, "expected absent for {contents:?}");
        }
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // The target path is an existing directory, so the write must fail.
        let cache = RateCache::new(dir.path());
        cache.write(130.0);
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().join("nested").join("rate.txt"));
        cache.write(128.75);
        assert_eq!(cache.read(), Some(128.75));
    }
}
