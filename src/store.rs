// src/store.rs
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::consts::READY_MARKER;
use crate::error::{RelayError, TransportError};

/// Last fetched history page on disk. Only a page with the ready marker
/// counts; anything else is as good as no cache at all.
#[derive(Clone, Debug)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files read as "nothing cached".
    pub fn read_valid(&self) -> Option<String> {
        let text = fs::read_to_string(&self.path).ok()?;
        text.contains(READY_MARKER).then_some(text)
    }

    pub fn write(&self, html_doc: &str) -> Result<(), TransportError> {
        let wrap = |source| TransportError::Cache { path: self.path.clone(), source };

        // Ensure parent directories exist
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(wrap)?;
            }
        }
        fs::write(&self.path, html_doc).map_err(wrap)
    }

    pub fn invalidate(&self) -> Result<(), TransportError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TransportError::Cache { path: self.path.clone(), source }),
        }
    }
}

/// Liveness marker for an external watchdog: its mtime moves once per cycle.
#[derive(Clone, Debug)]
pub struct HealthFile {
    path: PathBuf,
}

impl HealthFile {
    /// Create (or truncate) the file.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, RelayError> {
        let health = Self { path: path.into() };
        File::create(&health.path).map_err(|source| health.error(source))?;
        Ok(health)
    }

    pub fn touch(&self) -> Result<(), RelayError> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| self.error(source))?;
        file.set_modified(SystemTime::now())
            .map_err(|source| self.error(source))
    }

    fn error(&self, source: io::Error) -> RelayError {
        RelayError::Health { path: self.path.clone(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("alarm_relay_store_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn cache_is_valid_only_with_marker() {
        let cache = CacheFile::new(scratch("marker/history.cache"));
        cache.invalidate().unwrap();
        assert_eq!(cache.read_valid(), None);

        cache.write("<html>login please</html>").unwrap();
        assert_eq!(cache.read_valid(), None);

        let page = format!("<html>{READY_MARKER}<table></table></html>");
        cache.write(&page).unwrap();
        assert_eq!(cache.read_valid().as_deref(), Some(page.as_str()));

        cache.invalidate().unwrap();
        assert_eq!(cache.read_valid(), None);
        // Twice is fine
        cache.invalidate().unwrap();
    }

    #[test]
    fn health_touch_moves_mtime_forward() {
        let path = scratch("health/alive");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let health = HealthFile::create(&path).unwrap();

        let old = SystemTime::now() - Duration::from_secs(3600);
        File::options().write(true).open(&path).unwrap().set_modified(old).unwrap();

        health.touch().unwrap();
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(mtime > old + Duration::from_secs(1800));
    }
}
