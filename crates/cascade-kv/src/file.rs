//! File-based key-value store.
//!
//! [`FileKv`] stores each bucket as a subdirectory and each entry as a
//! single file holding the raw value bytes.
//!
//! On construction, [`FileKv`] validates a `VERSION` file in the store
//! root. If the version mismatches or is missing, the entire directory is
//! wiped and recreated, so caches written by an older release are never
//! served.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Kv, KvBucket};

/// File-based [`Kv`] store rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the store version string
/// +-- sitemap/           # bucket "sitemap"
/// |   +-- sitemap_index  # entry
/// +-- site_tree/         # bucket "site_tree"
///     +-- ...
/// ```
pub struct FileKv {
    root: PathBuf,
}

impl FileKv {
    /// Create a new file-based store at `root`, validating the version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the
    /// entire directory is removed and recreated. Errors during validation
    /// are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }
}

impl Kv for FileKv {
    fn bucket(&self, name: &str) -> Box<dyn KvBucket> {
        Box::new(FileBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileBucket {
    dir: PathBuf,
}

impl KvBucket for FileBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.dir.join(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) {
        // Silently ignore errors; persistence is best-effort and the
        // caller rebuilds on the next miss.
        if fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        let _ = fs::write(self.dir.join(key), value);
    }

    fn delete(&self, key: &str) {
        let _ = fs::remove_file(self.dir.join(key));
    }
}

/// Validate the store version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("kv store version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!("kv store version mismatch (stored={stored}, current={version}), wiping");
        }
        Err(_) => {
            tracing::info!("no kv store VERSION file found, initializing");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove kv store directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create kv store directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write kv store VERSION file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let kv = FileKv::new(tmp.path().join("kv"), "v1");
        let bucket = kv.bucket("sitemap");

        bucket.set("sitemap_index", b"{\"post\":3}");
        assert_eq!(bucket.get("sitemap_index"), Some(b"{\"post\":3}".to_vec()));
    }

    #[test]
    fn test_get_missing_key() {
        let tmp = TempDir::new().unwrap();
        let kv = FileKv::new(tmp.path().join("kv"), "v1");
        let bucket = kv.bucket("sitemap");

        assert_eq!(bucket.get("missing"), None);
    }

    #[test]
    fn test_delete() {
        let tmp = TempDir::new().unwrap();
        let kv = FileKv::new(tmp.path().join("kv"), "v1");
        let bucket = kv.bucket("sitemap");

        bucket.set("key", b"data");
        bucket.delete("key");
        assert_eq!(bucket.get("key"), None);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let kv = FileKv::new(tmp.path().join("kv"), "v1");

        let sitemap = kv.bucket("sitemap");
        let newsmap = kv.bucket("newsmap");

        sitemap.set("key", b"sitemap-data");
        newsmap.set("key", b"newsmap-data");

        assert_eq!(sitemap.get("key"), Some(b"sitemap-data".to_vec()));
        assert_eq!(newsmap.get("key"), Some(b"newsmap-data".to_vec()));
    }

    #[test]
    fn test_binary_value() {
        let tmp = TempDir::new().unwrap();
        let kv = FileKv::new(tmp.path().join("kv"), "v1");
        let bucket = kv.bucket("sitemap");

        let binary: Vec<u8> = vec![0x00, 0x01, 0x0A, 0x0D, 0xFF, 0xFE, 0x80, 0x7F];
        bucket.set("binary", &binary);
        assert_eq!(bucket.get("binary"), Some(binary));
    }

    #[test]
    fn test_version_match_keeps_data() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("kv");

        let kv = FileKv::new(root.clone(), "v1");
        kv.bucket("sitemap").set("key", b"preserved");

        let kv2 = FileKv::new(root, "v1");
        assert_eq!(kv2.bucket("sitemap").get("key"), Some(b"preserved".to_vec()));
    }

    #[test]
    fn test_version_mismatch_wipes_data() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("kv");

        let kv = FileKv::new(root.clone(), "v1");
        kv.bucket("sitemap").set("key", b"will-be-wiped");

        let kv2 = FileKv::new(root.clone(), "v2");
        assert_eq!(kv2.bucket("sitemap").get("key"), None);

        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v2");
    }

    #[test]
    fn test_missing_version_file_wipes_data() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("kv");

        fs::create_dir_all(root.join("sitemap")).unwrap();
        fs::write(root.join("sitemap/orphan"), b"stale data").unwrap();

        let kv = FileKv::new(root.clone(), "v1");
        assert_eq!(kv.bucket("sitemap").get("orphan"), None);

        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v1");
    }

    #[test]
    fn test_nonexistent_root_creates_version() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/kv");

        assert!(!root.exists());

        let _kv = FileKv::new(root.clone(), "v1");

        assert!(root.exists());
        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v1");
    }
}
