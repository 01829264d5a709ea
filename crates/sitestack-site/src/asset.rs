//! Content-addressed staging of the local build directory.
//!
//! The deployment action references the build output by fingerprint, so a
//! change to any file produces a new object key and a new deployment, while an
//! unchanged tree synthesizes to an identical template.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{SiteError, SiteResult};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A file inside the staged directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetObject {
    /// `/`-separated path relative to the asset root.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// A fingerprinted build directory.
///
/// # Examples
///
/// ```
/// use sitestack_site::AssetSource;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
///
/// let asset = AssetSource::from_dir(dir.path()).unwrap();
/// assert_eq!(asset.objects().len(), 1);
/// assert_eq!(asset.fingerprint().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSource {
    path: PathBuf,
    objects: Vec<AssetObject>,
    fingerprint: String,
}

impl AssetSource {
    /// Walk `path` and fingerprint its contents.
    ///
    /// Files are visited in key order. The fingerprint is the SHA-256 of each
    /// key, a NUL byte, and the file bytes, concatenated over all files.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::AssetNotFound`] if `path` does not exist,
    /// [`SiteError::AssetNotDirectory`] if it is not a directory, and
    /// [`SiteError::Io`] if a file cannot be read.
    pub fn from_dir(path: impl AsRef<Path>) -> SiteResult<Self> {
        let root = path.as_ref();
        let metadata = match std::fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SiteError::AssetNotFound {
                    path: root.to_path_buf(),
                });
            }
            Err(e) => return Err(SiteError::io(root, e)),
        };
        if !metadata.is_dir() {
            return Err(SiteError::AssetNotDirectory {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        collect_files(root, root, &mut files)?;
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = Sha256::new();
        let mut objects = Vec::with_capacity(files.len());
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        for (key, file_path) in files {
            Digest::update(&mut hasher, key.as_bytes());
            Digest::update(&mut hasher, [0u8]);

            let mut file = File::open(&file_path).map_err(|e| SiteError::io(&file_path, e))?;
            let mut size = 0u64;
            loop {
                let n = file.read(&mut buf).map_err(|e| SiteError::io(&file_path, e))?;
                if n == 0 {
                    break;
                }
                Digest::update(&mut hasher, &buf[..n]);
                size += n as u64;
            }
            objects.push(AssetObject { key, size });
        }
        let fingerprint = hex::encode(hasher.finalize());

        if objects.is_empty() {
            tracing::warn!(path = %root.display(), "build directory is empty, deployment will clear the bucket");
        } else {
            tracing::debug!(
                path = %root.display(),
                objects = objects.len(),
                fingerprint = %fingerprint,
                "fingerprinted build directory"
            );
        }

        Ok(Self {
            path: root.to_path_buf(),
            objects,
            fingerprint,
        })
    }

    /// The staged directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files in key order.
    #[must_use]
    pub fn objects(&self) -> &[AssetObject] {
        &self.objects
    }

    /// Hex SHA-256 fingerprint of the tree; also the asset id.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Key of the archive in the asset staging bucket.
    #[must_use]
    pub fn object_key(&self) -> String {
        format!("{}.zip", self.fingerprint)
    }

    /// Total size of all files in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.objects.iter().map(|o| o.size).sum()
    }

    /// Whether the directory holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> SiteResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| SiteError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SiteError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| SiteError::io(&path, e))?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((key, path));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::fs::create_dir_all(dir.path().join("assets/js")).unwrap();
        std::fs::write(dir.path().join("assets/js/app.js"), "console.log(1)").unwrap();
        std::fs::write(dir.path().join("assets/style.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn test_should_list_objects_in_key_order() {
        let dir = site_dir();
        let asset = AssetSource::from_dir(dir.path()).unwrap();
        let keys: Vec<_> = asset.objects().iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["assets/js/app.js", "assets/style.css", "index.html"]);
        assert_eq!(asset.total_size(), 13 + 14 + 6);
        assert!(!asset.is_empty());
        assert_eq!(asset.object_key(), format!("{}.zip", asset.fingerprint()));
    }

    #[test]
    fn test_should_keep_fingerprint_stable_for_same_content() {
        let a = site_dir();
        let b = site_dir();
        assert_eq!(
            AssetSource::from_dir(a.path()).unwrap().fingerprint(),
            AssetSource::from_dir(b.path()).unwrap().fingerprint()
        );
    }

    #[test]
    fn test_should_change_fingerprint_when_file_changes() {
        let dir = site_dir();
        let before = AssetSource::from_dir(dir.path()).unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>v2</html>").unwrap();
        let after = AssetSource::from_dir(dir.path()).unwrap();
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn test_should_change_fingerprint_when_file_renamed() {
        let dir = site_dir();
        let before = AssetSource::from_dir(dir.path()).unwrap();
        std::fs::rename(dir.path().join("index.html"), dir.path().join("home.html")).unwrap();
        let after = AssetSource::from_dir(dir.path()).unwrap();
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn test_should_accept_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let asset = AssetSource::from_dir(dir.path()).unwrap();
        assert!(asset.is_empty());
        assert_eq!(asset.total_size(), 0);
    }

    #[test]
    fn test_should_reject_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("dist");
        assert!(matches!(
            AssetSource::from_dir(&missing),
            Err(SiteError::AssetNotFound { path }) if path == missing
        ));
    }

    #[test]
    fn test_should_reject_file_path() {
        let dir = site_dir();
        assert!(matches!(
            AssetSource::from_dir(dir.path().join("index.html")),
            Err(SiteError::AssetNotDirectory { .. })
        ));
    }
}
