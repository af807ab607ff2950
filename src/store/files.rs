//! On-disk layout of an idea folder.
//!
//! ```text
//! <root>/<idea_id>/
//!   metadata.yaml
//!   v1.yaml, v2.yaml, ...
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{IdeaError, Result};
use crate::models::VersionNumber;

pub const METADATA_FILE: &str = "metadata.yaml";
const VERSION_EXT: &str = ".yaml";

pub fn version_file_name(version: VersionNumber) -> String {
    format!("v{version}{VERSION_EXT}")
}

/// `v12.yaml` -> `Some(12)`. Anything else, including `v0.yaml` and
/// zero-padded names like `v01.yaml`, is ignored so each number has one file.
pub fn parse_version_file_name(name: &str) -> Option<VersionNumber> {
    let digits = name.strip_prefix('v')?.strip_suffix(VERSION_EXT)?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Replace `path` with `contents` through a sibling temp file and a rename,
/// so readers see either the old record or the new one.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| IdeaError::io(path, std::io::ErrorKind::InvalidInput.into()))?;
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| IdeaError::io(dir, e))?;
    temp.write_all(contents.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| IdeaError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| IdeaError::io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote record");
    Ok(())
}

pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| IdeaError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_file_names() {
        assert_eq!(version_file_name(7), "v7.yaml");
        assert_eq!(parse_version_file_name("v7.yaml"), Some(7));
        assert_eq!(parse_version_file_name("v12.yaml"), Some(12));
        assert_eq!(parse_version_file_name("v10.yaml"), Some(10));
    }

    #[test]
    fn test_ignores_unrelated_files() {
        for name in [
            "metadata.yaml",
            "v.yaml",
            "v0.yaml",
            "v01.yaml",
            "v007.yaml",
            "v1.yml",
            "v-1.yaml",
            "v1a.yaml",
            "x1.yaml",
        ] {
            assert_eq!(parse_version_file_name(name), None, "{name}");
        }
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE);
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(read(&path).unwrap(), "second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
