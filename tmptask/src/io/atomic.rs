//! Atomic file replacement shared by the writers in this crate.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Sibling path used while writing: `.<name>.partial` next to `path`.
pub fn partial_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("write target has no file name {}", path.display()))?;
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".partial");
    Ok(path.with_file_name(tmp_name))
}

/// Write `contents` to a sibling partial file, then rename it over `path`.
///
/// The partial file is removed if either step fails. Missing parent
/// directories are not created.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = partial_path(path)?;
    if let Err(err) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("write temp file {}", tmp_path.display()));
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("replace {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_sits_next_to_target() {
        let partial = partial_path(Path::new("/tmp/out.txt")).expect("partial");
        assert_eq!(partial, Path::new("/tmp/.out.txt.partial"));
    }

    #[test]
    fn replaces_existing_contents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out.txt");
        fs::write(&path, "old").expect("seed");

        write_atomic(&path, "new").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
        assert!(!partial_path(&path).expect("partial").exists());
    }

    #[test]
    fn failed_rename_leaves_no_partial_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("occupied");
        fs::create_dir(&path).expect("dir at target");
        fs::write(path.join("inside"), "x").expect("fill dir");

        let err = write_atomic(&path, "contents").expect_err("rename onto dir");

        assert!(format!("{err:#}").contains("replace"));
        assert!(!partial_path(&path).expect("partial").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("missing").join("out.txt");

        let err = write_atomic(&path, "contents").expect_err("no parent");

        assert!(format!("{err:#}").contains("write temp file"));
        assert!(!partial_path(&path).expect("partial").exists());
    }
}
