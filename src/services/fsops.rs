//! Filesystem primitives shared by the walker and the recorder.
//!
//! Every path handed to the OS goes through [`long_path`], which on Windows
//! turns it into an absolute `\\?\` verbatim path so deep trees are not cut
//! off by the legacy 260-character limit.

use camino::Utf8Path;
use filetime::{FileTime, set_file_times};
use std::fs;
use std::io;
use std::path::PathBuf;

/// OS path for `path`, long-path prefixed where the platform needs it.
#[cfg(windows)]
pub fn long_path(path: &Utf8Path) -> PathBuf {
    let absolute = match std::path::absolute(path.as_std_path()) {
        Ok(p) => p,
        Err(_) => return path.as_std_path().to_path_buf(),
    };
    let text = absolute.to_string_lossy().replace('/', "\\");
    if text.starts_with(r"\\?\") {
        PathBuf::from(text)
    } else if let Some(share) = text.strip_prefix(r"\\") {
        PathBuf::from(format!(r"\\?\UNC\{}", share))
    } else {
        PathBuf::from(format!(r"\\?\{}", text))
    }
}

/// OS path for `path`, long-path prefixed where the platform needs it.
#[cfg(not(windows))]
pub fn long_path(path: &Utf8Path) -> PathBuf {
    path.as_std_path().to_path_buf()
}

/// `create_dir_all` through [`long_path`].
pub fn create_dir_all_long(path: &Utf8Path) -> io::Result<()> {
    fs::create_dir_all(long_path(path))
}

/// Copy file contents and permissions, then restore access and
/// modification times on the copy. Returns the number of bytes copied.
pub fn copy_with_metadata(from: &Utf8Path, to: &Utf8Path) -> io::Result<u64> {
    let src = long_path(from);
    let dst = long_path(to);

    let bytes = fs::copy(&src, &dst)?;

    let meta = fs::metadata(&src)?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    set_file_times(&dst, atime, mtime)?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_create_dir_all_long_nested() {
        let temp = TempDir::new().unwrap();
        let deep = utf8_dir(&temp).join("a/b/c/d");
        create_dir_all_long(&deep).unwrap();
        assert!(deep.is_dir());
        // Existing directories are fine
        create_dir_all_long(&deep).unwrap();
    }

    #[test]
    fn test_copy_preserves_contents_and_mtime() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        let src = root.join("src.txt");
        let dst = root.join("dst.txt");
        fs::write(&src, b"hello backup").unwrap();

        let stamp = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, stamp).unwrap();

        let bytes = copy_with_metadata(&src, &dst).unwrap();
        assert_eq!(bytes, 12);
        assert_eq!(fs::read(&dst).unwrap(), b"hello backup");

        let copied = fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), stamp);
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        let result = copy_with_metadata(&root.join("missing"), &root.join("out"));
        assert!(result.is_err());
    }
}
