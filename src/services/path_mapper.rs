//! Source-to-backup path mapping.
//!
//! All paths handled by the walker pass through [`normalize`] so that
//! comparisons, skip-registry keys, and recorded log entries share one
//! canonical form: forward slashes, no duplicate separators, no `.`
//! segments, `..` resolved lexically, no trailing separator.

use crate::error::{BackupError, Result};
use crate::models::BackupConfig;
use camino::{Utf8Path, Utf8PathBuf};

/// Canonicalize a path string.
///
/// Backslashes become forward slashes, repeated separators collapse, `.`
/// segments disappear and `..` pops the previous segment (never above an
/// absolute root). An empty result becomes `.`. The function is idempotent.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");

    let (prefix, rest) = split_drive(&unified);
    let absolute = rest.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let mut out = String::with_capacity(unified.len());
    out.push_str(prefix);
    if absolute {
        out.push('/');
    }
    out.push_str(&parts.join("/"));

    if out.is_empty() { ".".to_string() } else { out }
}

/// Split a leading Windows drive (`C:`) off a slash-normalized path.
fn split_drive(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        path.split_at(2)
    } else {
        ("", path)
    }
}

/// Join an entry name onto a normalized directory with a forward slash.
///
/// The name is taken verbatim: on Unix a backslash is an ordinary file name
/// character and must not be rewritten into a separator.
pub fn join(dir: &Utf8Path, name: &str) -> Utf8PathBuf {
    if dir.as_str().ends_with('/') {
        Utf8PathBuf::from(format!("{}{}", dir, name))
    } else {
        Utf8PathBuf::from(format!("{}/{}", dir, name))
    }
}

/// Strip `root` from `path` on a segment boundary. Both must be normalized.
fn strip_root<'a>(root: &str, path: &'a str) -> Option<&'a str> {
    if root == "." {
        let escapes = path == ".." || path.starts_with("../");
        let rooted = path.starts_with('/') || !split_drive(path).0.is_empty();
        return match path {
            "." => Some(""),
            _ if escapes || rooted => None,
            _ => Some(path),
        };
    }
    if path == root {
        return Some("");
    }
    let rest = path.strip_prefix(root)?;
    if root.ends_with('/') {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// Maps paths under the source root onto the backup root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    source_root: Utf8PathBuf,
    backup_root: Utf8PathBuf,
}

impl PathMapper {
    pub fn new(source_root: impl AsRef<Utf8Path>, backup_root: impl AsRef<Utf8Path>) -> Self {
        Self {
            source_root: Utf8PathBuf::from(normalize(source_root.as_ref().as_str())),
            backup_root: Utf8PathBuf::from(normalize(backup_root.as_ref().as_str())),
        }
    }

    pub fn from_config(config: &BackupConfig) -> Self {
        Self::new(config.source_root(), config.backup_root())
    }

    pub fn source_root(&self) -> &Utf8Path {
        &self.source_root
    }

    pub fn backup_root(&self) -> &Utf8Path {
        &self.backup_root
    }

    /// Compute the backup-side path of `source_path`.
    ///
    /// The source root maps to the backup root itself. Paths that do not lie
    /// under the source root once normalized (including ones that escape it
    /// through `..`) are rejected, so the result always stays inside the
    /// backup root.
    pub fn to_backup_path(&self, source_path: &Utf8Path) -> Result<Utf8PathBuf> {
        let normalized = normalize(source_path.as_str());
        let remainder = strip_root(self.source_root.as_str(), &normalized).ok_or_else(|| {
            BackupError::OutsideSourceRoot {
                path: Utf8PathBuf::from(&normalized),
                root: self.source_root.clone(),
            }
        })?;

        let remainder = remainder.trim_start_matches('/');
        if remainder.is_empty() {
            return Ok(self.backup_root.clone());
        }
        Ok(join(&self.backup_root, remainder))
    }

    /// True if `path` is the backup root (after normalization).
    pub fn is_backup_root(&self, path: &Utf8Path) -> bool {
        normalize(path.as_str()) == self.backup_root.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize("C:\\data\\src"), "C:/data/src");
        assert_eq!(normalize("/data//src///a"), "/data/src/a");
        assert_eq!(normalize("/data/src/"), "/data/src");
    }

    #[test]
    fn test_normalize_dot_segments() {
        assert_eq!(normalize("/data/./src/../backup"), "/data/backup");
        assert_eq!(normalize("./a/b"), "a/b");
        assert_eq!(normalize("../a"), "../a");
        assert_eq!(normalize("a/../../b"), "../b");
        assert_eq!(normalize("/../a"), "/a");
    }

    #[test]
    fn test_normalize_empty_and_roots() {
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("."), ".");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("C:\\"), "C:/");
    }

    #[test]
    fn test_normalize_idempotent_on_samples() {
        for p in ["C:\\x\\..\\y\\", "//a//b/", "../../x/./y", "", "/"] {
            let once = normalize(p);
            assert_eq!(normalize(&once), once, "input {:?}", p);
        }
    }

    #[test]
    fn test_to_backup_path_basic() {
        let mapper = PathMapper::new("/data/src", "/mnt/backup");
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("/data/src/a/b.txt")).unwrap(),
            "/mnt/backup/a/b.txt"
        );
    }

    #[test]
    fn test_to_backup_path_of_root_is_backup_root() {
        let mapper = PathMapper::new("/data/src/", "/mnt/backup");
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("/data/src")).unwrap(),
            "/mnt/backup"
        );
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("/data//src/")).unwrap(),
            "/mnt/backup"
        );
    }

    #[test]
    fn test_to_backup_path_windows_style() {
        let mapper = PathMapper::new("D:\\work", "E:\\backup");
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("D:\\work\\proj\\main.py")).unwrap(),
            "E:/backup/proj/main.py"
        );
    }

    #[test]
    fn test_to_backup_path_requires_segment_boundary() {
        let mapper = PathMapper::new("/data/src", "/mnt/backup");
        assert!(matches!(
            mapper.to_backup_path(Utf8Path::new("/data/src2/a")),
            Err(BackupError::OutsideSourceRoot { .. })
        ));
    }

    #[test]
    fn test_to_backup_path_rejects_traversal() {
        let mapper = PathMapper::new("/data/src", "/mnt/backup");
        assert!(
            mapper
                .to_backup_path(Utf8Path::new("/data/src/../../etc/passwd"))
                .is_err()
        );
        // Traversal that stays inside the root is fine
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("/data/src/a/../b")).unwrap(),
            "/mnt/backup/b"
        );
    }

    #[test]
    fn test_to_backup_path_relative_roots() {
        let mapper = PathMapper::new(".", "../backup");
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("./a/b")).unwrap(),
            "../backup/a/b"
        );
        assert_eq!(mapper.to_backup_path(Utf8Path::new(".")).unwrap(), "../backup");
        assert!(mapper.to_backup_path(Utf8Path::new("../x")).is_err());
    }

    #[test]
    fn test_filesystem_root_as_source() {
        let mapper = PathMapper::new("/", "/backup");
        assert_eq!(
            mapper.to_backup_path(Utf8Path::new("/home/u")).unwrap(),
            "/backup/home/u"
        );
    }

    #[test]
    fn test_is_backup_root() {
        let mapper = PathMapper::new("/data", "/data/backup");
        assert!(mapper.is_backup_root(Utf8Path::new("/data/backup/")));
        assert!(mapper.is_backup_root(Utf8Path::new("/data/./backup")));
        assert!(!mapper.is_backup_root(Utf8Path::new("/data/backup/x")));
    }

    #[test]
    fn test_join() {
        assert_eq!(join(Utf8Path::new("/a/b"), "c.txt"), "/a/b/c.txt");
        assert_eq!(join(Utf8Path::new("/"), "c.txt"), "/c.txt");
        assert_eq!(join(Utf8Path::new("/a"), "x\\y.txt").as_str(), "/a/x\\y.txt");
    }
}
