//! Path canonicalization and comparison.
//!
//! Every path that crosses a component boundary (cache keys, compile
//! database lookups, report output) must first pass through [`canonical`].

use std::path::{Component, Path, PathBuf};

/// Lexical normalization: collapses `.`, resolves `..` against preceding
/// components, and removes duplicate separators. Never touches the file
/// system, so it works for paths that don't exist yet.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// If `path` exists, its canonical (symlink-resolved, absolute) form.
/// Otherwise a lexical absolutization relative to the current directory.
pub fn canonical(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    normalize(&absolute)
}

/// True iff `a` and `b` refer to the same file after canonicalization.
pub fn same_file(a: &Path, b: &Path) -> bool {
    canonical(a) == canonical(b)
}

pub fn relative(from: &Path, to: &Path) -> Option<PathBuf> {
    let from = canonical(from);
    let to = canonical(to);
    pathdiff::diff_paths(&to, &from)
}

pub fn is_absolute(path: &Path) -> bool {
    path.is_absolute()
}

pub fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

pub fn directory(path: &Path) -> Option<PathBuf> {
    path.parent().map(|p| p.to_path_buf())
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dot_and_dotdot() {
        let p = PathBuf::from("/a/./b/../c");
        assert_eq!(normalize(&p), PathBuf::from("/a/c"));
    }

    #[test]
    fn normalize_keeps_leading_parent_dirs() {
        let p = PathBuf::from("../a/../../b");
        assert_eq!(normalize(&p), PathBuf::from("../../b"));
    }

    #[test]
    fn canonical_of_nonexistent_path_is_lexically_absolute() {
        let p = PathBuf::from("does/not/exist/at/all.cpp");
        let c = canonical(&p);
        assert!(c.is_absolute());
        assert!(c.ends_with("does/not/exist/at/all.cpp"));
    }

    #[test]
    fn same_file_true_for_identical_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.cpp");
        std::fs::write(&file, "").unwrap();
        assert!(same_file(&file, &file));
    }

    #[test]
    fn file_name_extracts_basename() {
        assert_eq!(
            file_name(Path::new("/a/b/c.cpp")),
            Some("c.cpp".to_string())
        );
    }
}
