//! Logical → physical path resolution.
//!
//! A logical path is always relative to the manager's base path. Resolution is purely lexical: it
//! never touches the filesystem, so symlinks inside the base path are the loader's business.
//!
//! - `.` segments and repeated separators are dropped
//! - `..` is folded against the preceding segment
//! - a `..` that would climb above the base path is rejected, as are absolute and empty paths

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, TmplviewError};

/// Normalize a logical path into its canonical relative form (`pages/hello.html`).
///
/// The normalized form is also the cache key, so `pages//hello.html` and `./pages/hello.html`
/// share one entry.
pub fn normalize(logical: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();

    for component in Path::new(logical).components() {
        match component {
            Component::Normal(seg) => {
                let seg = seg.to_str().ok_or_else(|| invalid(logical, "not valid UTF-8"))?;
                segments.push(seg);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(invalid(logical, "escapes the base path"));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid(logical, "must be relative to the base path"));
            }
        }
    }

    if segments.is_empty() {
        return Err(invalid(logical, "does not name a template"));
    }

    Ok(segments.join("/"))
}

/// A logical path after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Normalized logical path; the cache key.
    pub key: String,
    /// `base` joined with `key`; what the loader receives.
    pub physical: PathBuf,
}

/// Normalize a logical path and join it onto `base`.
pub fn resolve(base: &Path, logical: &str) -> Result<Resolved> {
    let key = normalize(logical)?;
    let physical = base.join(&key);
    Ok(Resolved { key, physical })
}

fn invalid(path: &str, reason: &'static str) -> TmplviewError {
    TmplviewError::InvalidPath {
        path: path.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_simple() {
        let r = resolve(Path::new("views"), "pages/hello.html").unwrap();
        assert_eq!(r.key, "pages/hello.html");
        assert_eq!(r.physical, Path::new("views").join("pages").join("hello.html"));
    }

    #[test]
    fn test_normalize_redundant_separators() {
        assert_eq!(normalize("pages//hello.html").unwrap(), "pages/hello.html");
        assert_eq!(normalize("./pages/./hello.html").unwrap(), "pages/hello.html");
        assert_eq!(normalize("pages/hello.html/").unwrap(), "pages/hello.html");
    }

    #[test]
    fn test_normalize_folds_inner_parent() {
        assert_eq!(
            normalize("pages/drafts/../hello.html").unwrap(),
            "pages/hello.html"
        );
    }

    #[test]
    fn test_traversal_rejected() {
        let err = resolve(Path::new("views"), "../secrets.txt").unwrap_err();
        assert!(matches!(err, TmplviewError::InvalidPath { .. }));

        let err = normalize("pages/../../etc/passwd").unwrap_err();
        assert!(matches!(err, TmplviewError::InvalidPath { .. }));
    }

    #[test]
    fn test_absolute_rejected() {
        let err = normalize("/etc/passwd").unwrap_err();
        assert!(matches!(err, TmplviewError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(normalize("").is_err());
        assert!(normalize(".").is_err());
        assert!(normalize("pages/..").is_err());
    }

    #[test]
    fn test_empty_base_path() {
        let r = resolve(Path::new(""), "hello.html").unwrap();
        assert_eq!(r.physical, Path::new("hello.html"));
    }
}
