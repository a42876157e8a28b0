//! Path resolution against the permitted root directories
//!
//! Every caller-supplied file reference goes through [`resolve`] before any
//! I/O. Containment is decided on canonical paths, component by component,
//! so `/var/logs-archive/x` is never treated as inside `/var/logs`.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::core::error::PathError;

/// Conventional root used when nothing is configured
pub const DEFAULT_ROOT: &str = "./logs";

/// Ordered, non-empty set of permitted root directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSet {
    roots: Vec<PathBuf>,
}

impl RootSet {
    /// Build a root set. Relative entries are anchored at the current
    /// working directory; an empty list falls back to [`DEFAULT_ROOT`].
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let cwd = std::env::current_dir().ok();
        let mut roots: Vec<PathBuf> = dirs
            .into_iter()
            .map(Into::into)
            .filter(|p: &PathBuf| !p.as_os_str().is_empty())
            .map(|p| anchor(p, cwd.as_deref()))
            .collect();

        if roots.is_empty() {
            roots.push(anchor(PathBuf::from(DEFAULT_ROOT), cwd.as_deref()));
        }

        Self { roots }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }
}

impl Default for RootSet {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

fn anchor(path: PathBuf, cwd: Option<&Path>) -> PathBuf {
    let path = normalize_lexically(&path);
    match cwd {
        Some(cwd) if path.is_relative() => normalize_lexically(&cwd.join(path)),
        _ => path,
    }
}

/// A canonical file path proven to live under one of the roots.
///
/// Only [`resolve`] can build one, so holding a `ResolvedPath` means the
/// containment check already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    root: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Canonical root the file was found under
    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to its root, '/'-separated
    pub fn relative(&self) -> String {
        make_relative(&self.path, &self.root).unwrap_or_else(|| normalize_path(&self.path))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(path: PathBuf, root: PathBuf) -> Self {
        Self { path, root }
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Resolve a caller-supplied reference to a file inside `roots`.
pub fn resolve(reference: &str, roots: &RootSet) -> Result<ResolvedPath, PathError> {
    if reference.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let normalized = normalize_lexically(Path::new(reference));
    let canonical_roots = canonical_roots(roots);

    if normalized.is_absolute() {
        let canonical = normalized
            .canonicalize()
            .map_err(|_| PathError::NotFound {
                reference: reference.to_string(),
            })?;

        return match canonical_roots
            .iter()
            .flatten()
            .find(|root| is_within(&canonical, root))
        {
            Some(root) => finish(reference, canonical, root.clone()),
            None => {
                debug!(reference, "absolute reference is outside every root");
                Err(PathError::OutsideRoots {
                    reference: reference.to_string(),
                })
            }
        };
    }

    let mut escaped = false;
    let mut not_a_file = false;
    for (root, canonical_root) in roots.iter().zip(canonical_roots) {
        let candidate = root.join(&normalized);
        if !candidate.exists() {
            continue;
        }

        let Some(canonical_root) = canonical_root else {
            continue;
        };
        let Ok(canonical) = candidate.canonicalize() else {
            continue;
        };

        if is_within(&canonical, &canonical_root) {
            if canonical.is_file() {
                return finish(reference, canonical, canonical_root);
            }
            debug!(reference, root = %root.display(), "candidate is not a file");
            not_a_file = true;
            continue;
        }

        debug!(
            reference,
            root = %root.display(),
            "candidate escapes its root"
        );
        escaped = true;
    }

    if not_a_file {
        Err(PathError::NotAFile {
            reference: reference.to_string(),
        })
    } else if escaped {
        Err(PathError::OutsideRoots {
            reference: reference.to_string(),
        })
    } else {
        Err(PathError::NotFound {
            reference: reference.to_string(),
        })
    }
}

fn finish(reference: &str, canonical: PathBuf, root: PathBuf) -> Result<ResolvedPath, PathError> {
    if !canonical.is_file() {
        return Err(PathError::NotAFile {
            reference: reference.to_string(),
        });
    }
    debug!(reference, path = %canonical.display(), "resolved file reference");
    Ok(ResolvedPath {
        path: canonical,
        root,
    })
}

/// Canonical roots aligned index-for-index with `roots`; `None` for roots
/// that do not exist.
fn canonical_roots(roots: &RootSet) -> Vec<Option<PathBuf>> {
    roots
        .iter()
        .map(|root| match root.canonicalize() {
            Ok(canonical) => Some(canonical),
            Err(e) => {
                debug!(root = %root.display(), error = %e, "skipping unusable root");
                None
            }
        })
        .collect()
}

/// Component-wise containment test on canonical paths.
///
/// True when `path` equals `root` or sits below it; a sibling sharing a
/// textual prefix (`/var/logs-archive` vs `/var/logs`) is not contained.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` above the start of a relative path is kept, so the result may still
/// point outside its base; this is not a security boundary.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}
