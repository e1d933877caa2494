//! Path normalization - project-relative paths and the in-project filter
//!
//! Occurrence paths arrive absolute. A path is "in project" when the project
//! root is a component-wise prefix of it, so `/proj` contains `/proj/a.c`
//! but not `/project/a.c`. In-project paths are stored relative to the root
//! with `/` separators regardless of platform.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// How path components are compared against the project root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    fn components_match(&self, a: &Component<'_>, b: &Component<'_>) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => {
                a.as_os_str().to_string_lossy().to_lowercase()
                    == b.as_os_str().to_string_lossy().to_lowercase()
            }
        }
    }
}

/// Resolve `.` and `..` lexically, without touching the filesystem.
fn lexical_components(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Strip `root` from an absolute `path`, returning the `/`-joined remainder.
///
/// Returns `None` when the path is relative, lies outside the root, or names
/// the root itself.
pub fn normalize(path: &str, root: &Path, case: CaseSensitivity) -> Option<String> {
    let path = Path::new(path);
    if !path.is_absolute() {
        return None;
    }

    let path_components = lexical_components(path);
    let root_components = lexical_components(root);

    if path_components.len() <= root_components.len() {
        return None;
    }

    let is_prefix = root_components
        .iter()
        .zip(path_components.iter())
        .all(|(r, p)| case.components_match(r, p));
    if !is_prefix {
        return None;
    }

    let relative: Vec<String> = path_components[root_components.len()..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(relative.join("/"))
}

/// Why a path was left out of the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    OutsideProject,
    SystemHeader,
}

/// Outcome of classifying a dependency path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathDecision {
    InProject { path: String, is_system: bool },
    Excluded(ExclusionReason),
}

impl PathDecision {
    pub fn is_excluded(&self) -> bool {
        matches!(self, PathDecision::Excluded(_))
    }
}

/// The in-project filter configured for one export run.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    case: CaseSensitivity,
    exclude_system: bool,
}

impl PathFilter {
    /// Create a filter rooted at an absolute project path
    pub fn new(root: impl Into<PathBuf>, case: CaseSensitivity) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(Error::InvalidProjectRoot(format!(
                "{} is not an absolute path",
                root.display()
            )));
        }
        Ok(Self {
            root,
            case,
            exclude_system: false,
        })
    }

    /// Drop system-header records even when they sit under the project root
    pub fn with_exclude_system(mut self, exclude_system: bool) -> Self {
        self.exclude_system = exclude_system;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Decide whether a dependency file belongs in the export
    pub fn classify(&self, path: &str, is_system: bool) -> PathDecision {
        if is_system && self.exclude_system {
            return PathDecision::Excluded(ExclusionReason::SystemHeader);
        }
        match normalize(path, &self.root, self.case) {
            Some(path) => PathDecision::InProject { path, is_system },
            None => PathDecision::Excluded(ExclusionReason::OutsideProject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(path: &str, root: &str) -> Option<String> {
        normalize(path, Path::new(root), CaseSensitivity::Sensitive)
    }

    #[test]
    fn test_strips_root() {
        assert_eq!(norm("/proj/src/a.c", "/proj").as_deref(), Some("src/a.c"));
        assert_eq!(norm("/proj/src/a.c", "/proj/").as_deref(), Some("src/a.c"));
        assert_eq!(norm("/proj/a.c", "/proj").as_deref(), Some("a.c"));
    }

    #[test]
    fn test_segment_aware_prefix() {
        assert_eq!(norm("/project/a.c", "/proj"), None);
        assert_eq!(norm("/proj2/src/a.c", "/proj"), None);
        assert_eq!(norm("/usr/include/stdio.h", "/proj"), None);
    }

    #[test]
    fn test_root_itself_and_relative_paths() {
        assert_eq!(norm("/proj", "/proj"), None);
        assert_eq!(norm("/proj/", "/proj"), None);
        assert_eq!(norm("proj/a.c", "/proj"), None);
    }

    #[test]
    fn test_dot_segments() {
        assert_eq!(norm("/proj/src/../include/a.h", "/proj").as_deref(), Some("include/a.h"));
        assert_eq!(norm("/proj/./src/a.c", "/proj").as_deref(), Some("src/a.c"));
        assert_eq!(norm("/proj/../etc/passwd", "/proj"), None);
    }

    #[test]
    fn test_case_sensitivity() {
        assert_eq!(norm("/Proj/a.c", "/proj"), None);
        assert_eq!(
            normalize("/Proj/Src/a.c", Path::new("/proj"), CaseSensitivity::Insensitive).as_deref(),
            Some("Src/a.c")
        );
    }

    #[test]
    fn test_filter_classify() {
        let filter = PathFilter::new("/proj", CaseSensitivity::Sensitive).unwrap();
        assert_eq!(
            filter.classify("/proj/src/a.c", false),
            PathDecision::InProject { path: "src/a.c".to_string(), is_system: false }
        );
        assert_eq!(
            filter.classify("/other/a.c", false),
            PathDecision::Excluded(ExclusionReason::OutsideProject)
        );
        // System headers under the root are kept unless asked otherwise
        assert!(!filter.classify("/proj/vendor/x.h", true).is_excluded());

        let strict = filter.with_exclude_system(true);
        assert_eq!(
            strict.classify("/proj/vendor/x.h", true),
            PathDecision::Excluded(ExclusionReason::SystemHeader)
        );
    }

    #[test]
    fn test_relative_root_rejected() {
        assert!(matches!(
            PathFilter::new("proj", CaseSensitivity::Sensitive),
            Err(Error::InvalidProjectRoot(_))
        ));
    }
}
