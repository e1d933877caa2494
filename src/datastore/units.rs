//! Unit store enumeration
//!
//! Locates the versioned directory of an index store and lists the unit
//! files inside it.

use crate::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const UNITS_DIR: &str = "units";
pub const RECORDS_DIR: &str = "records";

fn re_unit_filename() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // <output-file>-<HASH>, e.g. `regexec.o-IYZYYYBU8KQO`
    RE.get_or_init(|| Regex::new(r"^[^./\\][^/\\]*-[0-9A-Z]+$").unwrap())
}

fn re_version_dir() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v(\d+)$").unwrap())
}

/// Whether `name` looks like a unit file written by the compiler.
///
/// Hidden files, editor droppings and anything without a `-<HASH>` suffix
/// are rejected.
pub fn is_unit_filename(name: &str) -> bool {
    re_unit_filename().is_match(name)
}

/// A located index store: its root and the versioned directory in use
#[derive(Debug, Clone)]
pub struct UnitStore {
    root: PathBuf,
    version_dir: PathBuf,
}

impl UnitStore {
    /// Locate the store under `root`.
    ///
    /// Picks the highest `v<N>` directory that contains `units/`; a root that
    /// holds `units/` directly is accepted as an unversioned store.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::StoreNotFound { path: root.to_path_buf() });
        }

        let mut best: Option<(u32, PathBuf)> = None;
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(caps) = re_version_dir().captures(name) else { continue };
            let Ok(version) = caps[1].parse::<u32>() else { continue };

            let dir = entry.path();
            if !dir.join(UNITS_DIR).is_dir() {
                continue;
            }
            if best.as_ref().map_or(true, |(v, _)| version > *v) {
                best = Some((version, dir));
            }
        }

        let version_dir = match best {
            Some((version, dir)) => {
                tracing::debug!("Using index store version v{} at {}", version, dir.display());
                dir
            }
            None if root.join(UNITS_DIR).is_dir() => root.to_path_buf(),
            None => return Err(Error::StoreNotFound { path: root.join(UNITS_DIR) }),
        };

        Ok(Self {
            root: root.to_path_buf(),
            version_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_dir(&self) -> &Path {
        &self.version_dir
    }

    pub fn units_dir(&self) -> PathBuf {
        self.version_dir.join(UNITS_DIR)
    }

    pub fn records_dir(&self) -> PathBuf {
        self.version_dir.join(RECORDS_DIR)
    }

    /// List well-formed unit filenames, sorted by name.
    pub fn list_units(&self) -> Result<Vec<String>> {
        let units_dir = self.units_dir();
        if !units_dir.is_dir() {
            return Err(Error::StoreNotFound { path: units_dir });
        }

        let mut units = Vec::new();
        for entry in std::fs::read_dir(&units_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str() {
                Some(name) if is_unit_filename(name) => units.push(name.to_string()),
                Some(name) => tracing::debug!("Skipping malformed unit filename: {}", name),
                None => tracing::debug!("Skipping non UTF-8 unit filename: {:?}", name),
            }
        }
        units.sort();
        Ok(units)
    }
}
