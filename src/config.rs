//! Run configuration - optional `indexdump.toml` merged with CLI flags

use crate::path::CaseSensitivity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DumpConfig {
    pub output_db: Option<PathBuf>,
    pub index_datastore_path: Option<PathBuf>,
    pub project_path: Option<PathBuf>,
    pub case_insensitive_paths: Option<bool>,
    pub exclude_system: Option<bool>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one export run
#[derive(Debug, Clone, PartialEq)]
pub struct DumpSettings {
    pub output_db: PathBuf,
    pub index_datastore_path: PathBuf,
    pub project_path: PathBuf,
    pub case: CaseSensitivity,
    pub exclude_system: bool,
    pub timeout: Option<Duration>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("indexdump.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DumpConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DumpConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

impl DumpConfig {
    /// Layer `overrides` on top of `self`; set values in `overrides` win
    pub fn merge(self, overrides: DumpConfig) -> DumpConfig {
        DumpConfig {
            output_db: overrides.output_db.or(self.output_db),
            index_datastore_path: overrides.index_datastore_path.or(self.index_datastore_path),
            project_path: overrides.project_path.or(self.project_path),
            case_insensitive_paths: overrides.case_insensitive_paths.or(self.case_insensitive_paths),
            exclude_system: overrides.exclude_system.or(self.exclude_system),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Check that every required path is present.
    ///
    /// A relative project path is made absolute against the current directory.
    pub fn resolve(self) -> anyhow::Result<DumpSettings> {
        let Some(output_db) = self.output_db else {
            anyhow::bail!("missing --output-db (or output_db in the config file)");
        };
        let Some(index_datastore_path) = self.index_datastore_path else {
            anyhow::bail!("missing --index-datastore-path (or index_datastore_path in the config file)");
        };
        let Some(project_path) = self.project_path else {
            anyhow::bail!("missing --project-path (or project_path in the config file)");
        };

        let project_path = if project_path.is_absolute() {
            project_path
        } else {
            std::path::absolute(&project_path)?
        };

        let case = if self.case_insensitive_paths.unwrap_or(false) {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        };

        Ok(DumpSettings {
            output_db,
            index_datastore_path,
            project_path,
            case,
            exclude_system: self.exclude_system.unwrap_or(false),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(load_config(Some(dir.path().join("absent.toml").as_path())).unwrap(), None);
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("indexdump.toml");
        std::fs::write(
            &path,
            "output_db = \"out/index.db\"\nproject_path = \"/proj\"\nexclude_system = true\ntimeout_secs = 30\n",
        )
        .unwrap();

        let config = load_config(Some(path.as_path())).unwrap().unwrap();
        assert_eq!(config.output_db, Some(PathBuf::from("out/index.db")));
        assert_eq!(config.project_path, Some(PathBuf::from("/proj")));
        assert_eq!(config.exclude_system, Some(true));
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.index_datastore_path, None);
    }

    #[test]
    fn test_flags_override_file() {
        let file = DumpConfig {
            output_db: Some("file.db".into()),
            project_path: Some("/file/proj".into()),
            timeout_secs: Some(10),
            ..Default::default()
        };
        let flags = DumpConfig {
            output_db: Some("flag.db".into()),
            index_datastore_path: Some("/store".into()),
            ..Default::default()
        };

        let settings = file.merge(flags).resolve().unwrap();
        assert_eq!(settings.output_db, PathBuf::from("flag.db"));
        assert_eq!(settings.index_datastore_path, PathBuf::from("/store"));
        assert_eq!(settings.project_path, PathBuf::from("/file/proj"));
        assert_eq!(settings.timeout, Some(Duration::from_secs(10)));
        assert_eq!(settings.case, CaseSensitivity::Sensitive);
        assert!(!settings.exclude_system);
    }

    #[test]
    fn test_missing_path_is_error() {
        let config = DumpConfig {
            output_db: Some("out.db".into()),
            project_path: Some("/proj".into()),
            ..Default::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("--index-datastore-path"));
    }

    #[test]
    fn test_relative_project_path_is_made_absolute() {
        let config = DumpConfig {
            output_db: Some("out.db".into()),
            index_datastore_path: Some("/store".into()),
            project_path: Some("proj".into()),
            case_insensitive_paths: Some(true),
            ..Default::default()
        };
        let settings = config.resolve().unwrap();
        assert!(settings.project_path.is_absolute());
        assert!(settings.project_path.ends_with("proj"));
        assert_eq!(settings.case, CaseSensitivity::Insensitive);
    }
}
