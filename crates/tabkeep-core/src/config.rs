//! TabKeep configuration

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "TABKEEP_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Default directory for exported backups
    pub export_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let export_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("exports"));

        Self {
            database_path: data_dir.join("tabkeep.db"),
            export_dir,
        }
    }

    pub fn data_dir() -> PathBuf {
        resolve_data_dir(std::env::var_os(DATA_DIR_ENV), dirs::data_local_dir())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

/// A non-empty override wins, then the platform data directory
fn resolve_data_dir(env_override: Option<OsString>, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    platform_dir
        .map(|d| d.join("TabKeep"))
        .unwrap_or_else(|| PathBuf::from(".tabkeep"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = Config::new(PathBuf::from("/tmp/tabkeep-test"));
        assert_eq!(
            config.database_path,
            PathBuf::from("/tmp/tabkeep-test/tabkeep.db")
        );
    }

    #[test]
    fn test_config_serializes() {
        let config = Config::new(PathBuf::from("/data"));
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_data_dir_resolution() {
        let platform = Some(PathBuf::from("/home/user/.local/share"));

        assert_eq!(
            resolve_data_dir(Some(OsString::from("/srv/tabkeep")), platform.clone()),
            PathBuf::from("/srv/tabkeep")
        );
        assert_eq!(
            resolve_data_dir(Some(OsString::new()), platform.clone()),
            PathBuf::from("/home/user/.local/share/TabKeep")
        );
        assert_eq!(
            resolve_data_dir(None, platform),
            PathBuf::from("/home/user/.local/share/TabKeep")
        );
        assert_eq!(resolve_data_dir(None, None), PathBuf::from(".tabkeep"));
    }

    #[test]
    fn test_platform_data_dir_is_absolute() {
        if let Some(dir) = dirs::data_local_dir() {
            assert!(dir.is_absolute());
            assert!(resolve_data_dir(None, Some(dir)).is_absolute());
        }
    }
}
