use crate::domain::{config::GatewayConfig, error::{GwError, GwResult}};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "gwconsole";
const PROJECT_DIR: &str = ".gwconsole";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
#[derive(Debug)]
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Locate the user and project configuration files
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// Load configuration: project file if found, else user file, else defaults
    pub fn load_config(&self) -> GwResult<GatewayConfig> {
        let candidates = [self.project_config_path.as_ref(), self.global_config_path.as_ref()];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                debug!("Loading configuration from {}", path.display());
                return self.load_config_from_path(path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(GatewayConfig::default())
    }

    /// User configuration path, `~/.config/gwconsole/config.toml`
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join(APP_DIR).join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> GwResult<GatewayConfig> {
        let content = fs::read_to_string(path).map_err(|e| GwError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| GwError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &GatewayConfig) -> GwResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| GwError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| GwError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default project configuration under `dir/.gwconsole/`
    pub fn init_project_config(&self, dir: &Path) -> GwResult<PathBuf> {
        let config_dir = dir.join(PROJECT_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(GwError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| GwError::Config {
            message: format!("Failed to create {} directory: {}", PROJECT_DIR, e),
        })?;

        self.save_config_to_path(&config_file, &GatewayConfig::default())?;
        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the user config path (if the home directory is known)
    pub fn get_global_config_path_ref(&self) -> Option<&PathBuf> {
        self.global_config_path.as_ref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::TransportKind;
    use tempfile::TempDir;

    #[test]
    fn test_init_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::new();

        let written = manager.init_project_config(temp_dir.path()).unwrap();

        let config_file = temp_dir.path().join(".gwconsole").join("config.toml");
        assert_eq!(written, config_file);
        let config = manager.load_config_from_path(&config_file).unwrap();
        assert_eq!(config.credentials.username, "root");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::new();

        manager.init_project_config(temp_dir.path()).unwrap();
        assert!(manager.init_project_config(temp_dir.path()).is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gw.toml");
        fs::write(&path, "[connection]\nkind = \"telnet\"\n[timing]\nmax_retries = 5\n").unwrap();

        let config = ConfigManager::new().load_config_from_path(&path).unwrap();
        assert_eq!(config.connection.kind, TransportKind::Telnet);
        assert_eq!(config.timing.max_retries, 5);
        assert_eq!(config.timing.read_timeout_ms, 5000);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "[connection\nkind=").unwrap();

        let result = ConfigManager::new().load_config_from_path(&path);
        assert!(matches!(result, Err(GwError::Config { .. })));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigManager::new().load_config_from_path(&temp_dir.path().join("none.toml"));
        assert!(result.is_err());
    }
}
