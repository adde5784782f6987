use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_VERSION: u32 = 1;

/// Viewer settings persisted across sessions. The scaffold root is the one
/// the runner depends on; the rest restores the user's last selections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub version: u32,
    pub scaffold_root: Option<String>,
    pub java_display: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub selected_maps: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            scaffold_root: None,
            java_display: None,
            team_a: None,
            team_b: None,
            selected_maps: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config write failed: {}", err),
            ConfigError::Serialize(err) => write!(f, "config encode failed: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Serialize(err) => Some(err),
        }
    }
}

impl ViewerConfig {
    /// Loads from `path`, falling back to defaults for a missing, garbled,
    /// or version-mismatched file. Never an error: a fresh install and a
    /// broken file both mean "start clean".
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        let config: ViewerConfig = match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                crate::logging::warn(format!("ignoring unreadable config: {}", err));
                return Self::default();
            }
        };
        if config.version != CONFIG_VERSION {
            return Self::default();
        }
        config
    }

    pub fn load() -> Self {
        Self::load_from(&default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let data = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, data).map_err(ConfigError::Io)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&default_path())
    }

    pub fn scaffold_root_path(&self) -> Option<PathBuf> {
        self.scaffold_root.as_ref().map(PathBuf::from)
    }

    pub fn set_scaffold_root(&mut self, root: &Path) {
        self.scaffold_root = Some(root.display().to_string());
    }
}

/// Platform config file location, resolved the same way for every session.
pub fn default_path() -> PathBuf {
    if let Some(appdata) = std::env::var_os("APPDATA") {
        return PathBuf::from(appdata).join("Matchview").join("viewer.toml");
    }
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(config).join("matchview").join("viewer.toml");
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("matchview")
            .join("viewer.toml");
    }
    PathBuf::from("viewer.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        let unique = format!(
            "matchview-config-{}-{}-{}",
            name,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        );
        std::env::temp_dir().join(unique).join("viewer.toml")
    }

    #[test]
    fn config_round_trips_through_toml() {
        let path = temp_config_path("roundtrip");
        let mut config = ViewerConfig::default();
        config.set_scaffold_root(Path::new("/opt/battlecode25-scaffold"));
        config.team_a = Some("examplefuncsplayer".to_string());
        config.selected_maps = vec!["DefaultSmall".to_string()];
        config.save_to(&path).expect("save config");

        let loaded = ViewerConfig::load_from(&path);
        assert_eq!(loaded, config);
        std::fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let loaded = ViewerConfig::load_from(Path::new("/nonexistent/matchview/viewer.toml"));
        assert_eq!(loaded, ViewerConfig::default());
    }

    #[test]
    fn garbled_file_loads_defaults() {
        let path = temp_config_path("garbled");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "not = [valid").expect("write");
        let loaded = ViewerConfig::load_from(&path);
        assert_eq!(loaded, ViewerConfig::default());
        std::fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn version_mismatch_resets_to_defaults() {
        let path = temp_config_path("version");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "version = 99\nteam_a = \"stale\"\n").expect("write");
        let loaded = ViewerConfig::load_from(&path);
        assert_eq!(loaded, ViewerConfig::default());
        std::fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }
}
