use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::goals::ColorAnchors;

pub const DEFAULT_CONFIG_FILE: &str = "nutri-ledger.toml";
pub const CONFIG_PATH_ENV_VAR: &str = "NUTRI_LEDGER_CONFIG";
const ENV_PREFIX: &str = "NUTRI_LEDGER";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
    pub colors: ColorAnchors,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    /// Emit JSON lines instead of compact text.
    #[serde(default)]
    pub json: bool,
}

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (NUTRI_LEDGER__STORAGE__DATA_FILE, etc.)
    /// 2. Config file: `config_path`, then $NUTRI_LEDGER_CONFIG, then ./nutri-ledger.toml
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let anchors = ColorAnchors::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("storage.data_file", "nutri-ledger.json")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("colors.base", anchors.base.to_string())?
            .set_default("colors.favorable", anchors.favorable.to_string())?
            .set_default("colors.unfavorable", anchors.unfavorable.to_string())?;

        let explicit = config_path.or_else(|| env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from));
        match explicit {
            // an explicitly named file has to exist
            Some(path) => builder = builder.add_source(File::from(path.as_path()).required(true)),
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::Rgb;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[storage]\ndata_file = \"/tmp/food.json\"\n\n[colors]\nfavorable = \"#00ff00\"\n"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(settings.storage.data_file, PathBuf::from("/tmp/food.json"));
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.colors.favorable, Rgb::new(0, 255, 0));
        assert_eq!(settings.colors.base, ColorAnchors::default().base);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[colors]\nunfavorable = \"red\"\n").unwrap();
        assert!(Settings::load(Some(file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("absent.toml"))).is_err());
    }
}
