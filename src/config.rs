//! Settings from `config.toml`.
//!
//! Looked up in the platform config directory (e.g.
//! `~/.config/cellsheet/config.toml`) unless a path is given explicitly.
//!
//! ```toml
//! propagation = "fan-out"
//! validate_ids = false
//! echo = true
//! ```

use anyhow::{Context, Result, bail};
use cellsheet_core::Propagation;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    propagation: Option<String>,
    validate_ids: Option<bool>,
    echo: Option<bool>,
}

/// Resolved settings; command-line flags are applied on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub propagation: Propagation,
    pub validate_ids: bool,
    pub echo: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            propagation: Propagation::default(),
            validate_ids: true,
            echo: false,
        }
    }
}

/// Load settings from `explicit`, or from the default location.
///
/// A missing default file yields the defaults; a missing explicit file is
/// an error.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.exists() => path,
            Some(_) => return Ok(Settings::default()),
            None => {
                warn!("no configuration directory available, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    let meta = std::fs::metadata(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        bail!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        );
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings =
        parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), ?settings, "loaded config");
    Ok(settings)
}

/// Parse the contents of a config file.
pub fn parse(content: &str) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(content)?;
    let defaults = Settings::default();
    let propagation = match file.propagation.as_deref() {
        Some(name) => name.parse::<Propagation>().map_err(anyhow::Error::msg)?,
        None => defaults.propagation,
    };
    Ok(Settings {
        propagation,
        validate_ids: file.validate_ids.unwrap_or(defaults.validate_ids),
        echo: file.echo.unwrap_or(defaults.echo),
    })
}

fn default_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellsheet")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_all_keys() {
        let settings = parse(
            r#"
propagation = "fan-out"
validate_ids = false
echo = true
"#,
        )
        .unwrap();
        assert_eq!(
            settings,
            Settings {
                propagation: Propagation::FanOut,
                validate_ids: false,
                echo: true,
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(parse("colour = \"red\"").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_propagation() {
        let err = parse("propagation = \"sideways\"").unwrap_err();
        assert!(err.to_string().contains("unknown propagation"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "propagation = \"topological\"\necho = true\n").unwrap();
        let settings = load(Some(&path)).unwrap();
        assert_eq!(settings.propagation, Propagation::Topological);
        assert!(settings.echo);
        assert!(settings.validate_ids);
    }
}
