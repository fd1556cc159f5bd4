// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Immutable settings for one conversion job, resolved from CLI flags and
/// the user config before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Still-codec quality, 0-100.
    pub quality: u8,
    /// Output frame size; None keeps the source dimensions.
    pub size: Option<(u32, u32)>,
    /// 0 loops forever.
    pub loop_count: u32,
    /// Fail on delay-count / frame-count mismatch instead of truncating or
    /// padding.
    pub strict: bool,
}

/// Parse a "WxH" size argument.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("invalid size '{s}', expected WxH"))?;
    let width = w.parse().map_err(|_| format!("invalid width in '{s}'"))?;
    let height = h.parse().map_err(|_| format!("invalid height in '{s}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{s}' must be nonzero"));
    }
    Ok((width, height))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default still-codec quality for new jobs
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Default loop count (0 = infinite)
    #[serde(default)]
    pub loop_count: u32,

    /// Default overwrite setting for batch mode
    #[serde(default)]
    pub overwrite: bool,
}

fn default_quality() -> u8 {
    75
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            loop_count: 0,
            overwrite: false,
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("apng2webp").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("128x96"), Ok((128, 96)));
        assert!(parse_size("128").is_err());
        assert!(parse_size("128x").is_err());
        assert!(parse_size("0x96").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.defaults.quality, 75);
        assert_eq!(config.defaults.loop_count, 0);
        assert!(!config.defaults.overwrite);
    }

    #[test]
    fn test_config_partial_override() {
        let config: Config = toml::from_str("[defaults]\nquality = 90\n").unwrap();
        assert_eq!(config.defaults.quality, 90);
        assert_eq!(config.defaults.loop_count, 0);
    }
}
