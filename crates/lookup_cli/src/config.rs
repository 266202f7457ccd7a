//! `lookup.toml` handling
//!
//! The file holds a flat [`LookupConfig`]. Command-line flags override
//! whatever the file sets.

use anyhow::{Context, Result};
use lookup_core::LookupConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "lookup.toml";

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: LookupConfig) -> LookupConfig {
        if let Some(endpoint) = self.endpoint {
            config.endpoint_url = endpoint;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.debounce_ms = delay_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = Some(timeout_ms);
        }
        config
    }
}

/// Load the configuration and apply flag overrides
///
/// An explicit `path` must exist. Without one, `lookup.toml` in `dir` is
/// used when present and the defaults otherwise.
pub fn load(path: Option<&Path>, dir: &Path, overrides: Overrides) -> Result<LookupConfig> {
    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(dir.join(CONFIG_FILE)).filter(|p| p.exists()),
    };

    let config = match file {
        Some(file) => read(&file)?,
        None => {
            tracing::debug!("no {} found, using defaults", CONFIG_FILE);
            LookupConfig::default()
        }
    };

    let config = overrides.apply(config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read(path: &Path) -> Result<LookupConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = LookupConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!("loaded {}", path.display());
    Ok(config)
}

/// Write a default `lookup.toml` into `dir`
pub fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = LookupConfig::default()
        .to_toml()
        .context("Failed to serialize config")?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lookup_cli_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = temp_dir("defaults");
        let config = load(None, &dir, Overrides::default()).unwrap();
        assert_eq!(config, LookupConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = temp_dir("override");
        fs::write(
            dir.join(CONFIG_FILE),
            "endpoint_url = \"http://localhost:8080/users\"\ndebounce_ms = 300\n",
        )
        .unwrap();

        let config = load(
            None,
            &dir,
            Overrides {
                delay_ms: Some(50),
                timeout_ms: Some(2000),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.endpoint_url, "http://localhost:8080/users");
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.timeout_ms, Some(2000));
        assert_eq!(config.no_options_text, "Add new");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = temp_dir("missing");
        let err = load(Some(&dir.join("nope.toml")), &dir, Overrides::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[test]
    fn test_file_values_are_validated_on_read() {
        let dir = temp_dir("validated");
        fs::write(dir.join(CONFIG_FILE), "timeout_ms = 0\n").unwrap();

        let err = load(None, &dir, Overrides::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
        assert!(format!("{:#}", err).contains("timeout_ms must be greater than zero"));
    }

    #[test]
    fn test_invalid_override_fails() {
        let dir = temp_dir("invalid");
        let overrides = Overrides {
            endpoint: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(load(None, &dir, overrides).is_err());
    }

    #[test]
    fn test_write_default_respects_force() {
        let dir = temp_dir("init");
        let path = write_default(&dir, false).unwrap();
        assert!(write_default(&dir, false).is_err());
        assert_eq!(write_default(&dir, true).unwrap(), path);

        let written = load(Some(&path), &dir, Overrides::default()).unwrap();
        assert_eq!(written, LookupConfig::default());
    }
}
