pub mod types;

use crate::error::{ConfigError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".mesh-uninject.toml";

/// Get the global config file path (~/.mesh-uninject.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (./.mesh-uninject.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults
///
/// An explicit path must exist and parse. Otherwise the local config is
/// checked first, then the global one; a discovered file that fails to parse
/// is skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let candidates = [Some(local_config_path(Path::new("."))), global_config_path()];
    for path in candidates.into_iter().flatten() {
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => return Ok(config),
            Err(e) => warn!("Ignoring {}: {}", path.display(), e),
        }
    }

    Ok(types::Config::default())
}

/// Load and parse a single config file
pub fn load_config_file(path: &Path) -> Result<types::Config> {
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<types::Config> {
    let config = toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::OutputFormat;
    use crate::uninject::{NamingPolicy, ReportFormat};

    #[test]
    fn test_default_config() {
        let config = types::Config::default();
        assert_eq!(config.naming, NamingPolicy::default());
        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert_eq!(config.output.report, ReportFormat::Plain);
        assert!(config.output.color);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
[naming]
proxy-container-name = "envoy"

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.naming.proxy_container_name, "envoy");
        assert_eq!(config.naming.proxy_init_container_name, "linkerd-init");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.report, ReportFormat::Plain);
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = parse_config("[output]\nformat = \"xml\"\n").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: parsing failed"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uninject.toml");
        fs::write(&path, "[naming]\nprefix = \"example.io\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.naming.prefix, "example.io");
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = types::Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("proxy-container-name = \"linkerd-proxy\""));
        assert_eq!(parse_config(&rendered).unwrap(), config);
    }
}
