//! Handler for the `policy` command.

use crate::config::types::Config;
use crate::error::{ConfigError, Result, UninjectError};
use crate::uninject::NamingPolicy;
use serde::Serialize;

#[derive(Serialize)]
struct PolicyTable<'a> {
    naming: &'a NamingPolicy,
}

/// Render the effective naming policy as TOML or JSON
pub fn render_policy(config: &Config, json: bool) -> Result<String> {
    if json {
        let mut rendered = serde_json::to_string_pretty(&config.naming)
            .map_err(|e| UninjectError::Encode(e.to_string()))?;
        rendered.push('\n');
        return Ok(rendered);
    }

    let table = PolicyTable {
        naming: &config.naming,
    };
    let rendered =
        toml::to_string_pretty(&table).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    Ok(rendered)
}

/// Handle the `policy` command
pub fn handle_policy(config: &Config, json: bool) -> Result<()> {
    print!("{}", render_policy(config, json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_policy_toml() {
        let rendered = render_policy(&Config::default(), false).unwrap();
        assert!(rendered.starts_with("[naming]\n"));
        assert!(rendered.contains("proxy-init-container-name = \"linkerd-init\""));
        assert!(!rendered.contains("[output]"));
    }

    #[test]
    fn test_render_policy_json() {
        let rendered = render_policy(&Config::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["proxy-container-name"], "linkerd-proxy");
        assert_eq!(value["prefix"], "linkerd.io");
    }
}
