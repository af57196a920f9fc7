//! Optional user configuration read from `<home>/config.toml`.
//!
//! Environment variables take precedence over anything set here.

use anyhow::Context as _;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub catalog: Option<CatalogCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogCfg {
    /// Directory holding agent definition files; `~/` is expanded.
    pub agents_dir: Option<String>,
    /// Definition file suffix, e.g. `.md`.
    pub extension: Option<String>,
}

pub fn load_user_config(home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("read {}", path.display()))?;
    let cfg = parse_user_config(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(cfg))
}

pub fn parse_user_config(s: &str) -> anyhow::Result<UserConfig> {
    Ok(toml::from_str(s)?)
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Default agents directory: `$HOME/.claude/agents`.
pub fn default_agents_dir() -> PathBuf {
    expand_home("~/.claude/agents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_logging_and_catalog_sections() {
        let cfg = parse_user_config(
            r#"
[logging]
level = "debug"
json = true

[catalog]
agents_dir = "/srv/agents"
extension = ".agent.md"
"#,
        )
        .expect("parse ok");
        let logging = cfg.logging.expect("logging");
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.json, Some(true));
        assert_eq!(logging.to_file, None);
        let catalog = cfg.catalog.expect("catalog");
        assert_eq!(catalog.agents_dir.as_deref(), Some("/srv/agents"));
        assert_eq!(catalog.extension.as_deref(), Some(".agent.md"));
    }

    #[test]
    fn missing_config_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_user_config(dir.path()).expect("ok").is_none());
    }

    #[test]
    fn invalid_config_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.toml"), "logging = [").expect("write");
        assert!(load_user_config(dir.path()).is_err());
    }

    #[test]
    fn absolute_paths_are_not_expanded() {
        assert_eq!(expand_home("/etc/agents"), PathBuf::from("/etc/agents"));
    }
}
