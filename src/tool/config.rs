//! JSON configuration file holding tool overrides.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Deserialize;

use super::{checked_program, Tool, ToolOverrides};

/// On-disk configuration layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Tool name to replacement program.
    #[serde(default)]
    pub tools: BTreeMap<String, String>,
}

impl Config {
    /// Parse configuration from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid configuration JSON")
    }

    /// Validate tool names and convert into overrides.
    pub fn overrides(&self) -> Result<ToolOverrides> {
        let mut overrides = ToolOverrides::new();
        for (name, program) in &self.tools {
            let tool = name
                .parse::<Tool>()
                .with_context(|| format!("invalid entry in \"tools\": {name}"))?;
            let program = checked_program(tool, program)
                .with_context(|| format!("invalid entry in \"tools\": {name}"))?;
            overrides.set(tool, program);
        }
        Ok(overrides)
    }
}

/// Load overrides from a configuration file.
pub fn load_overrides(path: &Utf8Path) -> Result<ToolOverrides> {
    let text = fs_err::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read config {path}"))?;
    let config = Config::from_json(&text).with_context(|| format!("in config {path}"))?;
    let overrides = config.overrides()?;
    tracing::debug!(config = %path, count = config.tools.len(), "loaded tool overrides");
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserInputError;

    #[test]
    fn reads_tool_table() -> Result<()> {
        let config = Config::from_json(r#"{"tools": {"gunzip": "pigz-wrapper", "7z": "7zz"}}"#)?;
        let overrides = config.overrides()?;
        assert_eq!(overrides.program(Tool::Gunzip), "pigz-wrapper");
        assert_eq!(overrides.program(Tool::SevenZip), "7zz");
        assert_eq!(overrides.program(Tool::Tar), "tar");
        Ok(())
    }

    #[test]
    fn empty_object_means_no_overrides() -> Result<()> {
        assert!(Config::from_json("{}")?.overrides()?.is_empty());
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_json(r#"{"tool": {}}"#).is_err());
    }

    #[test]
    fn empty_program_is_user_error() -> Result<()> {
        let config = Config::from_json(r#"{"tools": {"unzip": "  "}}"#)?;
        let err = config.overrides().expect_err("empty program accepted");
        assert!(err.chain().any(|cause| cause.is::<UserInputError>()));
        assert!(format!("{err:#}").contains("unzip has an empty program"));
        Ok(())
    }

    #[test]
    fn programs_are_trimmed() -> Result<()> {
        let config = Config::from_json(r#"{"tools": {"tar": " bsdtar "}}"#)?;
        assert_eq!(config.overrides()?.program(Tool::Tar), "bsdtar");
        Ok(())
    }

    #[test]
    fn unknown_tool_is_user_error() -> Result<()> {
        let config = Config::from_json(r#"{"tools": {"lha": "lha"}}"#)?;
        let err = config.overrides().expect_err("unknown tool accepted");
        assert!(err.chain().any(|cause| cause.is::<UserInputError>()));
        Ok(())
    }
}
