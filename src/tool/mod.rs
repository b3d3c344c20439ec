//! External extraction tools and the dispatch table that maps formats to them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::error::UserInputError;
use crate::format::ArchiveFormat;

pub mod config;

/// External programs the dispatcher can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum Tool {
    Tar,
    Bunzip2,
    Unrar,
    Gunzip,
    Unzip,
    Uncompress,
    SevenZip,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Tar,
        Tool::Bunzip2,
        Tool::Unrar,
        Tool::Gunzip,
        Tool::Unzip,
        Tool::Uncompress,
        Tool::SevenZip,
    ];

    /// Program name looked up on `PATH` when no override is set.
    #[must_use]
    pub fn default_program(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Bunzip2 => "bunzip2",
            Self::Unrar => "unrar",
            Self::Gunzip => "gunzip",
            Self::Unzip => "unzip",
            Self::Uncompress => "uncompress",
            Self::SevenZip => "7z",
        }
    }
}

impl From<Tool> for String {
    fn from(tool: Tool) -> Self {
        tool.default_program().to_owned()
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

impl FromStr for Tool {
    type Err = UserInputError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.default_program() == name)
            .ok_or_else(|| {
                let known: Vec<_> = Tool::ALL.iter().map(|tool| tool.default_program()).collect();
                UserInputError::new(format!(
                    "unknown tool '{name}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// The tool and leading arguments used for a format. The archive path is
/// always appended as the final argument.
#[must_use]
pub fn command_for(format: ArchiveFormat) -> (Tool, &'static [&'static str]) {
    match format {
        ArchiveFormat::TarBz2 | ArchiveFormat::Tbz2 => (Tool::Tar, &["xjf"]),
        ArchiveFormat::TarGz | ArchiveFormat::Tgz => (Tool::Tar, &["xzf"]),
        ArchiveFormat::Bz2 => (Tool::Bunzip2, &[]),
        ArchiveFormat::Rar => (Tool::Unrar, &["x"]),
        ArchiveFormat::Gz => (Tool::Gunzip, &[]),
        ArchiveFormat::Tar => (Tool::Tar, &["xf"]),
        ArchiveFormat::Zip => (Tool::Unzip, &[]),
        ArchiveFormat::Z => (Tool::Uncompress, &[]),
        ArchiveFormat::SevenZip => (Tool::SevenZip, &["x"]),
    }
}

/// Replacement programs for individual tools. Flags are never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverrides {
    programs: BTreeMap<Tool, String>,
}

impl ToolOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the program used for `tool`, replacing any earlier override.
    #[must_use]
    pub fn with(mut self, tool: Tool, program: impl Into<String>) -> Self {
        self.set(tool, program);
        self
    }

    pub fn set(&mut self, tool: Tool, program: impl Into<String>) {
        self.programs.insert(tool, program.into());
    }

    /// Apply every override from `other` on top of `self`.
    pub fn merge(&mut self, other: ToolOverrides) {
        self.programs.extend(other.programs);
    }

    /// Program to execute for `tool`.
    #[must_use]
    pub fn program(&self, tool: Tool) -> &str {
        self.programs
            .get(&tool)
            .map(String::as_str)
            .unwrap_or_else(|| tool.default_program())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tool, &str)> {
        self.programs.iter().map(|(tool, program)| (*tool, program.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Parse a `NAME=PROGRAM` override as given on the command line.
pub fn parse_override(spec: &str) -> Result<(Tool, String), UserInputError> {
    let (name, program) = spec
        .split_once('=')
        .ok_or_else(|| UserInputError::new(format!("tool override '{spec}' must be NAME=PROGRAM")))?;
    let tool = name.trim().parse::<Tool>()?;
    let program = checked_program(tool, program)?;
    Ok((tool, program))
}

/// Trim an override program, rejecting an empty one.
pub fn checked_program(tool: Tool, program: &str) -> Result<String, UserInputError> {
    let program = program.trim();
    if program.is_empty() {
        return Err(UserInputError::new(format!(
            "tool override for {tool} has an empty program"
        )));
    }
    Ok(program.to_owned())
}

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub tool: Tool,
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_dir: Option<Utf8PathBuf>,
}

impl Invocation {
    /// Build the command that extracts `path` as `format`.
    #[must_use]
    pub fn build(format: ArchiveFormat, path: &Utf8Path, overrides: &ToolOverrides) -> Self {
        let (tool, flags) = command_for(format);
        let mut args: Vec<String> = flags.iter().map(|flag| (*flag).to_owned()).collect();
        args.push(path.to_string());
        Self {
            tool,
            program: overrides.program(tool).to_owned(),
            args,
            current_dir: None,
        }
    }

    /// Run the command from `dir` instead of the caller's directory.
    #[must_use]
    pub fn in_dir(mut self, dir: Option<Utf8PathBuf>) -> Self {
        self.current_dir = dir;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tar_family_shares_flags() {
        assert_eq!(command_for(ArchiveFormat::TarBz2), command_for(ArchiveFormat::Tbz2));
        assert_eq!(command_for(ArchiveFormat::TarGz), command_for(ArchiveFormat::Tgz));
        assert_eq!(command_for(ArchiveFormat::Tar), (Tool::Tar, &["xf"][..]));
    }

    #[test]
    fn bare_compressors_take_only_the_path() {
        let invocation = Invocation::build(
            ArchiveFormat::Gz,
            Utf8Path::new("notes.gz"),
            &ToolOverrides::new(),
        );
        assert_eq!(invocation.program, "gunzip");
        assert_eq!(invocation.args, vec!["notes.gz".to_owned()]);
        assert_eq!(invocation.to_string(), "gunzip notes.gz");
    }

    #[test]
    fn override_replaces_program_only() {
        let overrides = ToolOverrides::new().with(Tool::SevenZip, "7zz");
        let invocation =
            Invocation::build(ArchiveFormat::SevenZip, Utf8Path::new("a.7z"), &overrides);
        assert_eq!(invocation.to_string(), "7zz x a.7z");
        assert_eq!(invocation.tool, Tool::SevenZip);
    }

    #[test]
    fn tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.default_program().parse::<Tool>().ok(), Some(tool));
        }
        assert!("gzip".parse::<Tool>().is_err());
    }

    #[test]
    fn parses_override_specs() {
        assert_eq!(
            parse_override("gunzip=/opt/bin/pigz").ok(),
            Some((Tool::Gunzip, "/opt/bin/pigz".to_owned()))
        );
        assert!(parse_override("gunzip").is_err());
        assert!(parse_override("gunzip=").is_err());
        assert!(parse_override("lha=lha").is_err());
    }

    #[test]
    fn later_overrides_win_on_merge() {
        let mut base = ToolOverrides::new()
            .with(Tool::Tar, "gtar")
            .with(Tool::Unzip, "bsdunzip");
        base.merge(ToolOverrides::new().with(Tool::Tar, "bsdtar"));
        assert_eq!(base.program(Tool::Tar), "bsdtar");
        assert_eq!(base.program(Tool::Unzip), "bsdunzip");
        assert_eq!(base.program(Tool::Unrar), "unrar");
    }
}
