//! Validate, classify and hand an archive to its external extraction tool.

use std::io;
use std::process::{Command, ExitStatus};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::error::ExtractError;
use crate::format::sniff::{read_header, Signature};
use crate::format::{ArchiveFormat, ArchivePath, SUFFIX_RULES};
use crate::tool::{Invocation, ToolOverrides};

/// Options that steer a single extraction.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Replacement programs; unset tools use their default name.
    pub overrides: ToolOverrides,
    /// Check magic bytes against the suffix before running anything.
    pub verify_contents: bool,
    /// Working directory for the tool.
    pub directory: Option<Utf8PathBuf>,
    /// Resolve the invocation but do not run it.
    pub dry_run: bool,
}

/// Exit state of a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: Option<i32>,
    signal: Option<i32>,
}

impl ToolStatus {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Status of a process terminated by `signal`.
    #[must_use]
    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Code to exit with, following the shell convention for signals.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;
        Self {
            code: status.code(),
            signal,
        }
    }
}

/// Result of a dispatch that was allowed to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub format: ArchiveFormat,
    pub invocation: Invocation,
    /// `None` for dry runs.
    pub status: Option<ToolStatus>,
}

/// Runs a resolved invocation. Implementations block until the tool exits.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<ToolStatus>;
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<ToolStatus> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir.as_std_path());
        }
        let status = command.status()?;
        Ok(status.into())
    }
}

/// Extract `path` with the system's tools.
pub fn extract(path: &Utf8Path, options: &DispatchOptions) -> Result<Dispatched, ExtractError> {
    Dispatcher::new(SystemRunner).extract(path, options)
}

/// Ties classification to a [`CommandRunner`].
#[derive(Debug)]
pub struct Dispatcher<R> {
    runner: R,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Validate `path`, pick its tool and run it. The tool's status is
    /// returned as-is, including failures.
    pub fn extract(
        &mut self,
        path: &Utf8Path,
        options: &DispatchOptions,
    ) -> Result<Dispatched, ExtractError> {
        if !is_regular_file(path) {
            return Err(ExtractError::InvalidPath(path.to_owned()));
        }
        let archive = ArchivePath::new(path);
        let format = archive
            .format()
            .ok_or_else(|| ExtractError::UnrecognizedFormat(path.to_owned()))?;
        tracing::debug!(path = %path, %format, "classified archive");

        if options.verify_contents {
            verify_contents(path, format)?;
        }

        let invocation = match &options.directory {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ExtractError::InvalidDirectory(dir.clone()));
                }
                let absolute = absolute_path(path)?;
                Invocation::build(format, &absolute, &options.overrides).in_dir(Some(dir.clone()))
            }
            None => Invocation::build(format, path, &options.overrides),
        };

        if options.dry_run {
            tracing::debug!(command = %invocation, "dry run, not spawning");
            return Ok(Dispatched {
                format,
                invocation,
                status: None,
            });
        }

        tracing::info!(tool = %invocation.tool, command = %invocation, "running extraction tool");
        let status = self.runner.run(&invocation).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                ExtractError::ToolNotFound {
                    program: invocation.program.clone(),
                }
            } else {
                ExtractError::Spawn {
                    program: invocation.program.clone(),
                    source: err,
                }
            }
        })?;
        tracing::debug!(code = ?status.code(), "tool finished");

        Ok(Dispatched {
            format,
            invocation,
            status: Some(status),
        })
    }
}

/// How a path would be handled, without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub path: Utf8PathBuf,
    pub format: Option<ArchiveFormat>,
    pub command: Option<Invocation>,
}

/// Classify `path` and resolve the command that would extract it.
#[must_use]
pub fn classify(path: &Utf8Path, overrides: &ToolOverrides) -> Classification {
    let format = ArchivePath::new(path).format();
    Classification {
        path: path.to_owned(),
        format,
        command: format.map(|format| Invocation::build(format, path, overrides)),
    }
}

/// Every suffix rule in match order with its command template.
#[must_use]
pub fn dispatch_table(overrides: &ToolOverrides) -> Vec<(ArchiveFormat, Invocation)> {
    SUFFIX_RULES
        .iter()
        .map(|format| {
            let placeholder = Utf8Path::new("<path>");
            (*format, Invocation::build(*format, placeholder, overrides))
        })
        .collect()
}

fn is_regular_file(path: &Utf8Path) -> bool {
    fs_err::metadata(path.as_std_path())
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

fn verify_contents(path: &Utf8Path, format: ArchiveFormat) -> Result<(), ExtractError> {
    let header = read_header(path).map_err(|source| ExtractError::Read {
        path: path.to_owned(),
        source,
    })?;
    let expected = Signature::expected_for(format);
    let detected = Signature::detect(&header);
    if detected == Some(expected) {
        return Ok(());
    }
    tracing::debug!(path = %path, %expected, ?detected, "contents do not match suffix");
    Err(ExtractError::ContentMismatch {
        path: path.to_owned(),
        expected,
        detected,
    })
}

fn absolute_path(path: &Utf8Path) -> Result<Utf8PathBuf, ExtractError> {
    let read_error = |source| ExtractError::Read {
        path: path.to_owned(),
        source,
    };
    let canonical = fs_err::canonicalize(path.as_std_path()).map_err(read_error)?;
    Utf8PathBuf::from_path_buf(canonical).map_err(|other| {
        read_error(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("path not UTF-8: {}", other.display()),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_exit_follows_shell_convention() {
        assert_eq!(ToolStatus::from_signal(9).exit_code(), 137);
        assert_eq!(ToolStatus::from_code(4).exit_code(), 4);
        assert!(!ToolStatus::from_code(4).success());
        assert!(ToolStatus::from_code(0).success());
    }

    #[test]
    fn table_lists_rules_in_match_order() {
        let table = dispatch_table(&ToolOverrides::new());
        let formats: Vec<_> = table.iter().map(|(format, _)| *format).collect();
        assert_eq!(formats, SUFFIX_RULES.to_vec());
        assert_eq!(table[0].1.to_string(), "tar xjf <path>");
    }

    #[test]
    fn classify_does_not_need_the_file() {
        let result = classify(Utf8Path::new("/nowhere/backup.tgz"), &ToolOverrides::new());
        assert_eq!(result.format, Some(ArchiveFormat::Tgz));
        assert_eq!(
            result.command.map(|c| c.to_string()).as_deref(),
            Some("tar xzf /nowhere/backup.tgz")
        );
        assert_eq!(
            classify(Utf8Path::new("README"), &ToolOverrides::new()).command,
            None
        );
    }
}
