//! Filename-based archive classification.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

pub mod sniff;

/// Archive formats recognised by their filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    TarBz2,
    TarGz,
    Bz2,
    Rar,
    Gz,
    Tar,
    Tbz2,
    Tgz,
    Zip,
    /// Unix `compress` output.
    Z,
    SevenZip,
}

/// Suffix patterns in match order. Compound suffixes must stay ahead of the
/// bare `.bz2`, `.gz` and `.tar` rules.
pub const SUFFIX_RULES: [ArchiveFormat; 11] = [
    ArchiveFormat::TarBz2,
    ArchiveFormat::TarGz,
    ArchiveFormat::Bz2,
    ArchiveFormat::Rar,
    ArchiveFormat::Gz,
    ArchiveFormat::Tar,
    ArchiveFormat::Tbz2,
    ArchiveFormat::Tgz,
    ArchiveFormat::Zip,
    ArchiveFormat::Z,
    ArchiveFormat::SevenZip,
];

impl ArchiveFormat {
    /// The filename suffix this format is matched on.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::TarBz2 => ".tar.bz2",
            Self::TarGz => ".tar.gz",
            Self::Bz2 => ".bz2",
            Self::Rar => ".rar",
            Self::Gz => ".gz",
            Self::Tar => ".tar",
            Self::Tbz2 => ".tbz2",
            Self::Tgz => ".tgz",
            Self::Zip => ".zip",
            Self::Z => ".Z",
            Self::SevenZip => ".7z",
        }
    }

    /// Classify a filename. Matching is case-sensitive and the first rule in
    /// [`SUFFIX_RULES`] that matches wins.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        SUFFIX_RULES
            .iter()
            .copied()
            .find(|format| name.ends_with(format.suffix()))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix()[1..])
    }
}

/// A user-supplied path together with its derived format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePath {
    raw: Utf8PathBuf,
    format: Option<ArchiveFormat>,
}

impl ArchivePath {
    /// Classify `path` by its suffix. The filesystem is not consulted.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        let raw = path.into();
        let format = ArchiveFormat::from_name(raw.as_str());
        Self { raw, format }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.raw
    }

    /// `None` when no suffix rule matched.
    #[must_use]
    pub fn format(&self) -> Option<ArchiveFormat> {
        self.format
    }
}
