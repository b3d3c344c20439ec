//! Magic-byte signatures used for opt-in content verification.

use std::fmt;
use std::io::{self, Read};

use camino::Utf8Path;

use super::ArchiveFormat;

/// Bytes read from the head of a file; enough to reach the ustar magic.
pub const SNIFF_LEN: usize = 512;

const USTAR_OFFSET: usize = 257;

/// Container signatures recognised in file headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Gzip,
    Bzip2,
    Zip,
    Rar,
    SevenZip,
    Compress,
    Tar,
}

impl Signature {
    /// Guess the container from header bytes.
    #[must_use]
    pub fn detect(header: &[u8]) -> Option<Self> {
        if header.starts_with(&[0x1F, 0x8B]) {
            Some(Self::Gzip)
        } else if header.starts_with(b"BZh") {
            Some(Self::Bzip2)
        } else if header.starts_with(b"PK\x03\x04")
            || header.starts_with(b"PK\x05\x06")
            || header.starts_with(b"PK\x07\x08")
        {
            Some(Self::Zip)
        } else if header.starts_with(b"Rar!\x1A\x07") {
            Some(Self::Rar)
        } else if header.starts_with(&[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C]) {
            Some(Self::SevenZip)
        } else if header.starts_with(&[0x1F, 0x9D]) {
            Some(Self::Compress)
        } else if header
            .get(USTAR_OFFSET..USTAR_OFFSET + 5)
            .is_some_and(|magic| magic == b"ustar")
        {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Signature the outermost layer of `format` should carry.
    #[must_use]
    pub fn expected_for(format: ArchiveFormat) -> Self {
        match format {
            ArchiveFormat::TarGz | ArchiveFormat::Tgz | ArchiveFormat::Gz => Self::Gzip,
            ArchiveFormat::TarBz2 | ArchiveFormat::Tbz2 | ArchiveFormat::Bz2 => Self::Bzip2,
            ArchiveFormat::Zip => Self::Zip,
            ArchiveFormat::Rar => Self::Rar,
            ArchiveFormat::SevenZip => Self::SevenZip,
            ArchiveFormat::Z => Self::Compress,
            ArchiveFormat::Tar => Self::Tar,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gzip => write!(f, "gzip"),
            Self::Bzip2 => write!(f, "bzip2"),
            Self::Zip => write!(f, "zip"),
            Self::Rar => write!(f, "rar"),
            Self::SevenZip => write!(f, "7z"),
            Self::Compress => write!(f, "compress"),
            Self::Tar => write!(f, "tar"),
        }
    }
}

/// Read up to [`SNIFF_LEN`] bytes from the start of `path`.
pub fn read_header(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let file = fs_err::File::open(path.as_std_path())?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_signatures() {
        assert_eq!(Signature::detect(&[0x1F, 0x8B, 0x08]), Some(Signature::Gzip));
        assert_eq!(Signature::detect(b"BZh91AY"), Some(Signature::Bzip2));
        assert_eq!(Signature::detect(b"PK\x03\x04rest"), Some(Signature::Zip));
        assert_eq!(Signature::detect(b"PK\x05\x06"), Some(Signature::Zip));
        assert_eq!(Signature::detect(b"Rar!\x1A\x07\x00"), Some(Signature::Rar));
        assert_eq!(
            Signature::detect(&[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C, 0x00]),
            Some(Signature::SevenZip)
        );
        assert_eq!(Signature::detect(&[0x1F, 0x9D, 0x90]), Some(Signature::Compress));
    }

    #[test]
    fn detects_ustar_at_offset() {
        let mut block = vec![0_u8; SNIFF_LEN];
        block[USTAR_OFFSET..USTAR_OFFSET + 6].copy_from_slice(b"ustar\0");
        assert_eq!(Signature::detect(&block), Some(Signature::Tar));
    }

    #[test]
    fn short_or_plain_headers_are_unknown() {
        assert_eq!(Signature::detect(b""), None);
        assert_eq!(Signature::detect(b"hello world"), None);
        assert_eq!(Signature::detect(&[0x1F]), None);
    }

    #[test]
    fn compound_formats_expect_outer_layer() {
        assert_eq!(Signature::expected_for(ArchiveFormat::TarGz), Signature::Gzip);
        assert_eq!(Signature::expected_for(ArchiveFormat::Tbz2), Signature::Bzip2);
        assert_eq!(Signature::expected_for(ArchiveFormat::Tar), Signature::Tar);
    }
}
