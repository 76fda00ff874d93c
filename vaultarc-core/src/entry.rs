//! Archive entry metadata.
//!
//! This module defines [`ArchiveEntry`], the descriptor of one file inside a
//! backing source, along with its compression kind and storage locator.

use crate::error::{Result, VaultError};

/// Compression kind used for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CompressionKind {
    /// Stored without compression.
    #[default]
    None,
    /// Legacy dictionary compression (LZSS blocks).
    Lzss,
    /// zlib-wrapped deflate stream.
    Deflate,
}

impl CompressionKind {
    /// Check if the entry is stored as-is.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Get the kind name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "Stored",
            Self::Lzss => "LZSS",
            Self::Deflate => "Deflate",
        }
    }
}

impl std::fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of one backing source (a container or a loose file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub u32);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an entry's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    /// Backing source.
    pub handle: HandleId,
    /// Byte offset within the source.
    pub offset: u64,
}

/// A file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash separated path inside the archive.
    pub virtual_path: String,
    /// Storage location.
    pub locator: Locator,
    /// Uncompressed size.
    pub size: u64,
    /// Compressed size, 0 for stored entries.
    pub compressed_size: u64,
    /// Compression kind.
    pub compression: CompressionKind,
}

impl ArchiveEntry {
    /// Build an entry, checking the stored-size invariant.
    ///
    /// For stored entries the declared compressed size must be either 0 or
    /// equal to `size`; it is recorded as 0.
    pub fn new(
        virtual_path: impl Into<String>,
        locator: Locator,
        size: u64,
        compressed_size: u64,
        compression: CompressionKind,
    ) -> Result<Self> {
        let virtual_path = normalize_path(&virtual_path.into());
        let compressed_size = if compression.is_stored() {
            if compressed_size != 0 && compressed_size != size {
                return Err(VaultError::size_mismatch(
                    format!("stored entry {}", virtual_path),
                    size,
                    compressed_size,
                ));
            }
            0
        } else {
            compressed_size
        };

        Ok(Self {
            virtual_path,
            locator,
            size,
            compressed_size,
            compression,
        })
    }

    /// Number of bytes occupied in the backing source.
    pub fn stored_len(&self) -> u64 {
        if self.compression.is_stored() {
            self.size
        } else {
            self.compressed_size
        }
    }

    /// File name component of the virtual path.
    pub fn file_name(&self) -> &str {
        self.virtual_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.virtual_path)
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.virtual_path)
    }

    /// Compression ratio as a percentage of the original size.
    pub fn compression_ratio(&self) -> f64 {
        if self.size == 0 || self.compression.is_stored() {
            return 100.0;
        }
        (self.compressed_size as f64 / self.size as f64) * 100.0
    }

    /// Space savings as a percentage.
    pub fn space_savings(&self) -> f64 {
        100.0 - self.compression_ratio()
    }

    /// Relative path that is safe to join onto an output directory.
    ///
    /// Drops `.`, `..`, root and drive components.
    pub fn sanitized_path(&self) -> String {
        let mut result = String::new();
        for component in std::path::Path::new(&self.virtual_path).components() {
            if let std::path::Component::Normal(s) = component {
                if !result.is_empty() {
                    result.push('/');
                }
                result.push_str(&s.to_string_lossy().replace('\0', "_"));
            }
        }
        result
    }
}

/// Convert backslashes to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lower-cased extension of a path's final component.
pub fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> Locator {
        Locator {
            handle: HandleId(0),
            offset: 0,
        }
    }

    #[test]
    fn test_stored_entry_records_zero_compressed_size() {
        let entry =
            ArchiveEntry::new("a\\b.txt", locator(), 10, 10, CompressionKind::None).unwrap();
        assert_eq!(entry.virtual_path, "a/b.txt");
        assert_eq!(entry.compressed_size, 0);
        assert_eq!(entry.stored_len(), 10);
        assert_eq!(entry.file_name(), "b.txt");
    }

    #[test]
    fn test_stored_entry_size_mismatch() {
        let err = ArchiveEntry::new("x", locator(), 10, 4, CompressionKind::None).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_compressed_entry_keeps_sizes() {
        let entry = ArchiveEntry::new("x.acm", locator(), 100, 40, CompressionKind::Lzss).unwrap();
        assert_eq!(entry.stored_len(), 40);
        assert!((entry.space_savings() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension_of("sound/sfx/BOOM.ACM"), Some("acm".to_string()));
        assert_eq!(extension_of("dir.d/noext"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_sanitized_path() {
        let stored = |path: &str| {
            ArchiveEntry::new(path, locator(), 0, 0, CompressionKind::None).unwrap()
        };
        assert_eq!(stored("../art/./x.frm").sanitized_path(), "art/x.frm");
        assert_eq!(stored("/etc/passwd").sanitized_path(), "etc/passwd");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CompressionKind::Lzss.to_string(), "LZSS");
        assert_eq!(HandleId(3).to_string(), "#3");
    }
}
