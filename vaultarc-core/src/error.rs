//! Error types for VaultArc operations.
//!
//! A single error enum covers I/O failures, format validation failures found
//! while parsing containers and codec streams, truncated input, and usage
//! errors such as invalid bit widths.

use std::io;
use thiserror::Error;

/// The main error type for VaultArc operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A magic number did not match the expected value.
    #[error("Invalid magic in {context}: expected {expected:#x}, found {found:#x}")]
    InvalidMagic {
        /// Structure whose magic was checked.
        context: String,
        /// Expected magic value.
        expected: u64,
        /// Actual value found.
        found: u64,
    },

    /// Unsupported format version.
    #[error("Unsupported {context} version: {found}")]
    UnsupportedVersion {
        /// Structure whose version was checked.
        context: String,
        /// Version found in the stream.
        found: u64,
    },

    /// A declared size disagrees with the actual data.
    #[error("Size mismatch in {context}: expected {expected}, found {found}")]
    SizeMismatch {
        /// What was being sized.
        context: String,
        /// Declared or expected size.
        expected: u64,
        /// Actual size.
        found: u64,
    },

    /// Invalid header field.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Corrupted data inside a compressed or coded stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Audio block selected an entropy decoder that does not exist.
    #[error("Unimplemented subband decoder {selector} (subband {subband})")]
    UnimplementedSelector {
        /// 5-bit selector value read from the stream.
        selector: u32,
        /// Subband column being decoded.
        subband: usize,
    },

    /// Audio stream is wrapped in a container this decoder does not unwrap.
    #[error("Unsupported audio wrapper with magic {magic:#08x}")]
    UnsupportedWrapper {
        /// The 24-bit wrapper magic.
        magic: u32,
    },

    /// Neither container layout could be parsed.
    #[error("Invalid DAT format: {reason}")]
    InvalidContainer {
        /// Short description of the last failure.
        reason: String,
        /// The error raised by the last layout tried.
        #[source]
        source: Box<VaultError>,
    },

    /// A decompression backend reported an error.
    #[error("{method} decompression failed: {message}")]
    Decompression {
        /// Name of the compression method.
        method: String,
        /// Backend error message.
        message: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of data: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Buffer too small for operation.
    #[error("Buffer too small: need {needed} elements, have {available}")]
    BufferTooSmall {
        /// Number of elements needed.
        needed: usize,
        /// Number of elements available.
        available: usize,
    },

    /// Entry not found in the archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// Virtual path of the missing entry.
        name: String,
    },

    /// A bit read asked for zero or more than 32 bits.
    #[error("Invalid bit count {count}: must be between 1 and 32")]
    InvalidBitCount {
        /// Requested bit count.
        count: u32,
    },

    /// A bitfield template does not cover a whole number of bytes.
    #[error("Bitfield is not byte aligned: {missing} bits missing")]
    BitFieldMisaligned {
        /// Bits needed to reach the next byte boundary.
        missing: u32,
    },

    /// A decode pass was requested while another one is in progress.
    #[error("A decode pass is already in progress")]
    PassInProgress,
}

/// Result type alias for VaultArc operations.
pub type Result<T> = std::result::Result<T, VaultError>;

impl VaultError {
    /// Create an invalid magic error.
    pub fn invalid_magic(context: impl Into<String>, expected: u64, found: u64) -> Self {
        Self::InvalidMagic {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(context: impl Into<String>, found: u64) -> Self {
        Self::UnsupportedVersion {
            context: context.into(),
            found,
        }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(context: impl Into<String>, expected: u64, found: u64) -> Self {
        Self::SizeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an unimplemented selector error.
    pub fn unimplemented_selector(selector: u32, subband: usize) -> Self {
        Self::UnimplementedSelector { selector, subband }
    }

    /// Create an invalid container error wrapping the cause.
    pub fn invalid_container(source: VaultError) -> Self {
        Self::InvalidContainer {
            reason: source.to_string(),
            source: Box::new(source),
        }
    }

    /// Create a decompression error.
    pub fn decompression(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decompression {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Whether this error means the input violates its binary format.
    ///
    /// Format errors are fatal and never worth retrying.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. }
                | Self::UnsupportedVersion { .. }
                | Self::SizeMismatch { .. }
                | Self::InvalidHeader { .. }
                | Self::CorruptedData { .. }
                | Self::UnimplementedSelector { .. }
                | Self::UnsupportedWrapper { .. }
                | Self::InvalidContainer { .. }
                | Self::Decompression { .. }
        )
    }

    /// Whether this error means the input ended early.
    pub fn is_truncated(&self) -> bool {
        match self {
            Self::UnexpectedEof { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
