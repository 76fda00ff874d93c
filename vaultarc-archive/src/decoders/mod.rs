//! Asset decoders selected by file extension.
//!
//! [`DecoderRegistry::with_defaults`] knows `.acm`, `.lst` and `.msg`; other
//! decoders can be registered at runtime. Extensions without a decoder are
//! returned as raw bytes.

pub mod acm;
pub mod lst;
pub mod msg;

use std::collections::HashMap;
use std::sync::Arc;
use vaultarc_acm::AcmOptions;
use vaultarc_core::error::Result;

pub use acm::AcmDecoder;
pub use lst::{ListEntry, LstDecoder, decode_lst};
pub use msg::{Message, MessageTable, MsgDecoder, decode_msg};

/// An extracted asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// Undecoded bytes.
    Raw(Vec<u8>),
    /// Decoded audio.
    Audio {
        /// 16-bit little-endian PCM, optionally behind a WAVE header.
        bytes: Vec<u8>,
        /// Sample rate in hertz.
        sample_rate: u32,
        /// Channel count.
        channels: u16,
        /// Whether `bytes` starts with a WAVE header.
        wave_header: bool,
    },
    /// A decoded list file.
    List(Vec<ListEntry>),
    /// A decoded message file.
    Messages(MessageTable),
}

impl Asset {
    /// Raw bytes, if undecoded.
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Self::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// List entries, if a list file.
    pub fn as_list(&self) -> Option<&[ListEntry]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Message table, if a message file.
    pub fn as_messages(&self) -> Option<&MessageTable> {
        match self {
            Self::Messages(table) => Some(table),
            _ => None,
        }
    }

    /// Bytes to write when saving the asset to disk, if it has a byte form.
    pub fn to_file_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Raw(bytes) | Self::Audio { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Short kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw",
            Self::Audio { .. } => "audio",
            Self::List(_) => "list",
            Self::Messages(_) => "messages",
        }
    }
}

/// Options passed through to decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderOptions {
    /// Keep comments in list files.
    pub include_comments: bool,
    /// ACM decoding options.
    pub acm: AcmOptions,
}

impl DecoderOptions {
    /// Set whether list comments are kept.
    pub fn with_include_comments(mut self, include_comments: bool) -> Self {
        self.include_comments = include_comments;
        self
    }

    /// Set the ACM options.
    pub fn with_acm(mut self, acm: AcmOptions) -> Self {
        self.acm = acm;
        self
    }
}

/// Turns the bytes of one entry into an [`Asset`].
pub trait AssetDecoder: Send + Sync {
    /// Decoder name, used in logs.
    fn name(&self) -> &str;

    /// Decode `data`.
    fn decode(&self, data: Vec<u8>, options: &DecoderOptions) -> Result<Asset>;
}

/// Decoders keyed by lower-case extension.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn AssetDecoder>>,
}

impl DecoderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in decoders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("acm", AcmDecoder);
        registry.register("lst", LstDecoder);
        registry.register("msg", MsgDecoder);
        registry
    }

    /// Register `decoder` for `extension`, replacing any previous one.
    pub fn register(&mut self, extension: &str, decoder: impl AssetDecoder + 'static) {
        self.register_arc(extension, Arc::new(decoder));
    }

    /// Register a shared decoder for `extension`.
    pub fn register_arc(&mut self, extension: &str, decoder: Arc<dyn AssetDecoder>) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.decoders.insert(key, decoder);
    }

    /// Decoder for `extension`, ignoring case and a leading dot.
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn AssetDecoder>> {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.decoders.get(&key)
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}
