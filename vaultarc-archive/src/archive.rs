//! The [`Archive`] facade: one case-insensitive namespace over many sources.
//!
//! Sources are merged in order; an entry from a later source replaces one
//! with the same path from an earlier source, the way a patch DAT overrides
//! `master.dat`.

use crate::container::{DatContainer, LooseFile};
use crate::decoders::{Asset, AssetDecoder, DecoderOptions, DecoderRegistry};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use vaultarc_core::error::{Result, VaultError};
use vaultarc_core::{ArchiveEntry, ContainerReader, HandleId};

/// Archive-wide defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Keep extracted assets in memory.
    pub use_cache: bool,
    /// Run the registered decoder for an entry's extension.
    pub auto_decode: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            use_cache: false,
            auto_decode: true,
        }
    }
}

impl ArchiveOptions {
    /// Set the cache default.
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the auto-decode default.
    pub fn with_auto_decode(mut self, auto_decode: bool) -> Self {
        self.auto_decode = auto_decode;
        self
    }
}

/// Per-call extraction options. Unset fields fall back to [`ArchiveOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// Override the cache default.
    pub use_cache: Option<bool>,
    /// Override the auto-decode default.
    pub auto_decode: Option<bool>,
    /// Return `Ok(None)` instead of an error for a missing path.
    pub null_if_missing: bool,
    /// Options passed to the decoder.
    pub decoder: DecoderOptions,
}

impl ExtractOptions {
    /// Set the cache override.
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Set the auto-decode override.
    pub fn with_auto_decode(mut self, auto_decode: bool) -> Self {
        self.auto_decode = Some(auto_decode);
        self
    }

    /// Set whether a missing path yields `None`.
    pub fn with_null_if_missing(mut self, null_if_missing: bool) -> Self {
        self.null_if_missing = null_if_missing;
        self
    }

    /// Set the decoder options.
    pub fn with_decoder(mut self, decoder: DecoderOptions) -> Self {
        self.decoder = decoder;
        self
    }
}

/// Merged view over DAT archives and loose files.
pub struct Archive {
    options: ArchiveOptions,
    sources: Vec<Arc<dyn ContainerReader>>,
    entries: BTreeMap<String, ArchiveEntry>,
    registry: DecoderRegistry,
    cache: Mutex<HashMap<(String, bool), Asset>>,
}

impl Default for Archive {
    fn default() -> Self {
        Self::new(ArchiveOptions::default())
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("options", &self.options)
            .field("sources", &self.sources.len())
            .field("entries", &self.entries.len())
            .field("registry", &self.registry)
            .finish()
    }
}

impl Archive {
    /// An empty archive with the built-in decoders.
    pub fn new(options: ArchiveOptions) -> Self {
        Self {
            options,
            sources: Vec::new(),
            entries: BTreeMap::new(),
            registry: DecoderRegistry::with_defaults(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Archive-wide defaults.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Change the archive-wide defaults.
    pub fn set_options(&mut self, options: ArchiveOptions) {
        self.options = options;
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been merged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered sources, indexed by [`HandleId`].
    pub fn sources(&self) -> &[Arc<dyn ContainerReader>] {
        &self.sources
    }

    fn next_handle(&self) -> HandleId {
        HandleId(self.sources.len() as u32)
    }

    /// Merge the entries of a DAT file on disk. Returns the number merged.
    pub fn merge_dat_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let container = DatContainer::open(path, self.next_handle())?;
        Ok(self.merge_source(Arc::new(container)))
    }

    /// Merge the entries of a DAT archive read from `reader`.
    pub fn merge_dat_reader<R>(&mut self, label: impl Into<String>, reader: R) -> Result<usize>
    where
        R: Read + Seek + Send + 'static,
    {
        let container = DatContainer::new(label, reader, self.next_handle())?;
        Ok(self.merge_source(Arc::new(container)))
    }

    /// Register a file on disk under `virtual_path`.
    pub fn add_file(&mut self, disk_path: impl AsRef<Path>, virtual_path: &str) -> Result<()> {
        let source = LooseFile::new(disk_path.as_ref(), virtual_path, self.next_handle())?;
        self.merge_source(Arc::new(source));
        Ok(())
    }

    /// Merge any source. Later sources win on path collisions.
    pub fn merge_source(&mut self, source: Arc<dyn ContainerReader>) -> usize {
        let handle = self.next_handle();
        let mut merged = 0;
        let mut replaced = 0;
        for entry in source.entries() {
            let mut entry = entry.clone();
            entry.virtual_path = entry.virtual_path.to_lowercase();
            entry.locator.handle = handle;
            if self.entries.insert(entry.virtual_path.clone(), entry).is_some() {
                replaced += 1;
            }
            merged += 1;
        }
        info!(
            source = source.label(),
            handle = %handle,
            merged,
            replaced,
            "merged source"
        );
        self.sources.push(source);
        self.cache.lock().clear();
        merged
    }

    /// Register a decoder for `extension`.
    pub fn register_decoder(&mut self, extension: &str, decoder: impl AssetDecoder + 'static) {
        self.registry.register(extension, decoder);
        self.cache.lock().clear();
    }

    /// The decoder registry.
    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Look up an entry, ignoring case.
    pub fn entry(&self, path: &str) -> Option<&ArchiveEntry> {
        self.entries.get(&normalize_key(path))
    }

    /// Whether `path` exists, ignoring case.
    pub fn contains(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    /// Entries whose path ends with `suffix` and contains `infix`, both
    /// ignoring case. `None` matches everything. Sorted by path.
    pub fn entries(&self, suffix: Option<&str>, infix: Option<&str>) -> Vec<&ArchiveEntry> {
        let suffix = suffix.map(str::to_lowercase);
        let infix = infix.map(str::to_lowercase);
        self.entries
            .iter()
            .filter(|(key, _)| suffix.as_deref().is_none_or(|s| key.ends_with(s)))
            .filter(|(key, _)| infix.as_deref().is_none_or(|s| key.contains(s)))
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Iterate over every entry in path order.
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.values()
    }

    /// Extract `path` with the archive defaults.
    pub fn extract(&self, path: &str) -> Result<Asset> {
        self.extract_with(path, &ExtractOptions::default())?
            .ok_or_else(|| VaultError::entry_not_found(path))
    }

    /// Extract the undecoded bytes of `path`.
    pub fn extract_raw(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(path)
            .ok_or_else(|| VaultError::entry_not_found(path))?;
        self.read_entry(entry)
    }

    /// Extract `path`.
    ///
    /// Returns `Ok(None)` for a missing path only when
    /// [`ExtractOptions::null_if_missing`] is set.
    pub fn extract_with(&self, path: &str, options: &ExtractOptions) -> Result<Option<Asset>> {
        let key = normalize_key(path);
        let Some(entry) = self.entries.get(&key) else {
            if options.null_if_missing {
                return Ok(None);
            }
            return Err(VaultError::entry_not_found(path));
        };

        let use_cache = options.use_cache.unwrap_or(self.options.use_cache);
        let auto_decode = options.auto_decode.unwrap_or(self.options.auto_decode);
        let cache_key = (key, auto_decode);

        if use_cache {
            if let Some(asset) = self.cache.lock().get(&cache_key) {
                return Ok(Some(asset.clone()));
            }
        }

        let data = self.read_entry(entry)?;
        let asset = if auto_decode {
            self.decode(entry, data, &options.decoder)?
        } else {
            Asset::Raw(data)
        };

        if use_cache {
            self.cache.lock().insert(cache_key, asset.clone());
        }
        Ok(Some(asset))
    }

    /// Extract several paths, one rayon task per path. Fails if any fails.
    pub fn extract_many(
        &self,
        paths: &[&str],
        options: &ExtractOptions,
    ) -> Result<Vec<Option<Asset>>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            paths
                .par_iter()
                .map(|path| self.extract_with(path, options))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            paths
                .iter()
                .map(|path| self.extract_with(path, options))
                .collect()
        }
    }

    /// Drop every cached asset.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached assets.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let index = entry.locator.handle.0 as usize;
        let source = self.sources.get(index).ok_or_else(|| {
            VaultError::invalid_header(format!("unknown source {}", entry.locator.handle))
        })?;
        source.extract(entry)
    }

    fn decode(
        &self,
        entry: &ArchiveEntry,
        data: Vec<u8>,
        options: &DecoderOptions,
    ) -> Result<Asset> {
        let Some(extension) = entry.extension() else {
            return Ok(Asset::Raw(data));
        };
        match self.registry.get(&extension) {
            Some(decoder) => {
                debug!(path = %entry.virtual_path, decoder = decoder.name(), "decoding");
                decoder.decode(data, options)
            }
            None => {
                info!(
                    path = %entry.virtual_path,
                    extension = %extension,
                    "no decoder for extension, returning raw data"
                );
                Ok(Asset::Raw(data))
            }
        }
    }
}

fn normalize_key(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}
