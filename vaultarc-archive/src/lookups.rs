//! Lookup tables built from well-known archive paths.

use crate::archive::{Archive, ExtractOptions};
use crate::decoders::{ListEntry, Message, MessageTable, decode_lst, decode_msg};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use vaultarc_core::error::Result;

/// Prototype message file.
pub const PROTO_MSG_PATH: &str = "text/english/game/proto.msg";
/// Directory holding critter art.
pub const CRITTER_ART_DIR: &str = "art/critters/";

/// Tables the game resolves numeric IDs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLookups {
    /// Art lists (`art/**/*.lst`) by path.
    pub frm_lists: BTreeMap<String, Vec<ListEntry>>,
    /// Prototype lists (`proto/**/*.lst`) by path.
    pub proto_lists: BTreeMap<String, Vec<ListEntry>>,
    /// Prototype messages, if present.
    pub proto_msg: Option<MessageTable>,
    /// File names under `art/critters/`.
    pub critter_art: BTreeSet<String>,
}

impl AssetLookups {
    /// Build every table from the current contents of `archive`.
    pub fn collect(archive: &Archive) -> Result<Self> {
        let mut lookups = Self::default();

        for entry in archive.iter() {
            let path = entry.virtual_path.as_str();
            if path == PROTO_MSG_PATH {
                lookups.proto_msg = Some(decode_msg(&archive.extract_raw(path)?)?);
            } else if path.starts_with("art/") && path.ends_with(".lst") {
                let list = decode_lst(&archive.extract_raw(path)?, false);
                lookups.frm_lists.insert(path.to_string(), list);
            } else if path.starts_with("proto/") && path.ends_with(".lst") {
                let list = decode_lst(&archive.extract_raw(path)?, false);
                lookups.proto_lists.insert(path.to_string(), list);
            } else if path.starts_with(CRITTER_ART_DIR) {
                lookups.critter_art.insert(entry.file_name().to_string());
            }
        }

        debug!(
            frm_lists = lookups.frm_lists.len(),
            proto_lists = lookups.proto_lists.len(),
            critter_art = lookups.critter_art.len(),
            proto_msg = lookups.proto_msg.is_some(),
            "collected lookups"
        );
        Ok(lookups)
    }

    /// Entry `index` of an art list.
    pub fn frm_list_entry(&self, list: &str, index: usize) -> Option<&ListEntry> {
        self.frm_lists.get(&list.to_lowercase())?.get(index)
    }

    /// Entry `index` of a prototype list.
    pub fn proto_list_entry(&self, list: &str, index: usize) -> Option<&ListEntry> {
        self.proto_lists.get(&list.to_lowercase())?.get(index)
    }

    /// Whether a critter art file exists.
    pub fn has_critter_art(&self, file_name: &str) -> bool {
        self.critter_art.contains(&file_name.to_lowercase())
    }
}

/// Expand a short message file name.
///
/// `dialog/x` maps to `text/english/dialog/x.msg`, a bare name to
/// `text/english/game/<name>.msg`; anything else is used as given.
pub fn message_path(file: &str) -> String {
    let file = file.to_lowercase();
    if file.starts_with("dialog/") {
        format!("text/english/{}.msg", file)
    } else if !file.contains('/') {
        format!("text/english/game/{}.msg", file)
    } else {
        file
    }
}

/// Look up message `id` in `file`, using the archive cache.
///
/// Returns `None` for a negative id, a missing file, or an empty message.
pub fn lookup_message(archive: &Archive, file: &str, id: i64) -> Result<Option<Message>> {
    if id < 0 {
        return Ok(None);
    }
    let options = ExtractOptions::default()
        .with_use_cache(true)
        .with_auto_decode(true)
        .with_null_if_missing(true);
    let Some(asset) = archive.extract_with(&message_path(file), &options)? else {
        return Ok(None);
    };
    Ok(asset
        .as_messages()
        .and_then(|table| table.get(&id))
        .filter(|message| !message.text.is_empty())
        .cloned())
}
