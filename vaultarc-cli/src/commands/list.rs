//! List command implementation.

use crate::utils::{open_archive, print_entries, source_label};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vaultarc_archive::Archive;
use vaultarc_core::ArchiveEntry;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    path: String,
    size: u64,
    compressed_size: u64,
    ratio: f64,
    method: String,
    offset: u64,
    source: String,
}

impl EntryJson {
    fn from_entry(archive: &Archive, entry: &ArchiveEntry) -> Self {
        Self {
            path: entry.virtual_path.clone(),
            size: entry.size,
            compressed_size: entry.compressed_size,
            ratio: entry.compression_ratio(),
            method: entry.compression.name().to_string(),
            offset: entry.locator.offset,
            source: source_label(archive, entry).to_string(),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archives: Vec<String>,
    total: usize,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub suffix: Option<&'a str>,
    pub contains: Option<&'a str>,
    pub json: bool,
    pub verbose: bool,
}

pub fn cmd_list(
    archives: &[PathBuf],
    options: &ListOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(archives)?;
    let entries = archive.entries(options.suffix, options.contains);

    if options.json {
        let listing = ArchiveListJson {
            archives: archives.iter().map(|p| p.display().to_string()).collect(),
            total: archive.len(),
            entries: entries
                .iter()
                .map(|entry| EntryJson::from_entry(&archive, entry))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for path in archives {
        println!("Archive: {}", path.display());
    }
    println!();
    print_entries(&entries, options.verbose);
    Ok(())
}
