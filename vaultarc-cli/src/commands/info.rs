//! Info command implementation.

use crate::utils::savings;
use std::collections::BTreeMap;
use std::path::PathBuf;
use vaultarc_archive::DatContainer;
use vaultarc_core::{ContainerReader, HandleId};

pub fn cmd_info(archive: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let container = DatContainer::open(archive, HandleId(0))?;
    let layout = container.layout();
    let entries = container.entries();

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Format: {} ({})", layout, layout.game());
    println!("Byte order: {:?}", layout.endian());
    println!("Size: {} bytes", container.size());

    let total_size: u64 = entries.iter().map(|e| e.size).sum();
    let total_stored: u64 = entries.iter().map(|e| e.stored_len()).sum();

    println!();
    println!("Contents:");
    println!("  Files: {}", entries.len());
    println!("  Total size: {} bytes", total_size);
    println!("  Stored size: {} bytes", total_stored);
    if total_size > 0 {
        println!(
            "  Compression ratio: {:.1}%",
            savings(total_size, total_stored)
        );
    }

    let mut methods: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for entry in entries {
        let slot = methods.entry(entry.compression.name()).or_default();
        slot.0 += 1;
        slot.1 += entry.size;
    }

    println!();
    println!("Methods:");
    for (method, (count, size)) in methods {
        println!("  {:<8} {:>8} files {:>12} bytes", method, count, size);
    }

    Ok(())
}
