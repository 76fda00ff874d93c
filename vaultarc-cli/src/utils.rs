//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use vaultarc_archive::{Archive, ArchiveOptions};
use vaultarc_core::ArchiveEntry;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Merge `paths` into one archive, in order.
pub fn open_archive(paths: &[PathBuf]) -> Result<Archive, Box<dyn std::error::Error>> {
    let mut archive = Archive::new(ArchiveOptions::default());
    for path in paths {
        archive
            .merge_dat_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(archive)
}

/// Label of the source an entry was read from.
pub fn source_label<'a>(archive: &'a Archive, entry: &ArchiveEntry) -> &'a str {
    archive
        .sources()
        .get(entry.locator.handle.0 as usize)
        .map_or("?", |source| source.label())
}

/// Print entries in a formatted table.
pub fn print_entries(entries: &[&ArchiveEntry], verbose: bool) {
    if verbose {
        println!(
            "{:>10} {:>10} {:>6} {:>8}  Name",
            "Size", "Packed", "Ratio", "Method",
        );
        println!("{}", "-".repeat(60));

        let mut total_size = 0u64;
        let mut total_stored = 0u64;

        for entry in entries {
            let ratio = if entry.size > 0 && !entry.compression.is_stored() {
                format!("{:.1}%", entry.space_savings())
            } else {
                "-".to_string()
            };

            println!(
                "{:>10} {:>10} {:>6} {:>8}  {}",
                entry.size,
                entry.stored_len(),
                ratio,
                entry.compression.name(),
                entry.virtual_path
            );

            total_size += entry.size;
            total_stored += entry.stored_len();
        }

        println!("{}", "-".repeat(60));
        println!(
            "{:>10} {:>10} {:>5.1}%           {} files",
            total_size,
            total_stored,
            savings(total_size, total_stored),
            entries.len()
        );
    } else {
        for entry in entries {
            println!("{}", entry.virtual_path);
        }
    }
}

/// Percentage saved by compression.
pub fn savings(size: u64, stored: u64) -> f64 {
    if size == 0 {
        return 0.0;
    }
    (1.0 - stored as f64 / size as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings() {
        assert_eq!(savings(0, 0), 0.0);
        assert!((savings(200, 50) - 75.0).abs() < 1e-9);
        assert_eq!(savings(10, 10), 0.0);
    }

    #[test]
    fn test_open_archive_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.dat");
        let err = open_archive(&[path]).unwrap_err();
        assert!(err.to_string().contains("missing.dat"));
    }
}
