//! Extract command implementation.

use crate::utils::{create_progress_bar, open_archive};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;
use vaultarc_archive::{Asset, ExtractOptions as ArchiveExtractOptions};
use vaultarc_core::ArchiveEntry;

/// Options for extracting archive contents.
pub struct ExtractOptions<'a> {
    pub suffix: Option<&'a str>,
    pub contains: Option<&'a str>,
    pub paths: &'a [String],
    pub decode: bool,
    pub verbose: bool,
}

pub fn cmd_extract(
    archives: &[PathBuf],
    output: &Path,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(archives)?;

    let selected: Vec<&ArchiveEntry> = if options.paths.is_empty() {
        archive.entries(options.suffix, options.contains)
    } else {
        options
            .paths
            .iter()
            .map(|path| {
                archive
                    .entry(path)
                    .ok_or_else(|| format!("no such entry: {}", path))
            })
            .collect::<Result<_, _>>()?
    };

    let extract_options = ArchiveExtractOptions::default()
        .with_auto_decode(options.decode)
        .with_use_cache(false);

    let pb = create_progress_bar(selected.len() as u64, true);
    pb.set_message("files");

    for entry in selected {
        let Some(asset) = archive.extract_with(&entry.virtual_path, &extract_options)? else {
            continue;
        };
        debug!(path = %entry.virtual_path, kind = asset.kind(), "extracted");
        let (bytes, name) = render_asset(entry, asset);

        let file_path = output.join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, &bytes)?;

        if options.verbose {
            pb.println(format!(
                "  Extracted: {} ({} bytes)",
                file_path.display(),
                bytes.len()
            ));
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    Ok(())
}

/// Bytes to write for an asset and the relative name to write them under.
fn render_asset(entry: &ArchiveEntry, asset: Asset) -> (Vec<u8>, String) {
    let name = entry.sanitized_path();
    match asset {
        Asset::Raw(bytes) => (bytes, name),
        Asset::Audio {
            bytes, wave_header, ..
        } => {
            let ext = if wave_header { "wav" } else { "raw" };
            (bytes, replace_extension(&name, ext))
        }
        Asset::List(list) => {
            let mut text = String::new();
            for item in list {
                match item.comment {
                    Some(comment) => {
                        let _ = writeln!(text, "{} ; {}", item.value, comment);
                    }
                    None => {
                        let _ = writeln!(text, "{}", item.value);
                    }
                }
            }
            (text.into_bytes(), format!("{}.txt", name))
        }
        Asset::Messages(table) => {
            let mut text = String::new();
            for (id, message) in table {
                let sound = message.sound.unwrap_or_default();
                let _ = writeln!(text, "{}\t{}\t{}", id, sound, message.text);
            }
            (text.into_bytes(), format!("{}.txt", name))
        }
    }
}

fn replace_extension(name: &str, ext: &str) -> String {
    let stem_end = name
        .rfind('.')
        .filter(|&dot| !name[dot..].contains('/'))
        .unwrap_or(name.len());
    format!("{}.{}", &name[..stem_end], ext)
}
