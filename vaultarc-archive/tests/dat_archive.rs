//! Archive facade tests over DAT files written to a temporary directory.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use vaultarc_archive::{
    Archive, ArchiveOptions, Asset, AssetDecoder, AssetLookups, DatContainer, DatLayout,
    DecoderOptions, ExtractOptions, dat1_magic, lookup_message,
};
use vaultarc_core::{CompressionKind, ContainerReader, HandleId, Result, VaultError};

/// Build a DAT2 archive from `(path, data, compress)` triples.
fn build_dat2(files: &[(&str, &[u8], bool)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut tree = (files.len() as u32).to_le_bytes().to_vec();
    for (path, data, compress) in files {
        let offset = out.len() as u32;
        let stored = if *compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        } else {
            data.to_vec()
        };
        out.extend_from_slice(&stored);

        tree.extend_from_slice(&(path.len() as u32).to_le_bytes());
        tree.extend_from_slice(path.as_bytes());
        tree.push(u8::from(*compress));
        for v in [data.len() as u32, stored.len() as u32, offset] {
            tree.extend_from_slice(&v.to_le_bytes());
        }
    }
    out.extend_from_slice(&tree);
    let total = out.len() as u32 + 8;
    out.extend_from_slice(&(tree.len() as u32).to_le_bytes());
    out.extend_from_slice(&total.to_le_bytes());
    out
}

/// Build a DAT1 archive. Compressed files are stored as one LZSS literal block.
fn build_dat1(folders: &[(&str, &[(&str, &[u8], bool)])]) -> Vec<u8> {
    fn directory(folders: &[(&str, &[(&str, &[u8], bool)])], offsets: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        let count = folders.len() as u32;
        for v in [count, dat1_magic(count), 0, 0] {
            out.extend_from_slice(&v.to_be_bytes());
        }
        for (name, _) in folders {
            out.push(name.len() as u8);
            out.extend_from_slice(name.as_bytes());
        }
        let mut index = 0;
        for (_, files) in folders {
            let count = files.len() as u32;
            for v in [count, dat1_magic(count), 0, 0] {
                out.extend_from_slice(&v.to_be_bytes());
            }
            for (name, data, compress) in files.iter() {
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
                let (flags, packed) = if *compress {
                    (0x40, data.len() as u32 + 2)
                } else {
                    (0x20, 0)
                };
                for v in [flags, offsets[index], data.len() as u32, packed] {
                    out.extend_from_slice(&v.to_be_bytes());
                }
                index += 1;
            }
        }
        out
    }

    let all: Vec<&(&str, &[u8], bool)> = folders.iter().flat_map(|(_, f)| f.iter()).collect();
    let placeholder = vec![0u32; all.len()];
    let mut cursor = directory(folders, &placeholder).len() as u32;

    let mut offsets = Vec::new();
    let mut blobs = Vec::new();
    for (_, data, compress) in &all {
        offsets.push(cursor);
        if *compress {
            blobs.extend_from_slice(&(-(data.len() as i16)).to_be_bytes());
            cursor += 2;
        }
        blobs.extend_from_slice(data);
        cursor += data.len() as u32;
    }

    let mut out = directory(folders, &offsets);
    out.extend_from_slice(&blobs);
    out
}

fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_hello_dat2() {
    let data = build_dat2(&[("hello", &[1, 2, 3, 4], false)]);
    assert_eq!(data.len(), 38);
    assert_eq!(&data[30..], &[26, 0, 0, 0, 38, 0, 0, 0]);

    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "hello.dat", &data);

    let mut archive = Archive::default();
    assert_eq!(archive.merge_dat_file(&path).unwrap(), 1);
    assert_eq!(archive.extract_raw("hello").unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(
        archive.extract("HELLO").unwrap(),
        Asset::Raw(vec![1, 2, 3, 4])
    );
}

#[test]
fn test_dat2_stored_entry_with_zero_packed_size() {
    let mut data = build_dat2(&[("hello", &[1, 2, 3, 4], false)]);
    // data(4) + count(4) + path length(4) + "hello"(5) + flag(1) + size(4)
    data[22..26].copy_from_slice(&0u32.to_le_bytes());

    let mut archive = Archive::default();
    let err = archive.merge_dat_reader("m", Cursor::new(data)).unwrap_err();
    assert!(err.is_format_error());
    assert!(archive.is_empty());
}

#[test]
fn test_dat2_deflate_entries() {
    let text = b"{100}{}{A rock.}\r\n".repeat(3);
    let data = build_dat2(&[
        ("TEXT\\ENGLISH\\GAME\\PRO_MISC.MSG", &text, true),
        ("DATA\\NOTES.TXT", b"plain", false),
    ]);
    let container = DatContainer::new("mem", Cursor::new(data), HandleId(0)).unwrap();
    assert_eq!(container.layout(), DatLayout::Dat2);
    let entry = container
        .entry_by_path("text/english/game/pro_misc.msg")
        .unwrap();
    assert_eq!(entry.compression, CompressionKind::Deflate);
    assert_eq!(container.extract(entry).unwrap(), text);
}

#[test]
fn test_dat1_with_lzss() {
    let data = build_dat1(&[
        (".", &[("COLOR.PAL", b"palette", false)]),
        ("ART\\CRITTERS", &[("HMJMPSAA.FRM", b"frame data", true)]),
    ]);
    let mut archive = Archive::default();
    archive.merge_dat_reader("master", Cursor::new(data)).unwrap();

    let paths: Vec<&str> = archive.iter().map(|e| e.virtual_path.as_str()).collect();
    assert_eq!(paths, vec!["art/critters/hmjmpsaa.frm", "color.pal"]);

    let entry = archive.entry("ART/CRITTERS/HMJMPSAA.FRM").unwrap();
    assert_eq!(entry.compression, CompressionKind::Lzss);
    assert_eq!(archive.extract_raw("art/critters/hmjmpsaa.frm").unwrap(), b"frame data");
    assert_eq!(archive.extract_raw("color.pal").unwrap(), b"palette");
}

#[test]
fn test_later_source_overrides() {
    let master = build_dat2(&[("a.txt", b"old", false), ("b.txt", b"keep", false)]);
    let patch = build_dat2(&[("A.TXT", b"new", false)]);

    let mut archive = Archive::default();
    archive.merge_dat_reader("master", Cursor::new(master)).unwrap();
    archive.merge_dat_reader("patch", Cursor::new(patch)).unwrap();

    assert_eq!(archive.len(), 2);
    assert_eq!(archive.sources().len(), 2);
    assert_eq!(archive.extract_raw("a.txt").unwrap(), b"new");
    assert_eq!(archive.extract_raw("b.txt").unwrap(), b"keep");
}

#[test]
fn test_entry_filters() {
    let data = build_dat2(&[
        ("text/english/dialog/sckarl.msg", b"", false),
        ("text/english/game/misc.msg", b"", false),
        ("art/intrface/intrface.lst", b"", false),
    ]);
    let mut archive = Archive::default();
    archive.merge_dat_reader("m", Cursor::new(data)).unwrap();

    assert_eq!(archive.entries(None, None).len(), 3);
    assert_eq!(archive.entries(Some(".MSG"), None).len(), 2);
    assert_eq!(archive.entries(Some(".msg"), Some("dialog")).len(), 1);
    assert_eq!(archive.entries(None, Some("intrface")).len(), 1);
    assert!(archive.entries(Some(".acm"), None).is_empty());
}

#[test]
fn test_missing_entries() {
    let archive = Archive::default();
    let err = archive.extract("nope.txt").unwrap_err();
    assert!(matches!(err, VaultError::EntryNotFound { .. }));

    let options = ExtractOptions::default().with_null_if_missing(true);
    assert!(archive.extract_with("nope.txt", &options).unwrap().is_none());
}

#[test]
fn test_auto_decode_and_raw() {
    let data = build_dat2(&[
        ("art/items/items.lst", b"KNIFE.FRM ; blade\r\nGUN.FRM\r\n", true),
        ("maps/arcaves.map", b"\x00\x01", false),
    ]);
    let mut archive = Archive::default();
    archive.merge_dat_reader("m", Cursor::new(data)).unwrap();

    let list = archive.extract("art/items/items.lst").unwrap();
    let values: Vec<&str> = list
        .as_list()
        .unwrap()
        .iter()
        .map(|e| e.value.as_str())
        .collect();
    assert_eq!(values, vec!["knife.frm", "gun.frm"]);

    let with_comments = ExtractOptions::default()
        .with_decoder(DecoderOptions::default().with_include_comments(true));
    let list = archive
        .extract_with("art/items/items.lst", &with_comments)
        .unwrap()
        .unwrap();
    assert_eq!(list.as_list().unwrap()[0].comment.as_deref(), Some("blade"));

    let raw = ExtractOptions::default().with_auto_decode(false);
    let asset = archive.extract_with("art/items/items.lst", &raw).unwrap().unwrap();
    assert!(asset.as_raw().unwrap().starts_with(b"KNIFE"));

    // no decoder for .map
    assert_eq!(
        archive.extract("maps/arcaves.map").unwrap(),
        Asset::Raw(vec![0, 1])
    );
}

#[test]
fn test_cache() {
    let data = build_dat2(&[("x.txt", b"cached", false)]);
    let mut archive = Archive::new(ArchiveOptions::default().with_use_cache(true));
    archive.merge_dat_reader("m", Cursor::new(data)).unwrap();

    assert_eq!(archive.cached_len(), 0);
    archive.extract("x.txt").unwrap();
    assert_eq!(archive.cached_len(), 1);
    archive.extract("X.TXT").unwrap();
    assert_eq!(archive.cached_len(), 1);

    let bypass = ExtractOptions::default().with_use_cache(false).with_auto_decode(false);
    archive.extract_with("x.txt", &bypass).unwrap();
    assert_eq!(archive.cached_len(), 1);

    archive.clear_cache();
    assert_eq!(archive.cached_len(), 0);
}

#[test]
fn test_extract_many() {
    let files: Vec<(String, Vec<u8>)> = (0..32)
        .map(|i| (format!("data/file{:02}.bin", i), vec![i as u8; i + 1]))
        .collect();
    let refs: Vec<(&str, &[u8], bool)> = files
        .iter()
        .map(|(p, d)| (p.as_str(), d.as_slice(), true))
        .collect();
    let mut archive = Archive::default();
    archive.merge_dat_reader("m", Cursor::new(build_dat2(&refs))).unwrap();

    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    let assets = archive
        .extract_many(&paths, &ExtractOptions::default())
        .unwrap();
    assert_eq!(assets.len(), 32);
    for (i, asset) in assets.iter().enumerate() {
        assert_eq!(asset.as_ref().unwrap().as_raw().unwrap(), &vec![i as u8; i + 1][..]);
    }

    let mut with_missing = paths.clone();
    with_missing.push("missing.bin");
    assert!(archive
        .extract_many(&with_missing, &ExtractOptions::default())
        .is_err());
}

#[test]
fn test_add_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "override.msg", b"{1}{}{Loose}\r\n");

    let mut archive = Archive::default();
    archive
        .merge_dat_reader("m", Cursor::new(build_dat2(&[("text/x.msg", b"{1}{}{Packed}", false)])))
        .unwrap();
    archive.add_file(&path, "TEXT\\X.MSG").unwrap();

    let asset = archive.extract("text/x.msg").unwrap();
    assert_eq!(asset.as_messages().unwrap()[&1].text, "Loose");
    assert!(archive.add_file(dir.path().join("absent"), "y").is_err());
}

struct Reverse;

impl AssetDecoder for Reverse {
    fn name(&self) -> &str {
        "reverse"
    }

    fn decode(&self, mut data: Vec<u8>, _options: &DecoderOptions) -> Result<Asset> {
        data.reverse();
        Ok(Asset::Raw(data))
    }
}

#[test]
fn test_register_decoder() {
    let data = build_dat2(&[("a.rev", b"abc", false)]);
    let mut archive = Archive::default();
    archive.merge_dat_reader("m", Cursor::new(data)).unwrap();
    archive.register_decoder("REV", Reverse);
    assert_eq!(archive.extract("a.rev").unwrap(), Asset::Raw(b"cba".to_vec()));
}

#[test]
fn test_lookups() {
    let data = build_dat2(&[
        ("art/critters/critters.lst", b"HMJMPS,11\r\n", false),
        ("art/critters/HMJMPSAA.FRM", b"", false),
        ("proto/items/items.lst", b"00000001.pro\r\n", false),
        ("text/english/game/proto.msg", b"{100}{}{Items}\r\n", true),
        ("text/english/game/misc.msg", b"{7}{}{Seven}\r\n{8}{}{}\r\n", false),
    ]);
    let mut archive = Archive::default();
    archive.merge_dat_reader("m", Cursor::new(data)).unwrap();

    let lookups = AssetLookups::collect(&archive).unwrap();
    assert_eq!(lookups.frm_lists.len(), 1);
    assert_eq!(
        lookups.frm_list_entry("art/critters/critters.lst", 0).unwrap().value,
        "hmjmps,11"
    );
    assert_eq!(
        lookups.proto_list_entry("PROTO/ITEMS/ITEMS.LST", 0).unwrap().value,
        "00000001.pro"
    );
    assert!(lookups.has_critter_art("hmjmpsaa.frm"));
    assert_eq!(lookups.critter_art.len(), 1);
    assert_eq!(lookups.proto_msg.as_ref().unwrap()[&100].text, "Items");

    assert_eq!(lookup_message(&archive, "misc", 7).unwrap().unwrap().text, "Seven");
    assert!(lookup_message(&archive, "misc", 8).unwrap().is_none());
    assert!(lookup_message(&archive, "misc", 9).unwrap().is_none());
    assert!(lookup_message(&archive, "nonexistent", 1).unwrap().is_none());
}

#[test]
fn test_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "junk.dat", &[0x5A; 100]);
    let mut archive = Archive::default();
    let err = archive.merge_dat_file(&path).unwrap_err();
    assert!(err.is_format_error());
    assert!(archive.is_empty());
}
