//! LST list files: one entry per CRLF-terminated line, `;` starts a comment.

use super::{Asset, AssetDecoder, DecoderOptions};
use vaultarc_core::error::Result;

/// One line of a list file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListEntry {
    /// Trimmed, lower-cased text before any `;`.
    pub value: String,
    /// Trimmed, lower-cased comment; only kept when requested.
    pub comment: Option<String>,
}

/// Decode a list file.
pub fn decode_lst(data: &[u8], include_comments: bool) -> Vec<ListEntry> {
    let text = String::from_utf8_lossy(data);
    let mut entries: Vec<ListEntry> = text
        .split("\r\n")
        .map(|line| {
            let (value, comment) = match line.find(';') {
                Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
                None => (line, None),
            };
            ListEntry {
                value: value.trim().to_lowercase(),
                comment: comment
                    .filter(|_| include_comments)
                    .map(|c| c.trim().to_lowercase()),
            }
        })
        .collect();

    if entries
        .last()
        .is_some_and(|e| e.value.is_empty() && e.comment.is_none())
    {
        entries.pop();
    }
    entries
}

/// [`AssetDecoder`] for `.lst`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LstDecoder;

impl AssetDecoder for LstDecoder {
    fn name(&self) -> &str {
        "LST"
    }

    fn decode(&self, data: Vec<u8>, options: &DecoderOptions) -> Result<Asset> {
        Ok(Asset::List(decode_lst(&data, options.include_comments)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_and_trailing_line() {
        let list = decode_lst(b"HMJMPSAA.FRM\r\n  Misc.FRM ; a comment\r\n", false);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].value, "hmjmpsaa.frm");
        assert_eq!(list[1].value, "misc.frm");
        assert_eq!(list[1].comment, None);
    }

    #[test]
    fn test_comments_kept() {
        let list = decode_lst(b"a.frm ; First ONE\r\nb.frm", true);
        assert_eq!(list[0].comment.as_deref(), Some("first one"));
        assert_eq!(list[1].value, "b.frm");
        assert_eq!(list[1].comment, None);
    }

    #[test]
    fn test_blank_lines_inside_kept() {
        let list = decode_lst(b"a\r\n\r\nb\r\n", false);
        let values: Vec<_> = list.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(decode_lst(b"", false).is_empty());
    }
}
