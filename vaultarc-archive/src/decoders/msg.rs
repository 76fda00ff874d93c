//! MSG message files.
//!
//! Each message is three brace-delimited fields, `{index}{sound}{text}`,
//! optionally followed by a comment that runs to the end of the line.

use super::{Asset, AssetDecoder, DecoderOptions};
use std::collections::BTreeMap;
use vaultarc_core::error::{Result, VaultError};

/// One message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Message text.
    pub text: String,
    /// Lower-cased speech file name, if any.
    pub sound: Option<String>,
    /// Trailing comment, if any.
    pub comment: Option<String>,
}

/// Messages keyed by index.
pub type MessageTable = BTreeMap<i64, Message>;

/// Decode a message file.
pub fn decode_msg(data: &[u8]) -> Result<MessageTable> {
    let text = String::from_utf8_lossy(data);
    let mut table = MessageTable::new();
    let mut offset = 0;

    loop {
        let mut fields = [""; 3];
        for field in &mut fields {
            let Some(open) = text[offset..].find('{').map(|p| p + offset) else {
                return Ok(table);
            };
            let close = text[open + 1..]
                .find('}')
                .map(|p| p + open + 1)
                .ok_or_else(|| VaultError::corrupted(open as u64, "unterminated '{' in MSG"))?;
            *field = text[open + 1..close].trim();
            offset = close;
        }

        let rest = &text[offset + 1..];
        let comment = rest.find("\r\n").map_or(rest, |end| &rest[..end]).trim();

        let [index, sound, message] = fields;
        let index: i64 = index.parse().map_err(|_| {
            VaultError::corrupted(offset as u64, format!("invalid MSG index '{}'", index))
        })?;
        table.insert(
            index,
            Message {
                text: message.to_string(),
                sound: (!sound.is_empty()).then(|| sound.to_lowercase()),
                comment: (!comment.is_empty()).then(|| comment.to_string()),
            },
        );
    }
}

/// [`AssetDecoder`] for `.msg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgDecoder;

impl AssetDecoder for MsgDecoder {
    fn name(&self) -> &str {
        "MSG"
    }

    fn decode(&self, data: Vec<u8>, _options: &DecoderOptions) -> Result<Asset> {
        Ok(Asset::Messages(decode_msg(&data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let data = b"{100}{}{You see a rock.}\r\n{101}{NAR_01}{Hello}  # speech\r\n";
        let table = decode_msg(data).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&100].text, "You see a rock.");
        assert_eq!(table[&100].sound, None);
        assert_eq!(table[&100].comment, None);
        assert_eq!(table[&101].sound.as_deref(), Some("nar_01"));
        assert_eq!(table[&101].comment.as_deref(), Some("# speech"));
    }

    #[test]
    fn test_multiline_message() {
        let data = b"{1}{}{line one\r\nline two}";
        let table = decode_msg(data).unwrap();
        assert_eq!(table[&1].text, "line one\r\nline two");
    }

    #[test]
    fn test_comment_at_end_of_file() {
        let table = decode_msg(b"{5}{}{x} tail").unwrap();
        assert_eq!(table[&5].comment.as_deref(), Some("tail"));
    }

    #[test]
    fn test_unterminated_brace() {
        let err = decode_msg(b"{1}{}{never closed").unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_bad_index() {
        assert!(decode_msg(b"{abc}{}{x}").is_err());
    }

    #[test]
    fn test_incomplete_triple_ignored() {
        let table = decode_msg(b"{1}{}{a}\r\n{2}").unwrap();
        assert_eq!(table.len(), 1);
    }
}
