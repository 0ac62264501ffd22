//! Response shapes consumed from the code search API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

/// One page of code search results.
#[derive(Debug, Default, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub items: Vec<ResultItem>,
}

/// A search hit. `url` points at the file's contents resource.
#[derive(Clone, Debug, Deserialize)]
pub struct ResultItem {
    pub url: String,
}

/// Body of a contents resource.
#[derive(Debug, Deserialize)]
pub struct FileContent {
    #[serde(default)]
    pub content: String,
}

impl FileContent {
    /// Decode the base64 payload.
    ///
    /// GitHub wraps the encoded content at 60 columns, so line breaks inside
    /// the payload are dropped along with the surrounding whitespace.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let joined: String = self
            .content
            .trim()
            .chars()
            .filter(|c| !matches!(c, '\n' | '\r'))
            .collect();
        STANDARD.decode(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(value: &str) -> FileContent {
        FileContent {
            content: value.to_string(),
        }
    }

    #[test]
    fn decodes_after_trimming() {
        assert_eq!(content(" aGVsbG8=\n").decode().unwrap(), b"hello");
    }

    #[test]
    fn decodes_wrapped_payload() {
        assert_eq!(content("aGVs\nbG8g\r\nd29y\nbGQ=\n").decode().unwrap(), b"hello world");
    }

    #[test]
    fn rejects_invalid_payload() {
        assert!(content("not base64!").decode().is_err());
    }

    #[test]
    fn missing_content_decodes_to_nothing() {
        let file: FileContent = serde_json::from_str(r#"{"name": "empty.txt"}"#).unwrap();
        assert!(file.decode().unwrap().is_empty());
    }

    #[test]
    fn envelope_without_items_is_empty() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"total_count": 0, "incomplete_results": false}"#).unwrap();
        assert!(envelope.items.is_empty());
    }

    #[test]
    fn envelope_ignores_extra_fields() {
        let envelope: SearchEnvelope = serde_json::from_str(
            r#"{"items": [{"name": "a.rs", "url": "https://api.github.com/repos/o/r/contents/a.rs", "sha": "abc"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.items.len(), 1);
        assert_eq!(envelope.items[0].url, "https://api.github.com/repos/o/r/contents/a.rs");
    }
}
