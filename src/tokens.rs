use std::fmt;
use std::ops::Deref;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::{Error, Result};

/// A bearer credential, kept exactly as it appeared in the token file.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Token(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(****)")
    }
}

/// Ordered, non-empty set of tokens. Order is the rotation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenList(Vec<Token>);

impl TokenList {
    /// Wraps `tokens`, rejecting an empty list.
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(Error::NoTokens);
        }
        Ok(TokenList(tokens))
    }
}

impl Deref for TokenList {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Read one token per line from `path`.
///
/// Only the line terminator is stripped. Blank lines, duplicates and stray
/// whitespace all survive as literal tokens.
pub async fn load_tokens(path: impl AsRef<Path>) -> Result<Vec<Token>> {
    let path = path.as_ref();
    let io_error = |source: std::io::Error| Error::TokenFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(io_error)?;
    let mut lines = BufReader::new(file).lines();
    let mut tokens = Vec::new();

    while let Some(line) = lines.next_line().await.map_err(io_error)? {
        tokens.push(Token::new(line));
    }

    debug!("Loaded {} tokens from {}", tokens.len(), path.display());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn token_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::as_str).collect()
    }

    #[tokio::test]
    async fn keeps_file_order() {
        let file = token_file("A\nB\nC\n");
        let tokens = load_tokens(file.path()).await.unwrap();
        assert_eq!(values(&tokens), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn keeps_duplicates_and_whitespace() {
        let file = token_file("A\n B \nA\nC\t");
        let tokens = load_tokens(file.path()).await.unwrap();
        assert_eq!(values(&tokens), ["A", " B ", "A", "C\t"]);
    }

    #[tokio::test]
    async fn keeps_blank_lines_and_strips_crlf() {
        let file = token_file("A\r\n\r\nB\r\n");
        let tokens = load_tokens(file.path()).await.unwrap();
        assert_eq!(values(&tokens), ["A", "", "B"]);
    }

    #[tokio::test]
    async fn empty_file_loads_no_tokens() {
        let file = token_file("");
        let tokens = load_tokens(file.path()).await.unwrap();
        assert!(tokens.is_empty());
        assert!(matches!(TokenList::new(tokens), Err(Error::NoTokens)));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        match load_tokens(&path).await {
            Err(Error::TokenFile { path: reported, source }) => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected TokenFile error, got {:?}", other),
        }
    }

    #[test]
    fn debug_hides_the_secret() {
        let token = Token::new("ghp_secret");
        assert!(!format!("{:?}", token).contains("ghp_secret"));
    }
}
