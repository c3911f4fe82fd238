//! Version tokens and their hex wire form

use thiserror::Error;

/// A version token that could not be decoded
#[derive(Debug, Error, PartialEq)]
#[error("invalid version token {input:?}: {source}")]
pub struct TokenError {
    pub input: String,
    #[source]
    pub source: hex::FromHexError,
}

/// Opaque revision stamp of a record
///
/// Tokens are only compared and round-tripped, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(Vec<u8>);

impl VersionToken {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode the external hex form, `0x` prefix optional
    ///
    /// An empty string (or a bare prefix) is an absent token and decodes to
    /// `None`. Anything that is not valid hex is an error, never `None`.
    pub fn parse(input: &str) -> Result<Option<Self>, TokenError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);

        if digits.is_empty() {
            return Ok(None);
        }

        hex::decode(digits)
            .map(|bytes| Some(Self(bytes)))
            .map_err(|source| TokenError {
                input: input.to_string(),
                source,
            })
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
