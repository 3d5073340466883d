//! Credential normalization
//!
//! Users paste the provider key either percent-encoded (as shown on the
//! provider portal) or decoded. Internally the key is kept decoded and is
//! encoded exactly once when the request URL is built.

use std::borrow::Cow;
use std::fmt;

use crate::models::QueryError;

/// Percent-decode a credential.
///
/// Decoding a string with no escapes is a no-op. If the escapes do not decode
/// to valid UTF-8 the input is returned unchanged.
pub fn normalize(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// How the credential is placed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialEncoding {
    /// Decode the input, then percent-encode once when building the URL
    #[default]
    Decoded,
    /// Pass the input through untouched
    Verbatim,
}

/// A credential ready for request construction
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    encoding: CredentialEncoding,
}

impl Credential {
    /// Resolve user input into a credential. Surrounding whitespace is
    /// dropped; an empty key is a configuration error.
    pub fn resolve(raw: &str, encoding: CredentialEncoding) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::MissingCredential);
        }

        let value = match encoding {
            CredentialEncoding::Decoded => normalize(trimmed),
            CredentialEncoding::Verbatim => trimmed.to_string(),
        };

        Ok(Self { value, encoding })
    }

    pub fn encoding(&self) -> CredentialEncoding {
        self.encoding
    }

    /// The credential as it must appear in the query string
    pub fn query_value(&self) -> Cow<'_, str> {
        match self.encoding {
            CredentialEncoding::Decoded => urlencoding::encode(&self.value),
            CredentialEncoding::Verbatim => Cow::Borrowed(&self.value),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &crate::constants::REDACTED)
            .field("encoding", &self.encoding)
            .finish()
    }
}
