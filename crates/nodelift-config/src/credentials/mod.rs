//! Registry credential encoding
//!
//! Credentials are never stored as plain text in the config file: the
//! username and password are URI-encoded, joined with `:` and base64-encoded,
//! which is also the format of the `_auth` key in `.npmrc`.

use base64::{engine::general_purpose, Engine as _};
use nodelift_core::error::LiftError;

use crate::ConfigResult;

/// Decoded registry credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Encode credentials for storage
pub fn encode_credentials(credentials: &Credentials) -> String {
    let joined = format!(
        "{}:{}",
        urlencoding::encode(&credentials.username),
        urlencoding::encode(&credentials.password)
    );
    general_purpose::STANDARD.encode(joined)
}

/// Decode stored credentials
pub fn decode_credentials(encoded: &str) -> ConfigResult<Credentials> {
    let invalid = |reason: String| LiftError::ConfigValidation {
        field: "auth".to_string(),
        reason,
    };

    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| invalid(format!("not valid base64: {}", e)))?;
    let text = String::from_utf8(bytes).map_err(|e| invalid(format!("not valid UTF-8: {}", e)))?;

    let (username, password) = text
        .split_once(':')
        .ok_or_else(|| invalid("expected username:password".to_string()))?;

    let decode = |part: &str| {
        urlencoding::decode(part)
            .map(|decoded| decoded.into_owned())
            .map_err(|e| invalid(format!("invalid percent-encoding: {}", e)))
    };

    Ok(Credentials {
        username: decode(username)?,
        password: decode(password)?,
    })
}
