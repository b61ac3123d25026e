//! Static HTTP Basic credential check

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use subtle::ConstantTimeEq;

/// Username/password table loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct BasicAuthGuard {
    credentials: HashMap<String, String>,
}

impl BasicAuthGuard {
    pub fn new(credentials: HashMap<String, String>) -> Self {
        Self { credentials }
    }

    /// Check a username/password pair against the table
    ///
    /// Empty input is rejected before any lookup; unknown users fail closed.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        self.credentials
            .get(username)
            .is_some_and(|expected| ct_eq(password.as_bytes(), expected.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

/// Constant-time comparison of two byte slices
fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}

/// Decode an `Authorization: Basic ...` header value into (username, password)
pub fn parse_basic_header(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
