//! Cache identifiers derived from continuation tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::wiki::types::ContinuationToken;

/// Identifier used for the first page, which has no continuation token.
pub const HEAD_IDENTIFIER: &str = "head";

/// Map a continuation token (or none, for the first page) to its cache identifier.
///
/// Tokens are encoded as unpadded base64url, which is filesystem safe and
/// injective. No token can encode to `"head"`: decoding it yields bytes that
/// are not valid UTF-8.
pub fn identifier_for(token: Option<&ContinuationToken>) -> String {
  match token {
    None => HEAD_IDENTIFIER.to_string(),
    Some(token) => URL_SAFE_NO_PAD.encode(token.as_str().as_bytes()),
  }
}

/// Inverse of [`identifier_for`].
///
/// Returns `Some(None)` for the head identifier, `Some(Some(token))` for a
/// valid token encoding and `None` for anything else.
pub fn token_for(identifier: &str) -> Option<Option<ContinuationToken>> {
  if identifier == HEAD_IDENTIFIER {
    return Some(None);
  }

  let bytes = URL_SAFE_NO_PAD.decode(identifier).ok()?;
  let token = String::from_utf8(bytes).ok()?;
  Some(Some(ContinuationToken::new(token)))
}
