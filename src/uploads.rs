//! Text encoding of uploaded file content.
//!
//! Slots hold text only, so uploaded bytes travel as `data:` URLs with a
//! base64 payload, the same form a browser file reader produces.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const DEFAULT_MIME: &str = "application/octet-stream";

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    let mime = if mime.trim().is_empty() { DEFAULT_MIME } else { mime.trim() };
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Splits a base64 data URL into its mime type and decoded bytes.
///
/// Returns `None` for anything that is not a well-formed base64 data URL.
pub fn decode_data_url(text: &str) -> Option<(String, Vec<u8>)> {
    let rest = text.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;

    let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
    Some((mime.to_string(), bytes))
}
