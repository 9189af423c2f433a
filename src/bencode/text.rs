//! Text classification of byte strings and the raw-key literal.
//!
//! Decoded dictionaries are keyed by `String`. A key whose bytes are not
//! valid UTF-8 is stored as the literal `RawBytes[b0,b1,...]` instead, with
//! each byte written in decimal. The literal is reversible: [`parse_raw_key`]
//! recovers the bytes, and the encoder writes those bytes back to the wire.

use std::borrow::Cow;

use bytes::Bytes;

use crate::constants::{RAW_KEY_PREFIX, RAW_KEY_SEPARATOR, RAW_KEY_SUFFIX};

/// Returns `true` if `bytes` is strict UTF-8.
///
/// Overlong forms, encoded surrogates, stray continuation bytes and truncated
/// sequences are all rejected. The empty sequence is valid text.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::is_valid_text;
///
/// assert!(is_valid_text("中文".as_bytes()));
/// assert!(is_valid_text(b""));
/// assert!(!is_valid_text(&[0x80]));
/// assert!(!is_valid_text(&[0xed, 0xa0, 0x80]));
/// ```
pub fn is_valid_text(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

/// Renders bytes as a raw-key literal.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::raw_key;
///
/// assert_eq!(raw_key(&[0xff, 0x00, 0x41]), "RawBytes[255,0,65]");
/// ```
pub fn raw_key(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(RAW_KEY_PREFIX.len() + bytes.len() * 4);
    out.push_str(RAW_KEY_PREFIX);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(RAW_KEY_SEPARATOR);
        }
        out.push_str(&b.to_string());
    }
    out.push_str(RAW_KEY_SUFFIX);
    out
}

/// Parses a raw-key literal back into its bytes.
///
/// Only literals the decoder could have produced are accepted: the byte list
/// must be non-empty, every element a canonical decimal in `0..=255`, and the
/// bytes must not form valid UTF-8 (valid text is never stored as a literal).
/// Anything else returns `None` and is an ordinary text key.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::parse_raw_key;
///
/// assert_eq!(parse_raw_key("RawBytes[255,0]").as_deref(), Some(&[0xff, 0x00][..]));
/// assert_eq!(parse_raw_key("RawBytes[104,105]"), None); // "hi" is text
/// assert_eq!(parse_raw_key("plain"), None);
/// ```
pub fn parse_raw_key(key: &str) -> Option<Bytes> {
    let body = key
        .strip_prefix(RAW_KEY_PREFIX)?
        .strip_suffix(RAW_KEY_SUFFIX)?;
    if body.is_empty() {
        return None;
    }

    let mut bytes = Vec::with_capacity(body.len() / 2 + 1);
    for element in body.split(RAW_KEY_SEPARATOR) {
        bytes.push(parse_byte(element)?);
    }

    if is_valid_text(&bytes) {
        return None;
    }
    Some(Bytes::from(bytes))
}

/// Returns `true` if `key` is a raw-key literal.
pub fn is_raw_key(key: &str) -> bool {
    parse_raw_key(key).is_some()
}

/// Turns decoded key bytes into a dictionary key.
pub fn key_from_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => raw_key(bytes),
    }
}

/// Returns the bytes a dictionary key is written as on the wire.
pub fn key_to_bytes(key: &str) -> Cow<'_, [u8]> {
    match parse_raw_key(key) {
        Some(bytes) => Cow::Owned(bytes.to_vec()),
        None => Cow::Borrowed(key.as_bytes()),
    }
}

fn parse_byte(element: &str) -> Option<u8> {
    let digits = element.as_bytes();
    if digits.is_empty() || digits.len() > 3 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    // "007" would parse, but is not what raw_key writes.
    if digits.len() > 1 && digits[0] == b'0' {
        return None;
    }
    element.parse().ok()
}
