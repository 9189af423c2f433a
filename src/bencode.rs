//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files and tracker
//! responses.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Text and raw byte strings
//!
//! A byte string may hold text or arbitrary binary data (piece hashes,
//! compact peer lists). The decoder classifies each one when it is read: if
//! the bytes are strict UTF-8 the value is [`ByteString::Text`], otherwise
//! [`ByteString::Raw`]. [`DecodeOptions::raw_strings`] turns classification
//! off for values.
//!
//! Dictionary keys are `String`s. A key that is not UTF-8 is stored as a
//! raw-key literal such as `RawBytes[255,0,65]`; [`parse_raw_key`] turns it
//! back into bytes and the encoder writes those bytes, not the literal.
//!
//! # Examples
//!
//! ## Decoding bencode data
//!
//! ```
//! use rbencode::bencode::{decode, Value};
//!
//! let value = decode(b"i42e").unwrap();
//! assert_eq!(value.as_integer(), Some(42));
//!
//! let value = decode(b"4:spam").unwrap();
//! assert_eq!(value.as_str(), Some("spam"));
//!
//! let value = decode(b"l4:spami42ee").unwrap();
//! assert_eq!(value.as_list().map(|l| l.len()), Some(2));
//!
//! let value = decode(b"d3:foo3:bare").unwrap();
//! assert_eq!(value.get("foo").and_then(|v| v.as_str()), Some("bar"));
//! ```
//!
//! ## Encoding bencode data
//!
//! ```
//! use rbencode::bencode::{encode, Value};
//! use std::collections::BTreeMap;
//!
//! let mut info = BTreeMap::new();
//! info.insert("name".to_string(), Value::text("example.txt"));
//! info.insert("piece length".to_string(), Value::Integer(16384));
//! info.insert("length".to_string(), Value::Integer(1024));
//!
//! let encoded = encode(&Value::Dict(info));
//! assert_eq!(
//!     encoded,
//!     b"d6:lengthi1024e4:name11:example.txt12:piece lengthi16384ee"
//! );
//! ```
//!
//! # Error Handling
//!
//! - [`BencodeError::UnexpectedEof`] - Input ended inside a value
//! - [`BencodeError::InvalidInteger`] - Malformed integer (e.g., leading zeros)
//! - [`BencodeError::InvalidStringLength`] - Malformed byte string length
//! - [`BencodeError::NestingTooDeep`] - Recursion limit exceeded
//! - [`BencodeError::TrailingData`] - Extra data after the value
//! - [`BencodeError::UnsupportedValue`] / [`BencodeError::InvalidInput`] -
//!   Serialized data bencode cannot represent (see [`to_value`])
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod ser;
mod source;
mod stream;
mod text;
mod value;

pub use decode::{
    decode, decode_bytes, decode_bytes_with, decode_reader, decode_with, DecodeOptions, Decoder,
};
pub use encode::{encode, encode_into, encode_to};
pub use error::{BencodeError, Construct};
pub use ser::{to_bytes, to_value, ValueSerializer};
pub use source::{ByteSource, ReadSource, SliceSource};
pub use stream::{write_value, BencodeStream};
pub use text::{is_raw_key, is_valid_text, key_from_bytes, key_to_bytes, parse_raw_key, raw_key};
pub use value::{ByteString, Value};

#[cfg(test)]
mod tests;
