//! rbencode - Bencode for BitTorrent metadata
//!
//! Converts between bencoded bytes and an in-memory [`Value`] tree.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding, cursors, async streams
//! - [`constants`] - Decoder limits and raw-key literal syntax

pub mod bencode;
pub mod constants;

pub use bencode::{
    decode, encode, is_valid_text, parse_raw_key, raw_key, to_bytes, to_value, BencodeError,
    BencodeStream, ByteString, DecodeOptions, Decoder, Value,
};
