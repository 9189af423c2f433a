use super::error::{BencodeError, Construct};
use super::source::{ByteSource, ReadSource, SliceSource};
use super::text::key_from_bytes;
use super::value::{ByteString, Value};
use crate::constants::{MAX_DEPTH, MAX_LITERAL_LEN};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::trace;

/// Decoder settings.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{decode_with, DecodeOptions};
///
/// let options = DecodeOptions::new().raw_strings();
/// let value = decode_with(b"4:spam", &options).unwrap();
/// assert_eq!(value.as_str(), None);
/// assert_eq!(value.as_bytes(), Some(&b"spam"[..]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep every byte-string value as raw bytes instead of classifying it.
    /// Dictionary keys are always classified.
    pub raw_strings: bool,
    /// Maximum number of nested lists and dictionaries.
    pub max_depth: usize,
    /// Treat end of input inside a list or dictionary as its terminator.
    pub lenient_eof: bool,
    /// Ignore bytes after the first value in the whole-buffer helpers.
    pub allow_trailing: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            raw_strings: false,
            max_depth: MAX_DEPTH,
            lenient_eof: false,
            allow_trailing: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_strings(mut self) -> Self {
        self.raw_strings = true;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn lenient_eof(mut self) -> Self {
        self.lenient_eof = true;
        self
    }

    pub fn allow_trailing(mut self) -> Self {
        self.allow_trailing = true;
        self
    }
}

/// A recursive-descent bencode decoder over a [`ByteSource`].
///
/// Each call to [`decode_next`](Decoder::decode_next) reads one complete
/// value and leaves the cursor just past it, so a source holding several
/// concatenated values can be drained value by value.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{Decoder, SliceSource, Value};
///
/// let mut decoder = Decoder::new(SliceSource::from_slice(b"i1e4:spam"));
/// assert_eq!(decoder.decode_next().unwrap(), Some(Value::Integer(1)));
/// assert_eq!(decoder.decode_next().unwrap(), Some(Value::text("spam")));
/// assert_eq!(decoder.decode_next().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    options: DecodeOptions,
}

impl<S: ByteSource> Decoder<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, DecodeOptions::default())
    }

    pub fn with_options(source: S, options: DecodeOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Number of bytes consumed from the source so far.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Decodes the next value.
    ///
    /// Returns `Ok(None)` if the source is exhausted before the value starts.
    ///
    /// # Errors
    ///
    /// Fails on malformed input or if the source ends inside a value. Bytes
    /// consumed before the failure stay consumed.
    pub fn decode_next(&mut self) -> Result<Option<Value>, BencodeError> {
        self.decode_value(0)
    }

    fn decode_value(&mut self, depth: usize) -> Result<Option<Value>, BencodeError> {
        let Some(head) = self.source.peek()? else {
            trace!(position = self.position(), "end of input");
            return Ok(None);
        };

        let value = match head {
            b'i' => {
                self.source.read_byte()?;
                self.decode_integer()?
            }
            b'l' => {
                self.source.read_byte()?;
                self.decode_list(depth)?
            }
            b'd' => {
                self.source.read_byte()?;
                self.decode_dict(depth)?
            }
            // Anything else should be the first digit of a length prefix.
            _ => {
                let bytes = self.decode_byte_string()?;
                if self.options.raw_strings {
                    Value::ByteString(ByteString::Raw(bytes))
                } else {
                    Value::ByteString(ByteString::classify(bytes))
                }
            }
        };
        Ok(Some(value))
    }

    fn decode_integer(&mut self) -> Result<Value, BencodeError> {
        let literal = self.read_until(b'e', Construct::Integer)?;
        let value = parse_integer(&literal)?;
        trace!(value, "decoded integer");
        Ok(Value::Integer(value))
    }

    fn decode_byte_string(&mut self) -> Result<Bytes, BencodeError> {
        let literal = self.read_until(b':', Construct::ByteStringLength)?;
        let len = parse_length(&literal)?;
        let bytes = self
            .source
            .read_exact(len)?
            .ok_or(BencodeError::UnexpectedEof(Construct::ByteString))?;
        trace!(len, "decoded byte string");
        Ok(bytes)
    }

    fn decode_list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.enter(depth)?;
        let mut list = Vec::new();

        while self.more(Construct::List)? {
            let item = self
                .decode_value(depth + 1)?
                .ok_or(BencodeError::UnexpectedEof(Construct::List))?;
            list.push(item);
        }

        trace!(len = list.len(), "decoded list");
        Ok(Value::List(list))
    }

    fn decode_dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.enter(depth)?;
        let mut dict = BTreeMap::new();

        while self.more(Construct::Dict)? {
            let key = key_from_bytes(&self.decode_byte_string()?);
            let value = self
                .decode_value(depth + 1)?
                .ok_or(BencodeError::UnexpectedEof(Construct::Dict))?;
            trace!(key = %key, "decoded dictionary entry");
            dict.insert(key, value);
        }

        trace!(len = dict.len(), "decoded dictionary");
        Ok(Value::Dict(dict))
    }

    fn enter(&self, depth: usize) -> Result<(), BencodeError> {
        if depth >= self.options.max_depth {
            return Err(BencodeError::NestingTooDeep);
        }
        Ok(())
    }

    /// Returns `false` once the container body ends, consuming its `e`.
    fn more(&mut self, container: Construct) -> Result<bool, BencodeError> {
        match self.source.peek()? {
            Some(b'e') => {
                self.source.read_byte()?;
                Ok(false)
            }
            Some(_) => Ok(true),
            None if self.options.lenient_eof => {
                trace!(%container, "input ended inside container, closing it");
                Ok(false)
            }
            None => Err(BencodeError::UnexpectedEof(container)),
        }
    }

    /// Reads up to `stop`, consuming it but not returning it.
    fn read_until(&mut self, stop: u8, construct: Construct) -> Result<Vec<u8>, BencodeError> {
        let mut literal = Vec::new();
        loop {
            match self.source.read_byte()? {
                None => return Err(BencodeError::UnexpectedEof(construct)),
                Some(b) if b == stop => return Ok(literal),
                Some(b) => {
                    literal.push(b);
                    if literal.len() > MAX_LITERAL_LEN {
                        return Err(invalid_literal(construct, &literal, "too long"));
                    }
                }
            }
        }
    }
}

/// Decodes a single value from a byte slice.
///
/// The whole slice must be one value: empty input is
/// [`BencodeError::UnexpectedEof`] and extra bytes are
/// [`BencodeError::TrailingData`].
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{decode, Value};
///
/// assert_eq!(decode(b"i-123e").unwrap(), Value::Integer(-123));
/// assert_eq!(decode(b"5:hello").unwrap(), Value::text("hello"));
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    decode_with(data, &DecodeOptions::default())
}

/// Decodes a single value from a byte slice with explicit options.
pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<Value, BencodeError> {
    decode_bytes_with(Bytes::copy_from_slice(data), options)
}

/// Decodes a single value from a shared buffer.
///
/// Raw byte strings in the result are slices of `data`, not copies.
pub fn decode_bytes(data: Bytes) -> Result<Value, BencodeError> {
    decode_bytes_with(data, &DecodeOptions::default())
}

pub fn decode_bytes_with(data: Bytes, options: &DecodeOptions) -> Result<Value, BencodeError> {
    let mut decoder = Decoder::with_options(SliceSource::new(data), *options);
    let value = decoder
        .decode_next()?
        .ok_or(BencodeError::UnexpectedEof(Construct::Value))?;

    if !options.allow_trailing && decoder.source.remaining() > 0 {
        return Err(BencodeError::TrailingData);
    }

    Ok(value)
}

/// Decodes the next value from a buffered reader.
///
/// Only the bytes of that value are consumed; pass `&mut reader` to keep
/// reading afterwards. Returns `Ok(None)` if the reader is already at EOF.
pub fn decode_reader<R: BufRead>(
    reader: R,
    options: &DecodeOptions,
) -> Result<Option<Value>, BencodeError> {
    Decoder::with_options(ReadSource::new(reader), *options).decode_next()
}

/// Parses `-?(0|[1-9][0-9]*)` into an `i64`.
///
/// `-0` and leading zeros are rejected so that every integer has exactly one
/// encoding.
fn parse_integer(literal: &[u8]) -> Result<i64, BencodeError> {
    let digits = literal.strip_prefix(b"-").unwrap_or(literal);

    if digits.is_empty() {
        return Err(invalid_literal(Construct::Integer, literal, "empty"));
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid_literal(Construct::Integer, literal, "not a number"));
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(invalid_literal(Construct::Integer, literal, "leading zeros"));
    }
    if literal == b"-0" {
        return Err(invalid_literal(Construct::Integer, literal, "negative zero"));
    }

    // All ASCII by now.
    let text = String::from_utf8_lossy(literal);
    text.parse()
        .map_err(|_| invalid_literal(Construct::Integer, literal, "out of range"))
}

/// Parses `0|[1-9][0-9]*` into a byte count.
fn parse_length(literal: &[u8]) -> Result<usize, BencodeError> {
    if literal.is_empty() {
        return Err(invalid_literal(Construct::ByteStringLength, literal, "empty"));
    }
    if !literal.iter().all(u8::is_ascii_digit) {
        return Err(invalid_literal(
            Construct::ByteStringLength,
            literal,
            "not a number",
        ));
    }
    if literal.len() > 1 && literal[0] == b'0' {
        return Err(invalid_literal(
            Construct::ByteStringLength,
            literal,
            "leading zeros",
        ));
    }

    String::from_utf8_lossy(literal)
        .parse()
        .map_err(|_| invalid_literal(Construct::ByteStringLength, literal, "out of range"))
}

fn invalid_literal(construct: Construct, literal: &[u8], reason: &str) -> BencodeError {
    let message = format!("{:?} ({})", String::from_utf8_lossy(literal), reason);
    match construct {
        Construct::Integer => BencodeError::InvalidInteger(message),
        _ => BencodeError::InvalidStringLength(message),
    }
}
