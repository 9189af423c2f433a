use std::fmt;

use thiserror::Error;

/// The construct the decoder was working on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// The start of a value, before its type was known.
    Value,
    /// An `i<number>e` integer.
    Integer,
    /// The `<length>:` prefix of a byte string.
    ByteStringLength,
    /// The payload of a byte string.
    ByteString,
    /// An `l...e` list body.
    List,
    /// A `d...e` dictionary body.
    Dict,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::Value => "value",
            Construct::Integer => "integer",
            Construct::ByteStringLength => "byte string length",
            Construct::ByteString => "byte string",
            Construct::List => "list",
            Construct::Dict => "dictionary",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while encoding or decoding bencode.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// The input ended while the given construct was still incomplete.
    #[error("unexpected end of input while decoding {0}")]
    UnexpectedEof(Construct),

    /// An integer literal is not a canonical signed decimal.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// A byte string length prefix is not a canonical non-negative decimal.
    #[error("invalid string length: {0}")]
    InvalidStringLength(String),

    /// The encoder was handed a kind of value bencode cannot represent.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// The encoder was handed a value of a supported kind that breaks the
    /// format's contract, such as a non-integral number.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("trailing data after value")]
    TrailingData,

    #[error("nesting too deep")]
    NestingTooDeep,

    /// A streamed value grew past the configured frame limit.
    #[error("value too large: {0} bytes buffered")]
    ValueTooLarge(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BencodeError {
    /// Returns `true` if the error only means more input is needed.
    pub fn is_eof(&self) -> bool {
        matches!(self, BencodeError::UnexpectedEof(_))
    }
}

impl serde::ser::Error for BencodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        BencodeError::InvalidInput(msg.to_string())
    }
}
