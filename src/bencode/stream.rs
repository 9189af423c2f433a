//! Reading and writing bencoded values over async byte streams.

use super::decode::{DecodeOptions, Decoder};
use super::encode::encode;
use super::error::{BencodeError, Construct};
use super::source::SliceSource;
use super::value::Value;
use crate::constants::{MAX_VALUE_SIZE, STREAM_BUFFER_CAPACITY};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// Reads successive top-level values from an async reader.
///
/// Input is buffered until it holds a complete value, which is then decoded
/// and removed from the buffer; any bytes after it stay buffered for the
/// next call.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{BencodeStream, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rbencode::bencode::BencodeError> {
/// let input: &[u8] = b"i1el4:spame";
/// let mut stream = BencodeStream::new(input);
///
/// assert_eq!(stream.read_value().await?, Some(Value::Integer(1)));
/// assert_eq!(stream.read_value().await?, Some(Value::List(vec![Value::text("spam")])));
/// assert_eq!(stream.read_value().await?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BencodeStream<R> {
    reader: R,
    read_buf: BytesMut,
    options: DecodeOptions,
    max_value_size: usize,
}

impl<R: AsyncRead + Unpin> BencodeStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    /// Creates a stream with explicit decoder options.
    ///
    /// `lenient_eof` is ignored: every value must be complete.
    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self {
            reader,
            read_buf: BytesMut::with_capacity(STREAM_BUFFER_CAPACITY),
            options: DecodeOptions {
                lenient_eof: false,
                ..options
            },
            max_value_size: MAX_VALUE_SIZE,
        }
    }

    /// Sets the largest number of bytes a single value may occupy.
    pub fn max_value_size(mut self, limit: usize) -> Self {
        self.max_value_size = limit;
        self
    }

    /// Bytes read from the reader but not yet decoded.
    pub fn buffered(&self) -> usize {
        self.read_buf.len()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads the next value.
    ///
    /// Returns `Ok(None)` when the reader reaches EOF between values.
    ///
    /// # Errors
    ///
    /// - [`BencodeError::UnexpectedEof`] if the reader ends inside a value.
    /// - [`BencodeError::ValueTooLarge`] if a value outgrows the size limit.
    /// - Any decode error for malformed input, and [`BencodeError::Io`].
    pub async fn read_value(&mut self) -> Result<Option<Value>, BencodeError> {
        loop {
            let pending = if self.read_buf.is_empty() {
                None
            } else {
                match self.try_decode() {
                    Ok(value) => return Ok(Some(value)),
                    Err(BencodeError::UnexpectedEof(construct)) => Some(construct),
                    Err(e) => return Err(e),
                }
            };

            if self.read_buf.len() >= self.max_value_size {
                return Err(BencodeError::ValueTooLarge(self.read_buf.len()));
            }

            let n = self.reader.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return match pending {
                    None => Ok(None),
                    Some(construct) => Err(BencodeError::UnexpectedEof(construct)),
                };
            }
            trace!(read = n, buffered = self.read_buf.len(), "buffered stream input");
        }
    }

    fn try_decode(&mut self) -> Result<Value, BencodeError> {
        let source = SliceSource::from_slice(&self.read_buf);
        let mut decoder = Decoder::with_options(source, self.options);
        let value = decoder
            .decode_next()?
            .ok_or(BencodeError::UnexpectedEof(Construct::Value))?;

        let consumed = decoder.position();
        self.read_buf.advance(consumed);
        debug!(consumed, kind = value.kind(), "decoded value from stream");
        Ok(value)
    }
}

/// Encodes `value` and writes it to an async writer.
pub async fn write_value<W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: &Value,
) -> Result<(), BencodeError> {
    let data = encode(value);
    writer.write_all(&data).await?;
    Ok(())
}
