use super::error::BencodeError;
use super::text::key_to_bytes;
use super::value::Value;
use bytes::BufMut;
use std::borrow::Cow;
use std::io::Write;

/// Encodes a bencode value to a byte vector.
///
/// The output is canonical:
/// - Integers: `i<number>e`
/// - Byte strings: `<length>:<data>`, the length counted in bytes
/// - Lists: `l<items>e`, items in order
/// - Dictionaries: `d<key><value>...e`, keys sorted by their raw bytes
///
/// Raw-key literals are written as the bytes they stand for, so decoding and
/// re-encoding a canonical input reproduces it exactly.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{encode, Value};
/// use std::collections::BTreeMap;
///
/// assert_eq!(encode(&Value::Integer(42)), b"i42e");
/// assert_eq!(encode(&Value::text("hello")), b"5:hello");
///
/// let list = Value::List(vec![Value::Integer(1), Value::text("two")]);
/// assert_eq!(encode(&list), b"li1e3:twoe");
///
/// let mut dict = BTreeMap::new();
/// dict.insert("b".to_string(), Value::Integer(2));
/// dict.insert("a".to_string(), Value::Integer(1));
/// assert_eq!(encode(&Value::Dict(dict)), b"d1:ai1e1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

/// Appends the encoding of `value` to `buf`.
pub fn encode_into<B: BufMut>(value: &Value, buf: &mut B) {
    match value {
        Value::Integer(i) => {
            buf.put_u8(b'i');
            buf.put_slice(i.to_string().as_bytes());
            buf.put_u8(b'e');
        }
        Value::ByteString(s) => put_byte_string(buf, s.as_bytes()),
        Value::List(l) => {
            buf.put_u8(b'l');
            for item in l {
                encode_into(item, buf);
            }
            buf.put_u8(b'e');
        }
        Value::Dict(d) => {
            // `String` order and raw byte order differ once raw-key literals
            // are involved, so sort on the wire bytes.
            let mut entries: Vec<(Cow<'_, [u8]>, &Value)> =
                d.iter().map(|(k, v)| (key_to_bytes(k), v)).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            buf.put_u8(b'd');
            for (key, val) in entries {
                put_byte_string(buf, &key);
                encode_into(val, buf);
            }
            buf.put_u8(b'e');
        }
    }
}

/// Encodes `value` into a writer.
///
/// # Errors
///
/// Returns [`BencodeError::Io`] if the writer fails.
pub fn encode_to<W: Write>(value: &Value, writer: &mut W) -> Result<(), BencodeError> {
    writer.write_all(&encode(value))?;
    Ok(())
}

fn put_byte_string<B: BufMut>(buf: &mut B, bytes: &[u8]) {
    buf.put_slice(bytes.len().to_string().as_bytes());
    buf.put_u8(b':');
    buf.put_slice(bytes);
}
