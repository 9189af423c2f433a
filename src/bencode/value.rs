use bytes::Bytes;
use std::collections::BTreeMap;

use super::text::key_from_bytes;

/// The payload of a bencode byte string.
///
/// The wire format does not say whether a byte string holds text. The decoder
/// decides once, when the string is read: strict UTF-8 becomes
/// [`ByteString::Text`], anything else stays [`ByteString::Raw`]. Both are
/// accepted by the encoder and written identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ByteString {
    /// A byte string that is valid UTF-8.
    Text(String),
    /// A byte string kept as raw bytes.
    Raw(Bytes),
}

impl ByteString {
    /// Classifies decoded bytes as text or raw.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::bencode::ByteString;
    /// use bytes::Bytes;
    ///
    /// assert!(ByteString::classify(Bytes::from_static(b"spam")).is_text());
    /// assert!(!ByteString::classify(Bytes::from_static(&[0xff])).is_text());
    /// ```
    pub fn classify(bytes: Bytes) -> Self {
        match std::str::from_utf8(&bytes) {
            Ok(text) => ByteString::Text(text.to_owned()),
            Err(_) => ByteString::Raw(bytes),
        }
    }

    /// Returns the bytes written on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ByteString::Text(s) => s.as_bytes(),
            ByteString::Raw(b) => b,
        }
    }

    /// Returns the text, if this byte string was classified as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ByteString::Text(s) => Some(s),
            ByteString::Raw(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ByteString::Text(_))
    }

    /// Length in bytes, which is what the length prefix records.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            ByteString::Text(s) => Bytes::from(s),
            ByteString::Raw(b) => b,
        }
    }

    /// Converts the byte string into a dictionary key.
    ///
    /// Raw bytes that are not UTF-8 become a raw-key literal.
    pub fn into_key(self) -> String {
        match self {
            ByteString::Text(s) => s,
            ByteString::Raw(b) => key_from_bytes(&b),
        }
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        ByteString::Text(s.to_owned())
    }
}

impl From<String> for ByteString {
    fn from(s: String) -> Self {
        ByteString::Text(s)
    }
}

impl From<Bytes> for ByteString {
    fn from(b: Bytes) -> Self {
        ByteString::Raw(b)
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(b: Vec<u8>) -> Self {
        ByteString::Raw(Bytes::from(b))
    }
}

/// A bencode value.
///
/// Bencode has four data types: integers, byte strings, lists, and
/// dictionaries. Dictionary keys are strings; keys whose bytes are not UTF-8
/// are stored in their raw-key literal form (see [`raw_key`](super::raw_key)).
///
/// # Examples
///
/// ```
/// use rbencode::bencode::Value;
///
/// let int: Value = 42i64.into();
/// let text: Value = "hello".into();
/// let list = Value::List(vec![int.clone(), text.clone()]);
///
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(text.as_str(), Some("hello"));
/// assert_eq!(list.as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A length-prefixed byte string, classified as text or raw.
    ByteString(ByteString),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary. Encoding always writes keys in raw byte order.
    Dict(BTreeMap<String, Value>),
}

impl Value {
    /// Creates a text byte string.
    pub fn text(s: impl Into<String>) -> Self {
        Value::ByteString(ByteString::Text(s.into()))
    }

    /// Creates a raw byte string, bypassing classification.
    pub fn raw(b: impl Into<Bytes>) -> Self {
        Value::ByteString(ByteString::Raw(b.into()))
    }

    /// Name of this value's category, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::ByteString(_) => "byte string",
            Value::Integer(_) => "integer",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_byte_string(&self) -> Option<&ByteString> {
        match self {
            Value::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the raw bytes of a byte string, text or not.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::bencode::Value;
    ///
    /// assert_eq!(Value::text("hi").as_bytes(), Some(&b"hi"[..]));
    /// assert_eq!(Value::raw(vec![0xffu8]).as_bytes(), Some(&[0xff][..]));
    /// assert_eq!(Value::Integer(1).as_bytes(), None);
    /// ```
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.as_byte_string().map(ByteString::as_bytes)
    }

    /// Returns the text of a byte string that was classified as text.
    pub fn as_str(&self) -> Option<&str> {
        self.as_byte_string().and_then(ByteString::as_str)
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    pub fn into_dict(self) -> Option<BTreeMap<String, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::bencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap();
    /// assert_eq!(value.get("foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get("missing"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?.get(key)
    }

    /// Looks up a key by its wire bytes, whether or not they are UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::bencode::decode;
    ///
    /// let value = decode(b"d1:\xffi1ee").unwrap();
    /// assert_eq!(value.get_bytes(&[0xff]).and_then(|v| v.as_integer()), Some(1));
    /// ```
    pub fn get_bytes(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(&key_from_bytes(key))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::raw(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::raw(b)
    }
}

impl From<ByteString> for Value {
    fn from(b: ByteString) -> Self {
        Value::ByteString(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(d: BTreeMap<String, Value>) -> Self {
        Value::Dict(d)
    }
}
