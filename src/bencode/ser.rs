//! Conversion of arbitrary [`Serialize`] data into bencode.
//!
//! Bencode has no booleans, no null and no floating point. Those are rejected
//! here with [`BencodeError::UnsupportedValue`], and numbers that cannot be a
//! bencode integer (fractional, non-finite or out of `i64` range) with
//! [`BencodeError::InvalidInput`]. A float with no fractional part is accepted
//! as the integer it equals.
//!
//! Enums use the externally tagged layout: a unit variant is its name, any
//! other variant is a one-entry dictionary from its name to its content.

use std::collections::BTreeMap;
use std::fmt::Display;

use bytes::Bytes;
use serde::ser::{self, Serialize, SerializeMap as _, SerializeSeq as _, Serializer as _};

use super::encode::encode;
use super::error::BencodeError;
use super::value::{ByteString, Value};

/// Converts `value` into a bencode [`Value`].
///
/// # Examples
///
/// ```
/// use rbencode::bencode::{to_value, BencodeError, Value};
///
/// assert_eq!(to_value(&42u8).unwrap(), Value::Integer(42));
/// assert_eq!(to_value(&3.0f64).unwrap(), Value::Integer(3));
/// assert!(matches!(to_value(&1.23f64), Err(BencodeError::InvalidInput(_))));
/// assert!(matches!(to_value(&true), Err(BencodeError::UnsupportedValue(_))));
/// ```
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, BencodeError> {
    value.serialize(ValueSerializer)
}

/// Serializes `value` straight to canonical bencode.
///
/// # Examples
///
/// ```
/// use rbencode::bencode::to_bytes;
/// use std::collections::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("b", 2);
/// map.insert("a", 1);
/// assert_eq!(to_bytes(&map).unwrap(), b"d1:ai1e1:bi2ee");
/// ```
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    Ok(encode(&to_value(value)?))
}

impl Serialize for ByteString {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ByteString::Text(s) => serializer.serialize_str(s),
            ByteString::Raw(b) => serializer.serialize_bytes(b),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::ByteString(s) => s.serialize(serializer),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for item in l {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(d) => {
                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (k, v) in d {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// A [`serde::Serializer`] whose output is a [`Value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = BencodeError;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeDict;
    type SerializeStruct = SerializeDict;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, _v: bool) -> Result<Value, BencodeError> {
        Err(BencodeError::UnsupportedValue("boolean".into()))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, BencodeError> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| out_of_range(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, BencodeError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, BencodeError> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| out_of_range(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, BencodeError> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| out_of_range(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, BencodeError> {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Value, BencodeError> {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(Value::Integer(v as i64))
        } else {
            Err(BencodeError::InvalidInput(format!("non-integral number {v}")))
        }
    }

    fn serialize_char(self, v: char) -> Result<Value, BencodeError> {
        Ok(Value::text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, BencodeError> {
        Ok(Value::text(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, BencodeError> {
        Ok(Value::raw(Bytes::copy_from_slice(v)))
    }

    fn serialize_none(self) -> Result<Value, BencodeError> {
        Err(BencodeError::UnsupportedValue("null".into()))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, BencodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, BencodeError> {
        Err(BencodeError::UnsupportedValue("null".into()))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, BencodeError> {
        Err(BencodeError::UnsupportedValue(format!("unit struct {name}")))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, BencodeError> {
        Ok(Value::text(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, BencodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, BencodeError> {
        Ok(tagged(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList, BencodeError> {
        Ok(SerializeList {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList, BencodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeList, BencodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, BencodeError> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeDict, BencodeError> {
        Ok(SerializeDict::default())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<SerializeDict, BencodeError> {
        Ok(SerializeDict::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariant, BencodeError> {
        Ok(SerializeStructVariant {
            variant,
            dict: BTreeMap::new(),
        })
    }
}

pub struct SerializeList {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BencodeError> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BencodeError> {
        Ok(Value::List(self.items))
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BencodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, BencodeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BencodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, BencodeError> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BencodeError> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BencodeError> {
        Ok(tagged(self.variant, Value::List(self.items)))
    }
}

#[derive(Default)]
pub struct SerializeDict {
    dict: BTreeMap<String, Value>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for SerializeDict {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), BencodeError> {
        self.pending_key = Some(to_key(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BencodeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| BencodeError::InvalidInput("map value without a key".into()))?;
        self.dict.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BencodeError> {
        Ok(Value::Dict(self.dict))
    }
}

impl ser::SerializeStruct for SerializeDict {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), BencodeError> {
        self.dict.insert(key.to_owned(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BencodeError> {
        Ok(Value::Dict(self.dict))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    dict: BTreeMap<String, Value>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = BencodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), BencodeError> {
        self.dict.insert(key.to_owned(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, BencodeError> {
        Ok(tagged(self.variant, Value::Dict(self.dict)))
    }
}

fn to_key<T: ?Sized + Serialize>(key: &T) -> Result<String, BencodeError> {
    match to_value(key)? {
        Value::ByteString(s) => Ok(s.into_key()),
        other => Err(BencodeError::UnsupportedValue(format!(
            "{} as dictionary key",
            other.kind()
        ))),
    }
}

fn tagged(variant: &'static str, value: Value) -> Value {
    Value::Dict(BTreeMap::from([(variant.to_owned(), value)]))
}

fn out_of_range<T: Display>(v: T) -> BencodeError {
    BencodeError::InvalidInput(format!("integer {v} out of range"))
}
