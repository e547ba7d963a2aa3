use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use serde::ser::{
    self, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple, SerializeTupleStruct,
    SerializeTupleVariant,
};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Arguments cannot be encoded as a key. reason: {reason}")]
    Unrepresentable { reason: String },
}

impl ser::Error for KeyError {
    fn custom<T: Display>(msg: T) -> Self {
        KeyError::Unrepresentable {
            reason: msg.to_string(),
        }
    }
}

/// Arguments paired with a deterministic structural encoding of them.
///
/// Two `Canonical` values are equal, and hash alike, exactly when their encodings are
/// equal. Structurally equal arguments always encode the same way: sequences keep their
/// order, and map entries are sorted by their encoded key, so a `HashMap` argument
/// encodes identically no matter its iteration order. Use this for arguments that are
/// not `Eq + Hash` themselves, such as floats or maps.
///
/// The encoding is JSON-like. Non-finite floats, which JSON cannot express, are written
/// as the bare tokens `NaN`, `Infinity` and `-Infinity`, so they never collide with
/// `null` or with each other.
#[derive(Clone)]
pub struct Canonical<A> {
    args: A,
    encoded: String,
}

impl<A> Canonical<A>
where
    A: Serialize,
{
    pub fn new(args: A) -> Result<Self, KeyError> {
        let encoded = args.serialize(KeyEncoder)?;

        Ok(Self {
            args,
            encoded,
        })
    }
}

impl<A> Canonical<A> {
    pub fn args(&self) -> &A {
        &self.args
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn into_inner(self) -> A {
        self.args
    }
}

fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn encode_float(value: f64) -> String {
    match Number::from_f64(value) {
        Some(number) => number.to_string(),
        None if value.is_nan() => "NaN".to_string(),
        None if value.is_sign_positive() => "Infinity".to_string(),
        None => "-Infinity".to_string(),
    }
}

fn tagged(variant: Option<&'static str>, body: String) -> String {
    match variant {
        Some(variant) => format!("{{{}:{}}}", quote(variant), body),
        None => body,
    }
}

/// Serializes any value straight into its canonical encoding.
#[derive(Clone, Copy)]
struct KeyEncoder;

struct SeqEncoder {
    variant: Option<&'static str>,
    items: Vec<String>,
}

impl SeqEncoder {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.items.push(value.serialize(KeyEncoder)?);
        Ok(())
    }

    fn finish(self) -> String {
        tagged(self.variant, format!("[{}]", self.items.join(",")))
    }
}

struct MapEncoder {
    variant: Option<&'static str>,
    entries: Vec<(String, String)>,
    pending_key: Option<String>,
}

impl MapEncoder {
    fn new(variant: Option<&'static str>) -> Self {
        Self {
            variant,
            entries: Vec::new(),
            pending_key: None,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<(), KeyError> {
        self.entries.push((key, value.serialize(KeyEncoder)?));
        Ok(())
    }

    fn finish(mut self) -> String {
        self.entries.sort();
        let body = self
            .entries
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect::<Vec<_>>()
            .join(",");
        tagged(self.variant, format!("{{{}}}", body))
    }
}

impl Serializer for KeyEncoder {
    type Ok = String;
    type Error = KeyError;
    type SerializeSeq = SeqEncoder;
    type SerializeTuple = SeqEncoder;
    type SerializeTupleStruct = SeqEncoder;
    type SerializeTupleVariant = SeqEncoder;
    type SerializeMap = MapEncoder;
    type SerializeStruct = MapEncoder;
    type SerializeStructVariant = MapEncoder;

    fn serialize_bool(self, v: bool) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String, KeyError> {
        Ok(encode_float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<String, KeyError> {
        Ok(encode_float(v))
    }

    fn serialize_char(self, v: char) -> Result<String, KeyError> {
        Ok(quote(v.encode_utf8(&mut [0; 4])))
    }

    fn serialize_str(self, v: &str) -> Result<String, KeyError> {
        Ok(quote(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<String, KeyError> {
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for byte in v {
            seq.push(byte)?;
        }
        Ok(seq.finish())
    }

    fn serialize_none(self) -> Result<String, KeyError> {
        Ok("null".to_string())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String, KeyError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, KeyError> {
        Ok("null".to_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, KeyError> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, KeyError> {
        Ok(quote(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, KeyError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<String, KeyError> {
        Ok(tagged(Some(variant), value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder, KeyError> {
        Ok(SeqEncoder {
            variant: None,
            items: Vec::with_capacity(len.unwrap_or_default()),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder, KeyError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqEncoder, KeyError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqEncoder, KeyError> {
        Ok(SeqEncoder {
            variant: Some(variant),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder, KeyError> {
        Ok(MapEncoder::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapEncoder, KeyError> {
        Ok(MapEncoder::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<MapEncoder, KeyError> {
        Ok(MapEncoder::new(Some(variant)))
    }
}

impl SerializeSeq for SeqEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.push(value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl SerializeTuple for SeqEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.push(value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl SerializeTupleStruct for SeqEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.push(value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl SerializeTupleVariant for SeqEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.push(value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl SerializeMap for MapEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), KeyError> {
        self.pending_key = Some(key.serialize(KeyEncoder)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| <KeyError as ser::Error>::custom("map value without a key"))?;
        self.push(key, value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl SerializeStruct for MapEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError> {
        self.push(quote(key), value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl SerializeStructVariant for MapEncoder {
    type Ok = String;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError> {
        self.push(quote(key), value)
    }

    fn end(self) -> Result<String, KeyError> {
        Ok(self.finish())
    }
}

impl<A> Deref for Canonical<A> {
    type Target = A;

    fn deref(&self) -> &Self::Target {
        &self.args
    }
}

impl<A> PartialEq for Canonical<A> {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl<A> Eq for Canonical<A> {}

impl<A> Hash for Canonical<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl<A> Debug for Canonical<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encoded)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use rstest::rstest;

    use super::*;

    #[derive(Serialize)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    struct Handle;

    impl Serialize for Handle {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(ser::Error::custom("opaque handle"))
        }
    }

    #[test]
    fn structurally_equal_arguments_are_equal_keys() {
        // given
        let a = Canonical::new((Point { x: 1.5, y: -2.0 }, vec!["a", "b"])).unwrap();
        let b = Canonical::new((Point { x: 1.5, y: -2.0 }, vec!["a", "b"])).unwrap();

        // expect
        assert_eq!(a, b);
        assert_eq!(a.encoded(), r#"[{"x":1.5,"y":-2.0},["a","b"]]"#);
    }

    #[test]
    fn map_arguments_encode_independently_of_insertion_order() {
        // given
        let forward: HashMap<String, u32> = (0..32).map(|i| (format!("k{}", i), i)).collect();
        let reverse: HashMap<String, u32> = (0..32).rev().map(|i| (format!("k{}", i), i)).collect();

        // expect
        assert_eq!(Canonical::new(forward).unwrap(), Canonical::new(reverse).unwrap());
    }

    #[test]
    fn non_string_map_keys_are_encoded() {
        // given
        let map: BTreeMap<Vec<u8>, bool> = [(vec![2], false), (vec![1, 0], true)].into_iter().collect();

        // when
        let key = Canonical::new(map).unwrap();

        // then
        assert_eq!(key.encoded(), "{[1,0]:true,[2]:false}");
    }

    #[rstest]
    #[case(Shape::Dot, r#""Dot""#)]
    #[case(Shape::Circle(0.5), r#"{"Circle":0.5}"#)]
    #[case(Shape::Rect { w: 2, h: 3 }, r#"{"Rect":{"h":3,"w":2}}"#)]
    fn enum_variants_are_tagged(#[case] shape: Shape, #[case] expected: &str) {
        assert_eq!(Canonical::new(shape).unwrap().encoded(), expected);
    }

    #[rstest]
    #[case(vec![1, 2], vec![2, 1])]
    #[case(vec![1, 2], vec![1, 2, 3])]
    #[case(vec![0], vec![])]
    fn different_arguments_are_different_keys(#[case] a: Vec<i32>, #[case] b: Vec<i32>) {
        assert_ne!(Canonical::new(a).unwrap(), Canonical::new(b).unwrap());
    }

    #[test]
    fn non_finite_floats_are_distinct_keys() {
        // given
        let keys: Vec<Canonical<Option<f64>>> = [Some(f64::NAN), Some(f64::INFINITY), Some(f64::NEG_INFINITY), None]
            .into_iter()
            .map(|arg| Canonical::new(arg).unwrap())
            .collect();

        // then
        let encoded: Vec<&str> = keys.iter().map(Canonical::encoded).collect();
        assert_eq!(encoded, vec!["NaN", "Infinity", "-Infinity", "null"]);
    }

    #[test]
    fn shape_is_part_of_the_key() {
        // given
        let tuple = Canonical::new((1, 2)).unwrap();
        let nested = Canonical::new(((1,), 2)).unwrap();

        // expect
        assert_ne!(tuple.encoded(), nested.encoded());
    }

    #[test]
    fn unrepresentable_arguments_are_rejected() {
        // when
        let result = Canonical::new((1, Handle));

        // then
        assert_eq!(
            result.err(),
            Some(KeyError::Unrepresentable {
                reason: "opaque handle".to_string()
            })
        );
    }
}
