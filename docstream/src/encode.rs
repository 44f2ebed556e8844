// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::{
    AvroResult,
    error::Details,
    schema::{Schema, SchemaKind},
    types::{Value, ValueKind},
    util::{zig_i32, zig_i64},
};
use log::error;
use std::io::Write;

/// Encode a `Value` into avro format.
///
/// **NOTE** This will not perform schema validation. The value is assumed to
/// be valid with regards to the schema, and union values already carry the
/// index of their branch. A value whose shape does not match the schema is an
/// encoding error.
///
/// Arrays and maps are written as a single block followed by the terminating
/// zero block.
pub fn encode<W: Write>(value: &Value, schema: &Schema, writer: &mut W) -> AvroResult<usize> {
    match (value, schema) {
        (Value::Null, Schema::Null) => Ok(0),
        (Value::Boolean(b), Schema::Boolean) => write_all(writer, &[u8::from(*b)]),
        (Value::Int(i), Schema::Int) => encode_int(*i, writer),
        (Value::Long(i), Schema::Long) => encode_long(*i, writer),
        (Value::Float(x), Schema::Float) => write_all(writer, &x.to_le_bytes()),
        (Value::Double(x), Schema::Double) => write_all(writer, &x.to_le_bytes()),
        (Value::Bytes(bytes), Schema::Bytes) => encode_bytes(bytes, writer),
        (Value::String(s), Schema::String) => encode_bytes(s, writer),
        (Value::Fixed(bytes), Schema::Fixed(fixed)) => {
            if bytes.len() != fixed.size {
                return Err(Details::EncodeFixedSize {
                    size: fixed.size,
                    actual: bytes.len(),
                }
                .into());
            }
            write_all(writer, bytes)
        }
        (Value::Enum(i, _), Schema::Enum(_)) => encode_long(i64::from(*i), writer),
        (Value::Union(idx, item), Schema::Union(inner)) => {
            let inner_schema = inner.variants().get(*idx as usize).ok_or(
                Details::EncodeUnionIndex {
                    index: *idx,
                    num_variants: inner.variants().len(),
                },
            )?;
            let written = encode_long(i64::from(*idx), &mut *writer)?;
            Ok(written + encode(item, inner_schema, writer)?)
        }
        (Value::Array(items), Schema::Array(inner)) => {
            let mut written = 0;
            if !items.is_empty() {
                written += encode_long(items.len() as i64, &mut *writer)?;
                for item in items.iter() {
                    written += encode(item, &inner.items, &mut *writer)?;
                }
            }
            Ok(written + write_all(writer, &[0u8])?)
        }
        (Value::Map(items), Schema::Map(inner)) => {
            let mut written = 0;
            if !items.is_empty() {
                written += encode_long(items.len() as i64, &mut *writer)?;
                for (key, value) in items {
                    written += encode_bytes(key, &mut *writer)?;
                    written += encode(value, &inner.types, &mut *writer)?;
                }
            }
            Ok(written + write_all(writer, &[0u8])?)
        }
        (Value::Record(value_fields), Schema::Record(record)) => {
            let mut written = 0;
            for (position, schema_field) in record.fields.iter().enumerate() {
                let name = &schema_field.name;
                // Values built from the same schema keep its field order.
                let value = match value_fields.get(position) {
                    Some((n, v)) if n == name => Some(v),
                    _ => value_fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
                };
                let value = value.ok_or_else(|| Details::EncodeMissingField(name.clone()))?;
                written += encode(value, &schema_field.schema, &mut *writer)?;
            }
            Ok(written)
        }
        (value, schema) => {
            error!(
                "Invalid schema {} for value {}",
                SchemaKind::from(schema),
                ValueKind::from(value)
            );
            Err(Details::EncodeValueAsSchemaError {
                value_kind: ValueKind::from(value),
                supported_schema: vec![SchemaKind::from(schema)],
            }
            .into())
        }
    }
}

pub fn encode_to_vec(value: &Value, schema: &Schema) -> AvroResult<Vec<u8>> {
    let mut buffer = Vec::new();
    encode(value, schema, &mut buffer)?;
    Ok(buffer)
}

fn write_all<W: Write>(writer: &mut W, bytes: &[u8]) -> AvroResult<usize> {
    writer
        .write_all(bytes)
        .map_err(Details::WriteBytes)?;
    Ok(bytes.len())
}

fn encode_bytes<B: AsRef<[u8]> + ?Sized, W: Write>(s: &B, writer: &mut W) -> AvroResult<usize> {
    let bytes = s.as_ref();
    let written = encode_long(bytes.len() as i64, &mut *writer)?;
    Ok(written + write_all(writer, bytes)?)
}

fn encode_long<W: Write>(i: i64, writer: W) -> AvroResult<usize> {
    zig_i64(i, writer)
}

fn encode_int<W: Write>(i: i32, writer: W) -> AvroResult<usize> {
    zig_i32(i, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, decode::decode};
    type TestResult<T = ()> = anyhow::Result<T>;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_empty_array() -> TestResult {
        let empty: Vec<Value> = Vec::new();
        let buf = encode_to_vec(&Value::Array(empty), &Schema::array(Schema::Int))?;
        assert_eq!(vec![0u8], buf);
        Ok(())
    }

    #[test]
    fn test_encode_empty_map() -> TestResult {
        let buf = encode_to_vec(&Value::Map(BTreeMap::new()), &Schema::map(Schema::Int))?;
        assert_eq!(vec![0u8], buf);
        Ok(())
    }

    #[test]
    fn test_encode_array_as_a_single_block() -> TestResult {
        let value = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        let buf = encode_to_vec(&value, &Schema::array(Schema::Int))?;
        assert_eq!(vec![4u8, 2, 4, 0], buf);
        Ok(())
    }

    #[test]
    fn test_encode_union_writes_the_given_branch() -> TestResult {
        let schema = Schema::parse_str(r#"["null", "long", "string"]"#)?;
        let value = Value::Union(2, Box::new(Value::String("hi".to_string())));
        let buf = encode_to_vec(&value, &schema)?;
        assert_eq!(vec![4u8, 4, b'h', b'i'], buf);

        let out_of_range = Value::Union(3, Box::new(Value::Null));
        let err = encode_to_vec(&out_of_range, &schema).unwrap_err();
        assert!(matches!(
            err.details(),
            Details::EncodeUnionIndex {
                index: 3,
                num_variants: 3
            }
        ));
        Ok(())
    }

    #[test]
    fn test_encode_record_matches_fields_by_name() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "P", "fields": [
                {"name": "a", "type": "int"}, {"name": "b", "type": "boolean"}
            ]}"#,
        )?;
        let reordered = Value::Record(vec![
            ("b".to_string(), Value::Boolean(true)),
            ("a".to_string(), Value::Int(-1)),
        ]);
        assert_eq!(encode_to_vec(&reordered, &schema)?, vec![1u8, 1]);

        let missing = Value::Record(vec![("a".to_string(), Value::Int(0))]);
        let err = encode_to_vec(&missing, &schema).unwrap_err();
        assert!(matches!(err.details(), Details::EncodeMissingField(f) if f == "b"));
        Ok(())
    }

    #[test]
    fn test_encode_mismatch_is_an_encode_error() {
        let err = encode_to_vec(&Value::String("x".to_string()), &Schema::Int).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(matches!(
            err.details(),
            Details::EncodeValueAsSchemaError {
                value_kind: ValueKind::String,
                ..
            }
        ));
    }

    #[test]
    fn test_encode_fixed_checks_the_size() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "fixed", "name": "F", "size": 4}"#)?;
        let err = encode_to_vec(&Value::Fixed(vec![1, 2]), &schema).unwrap_err();
        assert!(matches!(
            err.details(),
            Details::EncodeFixedSize { size: 4, actual: 2 }
        ));
        Ok(())
    }

    #[test]
    fn test_encode_then_decode_nested_record() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "Order", "fields": [
                {"name": "id", "type": "long"},
                {"name": "price", "type": "double"},
                {"name": "ratio", "type": "float"},
                {"name": "lines", "type": {"type": "array", "items": {
                    "type": "record", "name": "Line", "fields": [
                        {"name": "sku", "type": "string"},
                        {"name": "qty", "type": "int"}
                    ]}}},
                {"name": "attrs", "type": {"type": "map", "values": "bytes"}},
                {"name": "note", "type": ["null", "string"]}
            ]}"#,
        )?;
        let value = Value::Record(vec![
            ("id".to_string(), Value::Long(i64::MAX)),
            ("price".to_string(), Value::Double(9.99)),
            ("ratio".to_string(), Value::Float(0.5)),
            (
                "lines".to_string(),
                Value::Array(vec![Value::Record(vec![
                    ("sku".to_string(), Value::String("ab-1".to_string())),
                    ("qty".to_string(), Value::Int(3)),
                ])]),
            ),
            (
                "attrs".to_string(),
                Value::Map(BTreeMap::from([("k".to_string(), Value::Bytes(vec![0, 255]))])),
            ),
            ("note".to_string(), Value::Union(0, Box::new(Value::Null))),
        ]);

        let buf = encode_to_vec(&value, &schema)?;
        let mut input = buf.as_slice();
        assert_eq!(decode(&schema, &mut input)?, value);
        assert!(input.is_empty());
        Ok(())
    }
}
