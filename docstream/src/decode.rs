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

//! Decoding of the Avro binary encoding into [`Value`]s.

use crate::{
    AvroResult,
    error::Details,
    schema::Schema,
    types::Value,
    util::{read_exact, safe_len, zag_i32, zag_i64},
};
use std::{collections::BTreeMap, io::Read};

#[inline]
fn decode_long<R: Read>(reader: &mut R) -> AvroResult<Value> {
    zag_i64(reader).map(Value::Long)
}

#[inline]
fn decode_int<R: Read>(reader: &mut R) -> AvroResult<Value> {
    zag_i32(reader).map(Value::Int)
}

#[inline]
fn decode_len<R: Read>(reader: &mut R) -> AvroResult<usize> {
    let len = zag_i64(reader)?;
    safe_len(usize::try_from(len).map_err(|_| Details::NegativeLength(len))?)
}

/// Decode the length of a sequence.
///
/// Maps and arrays are 0-terminated, 0i64 is also encoded as 0 in Avro; reading a length of 0
/// means the end of the map or array. A negative length is followed by the size in bytes of
/// the block, which is read and discarded.
fn decode_seq_len<R: Read>(reader: &mut R) -> AvroResult<usize> {
    let raw_len = zag_i64(reader)?;
    let len = if raw_len < 0 {
        let _size = zag_i64(reader)?;
        raw_len
            .checked_neg()
            .ok_or(Details::IntegerOverflow)?
    } else {
        raw_len
    };
    safe_len(usize::try_from(len).map_err(|_| Details::NegativeLength(len))?)
}

/// Reads `len` bytes. The buffer grows with the bytes actually available, so a value that
/// is cut short costs only what arrived rather than its declared length.
fn decode_bytes<R: Read>(reader: &mut R, len: usize) -> AvroResult<Vec<u8>> {
    let len = safe_len(len)?;
    let mut buf = Vec::new();
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(Details::ReadBytes)?;
    if buf.len() < len {
        return Err(Details::UnexpectedEof.into());
    }
    Ok(buf)
}

fn decode_string<R: Read>(reader: &mut R) -> AvroResult<String> {
    let len = decode_len(reader)?;
    let bytes = decode_bytes(reader, len)?;
    String::from_utf8(bytes).map_err(|e| Details::ConvertToUtf8(e).into())
}

/// Decode a `Value` from avro format given its `Schema`.
///
/// Exactly the bytes of one value are consumed from `reader`. Running out of input is
/// reported as [`Details::UnexpectedEof`].
pub fn decode<R: Read>(schema: &Schema, reader: &mut R) -> AvroResult<Value> {
    match schema {
        Schema::Null => Ok(Value::Null),
        Schema::Boolean => {
            let mut buf = [0u8; 1];
            read_exact(reader, &mut buf)?;
            match buf[0] {
                0u8 => Ok(Value::Boolean(false)),
                1u8 => Ok(Value::Boolean(true)),
                other => Err(Details::BoolValue(other).into()),
            }
        }
        Schema::Int => decode_int(reader),
        Schema::Long => decode_long(reader),
        Schema::Float => {
            let mut buf = [0u8; std::mem::size_of::<f32>()];
            read_exact(reader, &mut buf)?;
            Ok(Value::Float(f32::from_le_bytes(buf)))
        }
        Schema::Double => {
            let mut buf = [0u8; std::mem::size_of::<f64>()];
            read_exact(reader, &mut buf)?;
            Ok(Value::Double(f64::from_le_bytes(buf)))
        }
        Schema::Bytes => {
            let len = decode_len(reader)?;
            decode_bytes(reader, len).map(Value::Bytes)
        }
        Schema::String => decode_string(reader).map(Value::String),
        Schema::Fixed(fixed) => decode_bytes(reader, fixed.size).map(Value::Fixed),
        Schema::Array(inner) => {
            let mut items = Vec::new();

            loop {
                let len = decode_seq_len(reader)?;
                if len == 0 {
                    break;
                }

                for _ in 0..len {
                    items.push(decode(&inner.items, reader)?);
                }
            }

            Ok(Value::Array(items))
        }
        Schema::Map(inner) => {
            let mut items = BTreeMap::new();

            loop {
                let len = decode_seq_len(reader)?;
                if len == 0 {
                    break;
                }

                for _ in 0..len {
                    let key = decode_string(reader)?;
                    let value = decode(&inner.types, reader)?;
                    items.insert(key, value);
                }
            }

            Ok(Value::Map(items))
        }
        Schema::Union(inner) => {
            let index = zag_i64(reader)?;
            let variants = inner.variants();
            let variant = usize::try_from(index)
                .ok()
                .and_then(|i| variants.get(i))
                .ok_or(Details::GetUnionVariant {
                    index,
                    num_variants: variants.len(),
                })?;
            let value = decode(variant, reader)?;
            // index is within 0..variants.len() here
            Ok(Value::Union(index as u32, Box::new(value)))
        }
        Schema::Record(record) => {
            let mut items = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                items.push((field.name.clone(), decode(&field.schema, reader)?));
            }
            Ok(Value::Record(items))
        }
        Schema::Enum(inner) => {
            let index = zag_i64(reader)?;
            let symbol = usize::try_from(index)
                .ok()
                .and_then(|i| inner.symbols.get(i))
                .ok_or(Details::GetEnumSymbolIndex {
                    index,
                    num_symbols: inner.symbols.len(),
                })?;
            Ok(Value::Enum(index as u32, symbol.clone()))
        }
    }
}

/// Iterates over the top-level values of an in-memory buffer of back-to-back encoded records.
///
/// There is no terminator in the stream: the iterator ends cleanly when the input is exhausted
/// exactly at the start of a value. A value cut short is returned as an error, after which the
/// iterator is fused.
pub struct RecordReader<'a> {
    schema: &'a Schema,
    input: &'a [u8],
}

impl<'a> RecordReader<'a> {
    pub fn new(schema: &'a Schema, input: &'a [u8]) -> Self {
        Self { schema, input }
    }

    /// The bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.input
    }
}

impl Iterator for RecordReader<'_> {
    type Item = AvroResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.input.is_empty() {
            return None;
        }

        let mut cursor = self.input;
        let item = match decode(self.schema, &mut cursor) {
            Ok(_) if cursor.len() == self.input.len() => Err(Details::ZeroWidthRecord {
                remaining: self.input.len(),
            }
            .into()),
            other => other,
        };

        self.input = if item.is_ok() { cursor } else { &[] };
        Some(item)
    }
}
