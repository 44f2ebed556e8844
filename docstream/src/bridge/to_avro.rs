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
    AvroResult, Error,
    bridge::temporal::{is_date_wrapper, wrap_date_time},
    document::{Document, DocumentKind, DocumentValue},
    error::Details,
    schema::{EnumSchema, RecordSchema, Schema, SchemaKind, UnionSchema},
    types::Value,
};
use log::trace;
use std::collections::BTreeMap;

fn mismatch(value: &DocumentValue, schema: &Schema) -> Error {
    Details::ConvertDocument {
        value: DocumentKind::from(value),
        schema: SchemaKind::from(schema),
    }
    .into()
}

fn numeric(value: impl ToString, schema: &Schema) -> Error {
    Details::ConvertNumeric {
        value: value.to_string(),
        schema: SchemaKind::from(schema),
    }
    .into()
}

/// A double converts to an integer only when it has no fractional part and is in range.
fn integral(x: f64, min: f64, max: f64) -> bool {
    x.fract() == 0.0 && x >= min && x <= max
}

/// Converts a document value to an Avro value of the given schema.
///
/// Unions are resolved here: `null` goes to the first `null` branch, anything else to the
/// first non-null branch that converts without error. Numbers narrow only when the value
/// fits, strings never become numbers.
pub fn to_avro(value: &DocumentValue, schema: &Schema) -> AvroResult<Value> {
    match (schema, value) {
        (Schema::Union(union), value) => resolve_union(value, union),
        (Schema::Null, DocumentValue::Null) => Ok(Value::Null),
        (Schema::Boolean, DocumentValue::Boolean(b)) => Ok(Value::Boolean(*b)),

        (Schema::Int, DocumentValue::Int32(i)) => Ok(Value::Int(*i)),
        (Schema::Int, DocumentValue::Int64(i)) => i32::try_from(*i)
            .map(Value::Int)
            .map_err(|_| numeric(i, schema)),
        (Schema::Int, DocumentValue::Double(x)) => {
            if integral(*x, f64::from(i32::MIN), f64::from(i32::MAX)) {
                Ok(Value::Int(*x as i32))
            } else {
                Err(numeric(x, schema))
            }
        }

        (Schema::Long, DocumentValue::Int32(i)) => Ok(Value::Long(i64::from(*i))),
        (Schema::Long, DocumentValue::Int64(i)) => Ok(Value::Long(*i)),
        (Schema::Long, DocumentValue::Double(x)) => {
            // i64::MAX is not representable, 2^63 is the first double out of range
            if integral(*x, i64::MIN as f64, i64::MAX as f64) && *x < i64::MAX as f64 {
                Ok(Value::Long(*x as i64))
            } else {
                Err(numeric(x, schema))
            }
        }

        (Schema::Float, DocumentValue::Int32(i)) => Ok(Value::Float(*i as f32)),
        (Schema::Float, DocumentValue::Int64(i)) => Ok(Value::Float(*i as f32)),
        (Schema::Float, DocumentValue::Double(x)) => {
            if x.is_finite() && x.abs() > f64::from(f32::MAX) {
                Err(numeric(x, schema))
            } else {
                Ok(Value::Float(*x as f32))
            }
        }

        (Schema::Double, DocumentValue::Int32(i)) => Ok(Value::Double(f64::from(*i))),
        (Schema::Double, DocumentValue::Int64(i)) => Ok(Value::Double(*i as f64)),
        (Schema::Double, DocumentValue::Double(x)) => Ok(Value::Double(*x)),

        (Schema::String, DocumentValue::String(s)) => Ok(Value::String(s.clone())),
        (Schema::Bytes, DocumentValue::Binary(bytes)) => Ok(Value::Bytes(bytes.clone())),
        (Schema::Fixed(fixed), DocumentValue::Binary(bytes)) => {
            if bytes.len() == fixed.size {
                Ok(Value::Fixed(bytes.clone()))
            } else {
                Err(Details::ConvertFixedSize {
                    size: fixed.size,
                    actual: bytes.len(),
                }
                .into())
            }
        }
        (Schema::Enum(inner), DocumentValue::String(symbol)) => to_enum(symbol, inner),

        (Schema::Array(inner), DocumentValue::Array(items)) => items
            .iter()
            .map(|item| to_avro(item, &inner.items))
            .collect::<AvroResult<_>>()
            .map(Value::Array),
        (Schema::Map(inner), DocumentValue::Document(document)) => document
            .iter()
            .map(|(key, item)| to_avro(item, &inner.types).map(|v| (key.to_string(), v)))
            .collect::<AvroResult<BTreeMap<_, _>>>()
            .map(Value::Map),

        (Schema::Record(record), DocumentValue::DateTime(date_time)) if is_date_wrapper(record) => {
            wrap_date_time(date_time)
        }
        (Schema::Record(record), DocumentValue::Document(document)) => {
            to_record(document, record)
        }

        (schema, value) => Err(mismatch(value, schema)),
    }
}

/// Converts a top-level document to an Avro record.
///
/// Fields missing from the document convert as `null`, keys without a field are ignored.
pub fn document_to_avro(document: &Document, schema: &Schema) -> AvroResult<Value> {
    match schema {
        Schema::Record(record) => to_record(document, record),
        _ => Err(Details::ConvertDocument {
            value: DocumentKind::Document,
            schema: SchemaKind::from(schema),
        }
        .into()),
    }
}

fn to_record(document: &Document, record: &RecordSchema) -> AvroResult<Value> {
    let null = DocumentValue::Null;
    let mut fields = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let value = document.get(&field.name).unwrap_or(&null);
        let value = to_avro(value, &field.schema).map_err(|source| Details::ConvertField {
            field: field.name.clone(),
            source,
        })?;
        fields.push((field.name.clone(), value));
    }
    Ok(Value::Record(fields))
}

fn to_enum(symbol: &str, schema: &EnumSchema) -> AvroResult<Value> {
    match schema.index_of(symbol) {
        Some(index) => Ok(Value::Enum(index as u32, symbol.to_string())),
        None => Err(Details::GetEnumSymbol {
            symbol: symbol.to_string(),
            symbols: schema.symbols.clone(),
        }
        .into()),
    }
}

fn resolve_union(value: &DocumentValue, union: &UnionSchema) -> AvroResult<Value> {
    let not_found = || -> Error {
        Details::FindUnionVariant {
            value: DocumentKind::from(value),
            branches: union.variants().iter().map(SchemaKind::from).collect(),
        }
        .into()
    };

    if let DocumentValue::Null = value {
        return union
            .null_variant()
            .map(|index| Value::Union(index as u32, Box::new(Value::Null)))
            .ok_or_else(not_found);
    }

    for (index, branch) in union.variants().iter().enumerate() {
        if let Schema::Null = branch {
            continue;
        }
        match to_avro(value, branch) {
            Ok(converted) => return Ok(Value::Union(index as u32, Box::new(converted))),
            Err(e) => trace!("Union branch {index} rejected the value: {e}"),
        }
    }
    Err(not_found())
}
