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
    document::{Document, DocumentValue},
    error::Details,
    schema::{Schema, SchemaKind},
    types::{Value, ValueKind},
};

fn mismatch(value: &Value, schema: &Schema) -> crate::Error {
    Details::ConvertValue {
        value: ValueKind::from(value),
        schema: SchemaKind::from(schema),
    }
    .into()
}

/// Maps a decoded Avro value to a document value.
///
/// `float` widens to `Double`, `bytes` and `fixed` become `Binary`, an enum becomes its
/// symbol and a union becomes the value of its branch. Map entries come out sorted by key.
pub fn to_document_value(value: Value, schema: &Schema) -> AvroResult<DocumentValue> {
    Ok(match (value, schema) {
        (Value::Null, _) => DocumentValue::Null,
        (Value::Boolean(b), _) => DocumentValue::Boolean(b),
        (Value::Int(i), _) => DocumentValue::Int32(i),
        (Value::Long(i), _) => DocumentValue::Int64(i),
        (Value::Float(x), _) => DocumentValue::Double(f64::from(x)),
        (Value::Double(x), _) => DocumentValue::Double(x),
        (Value::String(s), _) => DocumentValue::String(s),
        (Value::Bytes(bytes) | Value::Fixed(bytes), _) => DocumentValue::Binary(bytes),
        (Value::Enum(_, symbol), _) => DocumentValue::String(symbol),
        (Value::Union(index, inner), Schema::Union(union)) => {
            let branch = union
                .variants()
                .get(index as usize)
                .ok_or(Details::GetUnionVariant {
                    index: i64::from(index),
                    num_variants: union.variants().len(),
                })?;
            to_document_value(*inner, branch)?
        }
        (Value::Array(items), Schema::Array(inner)) => DocumentValue::Array(
            items
                .into_iter()
                .map(|item| to_document_value(item, &inner.items))
                .collect::<AvroResult<_>>()?,
        ),
        (Value::Map(items), Schema::Map(inner)) => {
            let mut document = Document::with_capacity(items.len());
            for (key, item) in items {
                document.insert(key, to_document_value(item, &inner.types)?);
            }
            DocumentValue::Document(document)
        }
        (value @ Value::Record(_), Schema::Record(_)) => {
            DocumentValue::Document(to_document(value, schema)?)
        }
        (value, schema) => return Err(mismatch(&value, schema)),
    })
}

/// Maps a decoded top-level record to a document, keeping the field order of the schema.
pub fn to_document(value: Value, schema: &Schema) -> AvroResult<Document> {
    match (value, schema) {
        (Value::Record(fields), Schema::Record(record)) => {
            let mut document = Document::with_capacity(fields.len());
            for (name, item) in fields {
                let field = record.field(&name).ok_or_else(|| Details::ConvertField {
                    field: name.clone(),
                    source: mismatch(&item, schema),
                })?;
                let item = to_document_value(item, &field.schema).map_err(|source| {
                    Details::ConvertField {
                        field: name.clone(),
                        source,
                    }
                })?;
                document.insert(name, item);
            }
            Ok(document)
        }
        (value, schema) => Err(mismatch(&value, schema)),
    }
}
