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
    document::DocumentKind,
    schema::SchemaKind,
    types::ValueKind,
};
use serde_json::Value as JsonValue;
use std::{error::Error as _, fmt};
use strum_macros::Display;

/// A boxed error coming from a store implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors encountered while parsing schemas, coding values or running a pipeline.
///
/// To inspect the error use [`details`](Self::details) or [`into_details`](Self::into_details)
/// to get a [`Details`] which contains more precise error information, or [`kind`](Self::kind)
/// for the coarse category.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    pub fn kind(&self) -> ErrorKind {
        self.details.kind()
    }

    /// Returns `true` if the input ran out before a value was complete.
    ///
    /// The ingest loop uses this to tell a record that needs more input apart from a
    /// record that is corrupt.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(*self.details, Details::UnexpectedEof)
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// The category of an [`Error`].
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed schema text, or a schema of the wrong shape for the operation.
    Schema,
    /// An unknown schema id.
    Lookup,
    /// Corrupt or truncated binary input.
    Format,
    /// A value that does not match the schema it is encoded with.
    Encode,
    /// A value that the bridge cannot map between Avro and documents.
    Conversion,
    /// The destination store rejected a write.
    Sink,
    /// The source store failed to produce documents.
    Source,
    /// Reading the input stream or writing the output stream failed.
    Io,
    /// The run was cancelled.
    Cancelled,
}

/// Failure of a whole ingest or export run.
///
/// `committed` is the number of records that reached the destination before the
/// failure. Those writes are final and are not rolled back.
#[derive(thiserror::Error, Debug)]
#[error("{error} ({committed} records committed before the failure)")]
pub struct RunError {
    pub committed: usize,
    #[source]
    pub error: Error,
}

impl RunError {
    pub fn new(committed: usize, error: impl Into<Error>) -> Self {
        Self {
            committed,
            error: error.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum Details {
    // Schema errors
    #[error("Failed to parse schema from JSON")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Must be a JSON string, object or array")]
    ParseSchemaFromValidJson,

    #[error("Unknown primitive type or undefined named type: {0}")]
    ParsePrimitive(String),

    #[error("Unknown complex type: {0}")]
    GetComplexType(JsonValue),

    #[error("No `type` in complex type")]
    GetComplexTypeField,

    #[error("No `name` field")]
    GetNameField,

    #[error("Invalid schema name {0}. It must match the regex '{1}'")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace {0}. It must match the regex '{1}'")]
    InvalidNamespace(String, &'static str),

    #[error("Invalid field name {0}")]
    FieldName(String),

    #[error("Invalid enum symbol name {0}")]
    EnumSymbolName(String),

    #[error("No `fields` in record")]
    GetRecordFieldsJson,

    #[error("No `type` in record field {0}")]
    GetRecordFieldTypeField(String),

    #[error("Duplicate field name {0}")]
    FieldNameDuplicate(String),

    #[error("No `symbols` field in enum")]
    GetEnumSymbolsField,

    #[error("Unable to parse `symbols` in enum")]
    GetEnumSymbols,

    #[error("Duplicate enum symbol {0}")]
    EnumSymbolDuplicate(String),

    #[error("No `items` in array")]
    GetArrayItemsField,

    #[error("No `values` in map")]
    GetMapValuesField,

    #[error("Fixed schema has no `size`")]
    GetFixedSizeField,

    #[error("Fixed schema `size` value must be a positive integer: {0}")]
    GetFixedSizeFieldPositive(JsonValue),

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Unions cannot contain duplicate types")]
    GetUnionDuplicate,

    #[error("Two named schemas with the same fullname were given: {0}")]
    NameCollision(String),

    #[error("Recursive reference to {0} is not supported")]
    RecursiveSchema(String),

    #[error("A record schema is required at the top level, got: {0}")]
    TopLevelNotRecord(SchemaKind),

    // Lookup errors
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    // Format errors
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Integer overflow when decoding a variable length integer")]
    IntegerOverflow,

    #[error("Expected i32, got: {1}")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("Negative length {0} in the input")]
    NegativeLength(i64),

    #[error("Invalid u8 for bool: {0}")]
    BoolValue(u8),

    #[error("Invalid utf-8 string")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Union index {index} out of bounds: {num_variants}")]
    GetUnionVariant { index: i64, num_variants: usize },

    #[error("Enum symbol index {index} out of bounds: {num_symbols}")]
    GetEnumSymbolIndex { index: i64, num_symbols: usize },

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("A record was decoded without consuming any input, {remaining} bytes left")]
    ZeroWidthRecord { remaining: usize },

    #[error("Failed to read from the decoder input: {0}")]
    ReadBytes(#[source] std::io::Error),

    // Encode errors
    #[error("Value {value_kind} cannot be encoded as schema {supported_schema:?}")]
    EncodeValueAsSchemaError {
        value_kind: ValueKind,
        supported_schema: Vec<SchemaKind>,
    },

    #[error("Union branch {index} out of bounds: {num_variants}")]
    EncodeUnionIndex { index: u32, num_variants: usize },

    #[error("Fixed value of {actual} bytes does not match schema size {size}")]
    EncodeFixedSize { size: usize, actual: usize },

    #[error("Missing field {0} when encoding a record")]
    EncodeMissingField(String),

    #[error("Failed to write bytes: {0}")]
    WriteBytes(#[source] std::io::Error),

    // Conversion errors
    #[error("Cannot convert document value {value} to Avro {schema}")]
    ConvertDocument {
        value: DocumentKind,
        schema: SchemaKind,
    },

    #[error("Cannot convert Avro value {value} with schema {schema}")]
    ConvertValue { value: ValueKind, schema: SchemaKind },

    #[error("Numeric value {value} does not fit into Avro {schema}")]
    ConvertNumeric { value: String, schema: SchemaKind },

    #[error("Enum symbol {symbol} is not one of {symbols:?}")]
    GetEnumSymbol {
        symbol: String,
        symbols: Vec<String>,
    },

    #[error("Binary value of {actual} bytes does not match fixed size {size}")]
    ConvertFixedSize { size: usize, actual: usize },

    #[error("Date-time {0} has a year outside 0000 to 9999")]
    DateTimeOutOfRange(String),

    #[error("No branch of union {branches:?} accepts document value {value}")]
    FindUnionVariant {
        value: DocumentKind,
        branches: Vec<SchemaKind>,
    },

    #[error("Failed to convert field {field}")]
    ConvertField {
        field: String,
        #[source]
        source: Error,
    },

    // Store and stream errors
    #[error("Failed to insert {count} documents into {collection}")]
    SinkWrite {
        collection: String,
        count: usize,
        #[source]
        source: BoxError,
    },

    #[error("Failed to fetch documents from the source")]
    SourceRead(#[source] BoxError),

    #[error("Failed to read the input stream")]
    ReadInput(#[source] std::io::Error),

    #[error("Failed to write the output stream")]
    WriteOutput(#[source] std::io::Error),

    #[error("The run was cancelled")]
    Cancelled,
}

impl Details {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Details::ParseSchemaJson(_)
            | Details::ParseSchemaFromValidJson
            | Details::ParsePrimitive(_)
            | Details::GetComplexType(_)
            | Details::GetComplexTypeField
            | Details::GetNameField
            | Details::InvalidSchemaName(..)
            | Details::InvalidNamespace(..)
            | Details::FieldName(_)
            | Details::EnumSymbolName(_)
            | Details::GetRecordFieldsJson
            | Details::GetRecordFieldTypeField(_)
            | Details::FieldNameDuplicate(_)
            | Details::GetEnumSymbolsField
            | Details::GetEnumSymbols
            | Details::EnumSymbolDuplicate(_)
            | Details::GetArrayItemsField
            | Details::GetMapValuesField
            | Details::GetFixedSizeField
            | Details::GetFixedSizeFieldPositive(_)
            | Details::GetNestedUnion
            | Details::GetUnionDuplicate
            | Details::NameCollision(_)
            | Details::RecursiveSchema(_)
            | Details::TopLevelNotRecord(_) => ErrorKind::Schema,
            Details::SchemaNotFound(_) => ErrorKind::Lookup,
            Details::UnexpectedEof
            | Details::IntegerOverflow
            | Details::ZagI32(..)
            | Details::NegativeLength(_)
            | Details::BoolValue(_)
            | Details::ConvertToUtf8(_)
            | Details::GetUnionVariant { .. }
            | Details::GetEnumSymbolIndex { .. }
            | Details::MemoryAllocation { .. }
            | Details::ZeroWidthRecord { .. } => ErrorKind::Format,
            Details::EncodeValueAsSchemaError { .. }
            | Details::EncodeUnionIndex { .. }
            | Details::EncodeFixedSize { .. }
            | Details::EncodeMissingField(_) => ErrorKind::Encode,
            Details::ConvertDocument { .. }
            | Details::ConvertValue { .. }
            | Details::ConvertNumeric { .. }
            | Details::GetEnumSymbol { .. }
            | Details::ConvertFixedSize { .. }
            | Details::DateTimeOutOfRange(_)
            | Details::FindUnionVariant { .. } => ErrorKind::Conversion,
            // The field context does not change what went wrong underneath.
            Details::ConvertField { source, .. } => source.kind(),
            Details::SinkWrite { .. } => ErrorKind::Sink,
            Details::SourceRead(_) => ErrorKind::Source,
            Details::ReadBytes(_)
            | Details::WriteBytes(_)
            | Details::ReadInput(_)
            | Details::WriteOutput(_) => ErrorKind::Io,
            Details::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
