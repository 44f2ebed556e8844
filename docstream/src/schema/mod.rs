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

//! Logic for parsing and interacting with schemas in Avro format.

mod name;
mod parser;
mod record;
mod union;

pub use crate::schema::{
    name::{Name, NamespaceRef},
    record::{RecordField, RecordSchema},
    union::UnionSchema,
};

use crate::{AvroResult, error::Details, schema::parser::Parser};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use strum_macros::{Display, EnumDiscriminants};

/// Represents any valid Avro schema
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/++version++/specification/#schema-declaration)
///
/// Named types are resolved while parsing: a reference to an already defined
/// `record`, `enum` or `fixed` shares the definition through an [`Arc`], so a `Schema`
/// never needs a name lookup to be walked and a reference costs one pointer.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(SchemaKind), derive(Hash, Ord, PartialOrd, Display))]
pub enum Schema {
    /// A `null` Avro schema.
    Null,
    /// A `boolean` Avro schema.
    Boolean,
    /// An `int` Avro schema.
    Int,
    /// A `long` Avro schema.
    Long,
    /// A `float` Avro schema.
    Float,
    /// A `double` Avro schema.
    Double,
    /// A `bytes` Avro schema.
    ///
    /// `Bytes` represents a sequence of 8-bit unsigned bytes.
    Bytes,
    /// A `string` Avro schema.
    ///
    /// `String` represents a unicode character sequence.
    String,
    /// An `array` Avro schema. Avro arrays are required to have the same type for each element.
    /// This variant holds the `Schema` for the array element type.
    Array(ArraySchema),
    /// A `map` Avro schema.
    /// `Map` holds a pointer to the `Schema` of its values, which must all be the same schema.
    /// `Map` keys are assumed to be `string`.
    Map(MapSchema),
    /// A `union` Avro schema.
    Union(UnionSchema),
    /// A `record` Avro schema.
    Record(Arc<RecordSchema>),
    /// An `enum` Avro schema.
    Enum(Arc<EnumSchema>),
    /// A `fixed` Avro schema.
    Fixed(Arc<FixedSchema>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapSchema {
    pub types: Box<Schema>,
}

/// A description of an Enum schema.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumSchema {
    /// The name of the schema
    pub name: Name,
    /// The set of symbols of the schema
    pub symbols: Vec<String>,
}

impl EnumSchema {
    /// The position of `symbol` in the declared symbols.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

/// A description of a Fixed schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedSchema {
    /// The name of the schema
    pub name: Name,
    /// The size of the fixed schema
    pub size: usize,
}

impl Schema {
    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> AvroResult<Schema> {
        let value = serde_json::from_str(input).map_err(Details::ParseSchemaJson)?;
        Self::parse(&value)
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro schema.
    pub fn parse(value: &JsonValue) -> AvroResult<Schema> {
        Parser::default().parse(value, None)
    }

    /// Returns a `Schema::Array` with the given items.
    pub fn array(items: Schema) -> Self {
        Schema::Array(ArraySchema {
            items: Box::new(items),
        })
    }

    /// Returns a `Schema::Map` with the given values.
    pub fn map(types: Schema) -> Self {
        Schema::Map(MapSchema {
            types: Box::new(types),
        })
    }

    /// Returns a `Schema::Union` of the given variants.
    pub fn union(schemas: Vec<Schema>) -> AvroResult<Self> {
        UnionSchema::new(schemas).map(Schema::Union)
    }

    /// Returns the name of the schema if it has one.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Record(record) => Some(&record.name),
            Schema::Enum(inner) => Some(&inner.name),
            Schema::Fixed(fixed) => Some(&fixed.name),
            _ => None,
        }
    }

    /// Returns whether the schema represents a named type according to the avro specification
    pub fn is_named(&self) -> bool {
        self.name().is_some()
    }

    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self {
            Schema::Record(record) => Some(record.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    type TestResult<T = ()> = anyhow::Result<T>;
    use pretty_assertions::assert_eq;

    #[test]
    fn schema_kind_is_displayed_by_variant_name() {
        assert_eq!(SchemaKind::Record.to_string(), "Record");
        assert_eq!(SchemaKind::from(&Schema::Long).to_string(), "Long");
    }

    #[test]
    fn named_schemas_expose_their_name() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "fixed", "name": "md5", "size": 16}"#)?;
        assert!(schema.is_named());
        assert_eq!(schema.name().map(Name::fullname), Some("md5"));
        assert!(!Schema::array(Schema::Int).is_named());
        Ok(())
    }

    #[test]
    fn enum_index_of_symbol() -> TestResult {
        let schema =
            Schema::parse_str(r#"{"type": "enum", "name": "Color", "symbols": ["R", "G", "B"]}"#)?;
        let Schema::Enum(colors) = schema else {
            panic!("expected an enum schema");
        };
        assert_eq!(colors.index_of("G"), Some(1));
        assert_eq!(colors.index_of("Y"), None);
        Ok(())
    }
}
