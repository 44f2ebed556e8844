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

use crate::error::Details;
use crate::schema::{
    EnumSchema, FixedSchema, Name, NamespaceRef, RecordField, RecordSchema, Schema, UnionSchema,
};
use crate::util::MapHelper;
use crate::validator::{validate_enum_symbol_name, validate_record_field_name};
use crate::{AvroResult, Error};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct Parser {
    /// Records whose fields are being parsed. A reference to one of them is recursive.
    resolving_schemas: HashSet<Name>,
    /// Named schemas defined so far. A later reference shares the definition.
    parsed_schemas: HashMap<Name, Schema>,
}

impl Parser {
    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro schema.
    pub(super) fn parse(
        &mut self,
        value: &Value,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match *value {
            Value::String(ref t) => self.parse_known_schema(t.as_str(), enclosing_namespace),
            Value::Object(ref data) => self.parse_complex(data, enclosing_namespace),
            Value::Array(ref data) => self.parse_union(data, enclosing_namespace),
            _ => Err(Details::ParseSchemaFromValidJson.into()),
        }
    }

    /// Parse a string as a primitive type or reference to an already defined named type.
    fn parse_known_schema(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match name {
            "null" => Ok(Schema::Null),
            "boolean" => Ok(Schema::Boolean),
            "int" => Ok(Schema::Int),
            "long" => Ok(Schema::Long),
            "double" => Ok(Schema::Double),
            "float" => Ok(Schema::Float),
            "bytes" => Ok(Schema::Bytes),
            "string" => Ok(Schema::String),
            _ => self.fetch_schema_ref(name, enclosing_namespace),
        }
    }

    fn fetch_schema_ref(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::new_with_enclosing_namespace(name, enclosing_namespace)
            .map_err(|_| Details::ParsePrimitive(name.to_string()))?;

        if let Some(parsed) = self.parsed_schemas.get(&fully_qualified_name) {
            return Ok(parsed.clone());
        }
        if self.resolving_schemas.contains(&fully_qualified_name) {
            return Err(Details::RecursiveSchema(fully_qualified_name.to_string()).into());
        }
        Err(Details::ParsePrimitive(fully_qualified_name.to_string()).into())
    }

    /// e.g: `{"type": {"type": "string"}}`
    ///
    /// A `logicalType` attribute is ignored and the underlying type is used.
    fn parse_complex(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        match complex.get("type") {
            Some(Value::String(t)) => match t.as_str() {
                "record" => self.parse_record(complex, enclosing_namespace),
                "enum" => self.parse_enum(complex, enclosing_namespace),
                "array" => self.parse_array(complex, enclosing_namespace),
                "map" => self.parse_map(complex, enclosing_namespace),
                "fixed" => self.parse_fixed(complex, enclosing_namespace),
                other => self.parse_known_schema(other, enclosing_namespace),
            },
            Some(Value::Object(data)) => self.parse_complex(data, enclosing_namespace),
            Some(Value::Array(variants)) => self.parse_union(variants, enclosing_namespace),
            Some(unknown) => Err(Details::GetComplexType(unknown.clone()).into()),
            None => Err(Details::GetComplexTypeField.into()),
        }
    }

    fn define(&mut self, name: &Name) -> AvroResult<()> {
        if self.parsed_schemas.contains_key(name) || self.resolving_schemas.contains(name) {
            return Err(Details::NameCollision(name.to_string()).into());
        }
        Ok(())
    }

    /// Parse a `serde_json::Value` representing an Avro record type into a `Schema`.
    fn parse_record(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        self.define(&fully_qualified_name)?;
        self.resolving_schemas.insert(fully_qualified_name.clone());

        debug!("Going to parse record schema: {:?}", &fully_qualified_name);

        let fields_json = complex
            .get("fields")
            .and_then(|fields| fields.as_array())
            .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))?;

        let mut fields = Vec::with_capacity(fields_json.len());
        let mut lookup = BTreeMap::new();
        for (position, field) in fields_json.iter().enumerate() {
            let field = field
                .as_object()
                .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))?;
            let field = self.parse_field(field, fully_qualified_name.namespace())?;
            if lookup.insert(field.name.clone(), position).is_some() {
                return Err(Details::FieldNameDuplicate(field.name).into());
            }
            fields.push(field);
        }

        let schema = Schema::Record(Arc::new(RecordSchema {
            name: fully_qualified_name.clone(),
            doc: complex.string("doc"),
            fields,
            lookup,
        }));

        self.resolving_schemas.remove(&fully_qualified_name);
        self.parsed_schemas
            .insert(fully_qualified_name, schema.clone());
        Ok(schema)
    }

    fn parse_field(
        &mut self,
        field: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<RecordField> {
        let name = field.name().ok_or(Details::GetNameField)?;
        validate_record_field_name(&name)?;

        let schema = match field.get("type") {
            Some(ty) => self.parse(ty, enclosing_namespace)?,
            None => return Err(Details::GetRecordFieldTypeField(name).into()),
        };

        Ok(RecordField {
            name,
            doc: field.string("doc"),
            schema,
        })
    }

    /// Parse a `serde_json::Value` representing a Avro enum type into a `Schema`.
    fn parse_enum(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        self.define(&fully_qualified_name)?;

        let symbols: Vec<String> = complex
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::from(Details::GetEnumSymbolsField))
            .and_then(|symbols| {
                symbols
                    .iter()
                    .map(|symbol| symbol.as_str().map(|s| s.to_string()))
                    .collect::<Option<_>>()
                    .ok_or_else(|| Error::from(Details::GetEnumSymbols))
            })?;

        let mut existing_symbols: HashSet<&String> = HashSet::with_capacity(symbols.len());
        for symbol in symbols.iter() {
            validate_enum_symbol_name(symbol)?;

            if !existing_symbols.insert(symbol) {
                return Err(Details::EnumSymbolDuplicate(symbol.to_string()).into());
            }
        }

        let schema = Schema::Enum(Arc::new(EnumSchema {
            name: fully_qualified_name.clone(),
            symbols,
        }));
        self.parsed_schemas
            .insert(fully_qualified_name, schema.clone());
        Ok(schema)
    }

    /// Parse a `serde_json::Value` representing a Avro array type into a `Schema`.
    fn parse_array(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        complex
            .get("items")
            .ok_or_else(|| Details::GetArrayItemsField.into())
            .and_then(|items| self.parse(items, enclosing_namespace))
            .map(Schema::array)
    }

    /// Parse a `serde_json::Value` representing a Avro map type into a `Schema`.
    fn parse_map(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        complex
            .get("values")
            .ok_or_else(|| Details::GetMapValuesField.into())
            .and_then(|types| self.parse(types, enclosing_namespace))
            .map(Schema::map)
    }

    /// Parse a `serde_json::Value` representing a Avro union type into a `Schema`.
    fn parse_union(
        &mut self,
        items: &[Value],
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let schemas = items
            .iter()
            .map(|v| self.parse(v, enclosing_namespace))
            .collect::<Result<Vec<_>, _>>()?;
        if schemas.len() < 2 {
            warn!("Union schema with {} member(s)! Consider dropping the union!", schemas.len());
        }
        Ok(Schema::Union(UnionSchema::new(schemas)?))
    }

    /// Parse a `serde_json::Value` representing a Avro fixed type into a `Schema`.
    fn parse_fixed(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Schema> {
        let size = match complex.get("size") {
            Some(size) => size
                .as_u64()
                .ok_or_else(|| Details::GetFixedSizeFieldPositive(size.clone())),
            None => Err(Details::GetFixedSizeField),
        }?;

        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        self.define(&fully_qualified_name)?;

        let schema = Schema::Fixed(Arc::new(FixedSchema {
            name: fully_qualified_name.clone(),
            size: size as usize,
        }));
        self.parsed_schemas
            .insert(fully_qualified_name, schema.clone());
        Ok(schema)
    }
}
