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

//! # Name validation
//!
//! Schema names, namespaces, enum symbols and record field names are checked against the
//! rules of the [Avro specification](https://avro.apache.org/docs/++version++/specification/#names).
//!
//! Record fields may additionally be called [`DATE_WRAPPER_FIELD`], which is how documents
//! carry date-times through a string field.
//!
//! Stores that accept looser names can register their own [`NameValidator`]:
//!
//! ```
//! # use avro_docstream::validator::{NameValidator, set_name_validator};
//! # use avro_docstream::AvroResult;
//! struct AnyFieldName;
//!
//! impl NameValidator for AnyFieldName {
//!     fn validate_record_field_name(&self, _field_name: &str) -> AvroResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! // don't parse any schema before registering the custom validator!
//! if set_name_validator(Box::new(AnyFieldName)).is_err() {
//!     panic!("There was already a name validator configured")
//! }
//! ```
//!
//! **Note**: a validator can be set only once per application lifetime. Parsing a schema
//! before setting one registers the default validator.

use crate::{AvroResult, error::Details};
use log::debug;
use regex_lite::Regex;
use std::sync::OnceLock;

/// The reserved field name of a record that wraps a date-time.
pub const DATE_WRAPPER_FIELD: &str = "$date";

fn schema_name_regex() -> &'static Regex {
    static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SCHEMA_NAME_ONCE.get_or_init(|| {
        Regex::new(
            // An optional namespace (with optional dots) followed by a name without any dots in it.
            r"^((?P<namespace>([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)$",
        )
        .expect("Regex is valid")
    })
}

fn namespace_regex() -> &'static Regex {
    static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
    NAMESPACE_ONCE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)?(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("Regex is valid")
    })
}

fn simple_name_regex() -> &'static Regex {
    static SIMPLE_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SIMPLE_NAME_ONCE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
}

/// Validates the names found in a schema.
///
/// Every method has a default implementation following the Avro rules, so an implementor
/// overrides only what it wants to relax.
pub trait NameValidator: Send + Sync {
    /// Validates a (possibly qualified) schema name and returns the start byte of the name part.
    fn validate_schema_name(&self, schema_name: &str) -> AvroResult<usize> {
        let regex = schema_name_regex();
        let caps = regex
            .captures(schema_name)
            .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()))?;
        caps.name("name")
            .map(|name| name.start())
            .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()).into())
    }

    fn validate_namespace(&self, namespace: &str) -> AvroResult<()> {
        let regex = namespace_regex();
        if !regex.is_match(namespace) {
            return Err(Details::InvalidNamespace(namespace.to_string(), regex.as_str()).into());
        }
        Ok(())
    }

    fn validate_enum_symbol_name(&self, symbol: &str) -> AvroResult<()> {
        if !simple_name_regex().is_match(symbol) {
            return Err(Details::EnumSymbolName(symbol.to_string()).into());
        }
        Ok(())
    }

    fn validate_record_field_name(&self, field_name: &str) -> AvroResult<()> {
        if field_name != DATE_WRAPPER_FIELD && !simple_name_regex().is_match(field_name) {
            return Err(Details::FieldName(field_name.to_string()).into());
        }
        Ok(())
    }
}

struct SpecificationValidator;

impl NameValidator for SpecificationValidator {}

static NAME_VALIDATOR_ONCE: OnceLock<Box<dyn NameValidator>> = OnceLock::new();

/// Sets a custom name validator.
///
/// Returns `Err(validator)` if a validator is already configured.
pub fn set_name_validator(
    validator: Box<dyn NameValidator>,
) -> Result<(), Box<dyn NameValidator>> {
    debug!("Setting a custom name validator.");
    NAME_VALIDATOR_ONCE.set(validator)
}

fn validator() -> &'static dyn NameValidator {
    NAME_VALIDATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default name validator.");
            Box::new(SpecificationValidator)
        })
        .as_ref()
}

pub(crate) fn validate_schema_name(schema_name: &str) -> AvroResult<usize> {
    validator().validate_schema_name(schema_name)
}

pub(crate) fn validate_namespace(namespace: &str) -> AvroResult<()> {
    validator().validate_namespace(namespace)
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    validator().validate_enum_symbol_name(symbol)
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    validator().validate_record_field_name(field_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Person", 0)]
    #[case("com.example.Person", 12)]
    #[case("_private", 0)]
    fn accepts_schema_names(#[case] name: &str, #[case] start: usize) -> anyhow::Result<()> {
        assert_eq!(SpecificationValidator.validate_schema_name(name)?, start);
        Ok(())
    }

    #[rstest]
    #[case("1abc")]
    #[case("com.1bad.Name")]
    #[case("has-dash")]
    #[case("")]
    fn rejects_schema_names(#[case] name: &str) {
        let err = SpecificationValidator
            .validate_schema_name(name)
            .unwrap_err();
        assert!(matches!(err.details(), Details::InvalidSchemaName(..)));
    }

    #[test]
    fn date_wrapper_is_a_valid_field_name() -> anyhow::Result<()> {
        SpecificationValidator.validate_record_field_name(DATE_WRAPPER_FIELD)?;
        let err = SpecificationValidator
            .validate_record_field_name("$other")
            .unwrap_err();
        assert!(matches!(err.details(), Details::FieldName(_)));
        Ok(())
    }

    #[test]
    fn enum_symbols_are_simple_names() {
        assert!(SpecificationValidator.validate_enum_symbol_name("RED").is_ok());
        assert!(
            SpecificationValidator
                .validate_enum_symbol_name("$date")
                .is_err()
        );
    }
}
