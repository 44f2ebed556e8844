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

use crate::AvroResult;
use crate::error::Details;
use crate::schema::{Schema, SchemaKind};
use std::collections::HashSet;

/// A description of a Union schema
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    schemas: Vec<Schema>,
}

impl UnionSchema {
    /// Creates a new UnionSchema from a vector of schemas.
    ///
    /// # Errors
    /// Will return an error if `schemas` has duplicate unnamed schemas, duplicate named
    /// schemas or if `schemas` contains a union.
    pub fn new(schemas: Vec<Schema>) -> AvroResult<Self> {
        let mut kinds = HashSet::new();
        let mut names = HashSet::new();
        for schema in &schemas {
            if let Schema::Union(_) = schema {
                return Err(Details::GetNestedUnion.into());
            }
            let unique = match schema.name() {
                Some(name) => names.insert(name.fullname()),
                None => kinds.insert(SchemaKind::from(schema)),
            };
            if !unique {
                return Err(Details::GetUnionDuplicate.into());
            }
        }
        Ok(UnionSchema { schemas })
    }

    /// Returns a slice to all variants of this schema.
    pub fn variants(&self) -> &[Schema] {
        &self.schemas
    }

    /// Returns true if the any of the variants of this `UnionSchema` is `Null`.
    pub fn is_nullable(&self) -> bool {
        self.null_variant().is_some()
    }

    /// The position of the `null` branch, if there is one.
    pub fn null_variant(&self) -> Option<usize> {
        self.schemas.iter().position(|s| matches!(s, Schema::Null))
    }
}
