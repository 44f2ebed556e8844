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

//! In-memory registry of the schemas producers encode with.

use crate::{AvroResult, error::Details, schema::Schema};
use log::debug;
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::{Arc, PoisonError, RwLock},
};
use uuid::Uuid;

/// The generated identifier of a registered schema.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(String);

impl SchemaId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SchemaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A registered schema. Never changes after registration.
#[derive(Debug)]
pub struct RegistryEntry {
    pub id: SchemaId,
    /// The schema text as it was registered.
    pub text: String,
    pub schema: Schema,
}

/// Schemas registered for the lifetime of the process.
///
/// Lookups take a read lock and hand out the shared entry, so concurrent runs never
/// block each other for longer than a map access.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: RwLock<HashMap<SchemaId, Arc<RegistryEntry>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and stores it under a freshly generated id.
    ///
    /// The top-level schema must be a record.
    pub fn register(&self, text: &str) -> AvroResult<SchemaId> {
        let schema = Schema::parse_str(text)?;
        if !matches!(schema, Schema::Record(_)) {
            return Err(Details::TopLevelNotRecord((&schema).into()).into());
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let id = SchemaId::generate();
            if let Entry::Vacant(slot) = entries.entry(id.clone()) {
                slot.insert(Arc::new(RegistryEntry {
                    id: id.clone(),
                    text: text.to_string(),
                    schema,
                }));
                break id;
            }
        };
        debug!("Registered schema {id}");
        Ok(id)
    }

    /// Returns the entry registered under `id`.
    pub fn get(&self, id: &SchemaId) -> AvroResult<Arc<RegistryEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| Details::SchemaNotFound(id.to_string()).into())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
