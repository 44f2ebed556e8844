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
    document::Document,
    error::BoxError,
    store::{DocumentSink, DocumentSource},
};
use async_trait::async_trait;
use log::debug;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    batch_sizes: Vec<usize>,
}

/// A document store kept in memory, keyed by collection name.
///
/// Besides the documents it remembers the size of every `insert_many` call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        // a panicking writer leaves whole batches behind, the map stays usable
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the documents in `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    /// The size of each batch written to `collection`, in order.
    pub fn batch_sizes(&self, collection: &str) -> Vec<usize> {
        self.lock()
            .get(collection)
            .map(|c| c.batch_sizes.clone())
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .get(collection)
            .map_or(0, |c| c.documents.len())
    }

    /// Adds documents to `collection` without recording a batch.
    pub fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .documents
            .extend(documents);
    }

    /// A source over a snapshot of `collection`, yielding batches of `batch_size` documents.
    pub fn source(&self, collection: &str, batch_size: usize) -> MemorySource {
        MemorySource::new(self.documents(collection), batch_size)
    }
}

#[async_trait]
impl DocumentSink for MemoryStore {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), BoxError> {
        debug!(
            "Inserting {} documents into collection {collection}",
            documents.len()
        );
        let mut collections = self.lock();
        let target = collections.entry(collection.to_string()).or_default();
        target.batch_sizes.push(documents.len());
        target.documents.extend(documents);
        Ok(())
    }
}

/// A [`DocumentSource`] over documents held in memory.
#[derive(Debug)]
pub struct MemorySource {
    documents: std::vec::IntoIter<Document>,
    batch_size: usize,
}

impl MemorySource {
    /// `batch_size` is clamped to at least one document.
    pub fn new(documents: Vec<Document>, batch_size: usize) -> Self {
        Self {
            documents: documents.into_iter(),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Document>>, BoxError> {
        let batch: Vec<Document> = self.documents.by_ref().take(self.batch_size).collect();
        Ok(if batch.is_empty() { None } else { Some(batch) })
    }
}
