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

//! The seam between the pipeline and a document store.
//!
//! A store driver implements [`DocumentSink`] to receive ingested documents and
//! [`DocumentSource`] to feed an export. [`MemoryStore`] is an in-process implementation
//! of both.

mod memory;

pub use memory::{MemorySource, MemoryStore};

use crate::{document::Document, error::BoxError};
use async_trait::async_trait;

/// The database a receiver writes to when the store URL does not name one.
pub const DEFAULT_DATABASE: &str = "test";

/// Destination of ingested documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Inserts `documents` into `collection`, in order, as one ordered bulk write.
    ///
    /// An error means the batch is not known to be committed. Earlier batches stay
    /// committed.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>)
    -> Result<(), BoxError>;
}

/// Origin of exported documents.
#[async_trait]
pub trait DocumentSource: Send {
    /// Fetches the next batch of documents, `None` once the source is exhausted.
    async fn next_batch(&mut self) -> Result<Option<Vec<Document>>, BoxError>;
}

/// Returns the database named in the path of a store URL, or [`DEFAULT_DATABASE`].
///
/// ```
/// # use avro_docstream::store::database_name;
/// assert_eq!(database_name("mongodb://localhost:27017/sales?retryWrites=true"), "sales");
/// assert_eq!(database_name("mongodb://localhost:27017"), "test");
/// ```
pub fn database_name(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split_once('/')
        .map_or("", |(_, path)| path);
    let name = path.split(['?', '/']).next().unwrap_or_default();
    if name.is_empty() { DEFAULT_DATABASE } else { name }
}
