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

use crate::document::Document;

/// Documents waiting to be flushed to the sink, in arrival order.
#[derive(Debug)]
pub(crate) struct Batch {
    documents: Vec<Document>,
    capacity: usize,
}

impl Batch {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            documents: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a document and returns whether the batch is now full.
    pub(crate) fn push(&mut self, document: Document) -> bool {
        self.documents.push(document);
        self.documents.len() >= self.capacity
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Hands out the accumulated documents and starts a new batch.
    pub(crate) fn take(&mut self) -> Vec<Document> {
        std::mem::replace(&mut self.documents, Vec::with_capacity(self.capacity))
    }
}
