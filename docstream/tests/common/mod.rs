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

#![allow(dead_code)]

type TestResult<T = ()> = anyhow::Result<T>;
use async_trait::async_trait;
use avro_docstream::{
    Schema, encode_to_vec,
    document::Document,
    error::BoxError,
    store::{DocumentSink, MemoryStore},
    types::Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

pub const EVENT_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Event",
    "namespace": "test.ingest",
    "fields": [
        {"name": "seq", "type": "long"},
        {"name": "name", "type": "string"},
        {"name": "tag", "type": ["null", "string"]}
    ]
}"#;

pub fn event_schema() -> Schema {
    Schema::parse_str(EVENT_SCHEMA).expect("valid event schema")
}

pub fn event(seq: i64) -> Value {
    let tag = if seq % 2 == 0 {
        Value::Union(0, Box::new(Value::Null))
    } else {
        Value::Union(1, Box::new(Value::String(format!("odd-{seq}"))))
    };
    Value::Record(vec![
        ("seq".to_string(), Value::Long(seq)),
        ("name".to_string(), Value::String(format!("event number {seq}"))),
        ("tag".to_string(), tag),
    ])
}

/// `count` encoded events, back to back.
pub fn encoded_events(count: i64) -> TestResult<Vec<u8>> {
    let schema = event_schema();
    let mut bytes = Vec::new();
    for seq in 0..count {
        bytes.extend(encode_to_vec(&event(seq), &schema)?);
    }
    Ok(bytes)
}

/// Passes batches to a [`MemoryStore`] until `fail_at` calls were made, then rejects them.
pub struct FailingSink {
    pub store: MemoryStore,
    calls: AtomicUsize,
    fail_at: usize,
}

impl FailingSink {
    pub fn new(fail_at: usize) -> Self {
        Self {
            store: MemoryStore::new(),
            calls: AtomicUsize::new(0),
            fail_at,
        }
    }
}

#[async_trait]
impl DocumentSink for FailingSink {
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), BoxError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err("write concern error".into());
        }
        self.store.insert_many(collection, documents).await
    }
}

/// Cancels `token` once `after` batches were written.
pub struct CancellingSink {
    pub store: MemoryStore,
    pub token: CancellationToken,
    after: usize,
}

impl CancellingSink {
    pub fn new(after: usize) -> Self {
        Self {
            store: MemoryStore::new(),
            token: CancellationToken::new(),
            after,
        }
    }
}

#[async_trait]
impl DocumentSink for CancellingSink {
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), BoxError> {
        self.store.insert_many(collection, documents).await?;
        if self.store.batch_sizes(collection).len() == self.after {
            self.token.cancel();
        }
        Ok(())
    }
}
