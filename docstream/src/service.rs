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

//! The operations a network front end exposes: registering schemas and streaming records
//! into and out of a store.

use crate::{
    AvroResult,
    error::RunError,
    pipeline::{ExportReport, IngestReport, Pipeline},
    registry::{SchemaId, SchemaRegistry},
    store::{DocumentSink, DocumentSource},
};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

/// Ties a [`SchemaRegistry`] to the sink ingested records go to.
///
/// ```
/// # use avro_docstream::{service::StreamService, store::MemoryStore};
/// # use std::sync::Arc;
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = Arc::new(MemoryStore::new());
/// let service = StreamService::builder().sink(store.clone()).build();
///
/// let id = service.register_schema(
///     r#"{"type": "record", "name": "Tick", "fields": [{"name": "n", "type": "long"}]}"#,
/// )?;
/// let report = service.ingest(&id, "ticks", &[2u8, 4][..]).await?;
/// assert_eq!(report.records, 2);
/// assert_eq!(store.len("ticks"), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
#[derive(bon::Builder)]
pub struct StreamService {
    #[builder(default)]
    registry: Arc<SchemaRegistry>,
    sink: Arc<dyn DocumentSink>,
    #[builder(default)]
    pipeline: Pipeline,
}

impl StreamService {
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Registers a record schema and returns its generated id.
    pub fn register_schema(&self, text: &str) -> AvroResult<SchemaId> {
        self.registry.register(text)
    }

    /// Streams the records of `reader`, encoded with schema `id`, into `collection`.
    ///
    /// An unknown id fails before anything is read.
    pub async fn ingest<R>(
        &self,
        id: &SchemaId,
        collection: &str,
        reader: R,
    ) -> Result<IngestReport, RunError>
    where
        R: AsyncRead + Unpin,
    {
        self.ingest_with_cancellation(id, collection, reader, &CancellationToken::new())
            .await
    }

    pub async fn ingest_with_cancellation<R>(
        &self,
        id: &SchemaId,
        collection: &str,
        reader: R,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, RunError>
    where
        R: AsyncRead + Unpin,
    {
        let entry = self.registry.get(id).map_err(|e| RunError::new(0, e))?;
        self.pipeline
            .ingest_with_cancellation(&entry.schema, collection, reader, self.sink.as_ref(), cancel)
            .await
    }

    /// Writes the documents of `source` to `writer`, encoded with schema `id`.
    pub async fn export<W>(
        &self,
        id: &SchemaId,
        source: &mut dyn DocumentSource,
        writer: W,
    ) -> Result<ExportReport, RunError>
    where
        W: AsyncWrite + Unpin,
    {
        let entry = self.registry.get(id).map_err(|e| RunError::new(0, e))?;
        self.pipeline.export(&entry.schema, source, writer).await
    }
}
