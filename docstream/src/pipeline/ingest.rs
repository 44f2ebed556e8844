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
    Error,
    bridge::to_document,
    decode::decode,
    error::{Details, RunError},
    pipeline::{IngestReport, Pipeline, batch::Batch, metrics::PipelineMetrics, require_record},
    schema::Schema,
    store::DocumentSink,
};
use log::{debug, error};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// Where an ingest run stands. A failure carries the records committed before it.
struct IngestRun<'a> {
    schema: &'a Schema,
    collection: &'a str,
    sink: &'a dyn DocumentSink,
    cancel: &'a CancellationToken,
    batch: Batch,
    committed: usize,
    batches: usize,
    metrics: PipelineMetrics,
}

impl IngestRun<'_> {
    fn fail(&self, error: impl Into<Error>) -> RunError {
        let error = error.into();
        error!(
            "Ingest into {} aborted after {} committed records: {error}",
            self.collection, self.committed
        );
        RunError::new(self.committed, error)
    }

    /// Decodes every complete record at the front of `input`, returning the number of bytes
    /// consumed. A record cut short is left for the next call unless `eof` is set.
    async fn drain(&mut self, input: &[u8], eof: bool) -> Result<usize, RunError> {
        let mut consumed = 0;
        while consumed < input.len() {
            let remaining = &input[consumed..];
            let mut cursor = remaining;

            let started = Instant::now();
            let value = match decode(self.schema, &mut cursor) {
                Ok(value) => value,
                Err(e) if e.is_unexpected_eof() && !eof => break,
                Err(e) => return Err(self.fail(e)),
            };
            self.metrics.codec.record(started.elapsed());

            let used = remaining.len() - cursor.len();
            if used == 0 {
                return Err(self.fail(Details::ZeroWidthRecord {
                    remaining: remaining.len(),
                }));
            }
            consumed += used;

            let started = Instant::now();
            let document = to_document(value, self.schema).map_err(|e| self.fail(e))?;
            self.metrics.mapping.record(started.elapsed());
            self.metrics.add_records(1);

            if self.batch.push(document) {
                self.flush().await?;
            }
        }
        Ok(consumed)
    }

    /// Appends input to `buffer` until it holds at least `wanted` bytes, reading at most
    /// `chunk_size` bytes at a time. At least one read happens. Returns whether the input
    /// is exhausted.
    async fn fill<R>(
        &mut self,
        reader: &mut R,
        buffer: &mut Vec<u8>,
        wanted: usize,
        chunk_size: usize,
    ) -> Result<bool, RunError>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if self.cancel.is_cancelled() {
                return Err(self.fail(Details::Cancelled));
            }
            buffer.reserve(chunk_size);
            let read = self
                .cancel
                .run_until_cancelled(
                    (&mut *reader)
                        .take(chunk_size as u64)
                        .read_buf(buffer),
                )
                .await;
            match read {
                None => return Err(self.fail(Details::Cancelled)),
                Some(Err(e)) => return Err(self.fail(Details::ReadInput(e))),
                Some(Ok(0)) => return Ok(true),
                Some(Ok(n)) => {
                    self.metrics.add_bytes(n as u64);
                    if buffer.len() >= wanted {
                        return Ok(false);
                    }
                }
            }
        }
    }

    async fn flush(&mut self) -> Result<(), RunError> {
        if self.cancel.is_cancelled() {
            return Err(self.fail(Details::Cancelled));
        }
        let documents = self.batch.take();
        let count = documents.len();

        let started = Instant::now();
        self.sink
            .insert_many(self.collection, documents)
            .await
            .map_err(|source| {
                self.fail(Details::SinkWrite {
                    collection: self.collection.to_string(),
                    count,
                    source,
                })
            })?;
        self.metrics.writing.record(started.elapsed());
        self.metrics.add_batch();

        self.committed += count;
        self.batches += 1;
        debug!(
            "Flushed {count} documents into {}, {} committed",
            self.collection, self.committed
        );
        Ok(())
    }
}

impl Pipeline {
    /// Decodes the records of `reader` against `schema` and inserts them into `collection`.
    ///
    /// The input is a plain concatenation of encoded records. It ends cleanly only when it
    /// runs out exactly at the start of a record. Documents go to the sink in batches of
    /// [`PipelineConfig::batch_size`](crate::pipeline::PipelineConfig::batch_size), the last
    /// one possibly shorter.
    pub async fn ingest<R>(
        &self,
        schema: &Schema,
        collection: &str,
        reader: R,
        sink: &dyn DocumentSink,
    ) -> Result<IngestReport, RunError>
    where
        R: AsyncRead + Unpin,
    {
        self.ingest_with_cancellation(schema, collection, reader, sink, &CancellationToken::new())
            .await
    }

    /// Like [`ingest`](Self::ingest), stopping when `cancel` fires.
    ///
    /// Cancellation is observed while waiting for input and before each flush. A batch
    /// already handed to the sink is awaited. A cancelled run fails with
    /// [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled) and counts only the batches
    /// flushed before it, the partial batch is dropped.
    pub async fn ingest_with_cancellation<R>(
        &self,
        schema: &Schema,
        collection: &str,
        mut reader: R,
        sink: &dyn DocumentSink,
        cancel: &CancellationToken,
    ) -> Result<IngestReport, RunError>
    where
        R: AsyncRead + Unpin,
    {
        require_record(schema).map_err(|e| RunError::new(0, e))?;

        let chunk_size = self.config.effective_read_chunk_size();
        let mut run = IngestRun {
            schema,
            collection,
            sink,
            cancel,
            batch: Batch::new(self.config.effective_batch_size()),
            committed: 0,
            batches: 0,
            metrics: PipelineMetrics::new(),
        };
        debug!("Starting ingest into {collection}");

        // Bytes read but not consumed yet, always starting at the first byte of a record.
        let mut buffer: Vec<u8> = Vec::with_capacity(chunk_size);
        let mut eof = false;
        let result = loop {
            let consumed = match run.drain(&buffer, eof).await {
                Ok(consumed) => consumed,
                Err(e) => break Err(e),
            };
            buffer.drain(..consumed);
            if eof {
                break Ok(());
            }

            // A record cut short is decoded again only once the buffer has doubled, so a
            // large record costs a bounded number of attempts.
            let wanted = buffer.len() * 2;
            eof = match run.fill(&mut reader, &mut buffer, wanted, chunk_size).await {
                Ok(eof) => eof,
                Err(e) => break Err(e),
            };
        };

        let result = match result {
            Ok(()) if !run.batch.is_empty() => run.flush().await,
            other => other,
        };

        self.finish_run(&format!("ingest into {collection}"), &run.metrics);
        result.map(|()| IngestReport {
            records: run.committed,
            batches: run.batches,
        })
    }
}
