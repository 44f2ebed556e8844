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
    AvroResult, Error,
    bridge::document_to_avro,
    encode::encode,
    error::{Details, RunError},
    pipeline::{ExportReport, Pipeline, metrics::PipelineMetrics, require_record},
    schema::Schema,
    store::DocumentSource,
};
use log::{debug, error};
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt};

impl Pipeline {
    /// Encodes the documents of `source` against `schema` and writes them to `writer`.
    ///
    /// The output is a plain concatenation of encoded records, readable by
    /// [`ingest`](Self::ingest). It is written once per fetched batch. On failure,
    /// `committed` counts the records already written.
    pub async fn export<W>(
        &self,
        schema: &Schema,
        source: &mut dyn DocumentSource,
        mut writer: W,
    ) -> Result<ExportReport, RunError>
    where
        W: AsyncWrite + Unpin,
    {
        require_record(schema).map_err(|e| RunError::new(0, e))?;

        let metrics = PipelineMetrics::new();
        let mut records = 0;
        let mut bytes = 0;
        let mut buffer = Vec::new();
        let fail = |records: usize, error: Error| {
            error!("Export aborted after {records} written records: {error}");
            RunError::new(records, error)
        };

        let result = loop {
            let batch = match source.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break Ok(()),
                Err(e) => break Err(fail(records, Details::SourceRead(e).into())),
            };
            metrics.add_batch();

            buffer.clear();
            let encoded: AvroResult<()> = batch.iter().try_for_each(|document| {
                let started = Instant::now();
                let value = document_to_avro(document, schema)?;
                metrics.mapping.record(started.elapsed());

                let started = Instant::now();
                encode(&value, schema, &mut buffer)?;
                metrics.codec.record(started.elapsed());
                Ok(())
            });
            if let Err(e) = encoded {
                break Err(fail(records, e));
            }

            let started = Instant::now();
            if let Err(e) = writer.write_all(&buffer).await {
                break Err(fail(records, Details::WriteOutput(e).into()));
            }
            metrics.writing.record(started.elapsed());

            records += batch.len();
            bytes += buffer.len();
            metrics.add_records(batch.len() as u64);
            metrics.add_bytes(buffer.len() as u64);
            debug!("Exported {} records, {records} in total", batch.len());
        };

        let result = match result {
            Ok(()) => writer
                .flush()
                .await
                .map_err(|e| fail(records, Details::WriteOutput(e).into())),
            err => err,
        };

        self.finish_run("export", &metrics);
        result.map(|()| ExportReport { records, bytes })
    }
}
