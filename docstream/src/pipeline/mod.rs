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

//! Streaming of Avro records between byte streams and document stores.
//!
//! Ingest reads back-to-back encoded records from an [`AsyncRead`](tokio::io::AsyncRead),
//! maps each to a document and writes them to a [`DocumentSink`](crate::store::DocumentSink)
//! in batches. Export does the reverse from a [`DocumentSource`](crate::store::DocumentSource)
//! to an [`AsyncWrite`](tokio::io::AsyncWrite).
//!
//! ```
//! # use avro_docstream::{Schema, pipeline::Pipeline, store::MemoryStore};
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = Schema::parse_str(
//!     r#"{"type": "record", "name": "Point", "fields": [{"name": "x", "type": "int"}]}"#,
//! )?;
//! let store = MemoryStore::new();
//! let pipeline = Pipeline::default();
//!
//! let input: &[u8] = &[2, 4, 6];
//! let report = pipeline.ingest(&schema, "points", input, &store).await?;
//! assert_eq!(report.records, 3);
//! assert_eq!(store.len("points"), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

mod batch;
mod config;
mod export;
mod ingest;
mod metrics;

pub use config::{DEFAULT_BATCH_SIZE, DEFAULT_READ_CHUNK_SIZE, PipelineConfig};
pub use metrics::{MetricsSnapshot, PipelineMetrics, StageStats, StageTimer};

use crate::{error::Details, schema::Schema, AvroResult};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Records decoded and inserted.
    pub records: usize,
    /// Calls made to `insert_many`.
    pub batches: usize,
}

/// Outcome of a successful export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Records encoded and written.
    pub records: usize,
    /// Bytes written to the output.
    pub bytes: usize,
}

/// Runs ingest and export with a shared configuration.
///
/// Every run logs its own summary. The figures of all runs are also added to
/// [`metrics`](Self::metrics), which may be shared with other pipelines.
#[derive(Debug, Default, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_metrics(config, Arc::default())
    }

    pub fn with_metrics(config: PipelineConfig, metrics: Arc<PipelineMetrics>) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The aggregated metrics of every run of this pipeline.
    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    fn finish_run(&self, run: &str, metrics: &PipelineMetrics) {
        let snapshot = metrics.snapshot();
        snapshot.log_summary(run);
        self.metrics.absorb(&snapshot);
    }
}

/// Both directions operate on a top-level record.
fn require_record(schema: &Schema) -> AvroResult<()> {
    match schema {
        Schema::Record(_) => Ok(()),
        other => Err(Details::TopLevelNotRecord(other.into()).into()),
    }
}
