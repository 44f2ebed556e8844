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

use serde::{Deserialize, Serialize};

/// Number of documents written to the sink per `insert_many`.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Number of bytes requested from the input stream per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Tuning of a pipeline run.
///
/// ```
/// # use avro_docstream::pipeline::PipelineConfig;
/// let config = PipelineConfig::builder().batch_size(500).build();
/// assert_eq!(config.read_chunk_size, 8192);
///
/// let config: PipelineConfig = serde_json::from_str(r#"{"batch_size": 10}"#).unwrap();
/// assert_eq!(config, PipelineConfig::builder().batch_size(10).build());
/// ```
#[derive(bon::Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Documents per batch. Values below one are treated as one.
    #[builder(default = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Bytes per read of the input stream. Values below one are treated as one.
    #[builder(default = DEFAULT_READ_CHUNK_SIZE)]
    pub read_chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PipelineConfig {
    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub(crate) fn effective_read_chunk_size(&self) -> usize {
        self.read_chunk_size.max(1)
    }
}
