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

mod common;

type TestResult<T = ()> = anyhow::Result<T>;
use avro_docstream::{
    ErrorKind, PipelineConfig, SchemaId, StreamService,
    document::{Document, DocumentValue},
    error::Details,
    pipeline::Pipeline,
    store::{DocumentSource, MemorySource, MemoryStore},
};
use common::{EVENT_SCHEMA, encoded_events};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn service(store: &Arc<MemoryStore>) -> StreamService {
    StreamService::builder()
        .sink(store.clone())
        .pipeline(Pipeline::new(PipelineConfig::builder().batch_size(10).build()))
        .build()
}

#[tokio::test]
async fn test_ingest_through_a_registered_schema() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let id = service.register_schema(EVENT_SCHEMA)?;
    let input = encoded_events(25)?;
    let report = service.ingest(&id, "events", input.as_slice()).await?;

    assert_eq!(report.records, 25);
    assert_eq!(store.batch_sizes("events"), vec![10, 10, 5]);
    assert_eq!(service.registry().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_schema_fails_before_reading() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    // reading from a broken stream would fail with an io error instead
    let (client, server) = tokio::io::duplex(8);
    drop(client);
    let err = service
        .ingest(&SchemaId::from("no-such-id"), "events", server)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(err.committed, 0);
    assert!(matches!(err.error.details(), Details::SchemaNotFound(id) if id == "no-such-id"));
    assert_eq!(store.len("events"), 0);
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_non_record_schemas() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let err = service.register_schema(r#""string""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    let err = service.register_schema(r#"{"type": "record"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_export_then_ingest_round_trip() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);
    let id = service.register_schema(EVENT_SCHEMA)?;

    let input = encoded_events(42)?;
    service.ingest(&id, "original", input.as_slice()).await?;

    let mut exported = Vec::new();
    let mut source = store.source("original", 8);
    let report = service.export(&id, &mut source, &mut exported).await?;
    assert_eq!(report.records, 42);
    assert_eq!(report.bytes, exported.len());
    assert_eq!(exported, input);

    service.ingest(&id, "copy", exported.as_slice()).await?;
    assert_eq!(store.documents("copy"), store.documents("original"));
    Ok(())
}

#[tokio::test]
async fn test_export_failure_counts_written_records() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);
    let id = service.register_schema(EVENT_SCHEMA)?;

    let valid = |seq: i64| -> Document {
        [
            ("seq", DocumentValue::Int64(seq)),
            ("name", DocumentValue::from("ok")),
        ]
        .into_iter()
        .collect()
    };
    let invalid: Document = [("seq", DocumentValue::from("not a number"))]
        .into_iter()
        .collect();
    let mut source = MemorySource::new(vec![valid(1), valid(2), valid(3), invalid], 2);

    let mut output = Vec::new();
    let err = service
        .export(&id, &mut source, &mut output)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert!(matches!(
        err.error.details(),
        Details::ConvertField { field, .. } if field == "seq"
    ));
    assert_eq!(err.committed, 2);
    Ok(())
}

#[tokio::test]
async fn test_source_failure_is_reported() -> TestResult {
    struct BrokenSource;

    #[async_trait::async_trait]
    impl DocumentSource for BrokenSource {
        async fn next_batch(
            &mut self,
        ) -> Result<Option<Vec<Document>>, avro_docstream::error::BoxError> {
            Err("cursor killed".into())
        }
    }

    let store = Arc::new(MemoryStore::new());
    let service = service(&store);
    let id = service.register_schema(EVENT_SCHEMA)?;

    let err = service
        .export(&id, &mut BrokenSource, Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Source);
    assert_eq!(err.committed, 0);
    Ok(())
}
