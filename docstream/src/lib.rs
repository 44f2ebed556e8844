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

//! Streams **[Apache Avro](https://avro.apache.org/)** binary records into and out of
//! document stores.
//!
//! The crate is layered from the wire format up:
//!
//! 1. [`decode`] and [`encode`] move between Avro binary data and the generic
//!    [`Value`](types::Value) type, directed by a parsed [`Schema`].
//! 2. [`bridge`] maps Avro values onto the [`Document`](document::Document) model used by
//!    document stores, and back.
//! 3. [`pipeline`] runs whole streams: it decodes a byte stream record by record and writes
//!    documents to a [`DocumentSink`](store::DocumentSink) in batches, or drains a
//!    [`DocumentSource`](store::DocumentSource) into an Avro byte stream.
//! 4. [`service`] ties a [`SchemaRegistry`](registry::SchemaRegistry) to a store so callers
//!    only deal with schema ids.
//!
//! ```
//! use avro_docstream::{Schema, bridge, decode::RecordReader, document::DocumentValue};
//!
//! let schema = Schema::parse_str(
//!     r#"{"type": "record", "name": "Point", "fields": [
//!         {"name": "x", "type": "int"}, {"name": "label", "type": ["null", "string"]}
//!     ]}"#,
//! )?;
//! let input = [4u8, 2, 2, b'a', 6, 0];
//!
//! let mut documents = Vec::new();
//! for value in RecordReader::new(&schema, &input) {
//!     documents.push(bridge::to_document(value?, &schema)?);
//! }
//! assert_eq!(documents.len(), 2);
//! assert_eq!(documents[0].get("label"), Some(&DocumentValue::String("a".to_string())));
//! assert_eq!(documents[1].get("label"), Some(&DocumentValue::Null));
//! # Ok::<(), avro_docstream::Error>(())
//! ```
//!
//! # MSRV
//!
//! The current MSRV is 1.88.0.

pub mod bridge;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod schema;
pub mod service;
pub mod store;
pub mod types;
pub mod util;
pub mod validator;

pub use decode::decode;
pub use document::{Document, DocumentValue};
pub use encode::{encode, encode_to_vec};
pub use error::{Error, ErrorKind, RunError};
pub use pipeline::{Pipeline, PipelineConfig};
pub use registry::{SchemaId, SchemaRegistry};
pub use schema::{Schema, SchemaKind};
pub use service::StreamService;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use crate::{
        Schema, bridge, decode::RecordReader, document::DocumentValue, encode_to_vec,
    };
    type TestResult<T = ()> = anyhow::Result<T>;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_documents_survive_the_wire() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "Reading", "fields": [
                {"name": "sensor", "type": "string"},
                {"name": "level", "type": {"type": "enum", "name": "Level", "symbols": ["LOW", "HIGH"]}},
                {"name": "samples", "type": {"type": "array", "items": "double"}}
            ]}"#,
        )?;
        let document = [
            ("sensor", DocumentValue::from("s-1")),
            ("level", DocumentValue::from("HIGH")),
            (
                "samples",
                DocumentValue::Array(vec![DocumentValue::Double(0.5), DocumentValue::Double(-1.0)]),
            ),
        ]
        .into_iter()
        .collect();

        let value = bridge::document_to_avro(&document, &schema)?;
        let mut bytes = encode_to_vec(&value, &schema)?;
        bytes.extend(encode_to_vec(&value, &schema)?);

        let decoded = RecordReader::new(&schema, &bytes)
            .map(|value| -> TestResult<_> { Ok(bridge::to_document(value?, &schema)?) })
            .collect::<TestResult<Vec<_>>>()?;
        assert_eq!(decoded, vec![document.clone(), document]);
        Ok(())
    }
}
