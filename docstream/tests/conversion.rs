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

type TestResult<T = ()> = anyhow::Result<T>;
use avro_docstream::{
    ErrorKind, Pipeline, Schema,
    document::{Document, DocumentValue},
    store::{MemorySource, MemoryStore},
};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;

async fn export_one(schema: &Schema, document: Document) -> TestResult<Vec<u8>> {
    let mut source = MemorySource::new(vec![document], 1);
    let mut output = Vec::new();
    Pipeline::default()
        .export(schema, &mut source, &mut output)
        .await?;
    Ok(output)
}

async fn ingest_one(schema: &Schema, input: &[u8]) -> TestResult<Document> {
    let store = MemoryStore::new();
    Pipeline::default()
        .ingest(schema, "c", input, &store)
        .await?;
    let mut documents = store.documents("c");
    assert_eq!(documents.len(), 1);
    Ok(documents.remove(0))
}

#[rstest]
#[case(DocumentValue::Null, vec![0u8])]
#[case(DocumentValue::Int32(5), vec![2, 10])]
#[case(DocumentValue::Double(1.5), vec![4, 0, 0, 0, 0, 0, 0, 248, 63])]
#[case(DocumentValue::from("5"), vec![6, 2, b'5'])]
#[tokio::test]
async fn test_union_branch_follows_declaration_order(
    #[case] value: DocumentValue,
    #[case] expected: Vec<u8>,
) -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "U", "fields": [
            {"name": "v", "type": ["null", "long", "double", "string"]}
        ]}"#,
    )?;
    let document = [("v", value)].into_iter().collect();
    assert_eq!(export_one(&schema, document).await?, expected);
    Ok(())
}

#[tokio::test]
async fn test_enum_symbols_survive_both_directions() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "E", "fields": [
            {"name": "grade", "type": {"type": "enum", "name": "Grade", "symbols": ["A", "B", "C"]}}
        ]}"#,
    )?;

    let document = ingest_one(&schema, &[4]).await?;
    assert_eq!(document.get("grade"), Some(&DocumentValue::from("C")));
    assert_eq!(export_one(&schema, document).await?, vec![4u8]);
    Ok(())
}

#[tokio::test]
async fn test_date_times_use_the_wrapper_record() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "Visit", "fields": [
            {"name": "at", "type": {"type": "record", "name": "Date", "fields": [
                {"name": "$date", "type": "string"}
            ]}},
            {"name": "left", "type": ["null", "Date"]}
        ]}"#,
    )?;
    let at = Utc.with_ymd_and_hms(2023, 6, 30, 12, 5, 9).unwrap() + chrono::Duration::milliseconds(250);
    let document = [
        ("at", DocumentValue::DateTime(at)),
        ("left", DocumentValue::Null),
    ]
    .into_iter()
    .collect();

    let bytes = export_one(&schema, document).await?;
    let rendered = "2023-06-30T12:05:09.2500000Z";
    let mut expected = vec![(rendered.len() * 2) as u8];
    expected.extend(rendered.as_bytes());
    expected.push(0);
    assert_eq!(bytes, expected);

    let document = ingest_one(&schema, &bytes).await?;
    let wrapper: Document = [("$date", rendered)].into_iter().collect();
    assert_eq!(document.get("at"), Some(&DocumentValue::Document(wrapper)));
    assert_eq!(document.get("left"), Some(&DocumentValue::Null));
    Ok(())
}

#[tokio::test]
async fn test_date_times_past_year_9999_are_rejected() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "Visit", "fields": [
            {"name": "at", "type": {"type": "record", "name": "Date", "fields": [
                {"name": "$date", "type": "string"}
            ]}}
        ]}"#,
    )?;
    let at = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
    let document: Document = [("at", DocumentValue::DateTime(at))].into_iter().collect();
    let mut source = MemorySource::new(vec![document], 1);
    let mut output = Vec::new();

    let err = Pipeline::default()
        .export(&schema, &mut source, &mut output)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert!(output.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_maps_and_nested_records_become_documents() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "Outer", "fields": [
            {"name": "inner", "type": {"type": "record", "name": "Inner", "fields": [
                {"name": "ratio", "type": "float"},
                {"name": "raw", "type": {"type": "fixed", "name": "Two", "size": 2}}
            ]}},
            {"name": "counts", "type": {"type": "map", "values": "int"}}
        ]}"#,
    )?;
    // inner: 0.5f32, fixed [1, 2]; counts: one block of {"b": 1, "a": 2}
    let mut input = 0.5f32.to_le_bytes().to_vec();
    input.extend([1, 2]);
    input.extend([4, 2, b'b', 2, 2, b'a', 4, 0]);

    let document = ingest_one(&schema, &input).await?;

    let inner: Document = [
        ("ratio", DocumentValue::Double(0.5)),
        ("raw", DocumentValue::Binary(vec![1, 2])),
    ]
    .into_iter()
    .collect();
    let counts: Document = [("a", 2), ("b", 1)].into_iter().collect();
    assert_eq!(document.get("inner"), Some(&DocumentValue::Document(inner)));
    assert_eq!(document.get("counts"), Some(&DocumentValue::Document(counts)));

    // keys come back sorted
    let mut expected = 0.5f32.to_le_bytes().to_vec();
    expected.extend([1, 2]);
    expected.extend([4, 2, b'a', 4, 2, b'b', 2, 0]);
    assert_eq!(export_one(&schema, document).await?, expected);
    Ok(())
}
