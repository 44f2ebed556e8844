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

//! The generic document model used by document stores.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use strum_macros::{Display, EnumDiscriminants};

/// A value inside a [`Document`].
///
/// There is no single precision float; Avro `float` values widen to [`DocumentValue::Double`].
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(DocumentKind), derive(Hash, Display))]
pub enum DocumentValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    /// A UTC timestamp.
    DateTime(DateTime<Utc>),
    Array(Vec<DocumentValue>),
    Document(Document),
}

/// An ordered mapping from unique keys to values.
///
/// Keys keep their insertion order. Inserting an existing key replaces its value in place.
/// Two documents are equal only when they hold the same entries in the same order.
#[derive(Clone, Debug, Default)]
pub struct Document {
    entries: IndexMap<String, DocumentValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts `value` under `key`, returning the previous value if the key was present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DocumentValue>,
    ) -> Option<DocumentValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Into<String>, V: Into<DocumentValue>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut document = Document::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            document.insert(key, value);
        }
        document
    }
}

impl IntoIterator for Document {
    type Item = (String, DocumentValue);
    type IntoIter = indexmap::map::IntoIter<String, DocumentValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

macro_rules! to_document_value(
    ($type:ty, $variant_constructor:expr) => (
        impl From<$type> for DocumentValue {
            fn from(value: $type) -> Self {
                $variant_constructor(value)
            }
        }
    );
);

to_document_value!(bool, DocumentValue::Boolean);
to_document_value!(i32, DocumentValue::Int32);
to_document_value!(i64, DocumentValue::Int64);
to_document_value!(f64, DocumentValue::Double);
to_document_value!(String, DocumentValue::String);
to_document_value!(Vec<u8>, DocumentValue::Binary);
to_document_value!(DateTime<Utc>, DocumentValue::DateTime);
to_document_value!(Vec<DocumentValue>, DocumentValue::Array);
to_document_value!(Document, DocumentValue::Document);

impl From<&str> for DocumentValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<()> for DocumentValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl<T> From<Option<T>> for DocumentValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_keeps_order_and_replaces_in_place() {
        let mut document = Document::new();
        assert_eq!(document.insert("b", 1), None);
        assert_eq!(document.insert("a", "x"), None);
        assert_eq!(
            document.insert("b", 2),
            Some(DocumentValue::Int32(1))
        );

        assert_eq!(document.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(document.get("b"), Some(&DocumentValue::Int32(2)));
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn collects_from_pairs() {
        let document: Document = [("x", DocumentValue::Null), ("y", DocumentValue::Boolean(true))]
            .into_iter()
            .collect();
        assert!(document.contains_key("y"));
        assert!(!document.contains_key("z"));
        assert_eq!(
            document.into_iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn equality_follows_key_order() {
        let ab: Document = [("a", 1), ("b", 2)].into_iter().collect();
        let ba: Document = [("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn wide_documents_keep_order_and_lookups() {
        let count = 50_000;
        let mut document: Document = (0..count).map(|i| (format!("k{i}"), i)).collect();
        assert_eq!(document.len(), count as usize);

        assert_eq!(document.insert("k0", "first"), Some(DocumentValue::Int32(0)));
        assert_eq!(document.get("k49999"), Some(&DocumentValue::Int32(49_999)));
        assert_eq!(document.get("k0"), Some(&DocumentValue::from("first")));
        assert_eq!(document.keys().next(), Some("k0"));
        assert_eq!(document.keys().last(), Some("k49999"));
        assert!(!document.contains_key("k50000"));
    }

    #[test]
    fn document_kind_names() {
        assert_eq!(DocumentKind::from(&DocumentValue::Int64(1)).to_string(), "Int64");
        assert_eq!(DocumentKind::DateTime.to_string(), "DateTime");
    }
}
