//! Engine types
//!
//! Named sub-queries in, one keyed aggregate out.

use crate::pagination::PaginationRequest;
use crate::types::Record;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One named sub-collection request
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSubQuery {
    /// Key of the sub-collection in the aggregate
    pub key: String,
    /// How to fetch it
    pub request: PaginationRequest,
}

impl NamedSubQuery {
    /// Create a named sub-query
    pub fn new(key: impl Into<String>, request: impl Into<PaginationRequest>) -> Self {
        Self {
            key: key.into(),
            request: request.into(),
        }
    }
}

/// A value fetched before the sub-queries run (e.g. a parent profile)
#[derive(Debug, Clone, PartialEq)]
pub struct BaseSeed {
    /// Key of the base entry
    pub key: String,
    /// The base value
    pub value: Value,
}

impl BaseSeed {
    /// Create a base seed
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Merged outcome of one orchestration call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    base: Option<BaseSeed>,
    collections: BTreeMap<String, Vec<Record>>,
}

impl AggregateResult {
    /// Start an aggregate from an optional base entry
    pub fn new(base: Option<BaseSeed>) -> Self {
        Self {
            base,
            collections: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: String, items: Vec<Record>) {
        self.collections.insert(key, items);
    }

    /// The base entry, if any
    pub fn base(&self) -> Option<&BaseSeed> {
        self.base.as_ref()
    }

    /// Records collected under `key`
    pub fn get(&self, key: &str) -> Option<&[Record]> {
        self.collections.get(key).map(Vec::as_slice)
    }

    /// Sub-collection keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of sub-collections (the base entry is not counted)
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether there are no sub-collections
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Total records over all sub-collections
    pub fn total_records(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Split into base entry and sub-collections
    pub fn into_parts(self) -> (Option<BaseSeed>, BTreeMap<String, Vec<Record>>) {
        (self.base, self.collections)
    }

    /// One JSON object: the base under its key, then every sub-collection
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        if let Some(base) = self.base {
            map.insert(base.key, base.value);
        }
        for (key, items) in self.collections {
            map.insert(key, Value::Array(items));
        }
        Value::Object(map)
    }

    /// The base object with every sub-collection written into it as a field.
    ///
    /// A base that is not an object (or no base at all) yields the plain
    /// sub-collection object.
    pub fn into_merged_base(self) -> Value {
        let mut map = match self.base {
            Some(BaseSeed {
                value: Value::Object(map),
                ..
            }) => map,
            _ => Map::new(),
        };
        for (key, items) in self.collections {
            map.insert(key, Value::Array(items));
        }
        Value::Object(map)
    }
}
