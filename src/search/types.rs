//! Search response schema
//!
//! The endpoint payload is validated here rather than trusted field by field.

use crate::error::{Error, Result};
use crate::types::BookRecord;
use serde::{Deserialize, Serialize};

/// Raw payload as sent by the endpoint
#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    docs: Vec<RawDoc>,
    #[serde(default)]
    num_found: Option<u64>,
    /// Camel-case spelling, sent instead of or alongside `num_found`
    #[serde(default, rename = "numFound")]
    num_found_legacy: Option<u64>,
    start: u64,
}

#[derive(Debug, Deserialize)]
struct RawDoc {
    key: String,
    title: String,
    #[serde(default)]
    author_name: Option<Vec<String>>,
}

impl From<RawDoc> for BookRecord {
    fn from(doc: RawDoc) -> Self {
        BookRecord {
            key: doc.key,
            title: doc.title,
            authors: doc.author_name.unwrap_or_default(),
        }
    }
}

/// One validated page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Records in endpoint order
    pub records: Vec<BookRecord>,
    /// Total number of hits for the query
    pub total_count: u64,
    /// Offset of the first record of this page
    pub offset_start: u64,
}

impl PageResponse {
    /// Create a page response
    pub fn new(records: Vec<BookRecord>, total_count: u64, offset_start: u64) -> Self {
        Self {
            records,
            total_count,
            offset_start,
        }
    }

    /// Parse and validate an endpoint payload
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let raw: RawSearchResponse =
            serde_json::from_slice(body).map_err(|e| Error::parse(e.to_string()))?;

        let total_count = raw
            .num_found
            .or(raw.num_found_legacy)
            .ok_or_else(|| Error::parse("missing field `num_found`"))?;

        Ok(Self {
            records: raw.docs.into_iter().map(BookRecord::from).collect(),
            total_count,
            offset_start: raw.start,
        })
    }

    /// Whether more pages are known to exist after this one
    pub fn has_more(&self) -> bool {
        !self.records.is_empty() && self.total_count > self.offset_start
    }
}
