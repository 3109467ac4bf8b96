//! Common types used throughout shelfscroll
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// One-based page index within a query
pub type PageIndex = u32;

/// Index of the first page of every query
pub const FIRST_PAGE: PageIndex = 1;

// ============================================================================
// Book Record
// ============================================================================

/// A single search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Unique remote id (e.g. "/works/OL893415W")
    pub key: String,
    /// Title as returned by the endpoint
    pub title: String,
    /// Author names in endpoint order
    #[serde(default)]
    pub authors: Vec<String>,
}

impl BookRecord {
    /// Create a new record
    pub fn new(key: impl Into<String>, title: impl Into<String>, authors: Vec<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            authors,
        }
    }

    /// Authors joined for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    #[default]
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    Exponential,
}
