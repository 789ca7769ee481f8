//! Listing endpoint payloads.

use serde::{Deserialize, Serialize};

use super::lenient;

/// Body POSTed to the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub applied_facets: serde_json::Map<String, serde_json::Value>,
    pub limit: usize,
    pub offset: usize,
    pub search_text: String,
}

impl ListingRequest {
    /// An unfiltered page request.
    pub fn page(offset: usize, limit: usize) -> Self {
        Self {
            applied_facets: serde_json::Map::new(),
            limit,
            offset,
            search_text: String::new(),
        }
    }
}

/// One page from the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    /// Total matching postings, as reported by the server
    #[serde(default)]
    pub total: Option<usize>,

    #[serde(default)]
    pub job_postings: Vec<ListingItem>,
}

impl ListingPage {
    /// The page a failed or undecodable request degrades to.
    pub fn empty() -> Self {
        Self {
            total: Some(0),
            job_postings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.job_postings.is_empty()
    }
}

/// A raw listing record. Only lives between a page fetch and extraction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub locations_text: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub posted_on: Option<String>,

    /// Opaque bullet list; the first entry is the requisition id
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub bullet_fields: Vec<String>,

    /// Reference path to the detail payload
    #[serde(default, deserialize_with = "lenient::text")]
    pub external_path: Option<String>,
}

impl ListingItem {
    /// Title for log lines.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown")
    }

    /// The reference path, if it is usable.
    pub fn reference_path(&self) -> Option<&str> {
        self.external_path.as_deref().filter(|p| !p.is_empty())
    }
}
