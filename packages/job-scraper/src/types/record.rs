//! The normalized output record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field names shared by the extractor and the cleaner.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const URL: &str = "url";
    pub const LOCATION: &str = "location";
    pub const POSTED_DATE: &str = "posted_date";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const JOB_ID: &str = "job_id";
    pub const JOB_TYPE: &str = "job_type";
    pub const EXTERNAL_PATH: &str = "external_path";
    pub const EXTERNAL_URL: &str = "external_url";
    pub const DESCRIPTION: &str = "description";
    pub const TIME_LEFT_TO_APPLY: &str = "time_left_to_apply";
    pub const CAN_APPLY: &str = "can_apply";
    pub const DETAILED_LOCATION: &str = "detailed_location";
    pub const COUNTRY: &str = "country";
    pub const COUNTRY_CODE: &str = "country_code";
    pub const HIRING_ORGANIZATION: &str = "hiring_organization";
    pub const ORGANIZATION_URL: &str = "organization_url";
    pub const SALARY_RANGE: &str = "salary_range";
    pub const SECURITY_CLEARANCE: &str = "security_clearance";
    pub const EXPERIENCE_YEARS: &str = "experience_years";
}

/// A job posting as a flat, ordered map of named string fields.
///
/// Keys keep first-insertion order so serialized output is stable across
/// runs. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord {
    fields: IndexMap<String, String>,
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Empty values are ignored (an existing value is kept).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.fields.insert(key.into(), value);
        }
    }

    /// Set a field if `value` is present and non-empty.
    pub fn insert_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Shallow merge by key; values from `other` win on collision.
    pub fn merge(&mut self, other: CanonicalRecord) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(fields::TITLE)
    }

    pub fn url(&self) -> Option<&str> {
        self.get(fields::URL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CanonicalRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = CanonicalRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}
