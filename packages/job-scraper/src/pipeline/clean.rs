//! Record cleaning: trim, drop noise, reject records without a title.

use tracing::debug;

use crate::types::record::{fields, CanonicalRecord};

/// Short fields kept whenever they are non-empty.
const BASIC_FIELDS: &[&str] = &[
    fields::LOCATION,
    fields::POSTED_DATE,
    fields::JOB_ID,
    fields::JOB_TYPE,
];

/// Free-text fields kept only above the minimum length.
const CONTENT_FIELDS: &[&str] = &[
    "description",
    "qualifications",
    "responsibilities",
    "benefits",
    "experience_level",
    "department",
    "salary_range",
];

/// Keys starting with this are internal and never swept into output.
const INTERNAL_PREFIX: char = '_';

/// What happens to fields outside the fixed lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPolicy {
    /// Keep any other field longer than the minimum length
    #[default]
    SweepLongFields,
    /// Keep only the fixed lists
    AllowListOnly,
}

/// Validates and trims records before output.
#[derive(Debug, Clone)]
pub struct RecordCleaner {
    min_content_len: usize,
    sweep: SweepPolicy,
}

impl Default for RecordCleaner {
    fn default() -> Self {
        Self::new(10)
    }
}

impl RecordCleaner {
    pub fn new(min_content_len: usize) -> Self {
        Self {
            min_content_len,
            sweep: SweepPolicy::default(),
        }
    }

    pub fn with_sweep(mut self, sweep: SweepPolicy) -> Self {
        self.sweep = sweep;
        self
    }

    /// Clean one record, or `None` if it has no usable title or url.
    ///
    /// Output order: `title`, `url`, the basic fields, the content fields,
    /// then swept fields in record order.
    pub fn clean(&self, record: &CanonicalRecord) -> Option<CanonicalRecord> {
        let title = record.title().map(str::trim).filter(|t| !t.is_empty())?;

        // Records built without a reference path fall back to the posting's own link
        let url = record
            .url()
            .or_else(|| record.get(fields::EXTERNAL_URL))
            .map(str::trim)
            .filter(|u| !u.is_empty());
        let Some(url) = url else {
            debug!(title, "Rejecting record without url");
            return None;
        };

        let mut cleaned = CanonicalRecord::new()
            .with(fields::TITLE, title)
            .with(fields::URL, url);

        for key in BASIC_FIELDS {
            if let Some(value) = record.get(key) {
                cleaned.insert(*key, value.trim());
            }
        }

        for key in CONTENT_FIELDS {
            if let Some(value) = record.get(key).map(str::trim) {
                if value.chars().count() > self.min_content_len {
                    cleaned.insert(*key, value);
                }
            }
        }

        if self.sweep == SweepPolicy::SweepLongFields {
            for (key, value) in record.iter() {
                if cleaned.contains(key) || key.starts_with(INTERNAL_PREFIX) {
                    continue;
                }
                let value = value.trim();
                if value.chars().count() > self.min_content_len {
                    cleaned.insert(key, value);
                }
            }
        }

        Some(cleaned)
    }

    /// Clean a batch, keeping input order and dropping rejects.
    pub fn clean_all<'a, I>(&self, records: I) -> Vec<CanonicalRecord>
    where
        I: IntoIterator<Item = &'a CanonicalRecord>,
    {
        records
            .into_iter()
            .filter_map(|record| self.clean(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_title() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("title", "   ")
            .with("url", "https://x/y")
            .with("location", "Herndon, VA")
            .with("description", "A long enough description of the role.");

        assert!(cleaner.clean(&record).is_none());
        assert!(cleaner
            .clean(&CanonicalRecord::new().with("url", "https://x/y"))
            .is_none());
    }

    #[test]
    fn test_accepts_minimal_record() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("title", "Engineer")
            .with("url", "https://x/y");

        let cleaned = cleaner.clean(&record).unwrap();

        assert_eq!(cleaned, record);
    }

    #[test]
    fn test_trims_and_orders_fields() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("job_type", " Full time ")
            .with("description", "  Build data pipelines for mission systems.  ")
            .with("url", " https://x/y ")
            .with("title", " Engineer ")
            .with("location", "Tampa, FL");

        let cleaned = cleaner.clean(&record).unwrap();

        assert_eq!(
            cleaned.keys().collect::<Vec<_>>(),
            vec!["title", "url", "location", "job_type", "description"]
        );
        assert_eq!(cleaned.title(), Some("Engineer"));
        assert_eq!(cleaned.url(), Some("https://x/y"));
        assert_eq!(cleaned.get("job_type"), Some("Full time"));
        assert_eq!(
            cleaned.get("description"),
            Some("Build data pipelines for mission systems.")
        );
    }

    #[test]
    fn test_short_content_fields_are_dropped() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("title", "Engineer")
            .with("url", "https://x/y")
            .with("salary_range", "$90,000")
            .with("benefits", "exactly 10");

        let cleaned = cleaner.clean(&record).unwrap();

        assert!(!cleaned.contains("salary_range"));
        assert!(!cleaned.contains("benefits"));
    }

    #[test]
    fn test_min_length_counts_characters() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("title", "Engineer")
            .with("url", "https://x/y")
            // 10 characters, 11 bytes
            .with("benefits", "Münchenxyz")
            .with("department", "Münchenxyzä")
            .with("office_note", "Zürich Süd")
            .with("office_region", "Zürich Süd!");

        let cleaned = cleaner.clean(&record).unwrap();

        assert!(!cleaned.contains("benefits"));
        assert_eq!(cleaned.get("department"), Some("Münchenxyzä"));
        assert!(!cleaned.contains("office_note"));
        assert_eq!(cleaned.get("office_region"), Some("Zürich Süd!"));
    }

    #[test]
    fn test_sweep_keeps_long_unlisted_fields() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("title", "Engineer")
            .with("url", "https://x/y")
            .with("security_clearance", "TS/SCI with poly")
            .with("experience_years", "5")
            .with("can_apply", "true")
            .with("_raw_payload_digest", "0123456789abcdef");

        let cleaned = cleaner.clean(&record).unwrap();

        assert_eq!(cleaned.get("security_clearance"), Some("TS/SCI with poly"));
        assert!(!cleaned.contains("experience_years"));
        assert!(!cleaned.contains("can_apply"));
        assert!(!cleaned.contains("_raw_payload_digest"));
    }

    #[test]
    fn test_allow_list_only_skips_sweep() {
        let cleaner = RecordCleaner::default().with_sweep(SweepPolicy::AllowListOnly);
        let record = CanonicalRecord::new()
            .with("title", "Engineer")
            .with("url", "https://x/y")
            .with("security_clearance", "TS/SCI with poly");

        let cleaned = cleaner.clean(&record).unwrap();

        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn test_external_url_fallback() {
        let cleaner = RecordCleaner::default();
        let record = CanonicalRecord::new()
            .with("title", "Engineer")
            .with("external_url", "https://tenant.example.com/job/R1");

        let cleaned = cleaner.clean(&record).unwrap();

        assert_eq!(cleaned.url(), Some("https://tenant.example.com/job/R1"));
        assert!(cleaner
            .clean(&CanonicalRecord::new().with("title", "Engineer"))
            .is_none());
    }

    #[test]
    fn test_clean_all_keeps_order() {
        let cleaner = RecordCleaner::default();
        let records = vec![
            CanonicalRecord::new().with("title", "A").with("url", "https://x/a"),
            CanonicalRecord::new().with("url", "https://x/none"),
            CanonicalRecord::new().with("title", "C").with("url", "https://x/c"),
        ];

        let cleaned = cleaner.clean_all(&records);

        let titles: Vec<_> = cleaned.iter().filter_map(|r| r.title()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }
}
