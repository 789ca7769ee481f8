//! Free-text mining of salary, clearance and experience from descriptions.
//!
//! Each family is a list of patterns tried in priority order; the first
//! pattern that matches anywhere in the text wins. No match, no field.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::record::{fields, CanonicalRecord};

static RE_SALARY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$[\d,]+(?:\.\d{2})?\s*(?:to|-)\s*\$[\d,]+(?:\.\d{2})?").unwrap()
});
static RE_SALARY_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$[\d,]+(?:\.\d{2})?(?:\s*(?:annually|per year|/year))?").unwrap()
});

static RE_TS_SCI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)TS/SCI(?:\s+with\s+(?:poly|polygraph))?").unwrap()
});
static RE_TOP_SECRET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Top\s+Secret(?:/SCI)?(?:\s+with\s+(?:poly|polygraph))?").unwrap()
});
static RE_SECRET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Secret(?:\s+clearance)?").unwrap());
static RE_PUBLIC_TRUST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Public\s+Trust").unwrap());

static RE_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\+?\s*years?\s+of\s+(?:experience|exp)").unwrap()
});

static SALARY_PATTERNS: &[&LazyLock<Regex>] = &[&RE_SALARY_RANGE, &RE_SALARY_SINGLE];

static CLEARANCE_PATTERNS: &[&LazyLock<Regex>] =
    &[&RE_TS_SCI, &RE_TOP_SECRET, &RE_SECRET, &RE_PUBLIC_TRUST];

/// First whole-match of the first pattern that matches.
fn first_match(patterns: &[&LazyLock<Regex>], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_string())
}

/// Salary as written, e.g. `$50,000 to $60,000`.
pub fn mine_salary(text: &str) -> Option<String> {
    first_match(SALARY_PATTERNS, text)
}

/// Clearance level as written, e.g. `TS/SCI with poly`.
pub fn mine_clearance(text: &str) -> Option<String> {
    first_match(CLEARANCE_PATTERNS, text)
}

/// Years of experience as a bare number string.
pub fn mine_experience_years(text: &str) -> Option<String> {
    RE_EXPERIENCE
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Mine every family from a description.
pub fn mine_description(text: &str) -> CanonicalRecord {
    let mut record = CanonicalRecord::new();
    record.insert_opt(fields::SALARY_RANGE, mine_salary(text).as_deref());
    record.insert_opt(fields::SECURITY_CLEARANCE, mine_clearance(text).as_deref());
    record.insert_opt(fields::EXPERIENCE_YEARS, mine_experience_years(text).as_deref());
    record
}
