//! Field extraction from listing items and detail payloads.

use crate::pipeline::mine::mine_description;
use crate::types::detail::DetailPayload;
use crate::types::listing::ListingItem;
use crate::types::record::{fields, CanonicalRecord};

/// Fields available from the listing alone.
///
/// `url` is `site_url + reference path` and is absent without a path.
pub fn extract_basic(item: &ListingItem, site_url: &str) -> CanonicalRecord {
    let mut record = CanonicalRecord::new();
    record.insert_opt(fields::TITLE, item.title.as_deref());
    record.insert_opt(fields::LOCATION, item.locations_text.as_deref());
    record.insert_opt(fields::POSTED_DATE, item.posted_on.as_deref());
    record.insert_opt(
        fields::JOB_ID,
        item.bullet_fields.first().map(String::as_str),
    );
    if let Some(path) = item.reference_path() {
        record.insert(fields::EXTERNAL_PATH, path);
        record.insert(fields::URL, format!("{}{}", site_url.trim_end_matches('/'), path));
    }
    record
}

/// Fields from a detail payload, plus whatever the description mines to.
pub fn extract_detail(payload: &DetailPayload) -> CanonicalRecord {
    let mut record = CanonicalRecord::new();

    if let Some(info) = &payload.job_posting_info {
        record.insert_opt(fields::ID, info.id.as_deref());
        record.insert_opt(fields::TITLE, info.title.as_deref());
        record.insert_opt(fields::DESCRIPTION, info.job_description.as_deref());
        record.insert_opt(fields::LOCATION, info.location.as_deref());
        record.insert_opt(fields::POSTED_DATE, info.posted_on.as_deref());
        record.insert_opt(fields::START_DATE, info.start_date.as_deref());
        record.insert_opt(fields::END_DATE, info.end_date.as_deref());
        record.insert_opt(fields::JOB_ID, info.job_req_id.as_deref());
        record.insert_opt(fields::JOB_TYPE, info.time_type.as_deref());
        record.insert_opt(fields::EXTERNAL_URL, info.external_url.as_deref());
        record.insert_opt(fields::TIME_LEFT_TO_APPLY, info.time_left_to_apply.as_deref());
        record.insert_opt(fields::CAN_APPLY, info.can_apply.as_deref());

        if let Some(location) = &info.job_requisition_location {
            record.insert_opt(fields::DETAILED_LOCATION, location.descriptor.as_deref());
            if let Some(country) = &location.country {
                record.insert_opt(fields::COUNTRY, country.descriptor.as_deref());
                record.insert_opt(fields::COUNTRY_CODE, country.alpha2_code.as_deref());
            }
        }
    }

    if let Some(org) = &payload.hiring_organization {
        record.insert_opt(fields::HIRING_ORGANIZATION, org.name.as_deref());
        record.insert_opt(fields::ORGANIZATION_URL, org.url.as_deref());
    }

    if let Some(description) = record.get(fields::DESCRIPTION).map(str::to_owned) {
        record.merge(mine_description(&description));
    }

    record
}

/// Listing fields overlaid with detail fields; detail wins per key.
pub fn merge_records(basic: CanonicalRecord, detail: CanonicalRecord) -> CanonicalRecord {
    let mut merged = basic;
    merged.merge(detail);
    merged
}
