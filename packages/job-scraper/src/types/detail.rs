//! Detail endpoint payloads.

use serde::Deserialize;

use super::lenient;

/// Full posting as returned by `<detail-base>/<reference path>`.
///
/// Every field is optional; a payload with neither section is treated as
/// "no detail available".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPayload {
    #[serde(default)]
    pub job_posting_info: Option<JobPostingInfo>,

    #[serde(default)]
    pub hiring_organization: Option<HiringOrganization>,
}

impl DetailPayload {
    pub fn is_empty(&self) -> bool {
        self.job_posting_info.is_none() && self.hiring_organization.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,

    /// Raw (usually HTML) description, also the input for mining
    #[serde(default, deserialize_with = "lenient::text")]
    pub job_description: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub posted_on: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub start_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub job_req_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub time_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub external_url: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub time_left_to_apply: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub can_apply: Option<String>,

    #[serde(default)]
    pub job_requisition_location: Option<RequisitionLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionLocation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub descriptor: Option<String>,

    #[serde(default)]
    pub country: Option<Country>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(default, deserialize_with = "lenient::text")]
    pub descriptor: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub alpha2_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HiringOrganization {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
}
