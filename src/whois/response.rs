use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Response;
use serde::Deserialize;

use super::LookupError;

pub fn build_query<'a>(domain: &'a str, api_key: &'a str) -> [(&'static str, &'a str); 3] {
    [
        ("domainName", domain),
        ("apiKey", api_key),
        ("outputFormat", "JSON"),
    ]
}

pub async fn parse_response(response: Response) -> Result<DateTime<Utc>, LookupError> {
    let body: WhoisResponse = response
        .json()
        .await
        .map_err(|err| LookupError::Decode(err.to_string()))?;
    creation_date(body)
}

pub fn creation_date(body: WhoisResponse) -> Result<DateTime<Utc>, LookupError> {
    if let Some(error) = body.error_message {
        return Err(LookupError::Provider(
            error
                .msg
                .or(error.error_code)
                .unwrap_or_else(|| "unknown provider error".to_string()),
        ));
    }

    let record = body.whois_record.ok_or(LookupError::MissingCreationDate)?;
    let raw = record
        .created_date
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            record
                .registry_data
                .and_then(|registry| registry.created_date)
                .filter(|value| !value.trim().is_empty())
        })
        .ok_or(LookupError::MissingCreationDate)?;

    parse_creation_date(&raw).ok_or(LookupError::MalformedDate(raw))
}

/// Registrars disagree on date formats; these are the ones seen in practice.
pub fn parse_creation_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    let naive = value.strip_suffix(" UTC").unwrap_or(value);
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

#[derive(Debug, Deserialize)]
pub struct WhoisResponse {
    #[serde(rename = "WhoisRecord")]
    pub whois_record: Option<WhoisRecord>,
    #[serde(rename = "ErrorMessage")]
    pub error_message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WhoisRecord {
    #[serde(rename = "createdDate")]
    pub created_date: Option<String>,
    #[serde(rename = "registryData")]
    pub registry_data: Option<RegistryData>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryData {
    #[serde(rename = "createdDate")]
    pub created_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "errorCode")]
    pub error_code: Option<String>,
    pub msg: Option<String>,
}
