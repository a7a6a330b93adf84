use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub const CUSTOMER_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Error body the API returns alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub region: String,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub registration_date: NaiveDate,
}

impl Customer {
    #[must_use]
    pub fn record(&self) -> CustomerRecord {
        CustomerRecord {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            region: self.region.clone(),
            registration_date: self.registration_date,
        }
    }
}

/// Editable fields of a customer, shared by the create and update bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub region: String,
    pub registration_date: NaiveDate,
}

/// Create/update body. The server ignores `id` on create, so it is sent as 0.
#[derive(Debug, Serialize)]
pub(crate) struct CustomerPayload<'a> {
    pub id: i64,
    #[serde(flatten)]
    pub record: &'a CustomerRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Filter criteria for the customer list. Empty fields are left out of the
/// query entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub name: String,
    pub email: String,
    pub region: String,
    pub registration_date: String,
}

impl CustomerFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("region", self.region.as_str()),
            ("registrationDate", self.registration_date.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }

    /// Form-urlencoded query string without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.query_pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Parses `2024-03-01`, `2024-03-01T00:00:00Z` or `2024-03-01T00:00:00` into
/// the calendar date, dropping any time component.
#[must_use]
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let (date_part, time_part) = match (trimmed.get(..10), trimmed.get(10..)) {
        (Some(date_part), Some(time_part)) => (date_part, time_part),
        _ => (trimmed, ""),
    };
    if !time_part.is_empty() && !time_part.starts_with(['T', 't', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, CUSTOMER_DATE_FORMAT).ok()
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid registration date: {raw}")))
}
