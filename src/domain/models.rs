use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingTime {
    pub id: i64,
    #[serde(with = "utc_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(with = "utc_timestamp")]
    pub end: DateTime<Utc>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingTimeDto {
    #[serde(with = "utc_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(with = "utc_timestamp")]
    pub end: DateTime<Utc>,
    pub user_id: i64,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct WorkingTimePatch {
    #[serde(skip_serializing_if = "Option::is_none", with = "utc_timestamp::option")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "utc_timestamp::option")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Clock {
    pub id: i64,
    #[serde(with = "utc_timestamp")]
    pub time: DateTime<Utc>,
    pub status: bool,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoleName {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "General Manager")]
    GeneralManager,
    #[serde(rename = "Manager")]
    Manager,
    #[serde(rename = "Employee")]
    Employee,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Right {
    Create,
    Read,
    Update,
    Delete,
    Clock,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Vec<Right>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Vec<Right>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Vec<Right>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Vec<Right>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<Vec<Right>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: RoleName,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserShort {
    pub id: i64,
    pub email: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub clock: Option<Clock>,
    #[serde(default, rename = "workingTimes", alias = "working_times")]
    pub working_times: Vec<WorkingTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamDetail {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub employees: Vec<UserShort>,
    #[serde(default)]
    pub managers: Vec<UserShort>,
}

impl TeamDetail {
    /// Managers first, then employees, without duplicates.
    pub fn members(&self) -> Vec<&UserShort> {
        let mut members: Vec<&UserShort> = Vec::new();
        for member in self.managers.iter().chain(self.employees.iter()) {
            if !members.iter().any(|known| known.id == member.id) {
                members.push(member);
            }
        }
        members
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Profile fields accepted by `PUT /account`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Tokens returned by login, registration and refresh. Refresh may omit the
/// refresh token, in which case the current one stays valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none() && self.refresh_token.is_none()
    }

    pub fn with_tokens(&self, tokens: TokenPair) -> Session {
        Session {
            user: self.user.clone(),
            access_token: Some(tokens.access_token),
            refresh_token: tokens.refresh_token.or_else(|| self.refresh_token.clone()),
        }
    }

    pub fn with_user(&self, user: User) -> Session {
        Session {
            user: Some(user),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Formats an instant as a `datetime-local` form value (`YYYY-MM-DDTHH:MM`).
pub fn format_datetime_local<Tz: TimeZone>(value: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value.with_timezone(tz).format("%Y-%m-%dT%H:%M").to_string()
}

/// The backend writes naive UTC timestamps (`2026-02-16T09:00:00`), sometimes
/// with fractional seconds. RFC 3339 values are accepted as well.
pub mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}
