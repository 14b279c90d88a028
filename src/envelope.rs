//! Unified API response envelope.
//!
//! Every JSON body the blog backend returns has the shape
//! `{ code, msg, data, count? }`, with `code == 200` meaning success.
//! Errors carry only `{ code, msg }`. Records coming from the hosted
//! database pass through [`format_timestamps`] so that `created_at` and
//! `updated_at` reach the pages already formatted in the site time zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code of a successful response.
pub const SUCCESS_CODE: u16 = 200;

/// Status code used when a backend error carries no status of its own.
pub const INTERNAL_ERROR_CODE: u16 = 500;

/// Fields formatted by default when normalizing backend records.
pub const DEFAULT_TIME_FIELDS: &[&str] = &["created_at", "updated_at"];

const DEFAULT_MESSAGE: &str = "Success";
const DATABASE_ERROR: &str = "Database error";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Wraps data in a `200 Success` envelope.
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: DEFAULT_MESSAGE.to_string(),
            data,
            count: None,
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }

    /// Attaches a total row count, typically for paginated lists.
    pub fn with_count(mut self, count: Option<u64>) -> Self {
        self.count = count;
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Transforms the payload while keeping code, message and count.
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            code: self.code,
            msg: self.msg,
            data: f(self.data),
            count: self.count,
        }
    }
}

impl ApiResponse<Option<Value>> {
    /// Converts a raw backend result into an envelope.
    ///
    /// Backend errors become an [`ErrorResponse`] with status 500 and a
    /// normalized message. Otherwise `time_fields` in the data are
    /// formatted in `tz`, and the backend status text (or `Success`)
    /// becomes the message.
    pub fn from_backend(
        response: BackendResponse,
        time_fields: &[&str],
        tz: Tz,
    ) -> Result<Self, ErrorResponse> {
        if let Some(error) = response.error {
            return Err(ErrorResponse::internal(error.normalized_message()));
        }

        let data = response.data.map(|mut value| {
            format_timestamps(&mut value, time_fields, tz);
            value
        });

        let msg = response
            .status_text
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

        Ok(Self::ok(data).with_msg(msg).with_count(response.count))
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub msg: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>, status: u16) -> Self {
        Self {
            code: status,
            msg: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(msg, INTERNAL_ERROR_CODE)
    }
}

/// Error reported by the hosted database client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendError {
    pub message: Option<String>,
    pub details: Option<String>,
}

impl BackendError {
    /// Message shown to clients: `message · [details]` when details exist.
    pub fn normalized_message(&self) -> String {
        let base = self
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DATABASE_ERROR);

        match self.details.as_deref().filter(|d| !d.is_empty()) {
            Some(details) => format!("{} · [{}]", base, details),
            None => base.to_string(),
        }
    }
}

/// Raw result of a hosted database call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendResponse {
    pub data: Option<Value>,
    pub error: Option<BackendError>,
    pub count: Option<u64>,
    #[serde(rename = "statusText")]
    pub status_text: Option<String>,
}

/// Formats timestamp fields in place, recursing into objects and arrays.
///
/// A field listed in `fields` whose value is truthy is parsed as an
/// RFC 3339 string, a naive `YYYY-MM-DD HH:MM:SS` string (UTC), a bare
/// date, or epoch milliseconds, and replaced by `YYYY-MM-DD HH:MM:SS` in
/// `tz`. Values that do not parse are left untouched.
pub fn format_timestamps(value: &mut Value, fields: &[&str], tz: Tz) {
    match value {
        Value::Array(items) => {
            for item in items {
                format_timestamps(item, fields, tz);
            }
        }
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if fields.contains(&key.as_str()) && is_truthy(field) {
                    if let Some(instant) = parse_instant(field) {
                        *field = Value::String(
                            instant.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string(),
                        );
                    }
                } else if field.is_object() || field.is_array() {
                    format_timestamps(field, fields, tz);
                }
            }
        }
        _ => {}
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => parse_instant_str(s.trim()),
        _ => None,
    }
}

fn parse_instant_str(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.with_timezone(&Utc));
    }

    let normalized = value.replacen(' ', "T", 1);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
