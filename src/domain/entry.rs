use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type EntryId = Uuid;

/// A single signed monetary record. Entries are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    /// When the income or expense happened, as supplied by the caller
    pub datetime: DateTime<Utc>,
    /// Positive for income, negative for expense
    pub price: f64,
}

impl Entry {
    pub fn is_income(&self) -> bool {
        self.price > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.price < 0.0
    }
}

/// Price as it arrives on the wire: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

/// Request to create an entry. Every field is optional here so that absent
/// fields surface as a `ValidationError` naming the field instead of a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEntry {
    pub name: Option<String>,
    pub description: Option<String>,
    pub datetime: Option<String>,
    pub price: Option<RawPrice>,
}

impl NewEntry {
    /// A request with a whole-number price, as produced by shorthand parsing.
    pub fn new(name: impl Into<String>, datetime: impl Into<String>, price: i64) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            datetime: Some(datetime.into()),
            price: Some(RawPrice::Number(price as f64)),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check required fields and normalize them into a `ValidEntry`.
    pub fn validate(self) -> Result<ValidEntry, ValidationError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingField("name"))?;

        let datetime_str = self
            .datetime
            .filter(|dt| !dt.trim().is_empty())
            .ok_or(ValidationError::MissingField("datetime"))?;

        let price = match self.price.ok_or(ValidationError::MissingField("price"))? {
            RawPrice::Number(value) => value,
            RawPrice::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidPrice(text.clone()))?,
        };
        if !price.is_finite() {
            return Err(ValidationError::InvalidPrice(price.to_string()));
        }

        let datetime = parse_timestamp(&datetime_str)
            .ok_or_else(|| ValidationError::InvalidDatetime(datetime_str.clone()))?;

        Ok(ValidEntry {
            name,
            description: self.description.unwrap_or_default(),
            datetime,
            price,
        })
    }
}

/// An entry that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub name: String,
    pub description: String,
    pub datetime: DateTime<Utc>,
    pub price: f64,
}

impl ValidEntry {
    /// Attach a store-assigned id.
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            name: self.name,
            description: self.description,
            datetime: self.datetime,
            price: self.price,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid price: '{0}' is not a number")]
    InvalidPrice(String),

    #[error("Invalid datetime: '{0}'")]
    InvalidDatetime(String),
}

impl ValidationError {
    /// Machine-readable reason for API clients.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing-field",
            ValidationError::InvalidPrice(_) => "invalid-price",
            ValidationError::InvalidDatetime(_) => "invalid-datetime",
        }
    }

    /// The offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidPrice(_) => "price",
            ValidationError::InvalidDatetime(_) => "datetime",
        }
    }
}

/// Sub-second digits kept on stored timestamps (microseconds).
pub const TIMESTAMP_PRECISION: u16 = 6;

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339, a zone-less date-time (as produced by browser
/// `datetime-local` inputs) interpreted as UTC, or a bare `YYYY-MM-DD`
/// at midnight UTC. The result is truncated to microseconds, the precision
/// the store keeps.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_exact(input.trim()).map(|dt| dt.trunc_subsecs(TIMESTAMP_PRECISION))
}

fn parse_timestamp_exact(input: &str) -> Option<DateTime<Utc>> {

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
