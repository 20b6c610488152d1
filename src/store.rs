use crate::errors::{AppError, AppResult};
use crate::models::Record;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Wire shape of one dataset entry. Every field is kept as a raw JSON value
/// so a single odd entry never rejects the whole file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    user_id: Value,
    name: Value,
    username: Value,
    account_based_in: Value,
    follower_count: Value,
    number_of_tweets: Value,
    following_count: Value,
    creation_date: Value,
    profile_pic_url: Value,
    description: Value,
}

impl RawRecord {
    fn into_record(self, position: usize) -> Record {
        let handle = text(&self.username).unwrap_or_default();
        let id = match &self.user_id {
            Value::String(value) if !value.trim().is_empty() => value.trim().to_string(),
            Value::Number(value) => value.to_string(),
            _ if !handle.is_empty() => handle.clone(),
            _ => format!("record-{}", position),
        };
        let creation_timestamp = match &self.creation_date {
            Value::String(raw) => {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() && !raw.trim().is_empty() {
                    tracing::warn!(handle = %handle, value = %raw, "unparseable creation date; excluded from timeline");
                }
                parsed
            }
            Value::Number(millis) => millis.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        };

        Record {
            id,
            name: text(&self.name).unwrap_or_default(),
            handle,
            location_label: text(&self.account_based_in),
            follower_count: count(&self.follower_count),
            tweet_count: count(&self.number_of_tweets),
            following_count: count(&self.following_count),
            creation_timestamp,
            avatar_url: text(&self.profile_pic_url),
            bio: text(&self.description),
        }
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(|value| value.round() as u64)
        }),
        Value::String(raw) => {
            let cleaned = raw.trim().replace(',', "");
            cleaned.parse::<u64>().ok().or_else(|| {
                cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() && *value >= 0.0)
                    .map(|value| value.round() as u64)
            })
        }
        _ => None,
    }
}

/// Parses the creation-date formats seen in exported account data.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y") {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

/// Immutable, ordered account collection for the session.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[Record]>,
    by_handle: Arc<HashMap<String, usize>>,
    generation: u64,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        let mut by_handle = HashMap::with_capacity(records.len());
        let mut missing_handles = 0usize;
        for (index, record) in records.iter().enumerate() {
            let key = record.handle.trim().to_lowercase();
            if key.is_empty() {
                missing_handles += 1;
                continue;
            }
            if by_handle.contains_key(&key) {
                tracing::warn!(handle = %record.handle, index, "duplicate handle; keeping first occurrence");
                continue;
            }
            by_handle.insert(key, index);
        }
        if missing_handles > 0 {
            tracing::warn!(count = missing_handles, "records without a handle cannot be navigated to");
        }

        Self {
            records: records.into(),
            by_handle: Arc::new(by_handle),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn from_json_str(input: &str) -> AppResult<Self> {
        let document: Value = serde_json::from_str(input)?;
        let entries = match document {
            Value::Array(entries) => entries,
            Value::Object(mut object) => match object.remove("users").or_else(|| object.remove("records")) {
                Some(Value::Array(entries)) => entries,
                _ => {
                    return Err(AppError::Dataset(
                        "expected an array of records or an object with a `users` array".to_string(),
                    ))
                }
            },
            _ => return Err(AppError::Dataset("expected an array of records".to_string())),
        };

        let mut records = Vec::with_capacity(entries.len());
        for (position, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<RawRecord>(entry) {
                Ok(raw) => records.push(raw.into_record(position)),
                Err(error) => {
                    tracing::warn!(position, error = %error, "skipping malformed dataset entry");
                }
            }
        }

        tracing::info!(count = records.len(), "dataset loaded");
        Ok(Self::new(records))
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))
            .map_err(|error| AppError::Io(format!("{:#}", error)))?;
        Self::from_json_str(&input)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifies this load; derived caches key on it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<(usize, &Record)> {
        let key = handle.trim().trim_start_matches('@').to_lowercase();
        self.by_handle
            .get(&key)
            .and_then(|index| self.records.get(*index).map(|record| (*index, record)))
    }
}
