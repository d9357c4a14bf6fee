//! Normalisation of history-mode payloads into one event list.
//!
//! Backends answer history requests in one of three shapes:
//! - an array of `{year, title, description}` objects
//! - an object holding such an array under `events`
//! - a flat object keyed by year, each value either a title string or a
//!   `{title, description}` object
//!
//! Anything else is rejected.

use serde_json::{Map, Value};

use super::json_extract::{extract_json, Shape};
use crate::error::ExtractError;
use crate::models::HistoryEvent;

/// Parse accumulated history-mode text into events
pub fn parse_timeline(text: &str) -> Result<Vec<HistoryEvent>, ExtractError> {
    let value = extract_json(text, Shape::Any)?;
    normalize_timeline(value)
}

pub fn normalize_timeline(value: Value) -> Result<Vec<HistoryEvent>, ExtractError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| event_from_record(i, item))
            .collect(),
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => normalize_timeline(Value::Array(items)),
            Some(other) => Err(ExtractError::Shape(format!(
                "'events' must be an array, found {}",
                kind_of(&other)
            ))),
            None => events_from_year_map(map),
        },
        other => Err(ExtractError::Shape(format!(
            "expected an array or object, found {}",
            kind_of(&other)
        ))),
    }
}

fn event_from_record(index: usize, item: Value) -> Result<HistoryEvent, ExtractError> {
    let Value::Object(record) = item else {
        return Err(ExtractError::Shape(format!("event {} is not an object", index)));
    };
    let year = record
        .get("year")
        .and_then(scalar_text)
        .ok_or_else(|| ExtractError::Shape(format!("event {} has no year", index)))?;

    Ok(HistoryEvent {
        year,
        title: record.get("title").and_then(scalar_text).unwrap_or_default(),
        description: record.get("description").and_then(scalar_text).unwrap_or_default(),
    })
}

fn events_from_year_map(map: Map<String, Value>) -> Result<Vec<HistoryEvent>, ExtractError> {
    if map.is_empty() {
        return Err(ExtractError::Shape("timeline object is empty".to_string()));
    }

    map.into_iter()
        .map(|(year, value)| match value {
            Value::Object(record) => Ok(HistoryEvent {
                year,
                title: record.get("title").and_then(scalar_text).unwrap_or_default(),
                description: record.get("description").and_then(scalar_text).unwrap_or_default(),
            }),
            other => scalar_text(&other)
                .map(|title| HistoryEvent {
                    year: year.clone(),
                    title,
                    description: String::new(),
                })
                .ok_or_else(|| ExtractError::Shape(format!("entry '{}' is not text", year))),
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
