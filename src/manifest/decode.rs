//! Splitting raw manifest text into documents.

use crate::error::{Result, UninjectError};
use serde::Deserialize;
use serde_yaml::Value;

/// Decode manifest text into its documents, in order.
///
/// Content starting with `{` or `[` is read as JSON (a top-level array yields
/// one document per element); anything else is read as a YAML stream. Empty
/// and comment-only documents are dropped.
pub fn decode_documents(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return decode_json(trimmed);
    }

    let mut documents = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document)
            .map_err(|e| UninjectError::decode(format!("YAML document {}", index + 1), e))?;
        if value.is_null() {
            continue;
        }
        documents.push(value);
    }

    Ok(documents)
}

fn decode_json(content: &str) -> Result<Vec<Value>> {
    let json: serde_json::Value =
        serde_json::from_str(content).map_err(|e| UninjectError::decode("JSON manifest", e))?;
    let value =
        serde_yaml::to_value(json).map_err(|e| UninjectError::decode("JSON manifest", e))?;

    Ok(match value {
        Value::Sequence(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    })
}
