#![deny(missing_docs)]

//! # Input Decoding
//!
//! Decodes YAML or JSON text into the generic document value the normalizer accepts.
//!
//! YAML allows non-string mapping keys (`200:` is an integer), while the document
//! model is keyed by strings, so scalar keys are converted to their text form.
//! Mapping order is preserved.

use crate::error::{AppError, AppResult};
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// Decodes YAML (or JSON, a YAML subset) text into a document value.
pub fn decode_document(text: &str) -> AppResult<Value> {
    let yaml: YamlValue = serde_yaml::from_str(text)?;
    yaml_to_json(yaml, "#")
}

fn yaml_to_json(value: YamlValue, location: &str) -> AppResult<Value> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f).map(Value::Number).ok_or_else(|| {
                    AppError::Parse(format!("{}: non-finite number '{}'", location, n))
                })?
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| yaml_to_json(item, &format!("{}/{}", location, idx)))
                .collect::<AppResult<Vec<_>>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = mapping_key(key, location)?;
                let child = format!("{}/{}", location, crate::pointer::encode_pointer_segment(&key));
                map.insert(key, yaml_to_json(item, &child)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value, location)?,
    })
}

fn mapping_key(key: YamlValue, location: &str) -> AppResult<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        _ => Err(AppError::Parse(format!(
            "{}: mapping keys must be scalars",
            location
        ))),
    }
}
