//! Merge contract between the sync core and concrete content types.
//!
//! The core never inspects fields. It hands a [`ContentDocument`] to the content type, which
//! copies over the keys it knows and keeps every other field as it was.

use crate::sync::SyncError;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Wire and on-disk representation of content: field name to JSON value.
pub type ContentDocument = Map<String, Value>;

/// A strongly typed content object that can absorb whole-document updates.
///
/// `Default` provides the empty instance used before any snapshot exists.
pub trait MergeableContent: Default + Serialize + Send + Sync + 'static {
	/// Overwrite the fields present in `updates`; leave every other field untouched.
	///
	/// Applying the same document twice must be equivalent to applying it once.
	fn merge_fields(&mut self, updates: &ContentDocument);

	/// Encode the full object as a document for the snapshot store.
	fn to_document(&self) -> Result<ContentDocument, SyncError> {
		match serde_json::to_value(self) {
			Ok(Value::Object(map)) => Ok(map),
			Ok(other) => Err(SyncError::SerializationFailure(format!(
				"content encoded as {} instead of an object",
				json_kind(&other)
			))),
			Err(e) => Err(SyncError::SerializationFailure(e.to_string())),
		}
	}
}

/// Copy `updates[key]` into `target` when the key is present and has the right shape.
///
/// Returns whether the field changed. A value of the wrong type is ignored and logged so a bad
/// field in the payload cannot wipe a good local value.
pub fn merge_field<V>(target: &mut V, updates: &ContentDocument, key: &str) -> bool
where
	V: DeserializeOwned + PartialEq,
{
	let Some(raw) = updates.get(key) else {
		return false;
	};

	match serde_json::from_value::<V>(raw.clone()) {
		Ok(value) => {
			if *target == value {
				false
			} else {
				*target = value;
				true
			}
		}
		Err(e) => {
			warn!("Ignoring content field {}: {}", key, e);
			false
		}
	}
}

/// Parse raw bytes as a content document. Anything other than a JSON object is malformed.
pub fn parse_document(bytes: &[u8]) -> Result<ContentDocument, SyncError> {
	let value: Value = serde_json::from_slice(bytes)
		.map_err(|e| SyncError::MalformedPayload(format!("Invalid JSON: {}", e)))?;

	match value {
		Value::Object(map) => Ok(map),
		other => Err(SyncError::MalformedPayload(format!(
			"expected a JSON object, got {}",
			json_kind(&other)
		))),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn merge_field_skips_missing_and_mistyped_keys() {
		let updates = json!({ "title": 42, "count": 3 });
		let updates = updates.as_object().unwrap();

		let mut title = "kept".to_string();
		assert!(!merge_field(&mut title, updates, "title"));
		assert_eq!(title, "kept");

		let mut missing = 7u32;
		assert!(!merge_field(&mut missing, updates, "absent"));
		assert_eq!(missing, 7);

		let mut count = 0u32;
		assert!(merge_field(&mut count, updates, "count"));
		assert_eq!(count, 3);
	}

	#[test]
	fn parse_document_rejects_non_objects() {
		assert!(matches!(
			parse_document(b"[1, 2]"),
			Err(SyncError::MalformedPayload(_))
		));
		assert!(matches!(
			parse_document(b"not json"),
			Err(SyncError::MalformedPayload(_))
		));
		assert_eq!(parse_document(b"{\"a\":1}").unwrap().len(), 1);
	}
}
