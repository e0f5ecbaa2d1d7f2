use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ResolveError;

/// A single selectable entry.
///
/// Two items are equal when their `value` matches; the label is display-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
	pub value: String,
	pub label: String,
}

impl Item {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			label: label.into(),
		}
	}

	/// Build an item whose label mirrors its value.
	pub fn literal(value: impl Into<String>) -> Self {
		let value = value.into();
		Self {
			label: value.clone(),
			value,
		}
	}
}

impl PartialEq for Item {
	fn eq(&self, other: &Self) -> bool {
		self.value == other.value
	}
}

impl Eq for Item {}

impl Hash for Item {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.value.hash(state);
	}
}

/// Convert a JSON document into items.
///
/// Accepts an array of `{ "value", "label" }` objects or an array of scalar
/// literals. A missing label falls back to the value and vice versa.
pub fn items_from_json(document: Value) -> Result<Vec<Item>, ResolveError> {
	let Value::Array(entries) = document else {
		return Err(ResolveError::parse(
			"options",
			format!("expected a JSON array, found {}", json_type(&document)),
		));
	};

	entries
		.into_iter()
		.enumerate()
		.map(|(index, entry)| item_from_entry(index, entry))
		.collect()
}

/// Parse a JSON string into items.
pub fn items_from_json_str(source: &str) -> Result<Vec<Item>, ResolveError> {
	let document: Value = serde_json::from_str(source)
		.map_err(|err| ResolveError::parse("options JSON", err.to_string()))?;
	items_from_json(document)
}

fn item_from_entry(index: usize, entry: Value) -> Result<Item, ResolveError> {
	match entry {
		Value::Object(mut fields) => {
			let value = fields.remove("value").and_then(scalar_text);
			let label = fields.remove("label").and_then(scalar_text);
			match (value, label) {
				(Some(value), Some(label)) => Ok(Item::new(value, label)),
				(Some(value), None) => Ok(Item::literal(value)),
				(None, Some(label)) => Ok(Item::literal(label)),
				(None, None) => Err(ResolveError::parse(
					"options",
					format!("entry {index} has neither a value nor a label"),
				)),
			}
		}
		other => scalar_text(other).map(Item::literal).ok_or_else(|| {
			ResolveError::parse("options", format!("entry {index} is not a scalar or object"))
		}),
	}
}

fn scalar_text(value: Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

fn json_type(value: &Value) -> &'static str {
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
	fn equality_ignores_label() {
		assert_eq!(Item::new("1", "One"), Item::new("1", "Uno"));
		assert_ne!(Item::new("1", "One"), Item::new("2", "One"));
	}

	#[test]
	fn objects_and_literals_are_accepted() {
		let items = items_from_json(json!([
			{ "value": "1", "label": "Option 1" },
			"plain",
			42,
			{ "value": 7 },
		]))
		.expect("items");

		assert_eq!(items.len(), 4);
		assert_eq!(items[0].label, "Option 1");
		assert_eq!(items[1].value, "plain");
		assert_eq!(items[1].label, "plain");
		assert_eq!(items[2].value, "42");
		assert_eq!(items[3].label, "7");
	}

	#[test]
	fn non_array_documents_are_rejected() {
		let err = items_from_json(json!({ "value": "1" })).unwrap_err();
		assert!(matches!(err, ResolveError::Parse { .. }));
	}

	#[test]
	fn nested_arrays_are_rejected() {
		assert!(items_from_json(json!([[1, 2]])).is_err());
		assert!(items_from_json(json!([null])).is_err());
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		let err = items_from_json_str("[{\"value\":").unwrap_err();
		assert!(matches!(err, ResolveError::Parse { .. }));
	}
}
