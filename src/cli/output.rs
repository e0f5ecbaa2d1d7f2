use anyhow::Result;
use serde_json::json;

use crate::workflow::ResolvedOptions;

/// Print one `value<TAB>label` line per option, marking selected ones.
pub(crate) fn print_plain(outcome: &ResolvedOptions) {
	print!("{}", format_plain(outcome));
}

pub(crate) fn format_plain(outcome: &ResolvedOptions) -> String {
	if let Some(error) = &outcome.error {
		return format!("Error ({}): {error}\n", outcome.kind);
	}
	if outcome.items.is_empty() {
		return "No options\n".to_string();
	}

	outcome
		.items
		.iter()
		.map(|item| {
			let marker = if outcome.selected.contains(&item.value) { "*" } else { " " };
			format!("{marker} {}\t{}\n", item.value, item.label)
		})
		.collect()
}

/// Format the resolved options as a JSON string.
pub(crate) fn format_outcome_json(outcome: &ResolvedOptions) -> Result<String> {
	let payload = json!({
		"kind": outcome.kind,
		"state": outcome.state,
		"items": outcome.items,
		"selected": outcome.selected,
		"error": outcome.error,
	});

	Ok(serde_json::to_string_pretty(&payload)?)
}

/// Print the JSON representation of the resolved options.
pub(crate) fn print_json(outcome: &ResolvedOptions) -> Result<()> {
	println!("{}", format_outcome_json(outcome)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use select_list::{Item, LoadState, ProviderKind};
	use serde_json::Value;

	use super::*;

	fn outcome() -> ResolvedOptions {
		ResolvedOptions {
			kind: ProviderKind::JsonLiteral,
			state: LoadState::Loaded,
			items: vec![Item::new("1", "Option 1"), Item::new("2", "Option 2")],
			selected: vec!["2".into()],
			error: None,
		}
	}

	#[test]
	fn json_format_includes_kind_and_selection() {
		let json = format_outcome_json(&outcome()).expect("json");
		let value: Value = serde_json::from_str(&json).expect("parse");
		assert_eq!(value["kind"], "json-literal");
		assert_eq!(value["state"], "loaded");
		assert_eq!(value["items"][1]["label"], "Option 2");
		assert_eq!(value["selected"][0], "2");
		assert!(value["error"].is_null());
	}

	#[test]
	fn plain_format_marks_selected_items() {
		assert_eq!(format_plain(&outcome()), "  1\tOption 1\n* 2\tOption 2\n");
	}

	#[test]
	fn plain_format_reports_empty_and_failed_loads() {
		let mut empty = outcome();
		empty.items.clear();
		assert_eq!(format_plain(&empty), "No options\n");

		let failed = ResolvedOptions {
			kind: ProviderKind::Unknown,
			state: LoadState::Error,
			error: Some("cannot resolve options of kind unknown".into()),
			..empty
		};
		assert_eq!(
			format_plain(&failed),
			"Error (unknown): cannot resolve options of kind unknown\n"
		);
	}
}
