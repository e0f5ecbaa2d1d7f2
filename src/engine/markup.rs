//! Extraction of `<option>` elements from a markup fragment.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ResolveError;
use super::item::Item;

/// Turns a fragment of option-like markup into ordered items.
pub trait MarkupParser: Send + Sync {
	fn parse_options(&self, markup: &str) -> Result<Vec<Item>, ResolveError>;
}

static OPTION_OPEN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<option\b([^>]*)>").expect("option tag pattern is valid")
});

static OPTION_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)</option\s*>|<option\b|</select\s*>|</optgroup\s*>|<optgroup\b")
		.expect("option terminator pattern is valid")
});

/// One attribute: its name, then an optional double-quoted, single-quoted or
/// bare value. Matches consume whole quoted values, so text inside one
/// attribute is never read as another.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?s)([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
		.expect("attribute pattern is valid")
});

static TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Scanner for `<option>` tags in an HTML fragment.
///
/// Handles quoted and unquoted `value` attributes and implicitly closed
/// options. The label is the option's text with whitespace collapsed; an
/// option without a `value` attribute uses its label as the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionTagParser;

impl MarkupParser for OptionTagParser {
	fn parse_options(&self, markup: &str) -> Result<Vec<Item>, ResolveError> {
		let mut items = Vec::new();
		for open in OPTION_OPEN.captures_iter(markup) {
			let Some(tag) = open.get(0) else {
				continue;
			};
			let attributes = open.get(1).map_or("", |m| m.as_str());
			let body_start = tag.end();
			let body_end = OPTION_CLOSE
				.find(&markup[body_start..])
				.map_or(markup.len(), |m| body_start + m.start());

			let label = collapse_whitespace(&decode_entities(
				&TAG.replace_all(&markup[body_start..body_end], ""),
			));
			let value = value_attribute(attributes).unwrap_or_else(|| label.clone());
			items.push(Item::new(value, label));
		}
		Ok(items)
	}
}

/// Value of the first `value` attribute, if any.
fn value_attribute(attributes: &str) -> Option<String> {
	let captures = ATTRIBUTE
		.captures_iter(attributes)
		.find(|captures| captures[1].eq_ignore_ascii_case("value"))?;
	let raw = captures
		.get(2)
		.or_else(|| captures.get(3))
		.or_else(|| captures.get(4))
		.map_or("", |m| m.as_str());
	Some(decode_entities(raw))
}

fn collapse_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
	if !text.contains('&') {
		return text.to_string();
	}

	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(start) = rest.find('&') {
		decoded.push_str(&rest[..start]);
		let candidate = &rest[start..];
		match candidate.find(';').and_then(|end| {
			decode_entity(&candidate[1..end]).map(|ch| (ch, end))
		}) {
			Some((ch, end)) => {
				decoded.push(ch);
				rest = &candidate[end + 1..];
			}
			None => {
				decoded.push('&');
				rest = &candidate[1..];
			}
		}
	}
	decoded.push_str(rest);
	decoded
}

fn decode_entity(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		_ => {
			let digits = name.strip_prefix('#')?;
			let code = match digits.strip_prefix(['x', 'X']) {
				Some(hex) => u32::from_str_radix(hex, 16).ok()?,
				None => digits.parse().ok()?,
			};
			char::from_u32(code)
		}
	}
}
