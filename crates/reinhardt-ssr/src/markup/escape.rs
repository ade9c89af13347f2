//! Text and attribute escaping.

use std::borrow::Cow;

use crate::props::number_to_string;

/// Marker inserted between adjacent text nodes in dynamic markup.
pub const TEXT_SEPARATOR: &str = "<!-- -->";

/// Returns the entity that replaces `byte` in text and attribute values.
fn entity(byte: u8) -> Option<&'static str> {
	match byte {
		b'&' => Some("&amp;"),
		b'<' => Some("&lt;"),
		b'>' => Some("&gt;"),
		b'"' => Some("&quot;"),
		b'\'' => Some("&#x27;"),
		_ => None,
	}
}

/// Appends `s` to `out` with `&`, `<`, `>`, `"` and `'` replaced by entities.
///
/// Runs of plain text are copied as whole slices. Every special character is
/// ASCII, so splitting at one never lands inside a multi-byte sequence.
pub fn escape_into(out: &mut String, s: &str) {
	let mut copied = 0;
	for (at, byte) in s.bytes().enumerate() {
		if let Some(entity) = entity(byte) {
			out.push_str(&s[copied..at]);
			out.push_str(entity);
			copied = at + 1;
		}
	}
	out.push_str(&s[copied..]);
}

/// Escapes `s`, borrowing it unchanged when nothing needs replacing.
pub fn escape_text(s: &str) -> Cow<'_, str> {
	let Some(first) = s.bytes().position(|b| entity(b).is_some()) else {
		return Cow::Borrowed(s);
	};
	let mut escaped = String::with_capacity(s.len() + 8);
	escaped.push_str(&s[..first]);
	escape_into(&mut escaped, &s[first..]);
	Cow::Owned(escaped)
}

/// Stringifies a number and escapes it.
pub fn escape_number(n: f64) -> String {
	// Number strings never contain special characters.
	number_to_string(n)
}

/// Escapes an attribute value and wraps it in double quotes.
pub fn quote_attribute_value(value: &str) -> String {
	let mut quoted = String::with_capacity(value.len() + 2);
	quoted.push('"');
	escape_into(&mut quoted, value);
	quoted.push('"');
	quoted
}
