//! Serialization of the `style` prop.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::props::{PropValue, Props, number_to_string};

/// CSS properties that accept plain numbers without a unit.
static UNITLESS_PROPERTIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
	[
		"animationIterationCount",
		"aspectRatio",
		"borderImageOutset",
		"borderImageSlice",
		"borderImageWidth",
		"boxFlex",
		"boxFlexGroup",
		"boxOrdinalGroup",
		"columnCount",
		"columns",
		"flex",
		"flexGrow",
		"flexPositive",
		"flexShrink",
		"flexNegative",
		"flexOrder",
		"gridArea",
		"gridRow",
		"gridRowEnd",
		"gridRowSpan",
		"gridRowStart",
		"gridColumn",
		"gridColumnEnd",
		"gridColumnSpan",
		"gridColumnStart",
		"fontWeight",
		"lineClamp",
		"lineHeight",
		"opacity",
		"order",
		"orphans",
		"tabSize",
		"widows",
		"zIndex",
		"zoom",
		// SVG
		"fillOpacity",
		"floodOpacity",
		"stopOpacity",
		"strokeDasharray",
		"strokeDashoffset",
		"strokeMiterlimit",
		"strokeOpacity",
		"strokeWidth",
	]
	.into_iter()
	.collect()
});

const VENDOR_PREFIXES: [&str; 4] = ["Webkit", "ms", "Moz", "O"];

/// Returns `true` if numbers for `name` are emitted without `px`.
///
/// Vendor-prefixed names (`WebkitLineClamp`) follow their unprefixed form.
pub fn is_unitless(name: &str) -> bool {
	if UNITLESS_PROPERTIES.contains(name) {
		return true;
	}
	VENDOR_PREFIXES.iter().any(|prefix| {
		name.strip_prefix(prefix)
			.filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
			.is_some_and(|rest| {
				let mut unprefixed = rest.to_string();
				unprefixed[..1].make_ascii_lowercase();
				UNITLESS_PROPERTIES.contains(unprefixed.as_str())
			})
	})
}

/// Converts a camelCase style name to its CSS form.
///
/// Custom properties (`--name`) are kept verbatim.
pub fn hyphenate_style_name(name: &str) -> String {
	if name.starts_with("--") {
		return name.to_string();
	}
	let mut hyphenated = String::with_capacity(name.len() + 4);
	for c in name.chars() {
		if c.is_ascii_uppercase() {
			hyphenated.push('-');
			hyphenated.push(c.to_ascii_lowercase());
		} else {
			hyphenated.push(c.to_ascii_lowercase());
		}
	}
	match hyphenated.strip_prefix("ms-") {
		Some(rest) => format!("-ms-{rest}"),
		None => hyphenated,
	}
}

/// Formats a single style value.
pub fn style_value(name: &str, value: &PropValue) -> String {
	let is_custom_property = name.starts_with("--");
	match value {
		PropValue::Null | PropValue::Bool(_) => String::new(),
		PropValue::Number(n) if !is_custom_property && *n != 0.0 && !is_unitless(name) => {
			format!("{}px", number_to_string(*n))
		}
		other => other.to_js_string().trim().to_string(),
	}
}

/// Serializes a style mapping, or returns `None` when nothing is emitted.
///
/// Entries keep their insertion order and null values are skipped.
pub fn serialize_style(style: &Props) -> Option<String> {
	let mut serialized = String::new();
	let mut delimiter = "";
	for (name, value) in style.iter() {
		if value.is_null() {
			continue;
		}
		serialized.push_str(delimiter);
		serialized.push_str(&hyphenate_style_name(name));
		serialized.push(':');
		serialized.push_str(&style_value(name, value));
		delimiter = ";";
	}
	(!serialized.is_empty()).then_some(serialized)
}
