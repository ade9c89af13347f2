//! Attribute serialization and the property metadata table.
//!
//! Props are named the way component code spells them (`className`,
//! `htmlFor`, `strokeWidth`). The table maps each known prop to its attribute
//! name and to the rule deciding whether and how it is emitted. Unknown props
//! are emitted verbatim as long as their name is safe.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RenderResult;
use crate::markup::escape::quote_attribute_value;
use crate::markup::url;
use crate::props::{PropValue, Props};
use crate::warn_log;

/// Props that never become attributes on custom elements.
pub const RESERVED_PROPS: [&str; 4] = [
	"children",
	"dangerouslySetInnerHTML",
	"suppressContentEditableWarning",
	"suppressHydrationWarning",
];

/// How a known property is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
	/// Never rendered as an attribute.
	Reserved,
	/// Plain string attribute.
	String,
	/// String attribute that also accepts booleans (`"true"`/`"false"`).
	BooleanishString,
	/// Present when truthy, absent otherwise.
	Boolean,
	/// Present without a value when `true`, a string otherwise, absent when `false`.
	OverloadedBoolean,
	/// Numeric attribute; `NaN` is omitted.
	Numeric,
	/// Numeric attribute; `NaN` and values below 1 are omitted.
	PositiveNumeric,
}

impl PropertyType {
	/// Returns `true` if boolean values are meaningful for this type.
	pub fn accepts_booleans(self) -> bool {
		matches!(
			self,
			Self::BooleanishString | Self::Boolean | Self::OverloadedBoolean
		)
	}
}

/// Metadata for a known property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
	/// Serialization rule.
	pub property_type: PropertyType,
	/// Attribute name written to the markup.
	pub attribute_name: Cow<'static, str>,
	/// Whether the value is a URL that must pass [`url::sanitize_url`].
	pub sanitize_url: bool,
}

type PropertyTable = HashMap<Cow<'static, str>, PropertyInfo>;

static PROPERTIES: Lazy<PropertyTable> = Lazy::new(build_properties);

fn add(
	table: &mut PropertyTable,
	name: Cow<'static, str>,
	property_type: PropertyType,
	attribute_name: Cow<'static, str>,
	sanitize_url: bool,
) {
	table.insert(
		name,
		PropertyInfo {
			property_type,
			attribute_name,
			sanitize_url,
		},
	);
}

fn build_properties() -> PropertyTable {
	let mut table = PropertyTable::new();

	// `style` is serialized separately; the others are consumed by the renderer.
	for name in [
		"children",
		"dangerouslySetInnerHTML",
		"defaultValue",
		"defaultChecked",
		"innerHTML",
		"suppressContentEditableWarning",
		"suppressHydrationWarning",
		"style",
	] {
		add(&mut table, name.into(), PropertyType::Reserved, name.into(), false);
	}

	for (name, attribute) in [
		("acceptCharset", "accept-charset"),
		("className", "class"),
		("htmlFor", "for"),
		("httpEquiv", "http-equiv"),
	] {
		add(&mut table, name.into(), PropertyType::String, attribute.into(), false);
	}

	for (name, attribute) in [
		("contentEditable", "contenteditable"),
		("draggable", "draggable"),
		("spellCheck", "spellcheck"),
		("value", "value"),
		("autoReverse", "autoReverse"),
		("externalResourcesRequired", "externalResourcesRequired"),
		("focusable", "focusable"),
		("preserveAlpha", "preserveAlpha"),
	] {
		add(&mut table, name.into(), PropertyType::BooleanishString, attribute.into(), false);
	}

	for name in [
		"allowFullScreen",
		"async",
		"autoFocus",
		"autoPlay",
		"controls",
		"default",
		"defer",
		"disabled",
		"disablePictureInPicture",
		"disableRemotePlayback",
		"formNoValidate",
		"hidden",
		"loop",
		"noModule",
		"noValidate",
		"open",
		"playsInline",
		"readOnly",
		"required",
		"reversed",
		"scoped",
		"seamless",
		"itemScope",
	] {
		add(
			&mut table,
			name.into(),
			PropertyType::Boolean,
			name.to_ascii_lowercase().into(),
			false,
		);
	}

	// Set as DOM properties on the client, so their casing is kept.
	for name in ["checked", "multiple", "muted", "selected"] {
		add(&mut table, name.into(), PropertyType::Boolean, name.into(), false);
	}

	for name in ["capture", "download"] {
		add(&mut table, name.into(), PropertyType::OverloadedBoolean, name.into(), false);
	}

	for name in ["cols", "rows", "size", "span"] {
		add(&mut table, name.into(), PropertyType::PositiveNumeric, name.into(), false);
	}

	for name in ["rowSpan", "start"] {
		add(
			&mut table,
			name.into(),
			PropertyType::Numeric,
			name.to_ascii_lowercase().into(),
			false,
		);
	}

	for &attribute in SVG_HYPHENATED_ATTRIBUTES {
		add(&mut table, camelize(attribute).into(), PropertyType::String, attribute.into(), false);
	}

	for attribute in [
		"xlink:actuate",
		"xlink:arcrole",
		"xlink:role",
		"xlink:show",
		"xlink:title",
		"xlink:type",
	] {
		add(&mut table, camelize(attribute).into(), PropertyType::String, attribute.into(), false);
	}

	for attribute in ["xml:base", "xml:lang", "xml:space"] {
		add(&mut table, camelize(attribute).into(), PropertyType::String, attribute.into(), false);
	}

	for name in ["tabIndex", "crossOrigin"] {
		add(
			&mut table,
			name.into(),
			PropertyType::String,
			name.to_ascii_lowercase().into(),
			false,
		);
	}

	add(&mut table, "xlinkHref".into(), PropertyType::String, "xlink:href".into(), true);
	for name in ["src", "href", "action", "formAction"] {
		add(
			&mut table,
			name.into(),
			PropertyType::String,
			name.to_ascii_lowercase().into(),
			true,
		);
	}

	table
}

/// SVG attributes whose prop names are the camelCase form.
const SVG_HYPHENATED_ATTRIBUTES: &[&str] = &[
	"accent-height",
	"alignment-baseline",
	"arabic-form",
	"baseline-shift",
	"cap-height",
	"clip-path",
	"clip-rule",
	"color-interpolation",
	"color-interpolation-filters",
	"color-profile",
	"color-rendering",
	"dominant-baseline",
	"enable-background",
	"fill-opacity",
	"fill-rule",
	"flood-color",
	"flood-opacity",
	"font-family",
	"font-size",
	"font-size-adjust",
	"font-stretch",
	"font-style",
	"font-variant",
	"font-weight",
	"glyph-name",
	"glyph-orientation-horizontal",
	"glyph-orientation-vertical",
	"horiz-adv-x",
	"horiz-origin-x",
	"image-rendering",
	"letter-spacing",
	"lighting-color",
	"marker-end",
	"marker-mid",
	"marker-start",
	"overline-position",
	"overline-thickness",
	"paint-order",
	"panose-1",
	"pointer-events",
	"rendering-intent",
	"shape-rendering",
	"stop-color",
	"stop-opacity",
	"strikethrough-position",
	"strikethrough-thickness",
	"stroke-dasharray",
	"stroke-dashoffset",
	"stroke-linecap",
	"stroke-linejoin",
	"stroke-miterlimit",
	"stroke-opacity",
	"stroke-width",
	"text-anchor",
	"text-decoration",
	"text-rendering",
	"underline-position",
	"underline-thickness",
	"unicode-bidi",
	"unicode-range",
	"units-per-em",
	"v-alphabetic",
	"v-hanging",
	"v-ideographic",
	"v-mathematical",
	"vector-effect",
	"vert-adv-y",
	"vert-origin-x",
	"vert-origin-y",
	"word-spacing",
	"writing-mode",
	"xmlns:xlink",
	"x-height",
];

/// Turns `stroke-width` into `strokeWidth` and `xlink:href` into `xlinkHref`.
fn camelize(attribute: &str) -> String {
	let mut camelized = String::with_capacity(attribute.len());
	let mut chars = attribute.chars().peekable();
	while let Some(c) = chars.next() {
		match (c, chars.peek()) {
			('-' | ':', Some(next)) if next.is_ascii_lowercase() => {
				camelized.push(next.to_ascii_uppercase());
				chars.next();
			}
			_ => camelized.push(c),
		}
	}
	camelized
}

static ATTRIBUTE_NAME: Lazy<Regex> = Lazy::new(|| {
	const START: &str = ":A-Z_a-z\\x{C0}-\\x{D6}\\x{D8}-\\x{F6}\\x{F8}-\\x{2FF}\\x{370}-\\x{37D}\\x{37F}-\\x{1FFF}\\x{200C}-\\x{200D}\\x{2070}-\\x{218F}\\x{2C00}-\\x{2FEF}\\x{3001}-\\x{D7FF}\\x{F900}-\\x{FDCF}\\x{FDF0}-\\x{FFFD}";
	let pattern = format!("^[{START}][{START}\\-.0-9\\x{{B7}}\\x{{300}}-\\x{{36F}}\\x{{203F}}-\\x{{2040}}]*$");
	Regex::new(&pattern).expect("Invalid attribute name regex pattern")
});

/// Looks up the metadata of a known property.
pub fn property_info(name: &str) -> Option<&'static PropertyInfo> {
	PROPERTIES.get(name)
}

/// Returns `true` if `name` can be written as an attribute name verbatim.
pub fn is_attribute_name_safe(name: &str) -> bool {
	if ATTRIBUTE_NAME.is_match(name) {
		return true;
	}
	warn_log!("invalid attribute name: `{}`", name);
	false
}

/// Returns `true` if the prop never produces an attribute, whatever its value.
pub fn should_ignore_attribute(name: &str, info: Option<&PropertyInfo>) -> bool {
	if let Some(info) = info {
		return info.property_type == PropertyType::Reserved;
	}
	let bytes = name.as_bytes();
	let is_event_handler =
		bytes.len() > 2 && matches!(bytes[0], b'o' | b'O') && matches!(bytes[1], b'n' | b'N');
	if is_event_handler {
		warn_log!("event handler `{}` is not rendered on the server", name);
	}
	is_event_handler
}

/// Returns `true` if `value` makes the prop disappear from the markup.
pub fn should_remove_attribute(name: &str, value: &PropValue, info: Option<&PropertyInfo>) -> bool {
	if value.is_null() {
		return true;
	}
	if info.is_some_and(|info| info.property_type == PropertyType::Reserved) {
		return false;
	}
	if let PropValue::Bool(_) = value {
		let accepts = match info {
			Some(info) => info.property_type.accepts_booleans(),
			None => {
				let prefix: String = name.chars().take(5).collect::<String>().to_ascii_lowercase();
				prefix == "data-" || prefix == "aria-"
			}
		};
		if !accepts {
			warn_log!("received a boolean for non-boolean attribute `{}`", name);
			return true;
		}
	}
	let Some(info) = info else {
		return false;
	};
	match info.property_type {
		PropertyType::Boolean => !value.is_truthy(),
		PropertyType::OverloadedBoolean => *value == PropValue::Bool(false),
		PropertyType::Numeric => value.to_js_number().is_nan(),
		PropertyType::PositiveNumeric => {
			let n = value.to_js_number();
			n.is_nan() || n < 1.0
		}
		_ => false,
	}
}

/// Serializes one prop of a regular element as `name="value"`.
///
/// Returns `Ok(None)` when the prop produces no attribute.
pub fn attribute_markup(
	name: &str,
	value: &PropValue,
	block_javascript_urls: bool,
) -> RenderResult<Option<String>> {
	let info = property_info(name);
	if name != "style" && should_ignore_attribute(name, info) {
		return Ok(None);
	}
	if should_remove_attribute(name, value, info) {
		return Ok(None);
	}
	let Some(info) = info else {
		if !is_attribute_name_safe(name) {
			return Ok(None);
		}
		return Ok(Some(format!(
			"{name}={}",
			quote_attribute_value(&value.to_js_string())
		)));
	};
	let is_flag = info.property_type == PropertyType::Boolean
		|| (info.property_type == PropertyType::OverloadedBoolean && *value == PropValue::Bool(true));
	if is_flag {
		return Ok(Some(format!("{}=\"\"", info.attribute_name)));
	}
	let text = value.to_js_string();
	if info.sanitize_url {
		url::sanitize_url(&info.attribute_name, &text, block_javascript_urls)?;
	}
	Ok(Some(format!(
		"{}={}",
		info.attribute_name,
		quote_attribute_value(&text)
	)))
}

/// Serializes one prop of a custom element. Only the name is checked.
pub fn custom_attribute_markup(name: &str, value: &PropValue) -> Option<String> {
	if value.is_null() || !is_attribute_name_safe(name) {
		return None;
	}
	Some(format!("{name}={}", quote_attribute_value(&value.to_js_string())))
}

/// Returns `true` if `tag` is rendered as a custom element.
///
/// A tag is custom when it contains a hyphen (except the few SVG and MathML
/// names that do) or carries a string `is` prop.
pub fn is_custom_component(tag: &str, props: &Props) -> bool {
	if !tag.contains('-') {
		return matches!(props.get("is"), Some(PropValue::Str(_)));
	}
	!matches!(
		tag,
		"annotation-xml"
			| "color-profile"
			| "font-face"
			| "font-face-src"
			| "font-face-uri"
			| "font-face-format"
			| "font-face-name"
			| "missing-glyph"
	)
}
