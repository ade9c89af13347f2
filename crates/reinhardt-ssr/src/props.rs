//! Property values and ordered property maps.
//!
//! Props keep their insertion order so that attributes come out in the order
//! they were declared. Values follow the loose scalar model of the markup they
//! end up in: everything can be turned into a string, booleans and numbers
//! have their own serialization rules, and styles are nested maps.

use std::borrow::Cow;

/// A single property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
	/// Absent value; omitted from markup.
	#[default]
	Null,
	/// Boolean value.
	Bool(bool),
	/// Numeric value.
	Number(f64),
	/// String value.
	Str(Cow<'static, str>),
	/// List value (for example a multi-select value).
	List(Vec<PropValue>),
	/// Style mapping (property name to value).
	Style(Props),
}

impl PropValue {
	/// Returns `true` for [`PropValue::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Returns the value if it is not null.
	pub fn non_null(&self) -> Option<&PropValue> {
		(!self.is_null()).then_some(self)
	}

	/// Converts the value to its string form.
	///
	/// Lists join their items with `,`; a null item contributes nothing.
	pub fn to_js_string(&self) -> Cow<'_, str> {
		match self {
			Self::Null => Cow::Borrowed("null"),
			Self::Bool(true) => Cow::Borrowed("true"),
			Self::Bool(false) => Cow::Borrowed("false"),
			Self::Number(n) => Cow::Owned(number_to_string(*n)),
			Self::Str(s) => Cow::Borrowed(s.as_ref()),
			Self::List(items) => Cow::Owned(
				items
					.iter()
					.map(|item| match item {
						Self::Null => Cow::Borrowed(""),
						other => other.to_js_string(),
					})
					.collect::<Vec<_>>()
					.join(","),
			),
			Self::Style(_) => Cow::Borrowed("[object Object]"),
		}
	}

	/// Converts the value to a number, yielding `NaN` when it has no numeric
	/// reading.
	pub fn to_js_number(&self) -> f64 {
		match self {
			Self::Null => 0.0,
			Self::Bool(b) => f64::from(u8::from(*b)),
			Self::Number(n) => *n,
			Self::Str(s) => parse_number(s),
			Self::List(items) => match items.as_slice() {
				[] => 0.0,
				[single] => parse_number(&single.to_js_string()),
				_ => f64::NAN,
			},
			Self::Style(_) => f64::NAN,
		}
	}

	/// Returns the truthiness of the value.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(b) => *b,
			Self::Number(n) => *n != 0.0 && !n.is_nan(),
			Self::Str(s) => !s.is_empty(),
			Self::List(_) | Self::Style(_) => true,
		}
	}
}

fn parse_number(s: &str) -> f64 {
	let trimmed = s.trim();
	if trimmed.is_empty() {
		return 0.0;
	}
	match trimmed {
		"Infinity" | "+Infinity" => f64::INFINITY,
		"-Infinity" => f64::NEG_INFINITY,
		// Rust accepts spellings like "inf" and "nan" that are not numbers here
		_ if trimmed.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') => {
			f64::NAN
		}
		_ => trimmed.parse().unwrap_or(f64::NAN),
	}
}

/// Formats a number the way markup expects it: integral values without a
/// fractional part, `NaN`, `Infinity`, and no negative zero.
pub fn number_to_string(n: f64) -> String {
	if n.is_nan() {
		"NaN".to_string()
	} else if n.is_infinite() {
		if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
	} else if n == 0.0 {
		"0".to_string()
	} else {
		n.to_string()
	}
}

impl From<&'static str> for PropValue {
	fn from(value: &'static str) -> Self {
		Self::Str(Cow::Borrowed(value))
	}
}

impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Str(Cow::Owned(value))
	}
}

impl From<Cow<'static, str>> for PropValue {
	fn from(value: Cow<'static, str>) -> Self {
		Self::Str(value)
	}
}

impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

macro_rules! impl_from_integer {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for PropValue {
				fn from(value: $ty) -> Self {
					Self::Number(value as f64)
				}
			}
		)*
	};
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
	fn from(value: Vec<T>) -> Self {
		Self::List(value.into_iter().map(Into::into).collect())
	}
}

impl From<Props> for PropValue {
	fn from(value: Props) -> Self {
		Self::Style(value)
	}
}

impl From<serde_json::Value> for PropValue {
	fn from(value: serde_json::Value) -> Self {
		use serde_json::Value;
		match value {
			Value::Null => Self::Null,
			Value::Bool(b) => Self::Bool(b),
			Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
			Value::String(s) => Self::Str(Cow::Owned(s)),
			Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
			Value::Object(map) => Self::Style(
				map.into_iter()
					.map(|(k, v)| (Cow::Owned(k), PropValue::from(v)))
					.collect(),
			),
		}
	}
}

/// An ordered property map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
	entries: Vec<(Cow<'static, str>, PropValue)>,
}

impl Props {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a property, builder style.
	pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<PropValue>) -> Self {
		self.insert(name, value);
		self
	}

	/// Sets a property, keeping the original position when it already exists.
	pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<PropValue>) {
		let name = name.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| *k == name) {
			Some((_, slot)) => *slot = value,
			None => self.entries.push((name, value)),
		}
	}

	/// Returns the value of a property.
	pub fn get(&self, name: &str) -> Option<&PropValue> {
		self.entries
			.iter()
			.find(|(k, _)| k.as_ref() == name)
			.map(|(_, v)| v)
	}

	/// Returns the value of a property if it is present and not null.
	pub fn get_non_null(&self, name: &str) -> Option<&PropValue> {
		self.get(name).and_then(PropValue::non_null)
	}

	/// Returns `true` if the property is present (even when null).
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Removes a property and returns its value.
	pub fn remove(&mut self, name: &str) -> Option<PropValue> {
		let index = self.entries.iter().position(|(k, _)| k.as_ref() == name)?;
		Some(self.entries.remove(index).1)
	}

	/// Iterates properties in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
		self.entries.iter().map(|(k, v)| (k.as_ref(), v))
	}

	/// Returns the number of properties.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if there are no properties.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Overlays `other` on top of this map.
	pub fn merge(&mut self, other: &Props) {
		for (name, value) in &other.entries {
			self.insert(name.clone(), value.clone());
		}
	}
}

impl<K, V> FromIterator<(K, V)> for Props
where
	K: Into<Cow<'static, str>>,
	V: Into<PropValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut props = Props::new();
		for (k, v) in iter {
			props.insert(k, v);
		}
		props
	}
}

impl IntoIterator for Props {
	type Item = (Cow<'static, str>, PropValue);
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}
