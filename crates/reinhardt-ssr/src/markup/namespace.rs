//! Markup namespaces.
//!
//! Rendering starts in HTML. Entering `<svg>` or `<math>` switches the
//! namespace for descendants; `<foreignObject>` inside SVG switches back.

/// The namespace an element is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
	/// HTML.
	#[default]
	Html,
	/// SVG.
	Svg,
	/// MathML.
	MathMl,
}

impl Namespace {
	/// Returns the namespace URI.
	pub fn uri(self) -> &'static str {
		match self {
			Self::Html => "http://www.w3.org/1999/xhtml",
			Self::Svg => "http://www.w3.org/2000/svg",
			Self::MathMl => "http://www.w3.org/1998/Math/MathML",
		}
	}

	/// Returns the namespace an `<svg>` or `<math>` tag opens on its own.
	pub fn intrinsic(tag: &str) -> Self {
		match tag {
			"svg" => Self::Svg,
			"math" => Self::MathMl,
			_ => Self::Html,
		}
	}

	/// Returns the namespace children of `tag` are rendered in, given the
	/// namespace of `tag` itself.
	pub fn child_namespace(self, tag: &str) -> Self {
		match self {
			Self::Html => Self::intrinsic(tag),
			Self::Svg if tag == "foreignObject" => Self::Html,
			other => other,
		}
	}

	/// Returns `true` where tag names are matched case-insensitively.
	pub fn is_case_insensitive(self) -> bool {
		self == Self::Html
	}
}
