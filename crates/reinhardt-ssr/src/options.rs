//! Options for a streaming render session.

use serde::{Deserialize, Serialize};

/// Default chunk size used by the convenience entry points (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Options for a streaming render session.
///
/// Deserializes with every field optional, so it can be embedded in a
/// settings file:
///
/// ```
/// use reinhardt_ssr::StreamOptions;
///
/// let options: StreamOptions =
///     serde_json::from_str(r#"{"identifier_prefix": "app-"}"#).unwrap();
/// assert_eq!(options.identifier_prefix, "app-");
/// assert!(!options.static_markup);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
	/// Prefix for identifiers generated with `use_id`.
	pub identifier_prefix: String,
	/// Emit static markup: no separators between adjacent text nodes.
	pub static_markup: bool,
	/// Chunk size used when draining a whole session at once.
	pub default_chunk_size: usize,
	/// Reject `javascript:` URLs in URL-valued attributes.
	pub block_javascript_urls: bool,
}

impl Default for StreamOptions {
	fn default() -> Self {
		Self {
			identifier_prefix: String::new(),
			static_markup: false,
			default_chunk_size: DEFAULT_CHUNK_SIZE,
			block_javascript_urls: true,
		}
	}
}

impl StreamOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the identifier prefix.
	pub fn identifier_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.identifier_prefix = prefix.into();
		self
	}

	/// Selects static (`true`) or dynamic (`false`) markup.
	pub fn static_markup(mut self, enable: bool) -> Self {
		self.static_markup = enable;
		self
	}

	/// Sets the default chunk size. Zero is clamped to one byte.
	pub fn chunk_size(mut self, size: usize) -> Self {
		self.default_chunk_size = size.max(1);
		self
	}

	/// Allows `javascript:` URLs in URL-valued attributes.
	pub fn allow_javascript_urls(mut self) -> Self {
		self.block_javascript_urls = false;
		self
	}
}
