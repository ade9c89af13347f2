//! URL sanitization for URL-valued attributes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RenderError, RenderResult};

// Leading control characters and spaces are ignored by URL parsers, and tabs
// or newlines may appear anywhere inside the scheme.
static JAVASCRIPT_URL: Lazy<Regex> = Lazy::new(|| {
	Regex::new(
		r"(?i)^[\x00-\x20]*j[\r\n\t]*a[\r\n\t]*v[\r\n\t]*a[\r\n\t]*s[\r\n\t]*c[\r\n\t]*r[\r\n\t]*i[\r\n\t]*p[\r\n\t]*t[\r\n\t]*:",
	)
	.expect("Invalid javascript URL regex pattern")
});

/// Returns `true` if `url` would execute script when followed.
pub fn is_javascript_url(url: &str) -> bool {
	JAVASCRIPT_URL.is_match(url)
}

/// Rejects `javascript:` URLs for `attribute` when `block` is set.
pub fn sanitize_url(attribute: &str, url: &str, block: bool) -> RenderResult<()> {
	if !is_javascript_url(url) {
		return Ok(());
	}
	if block {
		return Err(RenderError::UnsafeUrl(attribute.to_string()));
	}
	tracing::warn!(attribute, "rendering a javascript: URL");
	Ok(())
}
