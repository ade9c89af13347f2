//! One-shot rendering entry points.
//!
//! These drain a whole [`RenderSession`] in a single pass and destroy it. Use
//! a session directly when the output should be streamed.

use bytes::BytesMut;

use crate::error::RenderResult;
use crate::node::IntoNode;
use crate::options::StreamOptions;
use crate::runtime::Runtime;
use crate::session::RenderSession;

/// Renders `root` to a string with text separators, ready to be hydrated.
///
/// # Example
///
/// ```
/// use reinhardt_ssr::{Runtime, render_to_string};
/// use reinhardt_ssr::node::Element;
///
/// let runtime = Runtime::new();
/// let html = render_to_string(&runtime, Element::host("p").children(["a", "b"])).unwrap();
/// assert_eq!(html, "<p>a<!-- -->b</p>");
/// ```
pub fn render_to_string(runtime: &Runtime, root: impl IntoNode) -> RenderResult<String> {
	render_with_options(runtime, root, StreamOptions::default().static_markup(false))
}

/// Renders `root` to static markup, without text separators.
///
/// ```
/// use reinhardt_ssr::{Runtime, render_to_static_markup};
/// use reinhardt_ssr::node::Element;
///
/// let runtime = Runtime::new();
/// let html = render_to_static_markup(&runtime, Element::host("p").children(["a", "b"])).unwrap();
/// assert_eq!(html, "<p>ab</p>");
/// ```
pub fn render_to_static_markup(runtime: &Runtime, root: impl IntoNode) -> RenderResult<String> {
	render_with_options(runtime, root, StreamOptions::default().static_markup(true))
}

/// Renders `root` with explicit options, draining the session
/// [`default_chunk_size`](StreamOptions::default_chunk_size) bytes at a time.
pub fn render_with_options(
	runtime: &Runtime,
	root: impl IntoNode,
	options: StreamOptions,
) -> RenderResult<String> {
	let budget = options.default_chunk_size;
	let mut session = RenderSession::new(runtime, root, options)?;
	let mut out = BytesMut::new();
	while let Some(chunk) = session.read(budget)? {
		out.extend_from_slice(&chunk);
	}
	session.destroy();
	Ok(String::from_utf8_lossy(&out).into_owned())
}

/// A runtime paired with options, for rendering many trees the same way.
///
/// # Example
///
/// ```
/// use reinhardt_ssr::{StreamOptions, StreamRenderer};
/// use reinhardt_ssr::node::Element;
///
/// let renderer = StreamRenderer::with_options(StreamOptions::new().chunk_size(4));
/// let chunks: Vec<_> = renderer
///     .stream(Element::host("em").child("hi"))
///     .unwrap()
///     .stream_chunks()
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks.concat(), b"<em>hi</em>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamRenderer {
	runtime: Runtime,
	options: StreamOptions,
}

impl StreamRenderer {
	/// Creates a renderer with a fresh runtime and default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a renderer with custom options.
	pub fn with_options(options: StreamOptions) -> Self {
		Self {
			runtime: Runtime::new(),
			options,
		}
	}

	/// Creates a renderer that shares `runtime`, and with it its contexts.
	pub fn with_runtime(runtime: &Runtime, options: StreamOptions) -> Self {
		Self {
			runtime: runtime.clone(),
			options,
		}
	}

	/// Returns the runtime.
	pub fn runtime(&self) -> &Runtime {
		&self.runtime
	}

	/// Returns the options.
	pub fn options(&self) -> &StreamOptions {
		&self.options
	}

	/// Opens a session for `root`.
	pub fn stream(&self, root: impl IntoNode) -> RenderResult<RenderSession> {
		RenderSession::new(&self.runtime, root, self.options.clone())
	}

	/// Renders `root` in one pass using the renderer's options.
	pub fn render(&self, root: impl IntoNode) -> RenderResult<String> {
		render_with_options(&self.runtime, root, self.options.clone())
	}
}
