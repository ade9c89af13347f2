//! Error types for streaming server rendering.
//!
//! Fatal problems are reported as [`RenderError`]. A component that is not
//! ready yet is not an error: it reports [`Interrupt::Suspended`], which the
//! session turns into a switch to the nearest boundary's fallback.

use thiserror::Error;

/// Result type used throughout the renderer.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type returned by component render functions and lazy initializers.
pub type Evaluation<T> = Result<T, Interrupt>;

/// Fatal rendering errors.
///
/// Any of these aborts the current `read` call and leaves the session unusable.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// A portal node was encountered.
	#[error(
		"portals are not supported by the server renderer; render them conditionally so that they only appear on the client"
	)]
	PortalNotSupported,

	/// An element type the server renderer does not know how to render.
	#[error("unknown element-like object type: {0}")]
	UnknownElementType(String),

	/// A component suspended with no enclosing suspense boundary.
	#[error(
		"a component suspended while rendering, but no fallback UI was specified; add a suspense boundary with a fallback higher in the tree"
	)]
	SuspendedWithoutBoundary,

	/// A component suspended and the nearest boundary has no fallback.
	#[error("a component suspended inside a suspense boundary that has no fallback")]
	BoundaryWithoutFallback,

	/// `<textarea>` received more than one child.
	#[error("<textarea> can only have at most one child")]
	TextareaMultipleChildren,

	/// `<textarea>` received both children and `defaultValue`.
	#[error("if you supply `defaultValue` on a <textarea>, do not pass children")]
	TextareaChildrenWithDefaultValue,

	/// A void element received children or inner HTML.
	#[error(
		"{0} is a void element tag and must neither have `children` nor use `dangerouslySetInnerHTML`"
	)]
	VoidElementWithChildren(String),

	/// An element received both children and inner HTML.
	#[error("can only set one of `children` or `dangerouslySetInnerHTML` on <{0}>")]
	ChildrenAndInnerHtml(String),

	/// The `style` prop was not a style mapping.
	#[error("the `style` prop on <{0}> expects a mapping from style properties to values")]
	InvalidStyleProp(String),

	/// A tag name that cannot be emitted safely.
	#[error("invalid tag: {0}")]
	InvalidTag(String),

	/// A `javascript:` URL in a URL-valued attribute.
	#[error("blocked a javascript: URL in attribute `{0}` as a security precaution")]
	UnsafeUrl(String),

	/// The session id space is exhausted.
	#[error("maximum number of concurrent renderers exceeded ({0})")]
	TooManyRenderers(usize),

	/// A component kept requesting re-renders while rendering.
	#[error("too many re-renders in component `{0}`; the renderer limits the number of renders to prevent an infinite loop")]
	TooManyReRenders(String),

	/// A provider or consumer referred to a context this runtime never created.
	#[error("context {0} does not belong to this runtime")]
	UnknownContext(usize),

	/// A context value did not have the type its consumer expected.
	#[error("context value does not match the type expected by its consumer")]
	ContextTypeMismatch,

	/// `read` was called with a zero budget.
	#[error("read budget must be at least one byte")]
	ZeroBudget,

	/// The session was torn down by an earlier fatal error.
	#[error("session was aborted by an earlier fatal error")]
	SessionFailed,

	/// A lazy component's initializer failed.
	#[error("lazy component failed to initialize: {0}")]
	LazyInitFailed(String),

	/// A user component reported its own failure.
	#[error("component `{name}` failed: {message}")]
	Component {
		/// Component display name.
		name: String,
		/// Failure description.
		message: String,
	},
}

impl RenderError {
	/// Creates a [`RenderError::Component`] error.
	pub fn component(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Component {
			name: name.into(),
			message: message.into(),
		}
	}
}

/// Why a component or lazy initializer did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupt {
	/// The value is not ready yet; render the nearest boundary's fallback.
	Suspended,
	/// Rendering failed.
	Failed(RenderError),
}

impl Interrupt {
	/// Returns `true` for [`Interrupt::Suspended`].
	pub fn is_suspended(&self) -> bool {
		matches!(self, Self::Suspended)
	}
}

impl From<RenderError> for Interrupt {
	fn from(err: RenderError) -> Self {
		Self::Failed(err)
	}
}
