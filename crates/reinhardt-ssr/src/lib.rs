//! Reinhardt SSR - Streaming Server Renderer
//!
//! Renders a declarative component tree to HTML markup in pieces: a
//! [`RenderSession`] hands out at most a caller-chosen number of bytes per
//! [`read`](RenderSession::read), keeping its place on an explicit frame stack
//! between calls. Many sessions can be interleaved on one thread; context
//! values a session provides are only visible to that session.
//!
//! ## Features
//!
//! - **Resumable output**: byte-budgeted reads, chunk iterator, drop-safe teardown
//! - **Suspense boundaries**: components may suspend; the nearest boundary
//!   renders its fallback and nothing of the suspended content leaks out
//! - **Contexts**: per-session provider values on shared context slots
//! - **Hooks**: `use_state`, `use_id`, `use_context` and friends for components
//! - **DOM rules**: attribute table, style serialization, form controls,
//!   URL sanitizing, void and newline-eating tags
//!
//! ## Architecture
//!
//! - [`node`]: the tree description (`Node`, `Element`, components)
//! - [`runtime`]: session ids and context slots shared by sessions
//! - [`session`]: the streaming engine
//! - [`markup`]: escaping and attribute/style serialization
//! - [`hooks`]: the render context handed to components
//! - [`render`]: one-shot entry points
//!
//! ## Example
//!
//! ```
//! use reinhardt_ssr::{Runtime, RenderSession, StreamOptions};
//! use reinhardt_ssr::node::{Component, Element, IntoNode, Node};
//!
//! let runtime = Runtime::new();
//! let theme = runtime.create_context("light");
//!
//! let label = Component::new("Label", {
//!     let theme = theme.clone();
//!     move |cx, _props, _children| {
//!         let theme = cx.use_context(&theme)?;
//!         Ok(Element::host("span").attr("className", *theme).into_node())
//!     }
//! });
//!
//! let root = Element::host("div").child(Node::provider(&theme, "dark", [label.element()]));
//! let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
//!
//! let mut html = Vec::new();
//! for chunk in session.chunks(8) {
//!     html.extend_from_slice(&chunk.unwrap());
//! }
//! assert_eq!(html, br#"<div><span class="dark"></span></div>"#);
//! ```
#![warn(missing_docs)]

// Core modules
pub mod context;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod node;
pub mod options;
pub mod props;
pub mod runtime;
pub mod thread_id;

// Markup emission
pub mod markup;

// Streaming engine
mod element;
mod frame;
mod resolver;
pub mod render;
pub mod session;

pub use context::{Context, ContextId};
pub use error::{Evaluation, Interrupt, RenderError, RenderResult};
pub use hooks::{HookDispatcher, RenderCx, ServerHooks, StateSetter};
pub use node::{Component, Element, ElementKind, ForwardRef, IntoNode, Lazy, Node};
pub use options::{DEFAULT_CHUNK_SIZE, StreamOptions};
pub use props::{PropValue, Props};
pub use render::{StreamRenderer, render_to_static_markup, render_to_string, render_with_options};
pub use resolver::{BOUNDARY_END, BOUNDARY_FALLBACK_START, BOUNDARY_START};
pub use runtime::Runtime;
pub use session::{Chunks, RenderSession, SessionState};
pub use thread_id::SessionId;
