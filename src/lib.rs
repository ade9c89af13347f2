//! # Reinhardt Render
//!
//! Server-side rendering for Reinhardt component trees.
//!
//! ## Feature Flags
//!
//! - `ssr` (default) - Streaming server renderer ([`ssr`])
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt::ssr::{RenderSession, Runtime, StreamOptions};
//! use reinhardt::ssr::node::{Element, IntoNode};
//!
//! let runtime = Runtime::new();
//! let page = Element::host("main")
//!     .child(Element::host("h1").child("Posts"))
//!     .child(Element::host("p").children(["1", " post"]))
//!     .into_node();
//!
//! let mut session = RenderSession::new(&runtime, page, StreamOptions::default()).unwrap();
//! let mut body = Vec::new();
//! while let Some(chunk) = session.read(16).unwrap() {
//!     // Hand each chunk to the transport here.
//!     body.extend_from_slice(&chunk);
//! }
//! assert_eq!(body, b"<main><h1>Posts</h1><p>1<!-- --> post</p></main>");
//! ```

#[cfg(feature = "ssr")]
pub mod ssr;
