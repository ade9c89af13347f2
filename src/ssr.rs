//! Streaming server-side rendering
//!
//! This module provides access to reinhardt-ssr, which renders component
//! trees to HTML markup in byte-budgeted chunks.
//!
//! ## Architecture
//!
//! - **Sessions**: resumable renders driven by `read(budget)`
//! - **Contexts**: per-session provider values on shared slots
//! - **Suspense**: boundaries that fall back when a component is not ready
//!
//! ## Example
//!
//! ```rust
//! use reinhardt::ssr::{Runtime, render_to_string};
//! use reinhardt::ssr::node::Element;
//!
//! let runtime = Runtime::new();
//! let html = render_to_string(&runtime, Element::host("h1").child("Hi")).unwrap();
//! assert_eq!(html, "<h1>Hi</h1>");
//! ```

// Re-export all reinhardt-ssr functionality
pub use reinhardt_ssr::*;
