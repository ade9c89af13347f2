//! Development diagnostics for reinhardt-ssr
//!
//! Lifecycle events (session creation, suspension, teardown) are logged with
//! [`tracing`] directly. The macros in this module are for per-node
//! diagnostics that only make sense while developing a component tree, such as
//! an unknown attribute being dropped. They compile to no-ops in release builds
//! and never influence the rendered markup.
//!
//! ## Macro Overview
//!
//! | Macro | Debug Assertions | Target |
//! |-------|------------------|--------|
//! | `debug_log!` | Required | `tracing::debug!` |
//! | `warn_log!` | Required | `tracing::warn!` |
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_ssr::{debug_log, warn_log};
//!
//! warn_log!("dropping unsafe attribute name `{}`", name);
//! debug_log!("option child is not text: {:?}", child);
//! ```

/// Logs a development diagnostic at debug level (requires `debug_assertions`).
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		::tracing::debug!(target: "reinhardt_ssr::dev", $($arg)*);
	}};
}

/// No-op debug_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs a development diagnostic at warn level (requires `debug_assertions`).
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		::tracing::warn!(target: "reinhardt_ssr::dev", $($arg)*);
	}};
}

/// No-op warn_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! warn_log {
	($($arg:tt)*) => {{}};
}
