//! Markup emission utilities: escaping, attributes, styles, namespaces and
//! URL sanitization.

pub mod attributes;
pub mod escape;
pub mod namespace;
pub mod style;
pub mod url;

pub use attributes::{PropertyInfo, PropertyType, attribute_markup, property_info};
pub use escape::{TEXT_SEPARATOR, escape_into, escape_text};
pub use namespace::Namespace;
pub use style::serialize_style;
