//! Host element rendering.
//!
//! Turns a host element into its opening tag (and, for void elements, the
//! whole tag) plus a frame holding its children. Form controls get their
//! special treatment here: `<input>` resolves controlled against default
//! values, `<textarea>` moves its value into its content, `<select>` hands its
//! value to descendant `<option>`s, and `<option>` marks itself selected.

use std::borrow::Cow;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RenderError, RenderResult};
use crate::frame::{Frame, FrameKind};
use crate::markup::attributes::{RESERVED_PROPS, attribute_markup, custom_attribute_markup, is_custom_component};
use crate::markup::escape::{escape_into, escape_text};
use crate::markup::style::serialize_style;
use crate::markup::Namespace;
use crate::node::{Element, Node, to_array};
use crate::options::StreamOptions;
use crate::props::{PropValue, Props, number_to_string};
use crate::{debug_log, warn_log};

/// Tags that never get a closing tag.
const OMITTED_CLOSE_TAGS: [&str; 15] = [
	"area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
	"source", "track", "wbr",
];

/// Tags whose content parsers strip a single leading newline from.
const NEWLINE_EATING_TAGS: [&str; 3] = ["listing", "pre", "textarea"];

static VALID_TAG: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z:_.\-\d]*$").expect("Invalid tag regex pattern"));

fn is_void_element(tag: &str) -> bool {
	OMITTED_CLOSE_TAGS.contains(&tag) || tag == "menuitem"
}

/// Inputs shared by every host element rendered by a session.
pub(crate) struct HostEnv<'a> {
	pub(crate) parent_namespace: Namespace,
	pub(crate) ambient: &'a Rc<Props>,
	pub(crate) select_value: Option<&'a PropValue>,
	pub(crate) options: &'a StreamOptions,
}

/// What an element renders between its tags.
enum Content {
	/// Child nodes rendered through a frame.
	Children(Vec<Node>),
	/// Pre-rendered markup emitted right after the opening tag.
	Inline(String),
}

/// Renders `element` with tag `tag`, returning the opening markup and the frame
/// for its children.
pub(crate) fn render_host(
	element: Element,
	tag: &str,
	env: &HostEnv<'_>,
) -> RenderResult<(String, Frame)> {
	let lowercase = tag.to_ascii_lowercase();
	let namespace = match env.parent_namespace {
		Namespace::Html => Namespace::intrinsic(&lowercase),
		other => other,
	};
	if namespace == Namespace::Html && lowercase != tag {
		warn_log!("<{}> is using incorrect casing; use lowercase for HTML elements", tag);
	}
	if !VALID_TAG.is_match(tag) {
		return Err(RenderError::InvalidTag(tag.to_string()));
	}

	let Element {
		props,
		children,
		inner_html,
		..
	} = element;

	let mut kind = FrameKind::Host;
	let (props, content) = match lowercase.as_str() {
		"input" => (input_props(props), Content::Children(children)),
		"textarea" => textarea(props, children)?,
		"select" => {
			let (props, value) = select_props(props);
			kind = FrameKind::Select { saved: value };
			(props, Content::Children(children))
		}
		"option" => match env.select_value {
			Some(select_value) => option(props, children, select_value),
			None => (props, Content::Children(children)),
		},
		_ => (props, Content::Children(children)),
	};

	assert_valid_props(tag, &lowercase, &content, inner_html.is_some())?;

	let mut out = open_tag(tag, &lowercase, &props, env.options)?;
	let void = OMITTED_CLOSE_TAGS.contains(&lowercase.as_str());
	let footer = if void {
		out.push_str("/>");
		String::new()
	} else {
		out.push('>');
		format!("</{tag}>")
	};

	let inline = match (inner_html, content) {
		(Some(html), _) => Some(html.into_owned()),
		(None, Content::Inline(markup)) => Some(markup),
		(None, Content::Children(children)) => match single_scalar(&children) {
			Some(text) => Some(text),
			None => {
				let frame = Frame::new(
					kind,
					to_array(children),
					env.parent_namespace.child_namespace(tag),
					Rc::clone(env.ambient),
				)
				.with_footer(footer);
				return Ok((out, frame));
			}
		},
	};
	let inline = inline.unwrap_or_default();
	if NEWLINE_EATING_TAGS.contains(&lowercase.as_str()) && inline.starts_with('\n') {
		out.push('\n');
	}
	out.push_str(&inline);
	let frame = Frame::new(
		kind,
		Vec::new(),
		env.parent_namespace.child_namespace(tag),
		Rc::clone(env.ambient),
	)
	.with_footer(footer);
	Ok((out, frame))
}

/// Returns the escaped content when the only child is a string or number.
fn single_scalar(children: &[Node]) -> Option<String> {
	match children {
		[Node::Text(text)] => {
			let mut out = String::with_capacity(text.len());
			escape_into(&mut out, text);
			Some(out)
		}
		[Node::Number(n)] => Some(number_to_string(*n)),
		_ => None,
	}
}

/// `type` first, then the remaining props, with `value`/`checked` taken from
/// their controlled form when present and from the default form otherwise.
fn input_props(props: Props) -> Props {
	let value = props
		.get_non_null("value")
		.or_else(|| props.get_non_null("defaultValue"))
		.cloned()
		.unwrap_or_default();
	let checked = props
		.get_non_null("checked")
		.or_else(|| props.get_non_null("defaultChecked"))
		.cloned()
		.unwrap_or_default();

	let mut resolved = Props::new().with("type", PropValue::Null);
	resolved.merge(&props);
	resolved.insert("defaultChecked", PropValue::Null);
	resolved.insert("defaultValue", PropValue::Null);
	resolved.insert("value", value);
	resolved.insert("checked", checked);
	resolved
}

/// The value comes from `value`, then `defaultValue`, then the single child,
/// and is rendered as escaped content.
fn textarea(mut props: Props, children: Vec<Node>) -> RenderResult<(Props, Content)> {
	let initial = match props.get_non_null("value") {
		Some(value) => value.to_js_string().into_owned(),
		None => {
			let mut default_value = props
				.get_non_null("defaultValue")
				.map(|value| value.to_js_string().into_owned());
			if let Some(child) = textarea_child(&children)? {
				if default_value.is_some() {
					return Err(RenderError::TextareaChildrenWithDefaultValue);
				}
				default_value = Some(child);
			}
			default_value.unwrap_or_default()
		}
	};
	props.insert("value", PropValue::Null);
	Ok((props, Content::Inline(escape_text(&initial).into_owned())))
}

fn textarea_child(children: &[Node]) -> RenderResult<Option<String>> {
	let child = match children {
		[] | [Node::Empty] => return Ok(None),
		[single] => single,
		_ => return Err(RenderError::TextareaMultipleChildren),
	};
	match child {
		Node::List(items) => match items.as_slice() {
			[] => Ok(Some(String::new())),
			[only] => Ok(Some(node_to_string(only))),
			_ => Err(RenderError::TextareaMultipleChildren),
		},
		other => Ok(Some(node_to_string(other))),
	}
}

/// String conversion of a child used as a value.
fn node_to_string(node: &Node) -> String {
	match node {
		Node::Empty => String::new(),
		Node::Text(text) => text.to_string(),
		Node::Number(n) => number_to_string(*n),
		Node::List(items) => items
			.iter()
			.map(node_to_string)
			.collect::<Vec<_>>()
			.join(","),
		Node::Element(_) | Node::Portal(_) => "[object Object]".to_string(),
	}
}

/// Captures the select value and strips `value`, which has no attribute form.
fn select_props(mut props: Props) -> (Props, Option<PropValue>) {
	let value = props
		.get_non_null("value")
		.or_else(|| props.get_non_null("defaultValue"))
		.cloned();
	props.insert("value", PropValue::Null);
	(props, value)
}

/// Marks the option selected when its value matches the enclosing select.
fn option(props: Props, children: Vec<Node>, select_value: &PropValue) -> (Props, Content) {
	let text = flatten_option_children(children);
	let value = props
		.get_non_null("value")
		.map(|value| value.to_js_string().into_owned())
		.unwrap_or_else(|| text.clone());
	let selected = match select_value {
		PropValue::List(items) => items.iter().any(|item| item.to_js_string() == value),
		single => single.to_js_string() == value,
	};

	let mut resolved = Props::new().with("selected", PropValue::Null);
	resolved.merge(&props);
	resolved.insert("selected", selected);
	(resolved, Content::Inline(escape_text(&text).into_owned()))
}

fn flatten_option_children(children: Vec<Node>) -> String {
	let mut content = String::new();
	for child in to_array(children) {
		match &child {
			Node::Text(text) => content.push_str(text),
			Node::Number(n) => content.push_str(&number_to_string(*n)),
			other => {
				warn_log!("only strings and numbers are supported as <option> children");
				content.push_str(&node_to_string(other));
			}
		}
	}
	content
}

fn assert_valid_props(
	tag: &str,
	lowercase: &str,
	content: &Content,
	has_inner_html: bool,
) -> RenderResult<()> {
	let has_children = match content {
		Content::Children(children) => children.iter().any(|child| !matches!(child, Node::Empty)),
		// Synthesized content still counts as children.
		Content::Inline(_) => true,
	};
	if is_void_element(lowercase) && (has_children || has_inner_html) {
		return Err(RenderError::VoidElementWithChildren(tag.to_string()));
	}
	if has_inner_html && has_children {
		return Err(RenderError::ChildrenAndInnerHtml(tag.to_string()));
	}
	Ok(())
}

/// Builds `<tag attr="..."` without the closing `>`.
fn open_tag(
	tag: &str,
	lowercase: &str,
	props: &Props,
	options: &StreamOptions,
) -> RenderResult<String> {
	let custom = is_custom_component(lowercase, props);
	let mut out = String::with_capacity(tag.len() + 1 + props.len() * 16);
	out.push('<');
	out.push_str(tag);
	for (name, value) in props.iter() {
		if value.is_null() {
			continue;
		}
		let value: Cow<'_, PropValue> = if name == "style" {
			match value {
				PropValue::Style(style) => Cow::Owned(serialize_style(style).into()),
				_ => return Err(RenderError::InvalidStyleProp(tag.to_string())),
			}
		} else {
			Cow::Borrowed(value)
		};
		let markup = if custom {
			if RESERVED_PROPS.contains(&name) {
				None
			} else {
				custom_attribute_markup(name, &value)
			}
		} else {
			attribute_markup(name, &value, options.block_javascript_urls)?
		};
		if let Some(markup) = markup {
			out.push(' ');
			out.push_str(&markup);
		}
	}
	debug_log!("opened <{}> with {} props", tag, props.len());
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::IntoNode;
	use rstest::rstest;

	fn render(element: Element, select_value: Option<&PropValue>) -> RenderResult<(String, Frame)> {
		let ambient = Rc::new(Props::new());
		let options = StreamOptions::default();
		let tag = match element.kind() {
			crate::node::ElementKind::Host(tag) => tag.to_string(),
			_ => unreachable!("test elements are host elements"),
		};
		render_host(
			element,
			&tag,
			&HostEnv {
				parent_namespace: Namespace::Html,
				ambient: &ambient,
				select_value,
				options: &options,
			},
		)
	}

	fn open(element: Element) -> String {
		render(element, None).unwrap().0
	}

	#[rstest]
	fn test_basic_element_pushes_children() {
		let (out, frame) = render(
			Element::host("div").attr("id", "a").child(Element::host("span")),
			None,
		)
		.unwrap();
		assert_eq!(out, "<div id=\"a\">");
		assert_eq!(frame.footer, "</div>");
		assert_eq!(frame.len(), 1);
	}

	#[rstest]
	fn test_single_text_child_is_inline() {
		let (out, frame) = render(Element::host("p").child("a < b"), None).unwrap();
		assert_eq!(out, "<p>a &lt; b");
		assert_eq!(frame.len(), 0);
	}

	#[rstest]
	fn test_void_element() {
		let (out, frame) = render(Element::host("br"), None).unwrap();
		assert_eq!(out, "<br/>");
		assert_eq!(frame.footer, "");
	}

	#[rstest]
	fn test_menuitem_is_void_but_closed() {
		let (out, frame) = render(Element::host("menuitem"), None).unwrap();
		assert_eq!(out, "<menuitem>");
		assert_eq!(frame.footer, "</menuitem>");
		assert_eq!(
			render(Element::host("menuitem").child("x"), None).err(),
			Some(RenderError::VoidElementWithChildren("menuitem".into()))
		);
	}

	#[rstest]
	fn test_void_element_rejects_children() {
		assert_eq!(
			render(Element::host("img").child("x"), None).err(),
			Some(RenderError::VoidElementWithChildren("img".into()))
		);
		assert_eq!(
			render(Element::host("img").inner_html("<b>"), None).err(),
			Some(RenderError::VoidElementWithChildren("img".into()))
		);
	}

	#[rstest]
	fn test_children_and_inner_html_conflict() {
		assert_eq!(
			render(Element::host("div").child("x").inner_html("<b></b>"), None).err(),
			Some(RenderError::ChildrenAndInnerHtml("div".into()))
		);
	}

	#[rstest]
	fn test_inner_html_is_raw() {
		assert_eq!(open(Element::host("div").inner_html("<b>x</b>")), "<div><b>x</b>");
	}

	#[rstest]
	#[case("pre", "\nline", "<pre>\n\nline")]
	#[case("pre", "line", "<pre>line")]
	#[case("div", "\nline", "<div>\nline")]
	fn test_newline_eating_tags(#[case] tag: &'static str, #[case] text: &'static str, #[case] expected: &str) {
		assert_eq!(open(Element::host(tag).child(text)), expected);
	}

	#[rstest]
	#[case("my element")]
	#[case("1div")]
	#[case("div>")]
	fn test_invalid_tags(#[case] tag: &'static str) {
		assert_eq!(
			render(Element::host(tag), None).err(),
			Some(RenderError::InvalidTag(tag.into()))
		);
	}

	#[rstest]
	fn test_input_controlled_wins() {
		let input = Element::host("input")
			.attr("defaultChecked", false)
			.attr("checked", true)
			.attr("defaultValue", "d")
			.attr("value", "v")
			.attr("type", "checkbox");
		assert_eq!(open(input), "<input type=\"checkbox\" checked=\"\" value=\"v\"/>");
	}

	#[rstest]
	fn test_input_falls_back_to_defaults() {
		let input = Element::host("input")
			.attr("name", "n")
			.attr("defaultValue", "d")
			.attr("defaultChecked", true);
		assert_eq!(open(input), "<input name=\"n\" value=\"d\" checked=\"\"/>");
	}

	#[rstest]
	#[case(Element::host("textarea").attr("value", "v").attr("defaultValue", "d"), "<textarea>v")]
	#[case(Element::host("textarea").attr("defaultValue", "a&b"), "<textarea>a&amp;b")]
	#[case(Element::host("textarea").child("c"), "<textarea>c")]
	#[case(Element::host("textarea").child(3), "<textarea>3")]
	#[case(Element::host("textarea").child("\nx"), "<textarea>\n\nx")]
	#[case(Element::host("textarea").attr("rows", 2), "<textarea rows=\"2\">")]
	fn test_textarea_value(#[case] element: Element, #[case] expected: &str) {
		let (out, frame) = render(element, None).unwrap();
		assert_eq!(out, expected);
		assert_eq!(frame.footer, "</textarea>");
		assert_eq!(frame.len(), 0);
	}

	#[rstest]
	fn test_textarea_errors() {
		assert_eq!(
			render(Element::host("textarea").child("a").child("b"), None).err(),
			Some(RenderError::TextareaMultipleChildren)
		);
		assert_eq!(
			render(Element::host("textarea").child(vec!["a", "b"]), None).err(),
			Some(RenderError::TextareaMultipleChildren)
		);
		assert_eq!(
			render(Element::host("textarea").attr("defaultValue", "d").child("c"), None).err(),
			Some(RenderError::TextareaChildrenWithDefaultValue)
		);
	}

	#[rstest]
	fn test_select_captures_value() {
		let (out, frame) = render(
			Element::host("select").attr("value", "b").attr("name", "s"),
			None,
		)
		.unwrap();
		assert_eq!(out, "<select name=\"s\">");
		assert!(matches!(
			frame.kind,
			FrameKind::Select { saved: Some(PropValue::Str(ref v)) } if v == "b"
		));
	}

	#[rstest]
	#[case(PropValue::from("b"), "b", "<option selected=\"\" value=\"b\">B")]
	#[case(PropValue::from("a"), "b", "<option value=\"b\">B")]
	#[case(PropValue::from(vec!["a", "b"]), "b", "<option selected=\"\" value=\"b\">B")]
	#[case(PropValue::from(2), "2", "<option selected=\"\" value=\"2\">B")]
	fn test_option_selection(
		#[case] select_value: PropValue,
		#[case] value: &'static str,
		#[case] expected: &str,
	) {
		let option = Element::host("option").attr("value", value).child("B");
		assert_eq!(render(option, Some(&select_value)).unwrap().0, expected);
	}

	#[rstest]
	fn test_option_value_from_text() {
		let option = Element::host("option").child("x").child(1);
		let select_value = PropValue::from("x1");
		assert_eq!(
			render(option, Some(&select_value)).unwrap().0,
			"<option selected=\"\">x1"
		);
	}

	#[rstest]
	fn test_option_outside_select_keeps_children() {
		let (out, frame) = render(Element::host("option").child("a").child("b"), None).unwrap();
		assert_eq!(out, "<option>");
		assert_eq!(frame.len(), 2);
	}

	#[rstest]
	fn test_style_serialization() {
		let style = Props::new().with("color", "red").with("fontSize", 12);
		assert_eq!(
			open(Element::host("div").attr("style", style)),
			"<div style=\"color:red;font-size:12px\">"
		);
		assert_eq!(
			open(Element::host("div").attr("style", Props::new())),
			"<div>"
		);
		assert_eq!(
			render(Element::host("div").attr("style", "color:red"), None).err(),
			Some(RenderError::InvalidStyleProp("div".into()))
		);
	}

	#[rstest]
	fn test_custom_element_attributes() {
		let el = Element::host("my-widget")
			.attr("className", "w")
			.attr("flag", true)
			.attr("onClick", "x");
		assert_eq!(
			open(el),
			"<my-widget className=\"w\" flag=\"true\" onClick=\"x\">"
		);
	}

	#[rstest]
	fn test_svg_children_namespace() {
		let (_, frame) = render(Element::host("svg").child(Element::host("g")), None).unwrap();
		assert_eq!(frame.namespace, Namespace::Svg);
	}

	#[rstest]
	fn test_tag_emitted_verbatim() {
		assert_eq!(
			render(Element::host("foreignObject").child(Element::host("div")), None)
				.unwrap()
				.1
				.footer,
			"</foreignObject>"
		);
		assert_eq!(open(Element::host("DIV").child(().into_node())), "<DIV>");
	}
}
