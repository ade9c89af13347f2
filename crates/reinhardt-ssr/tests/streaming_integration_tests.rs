//! Streaming Renderer Integration Tests
//!
//! Drives whole trees through `RenderSession` and the one-shot entry points.
//!
//! Test Categories:
//! 1. Basic Rendering - host elements, text adjacency, fragments
//! 2. Chunked Reads - budgets, chunk counts, reassembly
//! 3. Contexts - provider isolation across interleaved sessions
//! 4. Suspense - boundaries, fallbacks, failures
//! 5. Components - hooks, identifiers, ambient context, lazy and memo types
//! 6. Form Controls - input, textarea, select/option

use std::rc::Rc;

use reinhardt_ssr::node::{Component, Element, ElementKind, ForwardRef, IntoNode, Lazy, Node};
use reinhardt_ssr::{
	Context, Interrupt, Props, RenderError, RenderSession, Runtime, SessionState, StreamOptions,
	render_to_static_markup, render_to_string,
};
use rstest::{fixture, rstest};

// ============================================================================
// Helpers
// ============================================================================

#[fixture]
fn runtime() -> Runtime {
	Runtime::new()
}

fn html(runtime: &Runtime, root: impl IntoNode) -> String {
	render_to_string(runtime, root).unwrap()
}

fn read_all(session: &mut RenderSession, budget: usize) -> Vec<Vec<u8>> {
	let mut chunks = Vec::new();
	while let Some(chunk) = session.read(budget).unwrap() {
		chunks.push(chunk.to_vec());
	}
	chunks
}

fn suspending(name: &'static str) -> Component {
	Component::new(name, |_, _, _| Err(Interrupt::Suspended))
}

fn article() -> Node {
	Element::host("article")
		.attr("className", "post")
		.child(Element::host("h1").child("Title & <more>"))
		.child(
			Element::host("ul").children(
				["one", "two", "three"]
					.into_iter()
					.map(|item| Element::host("li").child(item)),
			),
		)
		.child(Element::host("p").children(["a", "b", "c"]))
		.into_node()
}

// ============================================================================
// Category 1: Basic Rendering
// ============================================================================

#[rstest]
fn test_adjacent_text_gets_separator(runtime: Runtime) {
	let root = Element::host("div")
		.attr("id", "a")
		.attr("hidden", true)
		.children(["x", "y"]);
	assert_eq!(html(&runtime, root), r#"<div id="a" hidden="">x<!-- -->y</div>"#);
}

#[rstest]
fn test_static_markup_has_no_separator(runtime: Runtime) {
	let root = Element::host("div").children(["x", "y"]);
	assert_eq!(render_to_static_markup(&runtime, root).unwrap(), "<div>xy</div>");
}

#[rstest]
fn test_fragment_skips_empty_children(runtime: Runtime) {
	let root = Node::fragment([
		Element::host("span").into_node(),
		Node::empty(),
		Element::host("span").into_node(),
	]);
	assert_eq!(html(&runtime, root), "<span></span><span></span>");
}

#[rstest]
fn test_text_separated_across_elements_only_when_adjacent(runtime: Runtime) {
	let root = Node::fragment([
		Node::text("a"),
		Element::host("br").into_node(),
		Node::text("b"),
		Node::number(1),
	]);
	assert_eq!(html(&runtime, root), "a<br/>b<!-- -->1");
}

#[rstest]
fn test_text_is_escaped(runtime: Runtime) {
	assert_eq!(
		html(&runtime, Element::host("p").child("<script>\"x\" & 'y'</script>")),
		"<p>&lt;script&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/script&gt;</p>"
	);
}

#[rstest]
fn test_nested_document(runtime: Runtime) {
	assert_eq!(
		html(&runtime, article()),
		concat!(
			r#"<article class="post"><h1>Title &amp; &lt;more&gt;</h1>"#,
			"<ul><li>one</li><li>two</li><li>three</li></ul>",
			"<p>a<!-- -->b<!-- -->c</p></article>"
		)
	);
}

#[rstest]
#[case(Node::portal(Element::host("div")), RenderError::PortalNotSupported)]
#[case(
	Element::new(ElementKind::Unsupported("scope".into())).into_node(),
	RenderError::UnknownElementType("scope".into())
)]
#[case(
	Element::host("img").child("x").into_node(),
	RenderError::VoidElementWithChildren("img".into())
)]
fn test_fatal_errors(runtime: Runtime, #[case] root: Node, #[case] expected: RenderError) {
	assert_eq!(render_to_string(&runtime, root), Err(expected));
	assert_eq!(runtime.active_sessions(), 0);
}

// ============================================================================
// Category 2: Chunked Reads
// ============================================================================

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
#[case(64)]
#[case(4096)]
fn test_chunk_count_and_reassembly(runtime: Runtime, #[case] budget: usize) {
	let full = html(&runtime, article());
	let mut session = RenderSession::new(&runtime, article(), StreamOptions::default()).unwrap();
	let chunks = read_all(&mut session, budget);

	assert_eq!(chunks.len(), full.len().div_ceil(budget));
	for chunk in &chunks[..chunks.len() - 1] {
		assert_eq!(chunk.len(), budget);
	}
	assert_eq!(chunks.concat(), full.as_bytes());
	assert_eq!(session.read(budget).unwrap(), None);
}

#[rstest]
fn test_chunk_iterator(runtime: Runtime) {
	let mut session = RenderSession::new(&runtime, article(), StreamOptions::default()).unwrap();
	let chunks: Vec<_> = session.chunks(10).collect::<Result<_, _>>().unwrap();
	assert!(chunks.iter().all(|chunk| chunk.len() <= 10));
	assert_eq!(chunks.concat(), html(&runtime, article()).as_bytes());
	assert_eq!(session.state(), SessionState::Exhausted);
}

#[rstest]
fn test_budget_can_change_between_reads(runtime: Runtime) {
	let mut session = RenderSession::new(&runtime, article(), StreamOptions::default()).unwrap();
	let mut out = Vec::new();
	for budget in [1, 50, 2, 9].into_iter().cycle() {
		match session.read(budget).unwrap() {
			Some(chunk) => {
				assert!(chunk.len() <= budget);
				out.extend_from_slice(&chunk);
			}
			None => break,
		}
	}
	assert_eq!(out, html(&runtime, article()).as_bytes());
}

#[rstest]
fn test_session_ids_are_recycled(runtime: Runtime) {
	let first = RenderSession::new(&runtime, "a", StreamOptions::default()).unwrap();
	let id = first.id();
	drop(first);
	let second = RenderSession::new(&runtime, "b", StreamOptions::default()).unwrap();
	assert_eq!(second.id(), id);
}

// ============================================================================
// Category 3: Contexts
// ============================================================================

fn themed(theme: &Context<&'static str>, value: &'static str) -> Node {
	Element::host("div")
		.child(Node::provider(
			theme,
			value,
			[Element::host("span").child(Node::consumer(theme, |t: &&'static str| *t))],
		))
		.child(Node::consumer(theme, |t: &&'static str| *t))
		.into_node()
}

#[rstest]
fn test_interleaved_sessions_see_their_own_values(runtime: Runtime) {
	let theme = runtime.create_context("light");
	let mut dark =
		RenderSession::new(&runtime, themed(&theme, "dark"), StreamOptions::default()).unwrap();
	let mut blue =
		RenderSession::new(&runtime, themed(&theme, "blue"), StreamOptions::default()).unwrap();

	let (mut dark_out, mut blue_out) = (Vec::new(), Vec::new());
	let (mut dark_done, mut blue_done) = (false, false);
	while !(dark_done && blue_done) {
		match dark.read(1).unwrap() {
			Some(chunk) => dark_out.extend_from_slice(&chunk),
			None => dark_done = true,
		}
		match blue.read(1).unwrap() {
			Some(chunk) => blue_out.extend_from_slice(&chunk),
			None => blue_done = true,
		}
	}

	assert_eq!(dark_out, b"<div><span>dark</span>light</div>");
	assert_eq!(blue_out, b"<div><span>blue</span>light</div>");
	assert_eq!(runtime.active_sessions(), 0);
}

#[rstest]
fn test_destroy_restores_provided_values(runtime: Runtime) {
	let theme = runtime.create_context("light");
	let mut session =
		RenderSession::new(&runtime, themed(&theme, "dark"), StreamOptions::default()).unwrap();
	// Stop inside the provider.
	let first = session.read(11).unwrap().unwrap();
	assert_eq!(&first[..], b"<div><span>");
	session.destroy();

	// The next session reuses the same id and must see the default.
	let reader = Node::consumer(&theme, |t: &&'static str| *t);
	assert_eq!(html(&runtime, reader), "light");
}

#[rstest]
fn test_nested_providers_restore_outer_value(runtime: Runtime) {
	let level = runtime.create_context(0_i32);
	let show = |level: &Context<i32>| Node::consumer(level, |n: &i32| *n);
	let root = Node::provider(
		&level,
		1,
		[
			show(&level),
			Element::host("b")
				.child(Node::provider(&level, 2, [show(&level)]))
				.into_node(),
			show(&level),
		],
	);
	assert_eq!(html(&runtime, root), "1<b>2</b>1");
}

#[rstest]
fn test_context_from_component(runtime: Runtime) {
	let user = runtime.create_named_context("User", String::from("anonymous"));
	let greeting = Component::new("Greeting", {
		let user = user.clone();
		move |cx, _, _| {
			let name = cx.use_context(&user)?;
			Ok(Node::text(format!("Hello, {name}")))
		}
	});
	let root = Node::fragment([
		Node::provider(&user, String::from("Ada"), [greeting.element()]),
		Element::host("hr").into_node(),
		greeting.element().into_node(),
	]);
	assert_eq!(html(&runtime, root), "Hello, Ada<hr/>Hello, anonymous");
}

#[rstest]
fn test_provider_for_foreign_context_is_fatal(runtime: Runtime) {
	let theme = runtime.create_context("light");
	let other = Runtime::new();
	let _unused = other.create_context(0_i32);
	let foreign = other.create_context(0_i32);

	let root = Node::provider(
		&theme,
		"dark",
		[
			Node::provider(&foreign, 5, ["x"]),
			Element::host("b")
				.child(Node::consumer(&theme, |t: &&'static str| *t))
				.into_node(),
		],
	);
	let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
	assert_eq!(
		session.read(64),
		Err(RenderError::UnknownContext(foreign.id().index()))
	);
	assert_eq!(session.state(), SessionState::Failed);
	assert_eq!(runtime.active_sessions(), 0);

	// The theme slot was restored when the failed session released it.
	let reader = Node::consumer(&theme, |t: &&'static str| *t);
	assert_eq!(html(&runtime, reader), "light");
}

#[rstest]
fn test_consumer_for_foreign_context_is_fatal(runtime: Runtime) {
	let other = Runtime::new();
	let foreign = other.create_context(String::from("elsewhere"));
	let root = Element::host("p").child(Node::consumer(&foreign, |s: &String| s.clone()));
	assert_eq!(
		render_to_string(&runtime, root),
		Err(RenderError::UnknownContext(0))
	);
}

// ============================================================================
// Category 4: Suspense
// ============================================================================

#[rstest]
fn test_suspended_boundary_renders_only_fallback(runtime: Runtime) {
	let root = Element::host("section").child(Node::suspense(
		Some(Element::host("i").child("F").into_node()),
		[
			Node::text("partial"),
			Element::host("p").child("more partial").into_node(),
			suspending("Data").element().into_node(),
			Node::text("never"),
		],
	));
	let out = html(&runtime, root);
	assert_eq!(out, "<section><!--$!--><i>F</i><!--/$--></section>");
	assert!(!out.contains("partial"));
}

#[rstest]
fn test_suspended_boundary_with_small_budget(runtime: Runtime) {
	let root = Node::suspense(
		Some(Node::text("F")),
		[Element::host("div").child(suspending("Deep").element())],
	);
	let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
	assert_eq!(read_all(&mut session, 1).concat(), b"<!--$!-->F<!--/$-->");
}

#[rstest]
fn test_resolved_boundary_keeps_content(runtime: Runtime) {
	let root = Node::suspense(Some(Node::text("F")), [Element::host("b").child("C")]);
	assert_eq!(html(&runtime, root), "<!--$--><b>C</b><!--/$-->");
}

#[rstest]
fn test_inner_boundary_catches_first(runtime: Runtime) {
	let inner = Node::suspense(Some(Node::text("inner")), [suspending("A").element()]);
	let root = Node::suspense(
		Some(Node::text("outer")),
		[Node::text("ok"), Element::host("div").child(inner).into_node()],
	);
	assert_eq!(
		html(&runtime, root),
		"<!--$-->ok<div><!--$!-->inner<!--/$--></div><!--/$-->"
	);
}

#[rstest]
fn test_boundary_without_fallback_is_transparent_until_suspension(runtime: Runtime) {
	let fine = Node::suspense(None, [Element::host("b")]);
	assert_eq!(html(&runtime, fine), "<b></b>");

	let broken = Node::suspense(None, [suspending("A").element()]);
	assert_eq!(
		render_to_string(&runtime, broken),
		Err(RenderError::BoundaryWithoutFallback)
	);
}

#[rstest]
fn test_suspension_outside_boundary_fails_session(runtime: Runtime) {
	let mut session = RenderSession::new(
		&runtime,
		Element::host("div").child(suspending("A").element()),
		StreamOptions::default(),
	)
	.unwrap();
	assert_eq!(session.read(1).unwrap().as_deref(), Some(&b"<"[..]));
	assert_eq!(session.read(100), Err(RenderError::SuspendedWithoutBoundary));
	assert_eq!(session.state(), SessionState::Failed);
	assert_eq!(session.read(100), Err(RenderError::SessionFailed));
}

// ============================================================================
// Category 5: Components
// ============================================================================

#[rstest]
fn test_component_props_and_children(runtime: Runtime) {
	let card = Component::new("Card", |_, props, children| {
		let title = props
			.get("title")
			.map(|t| t.to_js_string().into_owned())
			.unwrap_or_default();
		Ok(Element::host("div")
			.attr("className", "card")
			.child(Element::host("h2").child(title))
			.children(children.to_vec())
			.into_node())
	});
	let root = card.element().attr("title", "Hi").child(Element::host("p").child("body"));
	assert_eq!(
		html(&runtime, root),
		r#"<div class="card"><h2>Hi</h2><p>body</p></div>"#
	);
}

#[rstest]
fn test_use_id_is_prefixed_and_unique(runtime: Runtime) {
	let field = Component::new("Field", |cx, _, _| {
		let id = cx.use_id();
		Ok(Element::host("label").attr("htmlFor", id).into_node())
	});
	let root = Node::fragment((0..3).map(|_| field.element()));
	let out = render_to_string_with_prefix(&runtime, root, "form-");
	assert_eq!(
		out,
		r#"<label for="form-R:0"></label><label for="form-R:1"></label><label for="form-R:2"></label>"#
	);
}

fn render_to_string_with_prefix(runtime: &Runtime, root: Node, prefix: &str) -> String {
	reinhardt_ssr::render_with_options(
		runtime,
		root,
		StreamOptions::new().identifier_prefix(prefix),
	)
	.unwrap()
}

#[rstest]
fn test_state_updates_during_render_rerun(runtime: Runtime) {
	let counter = Component::new("Counter", |cx, _, _| {
		let (count, set_count) = cx.use_state(|| 0);
		if *count < 2 {
			set_count.set(*count + 1);
		}
		Ok(Node::number(*count))
	});
	assert_eq!(html(&runtime, counter.element()), "2");
}

#[rstest]
fn test_unconditional_update_hits_limit(runtime: Runtime) {
	let runaway = Component::new("Runaway", |cx, _, _| {
		let (count, set_count) = cx.use_state(|| 0);
		set_count.set(*count + 1);
		Ok(Node::empty())
	});
	assert_eq!(
		render_to_string(&runtime, runaway.element()),
		Err(RenderError::TooManyReRenders("Runaway".into()))
	);
}

#[rstest]
fn test_ambient_context_flows_to_descendants(runtime: Runtime) {
	let reader = Component::new("Reader", |cx, _, _| {
		let locale = cx
			.ambient()
			.get("locale")
			.map(|v| v.to_js_string().into_owned())
			.unwrap_or_else(|| "none".into());
		Ok(Node::text(locale))
	});
	let provider = Component::new("LocaleProvider", |_, _, children| {
		Ok(Element::host("div").children(children.to_vec()).into_node())
	})
	.with_child_context(|props| {
		Props::new().with(
			"locale",
			props.get("locale").cloned().unwrap_or_default(),
		)
	});
	let root = Node::fragment([
		provider.element().attr("locale", "fr").child(reader.element()).into_node(),
		reader.element().into_node(),
	]);
	assert_eq!(html(&runtime, root), "<div>fr</div>none");
}

#[rstest]
fn test_forward_ref_receives_ref(runtime: Runtime) {
	let input = ForwardRef::new("FancyInput", |_, _, _, node_ref| {
		let has_ref = node_ref.is_some();
		Ok(Element::host("input").attr("data-ref", has_ref).into_node())
	});
	let root = input.element().with_ref(Rc::new(()));
	assert_eq!(html(&runtime, root), r#"<input data-ref="true"/>"#);
}

#[rstest]
fn test_memo_and_lazy_wrap_transparently(runtime: Runtime) {
	let lazy = Lazy::new(|| Ok(ElementKind::Host("em".into())));
	let memo = Element::memo(ElementKind::Host("strong".into())).child("m");
	let root = Node::fragment([lazy.element().child("l").into_node(), memo.into_node()]);
	assert_eq!(html(&runtime, root), "<em>l</em><strong>m</strong>");
	assert!(lazy.is_resolved());
}

#[rstest]
fn test_pending_lazy_suspends_to_boundary(runtime: Runtime) {
	let lazy = Lazy::new(|| Err(Interrupt::Suspended));
	let root = Node::suspense(Some(Node::text("loading")), [lazy.element()]);
	assert_eq!(html(&runtime, root), "<!--$!-->loading<!--/$-->");
	assert!(!lazy.is_resolved());
}

#[rstest]
fn test_failed_lazy_is_fatal(runtime: Runtime) {
	let lazy = Lazy::new(|| Err(RenderError::component("Chart", "bundle missing").into()));
	let result = render_to_string(&runtime, lazy.element());
	assert!(matches!(result, Err(RenderError::LazyInitFailed(_))));
}

#[rstest]
fn test_component_error_is_reported(runtime: Runtime) {
	let broken = Component::new("Broken", |_, _, _| {
		Err(RenderError::component("Broken", "no data").into())
	});
	assert_eq!(
		render_to_string(&runtime, Node::suspense(Some(Node::text("F")), [broken.element()])),
		Err(RenderError::component("Broken", "no data"))
	);
}

// ============================================================================
// Category 6: Form Controls
// ============================================================================

#[rstest]
#[case(true, false, r#"<input type="checkbox" checked=""/>"#)]
#[case(false, true, r#"<input type="checkbox"/>"#)]
fn test_checked_wins_over_default_checked(
	runtime: Runtime,
	#[case] checked: bool,
	#[case] default_checked: bool,
	#[case] expected: &str,
) {
	let root = Element::host("input")
		.attr("defaultChecked", default_checked)
		.attr("checked", checked)
		.attr("type", "checkbox");
	assert_eq!(html(&runtime, root), expected);
}

#[rstest]
fn test_input_default_value(runtime: Runtime) {
	let root = Element::host("input").attr("name", "q").attr("defaultValue", "x\"y");
	assert_eq!(html(&runtime, root), r#"<input name="q" value="x&quot;y"/>"#);
}

#[rstest]
fn test_textarea_value_is_content(runtime: Runtime) {
	let root = Element::host("textarea").attr("value", "\n<b>");
	assert_eq!(html(&runtime, root), "<textarea>\n\n&lt;b&gt;</textarea>");
}

#[rstest]
fn test_select_marks_matching_options(runtime: Runtime) {
	let root = Element::host("select")
		.attr("value", vec!["b", "c"])
		.attr("multiple", true)
		.children(["a", "b", "c"].into_iter().map(|v| {
			Element::host("option").attr("value", v).child(v.to_uppercase())
		}));
	assert_eq!(
		html(&runtime, root),
		concat!(
			r#"<select multiple="">"#,
			r#"<option value="a">A</option>"#,
			r#"<option selected="" value="b">B</option>"#,
			r#"<option selected="" value="c">C</option>"#,
			"</select>"
		)
	);
}

#[rstest]
fn test_option_value_falls_back_to_text(runtime: Runtime) {
	let root = Element::host("select").attr("defaultValue", "Two").children([
		Element::host("option").child("One"),
		Element::host("option").children(["T", "wo"]),
	]);
	assert_eq!(
		html(&runtime, root),
		r#"<select><option>One</option><option selected="">Two</option></select>"#
	);
}
