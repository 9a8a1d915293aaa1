use std::borrow::Cow;
use std::cmp;

use crate::error::Result;
use crate::strings::comment_body;
use crate::tag::Tag;

use super::{Emit, State};

const INDENT: &'static str = "  ";

/// Narrowest line width used for wrapping, no matter how deep the nesting.
pub const MIN_WRAP_WIDTH: usize = 20;

/// Default wrap threshold and nominal line width.
pub const DEFAULT_WRAP_WIDTH: usize = 70;

fn indentation(depth: usize) -> String {
	INDENT.repeat(depth)
}

/**
Word-wrap text.

Each output line starts with a newline followed by `indent` and is at most
`width` characters long, counting the indent. Lines are only broken at
whitespace; a word longer than the available width gets a line of its own.
Runs of whitespace collapse into a single space. Text without any words
yields an empty string.

```
use elementflow::wrap;
assert_eq!(wrap("aaa bbb ccc", "  ", 9), "\n  aaa bbb\n  ccc");
```
*/
pub fn wrap(text: &str, indent: &str, width: usize) -> String {
	let avail = cmp::max(width.saturating_sub(indent.chars().count()), 1);
	let mut out = String::with_capacity(text.len() + (text.len() / avail + 1) * (indent.len() + 1));
	let mut line_len = 0;
	let mut line_empty = true;
	for word in text.split_whitespace() {
		let word_len = word.chars().count();
		if !line_empty && line_len + 1 + word_len > avail {
			line_len = 0;
			line_empty = true;
		}
		if line_empty {
			out.push('\n');
			out.push_str(indent);
		} else {
			out.push(' ');
			line_len += 1;
		}
		out.push_str(word);
		line_len += word_len;
		line_empty = false;
	}
	out
}

/**
Pretty-printing layer.

Puts every start tag, leaf element and comment on its own line, indented by
two spaces per nesting level, and puts end tags of containers on their own
line at the container's level. Text and comment bodies longer than the wrap
width are word-wrapped one level deeper than their element, unless wrapping
is disabled.

Whitespace is only inserted while the layer below accepts content, so
calls which fail because of the writer state do not leave stray whitespace
behind.
*/
pub struct Indenter<E> {
	inner: E,
	text_wrap: bool,
	wrap_width: usize,
}

impl<E: Emit> Indenter<E> {
	/// Create an indenter which wraps at the default width.
	pub fn new(inner: E) -> Self {
		Self::with_wrapping(inner, true, DEFAULT_WRAP_WIDTH)
	}

	/// Create an indenter with explicit wrapping settings.
	pub fn with_wrapping(inner: E, text_wrap: bool, wrap_width: usize) -> Self {
		Self {
			inner,
			text_wrap,
			wrap_width,
		}
	}

	pub fn get_ref(&self) -> &E {
		&self.inner
	}

	pub fn get_mut(&mut self) -> &mut E {
		&mut self.inner
	}

	pub fn into_inner(self) -> E {
		self.inner
	}

	fn is_open(&self) -> bool {
		self.inner.state() == State::Open
	}

	fn newline(&mut self, depth: usize) -> Result<()> {
		let mut ws = String::with_capacity(1 + INDENT.len() * depth);
		ws.push('\n');
		ws.push_str(&indentation(depth));
		self.inner.raw(&ws)
	}

	fn fill(&self, value: &str, depth: usize) -> String {
		let indent = indentation(depth);
		let width = cmp::max(MIN_WRAP_WIDTH, self.wrap_width.saturating_sub(indent.len()));
		wrap(value, &indent, width)
	}

	fn format_value<'v>(&self, value: &'v str, depth: usize) -> Cow<'v, str> {
		if !self.text_wrap || value.chars().count() <= self.wrap_width {
			return Cow::Borrowed(value);
		}
		let mut filled = self.fill(value, depth + 1);
		filled.push('\n');
		filled.push_str(&indentation(depth));
		Cow::Owned(filled)
	}
}

impl<E: Emit> Emit for Indenter<E> {
	fn declaration(&mut self) -> Result<()> {
		self.inner.declaration()
	}

	fn open_tag(&mut self, tag: &Tag<'_>) -> Result<()> {
		match self.inner.state() {
			State::Unopened | State::Open => {
				self.inner.check_tag(tag)?;
				self.newline(self.inner.depth())?
			}
			_ => (),
		}
		self.inner.open_tag(tag)
	}

	fn close_tag(&mut self) -> Result<()> {
		if !self.is_open() {
			return self.inner.close_tag();
		}
		self.newline(self.inner.depth() - 1)?;
		self.inner.close_tag()?;
		if self.inner.depth() == 0 {
			self.inner.raw("\n")?;
		}
		Ok(())
	}

	fn abandon(&mut self) {
		self.inner.abandon()
	}

	fn element(&mut self, tag: &Tag<'_>, text: &str) -> Result<()> {
		if !self.is_open() {
			return self.inner.element(tag, text);
		}
		self.inner.check_tag(tag)?;
		self.inner.check_text(text)?;
		let depth = self.inner.depth();
		self.newline(depth)?;
		let text = self.format_value(text, depth);
		self.inner.element(tag, &text)
	}

	fn text(&mut self, value: &str) -> Result<()> {
		if !self.is_open() || value.is_empty() {
			return self.inner.text(value);
		}
		let depth = self.inner.depth();
		let value = if self.text_wrap {
			self.fill(value, depth)
		} else {
			format!("\n{}{}", indentation(depth), value)
		};
		self.inner.text(&value)
	}

	fn comment(&mut self, value: &str) -> Result<()> {
		if !self.is_open() {
			return self.inner.comment(value);
		}
		self.inner.check_text(&comment_body(value))?;
		let depth = self.inner.depth();
		self.newline(depth)?;
		let value = self.format_value(value, depth);
		self.inner.comment(&value)
	}

	fn raw(&mut self, data: &str) -> Result<()> {
		self.inner.raw(data)
	}

	fn check_tag(&self, tag: &Tag<'_>) -> Result<()> {
		self.inner.check_tag(tag)
	}

	fn check_text(&self, data: &str) -> Result<()> {
		self.inner.check_text(data)
	}

	fn depth(&self) -> usize {
		self.inner.depth()
	}

	fn state(&self) -> State {
		self.inner.state()
	}
}


#[cfg(test)]
mod tests_layer {
	use super::*;

	use crate::writer::{Namespaced, Writer};

	type Stack = Indenter<Namespaced<Writer<Vec<u8>>>>;

	fn mk(text_wrap: bool) -> Stack {
		let mut ind = Indenter::with_wrapping(
			Namespaced::new(Writer::new(Vec::new())),
			text_wrap,
			DEFAULT_WRAP_WIDTH,
		);
		ind.declaration().unwrap();
		ind.open_tag(&Tag::new("root")).unwrap();
		ind
	}

	fn finish(mut ind: Stack) -> String {
		ind.close_tag().unwrap();
		String::from_utf8(ind.into_inner().into_inner().into_inner()).unwrap()
	}

	#[test]
	fn indents_nested_structure() {
		let mut ind = mk(true);
		ind.open_tag(&Tag::new("a")).unwrap();
		ind.element(&Tag::new("b"), "short").unwrap();
		ind.element(&Tag::new("c"), "").unwrap();
		ind.close_tag().unwrap();
		assert_eq!(
			finish(ind),
			"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n  <a>\n    <b>short</b>\n    <c/>\n  </a>\n</root>\n"
		);
	}

	#[test]
	fn wraps_long_element_text() {
		let mut ind = mk(true);
		ind.open_tag(&Tag::new("a")).unwrap();
		ind.element(&Tag::new("b"), &"blah ".repeat(20)).unwrap();
		ind.comment(&["comment"; 20].join(" ")).unwrap();
		ind.close_tag().unwrap();
		assert_eq!(
			finish(ind),
			concat!(
				"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
				"<root>\n",
				"  <a>\n",
				"    <b>\n",
				"      blah blah blah blah blah blah blah blah blah blah blah\n",
				"      blah blah blah blah blah blah blah blah blah\n",
				"    </b>\n",
				"    <!--\n",
				"      comment comment comment comment comment comment comment\n",
				"      comment comment comment comment comment comment comment\n",
				"      comment comment comment comment comment comment\n",
				"    -->\n",
				"  </a>\n",
				"</root>\n",
			)
		);
	}

	#[test]
	fn leaves_long_text_alone_without_wrapping() {
		let mut ind = mk(false);
		ind.open_tag(&Tag::new("a")).unwrap();
		ind.element(&Tag::new("b"), &"blah ".repeat(20)).unwrap();
		ind.comment(&["comment"; 20].join(" ")).unwrap();
		ind.close_tag().unwrap();
		assert_eq!(
			finish(ind),
			format!(
				concat!(
					"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
					"<root>\n",
					"  <a>\n",
					"    <b>{}</b>\n",
					"    <!--{}-->\n",
					"  </a>\n",
					"</root>\n",
				),
				"blah ".repeat(20),
				["comment"; 20].join(" "),
			)
		);
	}

	#[test]
	fn text_goes_on_its_own_line() {
		let mut ind = mk(true);
		ind.text("a < b").unwrap();
		assert_eq!(
			finish(ind),
			"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n  a &lt; b\n</root>\n"
		);
	}

	#[test]
	fn text_without_wrapping_keeps_whitespace() {
		let mut ind = mk(false);
		ind.text("a  b").unwrap();
		assert_eq!(
			finish(ind),
			"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n  a  b\n</root>\n"
		);
	}

	#[test]
	fn wrapped_text_is_escaped_after_wrapping() {
		let mut ind = mk(true);
		ind.element(&Tag::new("b"), &"x&y ".repeat(25)).unwrap();
		let out = finish(ind);
		assert!(!out.contains("&amp\n"));
		assert!(!out.contains("x&y"));
		assert_eq!(out.matches("x&amp;y").count(), 25);
	}

	#[test]
	fn rejected_calls_leave_no_whitespace() {
		let mut ind = mk(true);
		assert!(ind.element(&Tag::new("x:bad"), "").is_err());
		assert!(ind.element(&Tag::new("has space"), "").is_err());
		assert!(ind.element(&Tag::new("b"), "\x01").is_err());
		assert!(ind.open_tag(&Tag::new("p:")).is_err());
		assert!(ind.comment("\x00").is_err());
		ind.element(&Tag::new("ok"), "").unwrap();
		assert_eq!(
			finish(ind),
			"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n  <ok/>\n</root>\n"
		);
	}

	#[test]
	fn no_whitespace_after_close() {
		let mut ind = mk(true);
		ind.close_tag().unwrap();
		assert!(ind.element(&Tag::new("x"), "").is_err());
		assert!(ind.comment("x").is_err());
		assert!(ind.close_tag().is_err());
		let out = String::from_utf8(ind.into_inner().into_inner().into_inner()).unwrap();
		assert!(out.ends_with("</root>\n"));
	}
}
