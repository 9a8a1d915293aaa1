/*!
# Streaming generator

The [`Generator`] is the main entry point. It writes the XML declaration and
opens the root element on construction; everything else is written as it is
requested, so memory use does not depend on document size.

Containers are opened with [`Generator::container`], which returns a
[`Container`] guard. The end tag is only written by [`Container::close`]. A
guard which is dropped without being closed (because an error was propagated
with `?`, or because of a panic) leaves its end tag unwritten on purpose:
the document in the sink is then incomplete, which tells whoever consumes it
that generation was aborted.
*/
use std::io;
use std::ops::{Deref, DerefMut};
use std::result::Result as StdResult;

use crate::error::{Error, Result};
use crate::tag::{Leaf, Tag};
use crate::writer::DEFAULT_WRAP_WIDTH;
use crate::writer::{Emit, Indenter, Namespaced, State, Writer};

/// Options for a [`Generator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Pretty-print the output with two spaces of indentation per level.
	pub indent: bool,

	/// Word-wrap long text and comment bodies when pretty-printing.
	///
	/// Has no effect unless [`Options::indent`] is set.
	pub text_wrap: bool,

	/// Length above which bodies are wrapped, and nominal width of wrapped
	/// lines including indentation.
	pub wrap_width: usize,
}

impl Options {
	/// Set the [`Options::indent`] value.
	///
	/// # Example
	///
	/// ```
	/// use elementflow::Options;
	/// let opts = Options::default().indent(true).text_wrap(false);
	/// assert!(opts.indent);
	/// assert!(!opts.text_wrap);
	/// ```
	pub fn indent(mut self, v: bool) -> Options {
		self.indent = v;
		self
	}

	/// Set the [`Options::text_wrap`] value.
	pub fn text_wrap(mut self, v: bool) -> Options {
		self.text_wrap = v;
		self
	}

	/// Set the [`Options::wrap_width`] value.
	pub fn wrap_width(mut self, v: usize) -> Options {
		self.wrap_width = v;
		self
	}
}

impl Default for Options {
	/// No indentation; wrapping at 70 columns once indentation is enabled.
	fn default() -> Self {
		Self {
			indent: false,
			text_wrap: true,
			wrap_width: DEFAULT_WRAP_WIDTH,
		}
	}
}

enum Layers<W> {
	Flat(Namespaced<Writer<W>>),
	Indented(Indenter<Namespaced<Writer<W>>>),
}

impl<W: io::Write> Layers<W> {
	fn emitter(&mut self) -> &mut dyn Emit {
		match self {
			Self::Flat(l) => l as &mut dyn Emit,
			Self::Indented(l) => l as &mut dyn Emit,
		}
	}

	fn emitter_ref(&self) -> &dyn Emit {
		match self {
			Self::Flat(l) => l as &dyn Emit,
			Self::Indented(l) => l as &dyn Emit,
		}
	}

	fn writer(&self) -> &Writer<W> {
		match self {
			Self::Flat(l) => l.get_ref(),
			Self::Indented(l) => l.get_ref().get_ref(),
		}
	}

	fn writer_mut(&mut self) -> &mut Writer<W> {
		match self {
			Self::Flat(l) => l.get_mut(),
			Self::Indented(l) => l.get_mut().get_mut(),
		}
	}

	fn into_writer(self) -> Writer<W> {
		match self {
			Self::Flat(l) => l.into_inner(),
			Self::Indented(l) => l.into_inner().into_inner(),
		}
	}
}

/**
Streaming XML generator bound to one sink and one root element.

Namespace prefixes are always validated. Pretty-printing is enabled through
[`Options::indent`].

```
use elementflow::{Generator, Options, Tag};

let mut buf = Vec::new();
let mut xml = Generator::open(&mut buf, "root", Options::default()).unwrap();
xml.element(Tag::new("item").attr("key", "value"), "text").unwrap();
{
	let mut container = xml.container(Tag::new("container").attr("key", "value")).unwrap();
	container.text("text").unwrap();
	container.element("subelement", "subelement text").unwrap();
	container.close().unwrap();
}
xml.close().unwrap();
drop(xml);
assert_eq!(
	std::str::from_utf8(&buf).unwrap(),
	concat!(
		"<?xml version=\"1.0\" encoding=\"utf-8\"?>",
		"<root><item key=\"value\">text</item>",
		"<container key=\"value\">text<subelement>subelement text</subelement></container>",
		"</root>",
	),
);
```
*/
pub struct Generator<W> {
	layers: Layers<W>,
}

impl<W: io::Write> Generator<W> {
	/// Write the XML declaration and open the root element.
	///
	/// Fails if the root tag is invalid (for example, if it uses an
	/// undeclared namespace prefix) or if the sink fails.
	pub fn open<'t, T: Into<Tag<'t>>>(sink: W, root: T, options: Options) -> Result<Self> {
		let writer = Namespaced::new(Writer::new(sink));
		let layers = if options.indent {
			Layers::Indented(Indenter::with_wrapping(
				writer,
				options.text_wrap,
				options.wrap_width,
			))
		} else {
			Layers::Flat(writer)
		};
		let mut generator = Generator { layers };
		let root = root.into();
		generator.emitter().declaration()?;
		generator.emitter().open_tag(&root)?;
		log::debug!(
			"opened root element {:?} (indent: {})",
			root.name(),
			options.indent
		);
		Ok(generator)
	}

	fn emitter(&mut self) -> &mut dyn Emit {
		self.layers.emitter()
	}

	fn ensure_open(&self) -> Result<()> {
		match self.state() {
			State::Open => Ok(()),
			State::Closed => Err(Error::InvalidState("generator is closed")),
			State::Aborted => Err(Error::InvalidState("generator has been aborted")),
			State::Unopened => Err(Error::InvalidState("generator is not open")),
		}
	}

	/// Open a container element.
	///
	/// The returned guard dereferences to the generator, so content for the
	/// container is written through it. Call [`Container::close`] to write
	/// the end tag.
	pub fn container<'t, T: Into<Tag<'t>>>(&mut self, tag: T) -> Result<Container<'_, W>> {
		self.ensure_open()?;
		self.emitter().open_tag(&tag.into())?;
		let depth = self.depth();
		Ok(Container {
			generator: self,
			depth,
			closed: false,
		})
	}

	/// Run `f` inside a container.
	///
	/// The container is closed if `f` returns `Ok`. If `f` fails, the error
	/// is returned and the end tag is not written.
	pub fn with_container<'t, T, F, R, E>(&mut self, tag: T, f: F) -> StdResult<R, E>
	where
		T: Into<Tag<'t>>,
		F: FnOnce(&mut Generator<W>) -> StdResult<R, E>,
		E: From<Error>,
	{
		let mut container = self.container(tag)?;
		let value = f(&mut container)?;
		container.close()?;
		Ok(value)
	}

	/// Write a leaf element.
	///
	/// The element is self-closing if `text` is empty.
	pub fn element<'t, T: Into<Tag<'t>>>(&mut self, tag: T, text: &str) -> Result<()> {
		self.ensure_open()?;
		self.emitter().element(&tag.into(), text)
	}

	/// Write text into the innermost open container.
	pub fn text(&mut self, value: &str) -> Result<()> {
		self.ensure_open()?;
		self.emitter().text(value)
	}

	/// Write a comment. Every `--` in `value` is removed.
	pub fn comment(&mut self, value: &str) -> Result<()> {
		self.ensure_open()?;
		self.emitter().comment(value)
	}

	/// Write one leaf element per item, in order.
	///
	/// `f` turns an item into anything convertible to a [`Leaf`]: a bare
	/// name, a [`Tag`], or a `(tag, text)` pair.
	///
	/// ```
	/// use elementflow::{Generator, Options, Tag};
	///
	/// let data = [(1, "One"), (2, "Two")];
	/// let mut buf = Vec::new();
	/// let mut xml = Generator::open(&mut buf, "root", Options::default()).unwrap();
	/// xml.map(data.iter(), |(k, v)| (Tag::new("item").attr("key", k.to_string()), *v)).unwrap();
	/// xml.map(data.iter(), |(_, v)| *v).unwrap();
	/// xml.close().unwrap();
	/// drop(xml);
	/// assert!(std::str::from_utf8(&buf).unwrap().ends_with(
	/// 	"<root><item key=\"1\">One</item><item key=\"2\">Two</item><One/><Two/></root>"
	/// ));
	/// ```
	pub fn map<'n, I, F, N>(&mut self, items: I, mut f: F) -> Result<()>
	where
		I: IntoIterator,
		F: FnMut(I::Item) -> N,
		N: Into<Leaf<'n>>,
	{
		for item in items {
			let leaf = f(item).into();
			self.element(leaf.tag, &leaf.text)?;
		}
		Ok(())
	}

	/// Close the root element, completing the document.
	///
	/// Fails with [`Error::InvalidState`] if the generator is not open or if
	/// containers other than the root are still open.
	pub fn close(&mut self) -> Result<()> {
		self.ensure_open()?;
		if self.depth() != 1 {
			return Err(Error::InvalidState("containers are still open"));
		}
		self.emitter().close_tag()?;
		log::debug!("closed root element, document complete");
		Ok(())
	}

	/// Number of open elements, including the root.
	pub fn depth(&self) -> usize {
		self.layers.emitter_ref().depth()
	}

	/// Current lifecycle state.
	pub fn state(&self) -> State {
		self.layers.emitter_ref().state()
	}

	/// Borrow the sink.
	pub fn get_ref(&self) -> &W {
		self.layers.writer().get_ref()
	}

	/// Mutably borrow the sink.
	///
	/// This is meant for draining buffering sinks; writing to the sink
	/// directly bypasses all bookkeeping.
	pub fn get_mut(&mut self) -> &mut W {
		self.layers.writer_mut().get_mut()
	}

	/// Return the sink, whatever state the document is in.
	pub fn into_inner(self) -> W {
		self.layers.into_writer().into_inner()
	}
}

/**
Guard for an open container element.

Dereferences to the [`Generator`], so nested containers and content are
written through the guard. Created by [`Generator::container`].
*/
pub struct Container<'g, W: io::Write> {
	generator: &'g mut Generator<W>,
	depth: usize,
	closed: bool,
}

impl<'g, W: io::Write> Container<'g, W> {
	/// Write the end tag of this container.
	pub fn close(mut self) -> Result<()> {
		self.closed = true;
		if self.generator.depth() != self.depth {
			return Err(Error::InvalidState("container is not the innermost open element"));
		}
		self.generator.ensure_open()?;
		self.generator.emitter().close_tag()
	}

	/// Nesting depth of this container; the root element is at depth 1.
	pub fn depth(&self) -> usize {
		self.depth
	}
}

impl<'g, W: io::Write> Deref for Container<'g, W> {
	type Target = Generator<W>;

	fn deref(&self) -> &Generator<W> {
		self.generator
	}
}

impl<'g, W: io::Write> DerefMut for Container<'g, W> {
	fn deref_mut(&mut self) -> &mut Generator<W> {
		self.generator
	}
}

impl<'g, W: io::Write> Drop for Container<'g, W> {
	fn drop(&mut self) {
		if self.closed || self.generator.depth() != self.depth {
			return;
		}
		log::warn!(
			"container at depth {} dropped without closing, document left incomplete",
			self.depth
		);
		self.generator.emitter().abandon();
	}
}

/**
Generate a complete document into a sink.

Opens the root element, runs `f`, closes the root element if `f` succeeded
and returns the sink. If `f` fails, its error is returned and the document
is left incomplete.

```
use elementflow::{xml, Options, Tag};

let buf = xml(Vec::new(), Tag::new("root").namespace("", "urn:n"), Options::default(), |xml| {
	xml.with_container("a", |a| a.element("b", "text"))
}).unwrap();
assert_eq!(
	std::str::from_utf8(&buf).unwrap(),
	"<?xml version=\"1.0\" encoding=\"utf-8\"?><root xmlns=\"urn:n\"><a><b>text</b></a></root>",
);
```
*/
pub fn xml<'t, W, T, F, E>(sink: W, root: T, options: Options, f: F) -> StdResult<W, E>
where
	W: io::Write,
	T: Into<Tag<'t>>,
	F: FnOnce(&mut Generator<W>) -> StdResult<(), E>,
	E: From<Error>,
{
	let mut generator = Generator::open(sink, root, options)?;
	f(&mut generator)?;
	generator.close()?;
	Ok(generator.into_inner())
}
