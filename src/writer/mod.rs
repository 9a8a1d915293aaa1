/*!
# Layered XML writers

The generator is built from independent layers which all implement the
[`Emit`] trait:

* [`Writer`] serializes tags and text into an [`io::Write`] sink and keeps
  the stack of open element names.
* [`Namespaced`] validates namespace prefixes against the declarations in
  scope before handing calls down.
* [`Indenter`] inserts indentation and wraps long text before handing calls
  down.

Each layer owns the layer below it. The layers can be combined freely, but
[`Generator`](crate::Generator) is the usual way to use them.
*/
use std::fmt;
use std::io;

use bytes::{BufMut, BytesMut};
use smartstring::alias::String as SmartString;

use crate::error::{Error, Result};
use crate::strings::{comment_body, escape_text_into, quote_attr_into};
use crate::tag::Tag;

mod indent;
mod namespaces;

pub use indent::{wrap, Indenter, DEFAULT_WRAP_WIDTH, MIN_WRAP_WIDTH};
pub use namespaces::{Namespaced, NamespaceScopes, PREFIX_XML, XMLNS_XML};

static XML_DECL: &'static [u8] = b"<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// Lifecycle of a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	/// The root element has not been opened yet.
	Unopened,
	/// The root element is open; content may be written.
	Open,
	/// The root element has been closed. The document is complete.
	Closed,
	/// A container was abandoned or the sink failed. The document is
	/// incomplete and no further content will be accepted.
	Aborted,
}

impl fmt::Display for State {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::Unopened => "unopened",
			Self::Open => "open",
			Self::Closed => "closed",
			Self::Aborted => "aborted",
		})
	}
}

/// Interface shared by all writer layers.
///
/// Objects implementing this trait expect the following protocol:
///
/// 1. Call `declaration` once.
/// 2. Open the root element with `open_tag`.
/// 3. Write content using `open_tag`/`close_tag` pairs, `element`, `text` and
///    `comment`.
/// 4. Call `close_tag` for the root element.
///
/// Instead of `close_tag`, `abandon` may be called to drop the innermost open
/// element without writing its end tag. This leaves the document incomplete
/// on purpose.
pub trait Emit {
	/// Write the XML declaration.
	fn declaration(&mut self) -> Result<()>;

	/// Write a start tag and push the element onto the open-element stack.
	fn open_tag(&mut self, tag: &Tag<'_>) -> Result<()>;

	/// Write the end tag of the innermost open element and pop it.
	fn close_tag(&mut self) -> Result<()>;

	/// Pop the innermost open element without writing its end tag.
	fn abandon(&mut self);

	/// Write a complete leaf element.
	///
	/// The element is self-closing if `text` is empty.
	fn element(&mut self, tag: &Tag<'_>, text: &str) -> Result<()>;

	/// Write escaped text into the innermost open element.
	fn text(&mut self, value: &str) -> Result<()>;

	/// Write a comment.
	fn comment(&mut self, value: &str) -> Result<()>;

	/// Write data without any escaping or checks.
	///
	/// This is intended for inter-element whitespace only.
	fn raw(&mut self, data: &str) -> Result<()>;

	/// Validate a tag without writing anything.
	///
	/// Returns the error `open_tag` or `element` would fail with for this tag.
	fn check_tag(&self, tag: &Tag<'_>) -> Result<()>;

	/// Validate character data without writing anything.
	fn check_text(&self, data: &str) -> Result<()>;

	/// Number of currently open elements.
	fn depth(&self) -> usize;

	/// Current lifecycle state.
	fn state(&self) -> State;
}

/**
Serializes XML into an [`io::Write`] sink.

This is the bottom layer. It performs no namespace processing: namespace
bindings on a [`Tag`] are written out as `xmlns` attributes without any
checks. Names and character data are validated against the XML 1.0
productions so that the output is always well-formed.

Each item is encoded into an internal buffer first and then handed to the
sink with a single `write_all`.

```
use elementflow::{Emit, Tag, Writer};

let mut w = Writer::new(Vec::new());
w.declaration().unwrap();
w.open_tag(&Tag::new("root")).unwrap();
w.element(&Tag::new("item").attr("k", "v"), "").unwrap();
w.close_tag().unwrap();
assert_eq!(
	&w.into_inner()[..],
	&b"<?xml version=\"1.0\" encoding=\"utf-8\"?><root><item k=\"v\"/></root>"[..],
);
```
*/
pub struct Writer<W> {
	sink: W,
	state: State,
	qname_stack: Vec<SmartString>,
	scratch: BytesMut,
}

impl<W: io::Write> Writer<W> {
	/// Create a new writer. Nothing is written until [`Emit::declaration`]
	/// is called.
	pub fn new(sink: W) -> Self {
		Self {
			sink,
			state: State::Unopened,
			qname_stack: Vec::new(),
			scratch: BytesMut::with_capacity(256),
		}
	}

	/// Borrow the sink.
	pub fn get_ref(&self) -> &W {
		&self.sink
	}

	/// Mutably borrow the sink.
	///
	/// Writing to the sink directly bypasses all bookkeeping.
	pub fn get_mut(&mut self) -> &mut W {
		&mut self.sink
	}

	/// Return the sink.
	pub fn into_inner(self) -> W {
		self.sink
	}

	fn check_content(&self) -> Result<()> {
		match self.state {
			State::Open => Ok(()),
			State::Unopened => Err(Error::InvalidState("no root element has been opened")),
			State::Closed => Err(Error::InvalidState("the root element is already closed")),
			State::Aborted => Err(Error::InvalidState("document has been aborted")),
		}
	}

	fn check_name(name: &str) -> Result<()> {
		rxml_validation::validate_name(name).map_err(|e| Error::invalid_name(name, e))
	}

	fn check_cdata(data: &str) -> Result<()> {
		rxml_validation::validate_cdata(data).map_err(Error::InvalidText)
	}

	fn validate_tag(tag: &Tag<'_>) -> Result<()> {
		Self::check_name(tag.name())?;
		for (name, value) in tag.attributes() {
			Self::check_name(name)?;
			Self::check_cdata(value)?;
		}
		for (prefix, uri) in tag.bindings() {
			if !prefix.is_empty() {
				rxml_validation::validate_ncname(prefix).map_err(|e| Error::invalid_name(prefix, e))?;
			}
			Self::check_cdata(uri)?;
		}
		Ok(())
	}

	fn encode_head(out: &mut BytesMut, tag: &Tag<'_>) {
		out.put_u8(b'<');
		out.put_slice(tag.name().as_bytes());
		for (name, value) in tag.attributes() {
			out.put_u8(b' ');
			out.put_slice(name.as_bytes());
			out.put_u8(b'=');
			quote_attr_into(out, value);
		}
		for (name, uri) in tag.declarations() {
			out.put_u8(b' ');
			out.put_slice(name.as_bytes());
			out.put_u8(b'=');
			quote_attr_into(out, uri);
		}
	}

	fn flush_scratch(&mut self) -> Result<()> {
		let result = self.sink.write_all(&self.scratch[..]);
		self.scratch.clear();
		if let Err(e) = result {
			log::debug!("sink failed, aborting document: {}", e);
			self.state = State::Aborted;
			return Err(Error::IO(e));
		}
		Ok(())
	}
}

impl<W: io::Write> Emit for Writer<W> {
	fn declaration(&mut self) -> Result<()> {
		if self.state != State::Unopened {
			return Err(Error::InvalidState("XML declaration must come first"));
		}
		self.scratch.put_slice(XML_DECL);
		self.flush_scratch()
	}

	fn open_tag(&mut self, tag: &Tag<'_>) -> Result<()> {
		match self.state {
			State::Unopened | State::Open => (),
			_ => self.check_content()?,
		}
		Self::validate_tag(tag)?;
		Self::encode_head(&mut self.scratch, tag);
		self.scratch.put_u8(b'>');
		self.flush_scratch()?;
		self.qname_stack.push(tag.name().into());
		self.state = State::Open;
		Ok(())
	}

	fn close_tag(&mut self) -> Result<()> {
		self.check_content()?;
		let name = match self.qname_stack.pop() {
			Some(name) => name,
			None => return Err(Error::InvalidState("no open element")),
		};
		self.scratch.put_slice(b"</");
		self.scratch.put_slice(name.as_bytes());
		self.scratch.put_u8(b'>');
		if self.qname_stack.is_empty() {
			self.state = State::Closed;
		}
		self.flush_scratch()
	}

	fn abandon(&mut self) {
		if self.qname_stack.pop().is_some() {
			self.state = State::Aborted;
		}
	}

	fn element(&mut self, tag: &Tag<'_>, text: &str) -> Result<()> {
		self.check_content()?;
		Self::validate_tag(tag)?;
		Self::check_cdata(text)?;
		Self::encode_head(&mut self.scratch, tag);
		if text.is_empty() {
			self.scratch.put_slice(b"/>");
		} else {
			self.scratch.put_u8(b'>');
			escape_text_into(&mut self.scratch, text);
			self.scratch.put_slice(b"</");
			self.scratch.put_slice(tag.name().as_bytes());
			self.scratch.put_u8(b'>');
		}
		self.flush_scratch()
	}

	fn text(&mut self, value: &str) -> Result<()> {
		self.check_content()?;
		Self::check_cdata(value)?;
		escape_text_into(&mut self.scratch, value);
		self.flush_scratch()
	}

	fn comment(&mut self, value: &str) -> Result<()> {
		self.check_content()?;
		let body = comment_body(value);
		Self::check_cdata(&body)?;
		self.scratch.put_slice(b"<!--");
		self.scratch.put_slice(body.as_bytes());
		self.scratch.put_slice(b"-->");
		self.flush_scratch()
	}

	fn raw(&mut self, data: &str) -> Result<()> {
		if self.state == State::Aborted {
			return Err(Error::InvalidState("document has been aborted"));
		}
		self.scratch.put_slice(data.as_bytes());
		self.flush_scratch()
	}

	fn check_tag(&self, tag: &Tag<'_>) -> Result<()> {
		Self::validate_tag(tag)
	}

	fn check_text(&self, data: &str) -> Result<()> {
		Self::check_cdata(data)
	}

	fn depth(&self) -> usize {
		self.qname_stack.len()
	}

	fn state(&self) -> State {
		self.state
	}
}
