/*!
# Streaming XML generation

This crate writes XML 1.0 documents incrementally into an output sink,
without building a tree in memory. Memory use depends on the nesting depth
of the document, not on its size, which makes it suitable for large payloads
consisting of many repeated records.

## Features

* Output is always UTF-8 and starts with an XML declaration
* Names and character data are validated so that normal termination always
  yields a well-formed document
* Namespace prefixes are checked against the declarations in scope
* Optional pretty-printing with word-wrapping of long text
* Incomplete output on abnormal termination: a container whose scope is left
  with an error does not get its end tag, so consumers can tell a truncated
  document from a complete one
* Chunked output through a [`BufferQueue`], as an iterator, as a
  `futures_core::Stream` (`stream` feature) or as a tokio `AsyncRead`
  (`async` feature)

## Example

```
use elementflow::{xml, Options, Tag};

let data = [(1, "One"), (2, "Two")];
let buf = xml(
	Vec::new(),
	Tag::new("root").namespace("", "urn:n").namespace("n1", "urn:n1"),
	Options::default(),
	|xml| {
		xml.element(Tag::new("item").attr("key", "value"), "text")?;
		xml.with_container(Tag::new("container").attr("key", "value"), |c| {
			c.text("text")?;
			c.element("subelement", "subelement text")
		})?;
		xml.with_container(Tag::new("n2:container").namespace("n2", "urn:n2"), |c| {
			c.element("n1:subelement", "")
		})?;
		xml.map(data.iter(), |(k, v)| (Tag::new("item").attr("key", k.to_string()), *v))
	},
).unwrap();
let doc = String::from_utf8(buf).unwrap();
assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?><root xmlns=\"urn:n\""));
assert!(doc.ends_with("</root>"));
```

## High-level usage

### Writing directly into a sink

[`Generator::open`] binds a generator to any [`std::io::Write`] and opens the
root element. Containers are opened with [`Generator::container`] or
[`Generator::with_container`]; leaves are written with
[`Generator::element`], [`Generator::text`] and [`Generator::comment`].
[`xml`] wraps all of this into a single call.

### Chunked delivery

A generator writing into a [`BufferQueue`] can be turned into a sequence of
byte chunks with [`Generator::chunks`], which emits one record per step and
hands out the buffered output whenever it exceeds a threshold.

### Lower-level layers

The [`writer`] module contains the layers the generator is built from. They
can be used on their own, for example to write without namespace checks.
*/
pub mod error;
pub mod strings;
mod tag;
pub mod writer;
mod generator;
mod bufq;
mod stream;


#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use tag::{Leaf, Tag};
#[doc(inline)]
pub use writer::{wrap, Emit, Indenter, Namespaced, NamespaceScopes, State, Writer};
#[doc(inline)]
pub use generator::{xml, Container, Generator, Options};
#[doc(inline)]
pub use bufq::BufferQueue;
pub use stream::Chunks;
#[cfg(feature = "async")]
pub use stream::ChunkReader;
pub use strings::{comment_body, escape_text, quote_attr};

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
