use smartstring::alias::String as SmartString;

use crate::error::{Error, Result};
use crate::strings::prefix_of;
use crate::tag::Tag;

use super::{Emit, State};

/// Prefix which is implicitly bound in every document.
pub const PREFIX_XML: &'static str = "xml";

/// Prefix reserved for namespace declarations, which may never be bound.
pub const PREFIX_XMLNS: &'static str = "xmlns";

/// Namespace URI which the `xml` prefix is bound to.
pub const XMLNS_XML: &'static str = "http://www.w3.org/XML/1998/namespace";

/// Namespace URI of namespace declarations.
pub const XMLNS_XMLNS: &'static str = "http://www.w3.org/2000/xmlns/";

/**
Stack of namespace prefix scopes.

There is one frame per open element, plus a synthetic bottom frame which
holds the `xml` prefix. Each frame only stores the prefixes declared on its
element; a prefix is visible if it is declared in any frame.

Objects of this type expect the following protocol:

1. `check` a tag against the visible prefixes.
2. If the tag opens a container, `push` it once its start tag is written.
3. Process all child elements by recursion.
4. Call `pop` to end the container.
*/
#[derive(Debug, Clone)]
pub struct NamespaceScopes {
	frames: Vec<Vec<SmartString>>,
}

impl NamespaceScopes {
	pub fn new() -> Self {
		Self {
			frames: vec![vec![PREFIX_XML.into()]],
		}
	}

	/// Whether the prefix is declared at the current depth.
	pub fn is_declared(&self, prefix: &str) -> bool {
		self.frames
			.iter()
			.rev()
			.any(|frame| frame.iter().any(|p| p.as_str() == prefix))
	}

	/// Number of pushed frames, not counting the bottom frame.
	pub fn depth(&self) -> usize {
		self.frames.len() - 1
	}

	fn check_binding(prefix: &str, uri: &str) -> Result<()> {
		if prefix == PREFIX_XMLNS || uri == XMLNS_XMLNS {
			return Err(Error::ReservedNamespacePrefix(prefix.to_string()));
		}
		if (prefix == PREFIX_XML) != (uri == XMLNS_XML) {
			return Err(Error::ReservedNamespacePrefix(prefix.to_string()));
		}
		Ok(())
	}

	fn check_name(&self, tag: &Tag<'_>, name: &str) -> Result<()> {
		let prefix = match prefix_of(name) {
			Some(prefix) => prefix,
			None => return Ok(()),
		};
		let local = &name[prefix.len() + 1..];
		rxml_validation::validate_ncname(prefix).map_err(|e| Error::invalid_name(name, e))?;
		rxml_validation::validate_ncname(local).map_err(|e| Error::invalid_name(name, e))?;
		if prefix == PREFIX_XMLNS {
			return Err(Error::ReservedNamespacePrefix(prefix.to_string()));
		}
		// bindings on the same tag apply to its own name and attributes
		if tag.bindings().any(|(p, _)| !p.is_empty() && p == prefix) || self.is_declared(prefix) {
			return Ok(());
		}
		Err(Error::UnknownNamespacePrefix(prefix.to_string()))
	}

	/// Check that all prefixes used by the tag resolve and that its bindings
	/// do not touch reserved prefixes.
	pub fn check(&self, tag: &Tag<'_>) -> Result<()> {
		for (prefix, uri) in tag.bindings() {
			Self::check_binding(prefix, uri)?;
		}
		self.check_name(tag, tag.name())?;
		for (name, _) in tag.attributes() {
			// declarations only go through Tag::namespace
			if name == PREFIX_XMLNS {
				return Err(Error::ReservedNamespacePrefix(name.to_string()));
			}
			self.check_name(tag, name)?;
		}
		Ok(())
	}

	/// Enter a container, making its bindings visible.
	pub fn push(&mut self, tag: &Tag<'_>) {
		if !tag.has_bindings() {
			self.frames.push(Vec::new());
			return;
		}
		let frame = tag
			.bindings()
			.filter(|(prefix, _)| !prefix.is_empty())
			.map(|(prefix, _)| prefix.into())
			.collect();
		self.frames.push(frame);
	}

	/// Leave a container, dropping its bindings.
	///
	/// # Panics
	///
	/// If no frame has been pushed.
	pub fn pop(&mut self) {
		if self.frames.len() <= 1 {
			panic!("attempt to pop the bottom namespace frame");
		}
		self.frames.pop();
	}
}

impl Default for NamespaceScopes {
	fn default() -> Self {
		Self::new()
	}
}

/**
Namespace layer.

Validates every prefixed element and attribute name against the declarations
in scope and keeps the scope stack in lockstep with the open-element stack of
the layer below. Calls which fail validation are not passed on, so nothing
is written for them.
*/
pub struct Namespaced<E> {
	inner: E,
	scopes: NamespaceScopes,
}

impl<E: Emit> Namespaced<E> {
	pub fn new(inner: E) -> Self {
		Self {
			inner,
			scopes: NamespaceScopes::new(),
		}
	}

	pub fn scopes(&self) -> &NamespaceScopes {
		&self.scopes
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

	// Elements popped below us (successfully or not) take their frames with
	// them.
	fn sync(&mut self) {
		while self.scopes.depth() > self.inner.depth() {
			self.scopes.pop();
		}
	}
}

impl<E: Emit> Emit for Namespaced<E> {
	fn declaration(&mut self) -> Result<()> {
		self.inner.declaration()
	}

	fn open_tag(&mut self, tag: &Tag<'_>) -> Result<()> {
		self.scopes.check(tag)?;
		self.inner.open_tag(tag)?;
		self.scopes.push(tag);
		Ok(())
	}

	fn close_tag(&mut self) -> Result<()> {
		let result = self.inner.close_tag();
		self.sync();
		result
	}

	fn abandon(&mut self) {
		self.inner.abandon();
		self.sync();
	}

	fn element(&mut self, tag: &Tag<'_>, text: &str) -> Result<()> {
		self.scopes.check(tag)?;
		self.inner.element(tag, text)
	}

	fn text(&mut self, value: &str) -> Result<()> {
		self.inner.text(value)
	}

	fn comment(&mut self, value: &str) -> Result<()> {
		self.inner.comment(value)
	}

	fn raw(&mut self, data: &str) -> Result<()> {
		self.inner.raw(data)
	}

	fn check_tag(&self, tag: &Tag<'_>) -> Result<()> {
		self.scopes.check(tag)?;
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
