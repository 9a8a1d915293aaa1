/*!
# Element descriptions

A [`Tag`] describes the start tag of an element: its (possibly prefixed)
name, its attributes and the namespace bindings it introduces. A [`Leaf`] is
a tag plus text content, which is what [`Generator::map`] expects from its
mapping function.

Attributes and namespace bindings keep their insertion order, so output is
deterministic. Setting an attribute (or binding a prefix) a second time
replaces the earlier value in place.

   [`Generator::map`]: crate::Generator::map
*/
use std::borrow::Cow;

type Pairs<'a> = Vec<(Cow<'a, str>, Cow<'a, str>)>;

fn set<'a>(pairs: &mut Pairs<'a>, key: Cow<'a, str>, value: Cow<'a, str>) {
	match pairs.iter_mut().find(|(k, _)| *k == key) {
		Some(existing) => existing.1 = value,
		None => pairs.push((key, value)),
	}
}

/**
Start tag of an element or container.

```
use elementflow::Tag;

let tag = Tag::new("n:item")
	.attr("key", "value")
	.namespace("n", "urn:example");
assert_eq!(tag.name(), "n:item");
assert_eq!(tag.attributes().count(), 1);
let decls: Vec<_> = tag.declarations().collect();
assert_eq!(decls, vec![("xmlns:n".to_string(), "urn:example")]);
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
	name: Cow<'a, str>,
	attrs: Pairs<'a>,
	namespaces: Pairs<'a>,
}

impl<'a> Tag<'a> {
	/// Create a tag without attributes or namespace bindings.
	pub fn new<N: Into<Cow<'a, str>>>(name: N) -> Tag<'a> {
		Tag {
			name: name.into(),
			attrs: Vec::new(),
			namespaces: Vec::new(),
		}
	}

	/// Set an attribute.
	pub fn attr<K: Into<Cow<'a, str>>, V: Into<Cow<'a, str>>>(mut self, name: K, value: V) -> Tag<'a> {
		set(&mut self.attrs, name.into(), value.into());
		self
	}

	/// Set all attributes from an iterator, in iteration order.
	pub fn attrs<I, K, V>(mut self, attrs: I) -> Tag<'a>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<Cow<'a, str>>,
		V: Into<Cow<'a, str>>,
	{
		for (k, v) in attrs {
			set(&mut self.attrs, k.into(), v.into());
		}
		self
	}

	/// Bind a namespace prefix on this tag.
	///
	/// The empty prefix declares the default namespace.
	pub fn namespace<P: Into<Cow<'a, str>>, U: Into<Cow<'a, str>>>(mut self, prefix: P, uri: U) -> Tag<'a> {
		set(&mut self.namespaces, prefix.into(), uri.into());
		self
	}

	/// Bind all namespace prefixes from an iterator of `(prefix, uri)`.
	pub fn namespaces<I, P, U>(mut self, namespaces: I) -> Tag<'a>
	where
		I: IntoIterator<Item = (P, U)>,
		P: Into<Cow<'a, str>>,
		U: Into<Cow<'a, str>>,
	{
		for (p, u) in namespaces {
			set(&mut self.namespaces, p.into(), u.into());
		}
		self
	}

	/// Name of the element, including its prefix.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Attributes as `(name, value)` pairs, in insertion order.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attrs.iter().map(|(k, v)| (&**k, &**v))
	}

	/// Namespace bindings as `(prefix, uri)` pairs, in insertion order.
	pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
		self.namespaces.iter().map(|(k, v)| (&**k, &**v))
	}

	/// Namespace bindings rewritten as their reserved attributes: `xmlns`
	/// for the default namespace and `xmlns:p` for prefix `p`.
	pub fn declarations(&self) -> impl Iterator<Item = (String, &str)> {
		self.bindings().map(|(prefix, uri)| {
			let name = if prefix.is_empty() {
				"xmlns".to_string()
			} else {
				format!("xmlns:{}", prefix)
			};
			(name, uri)
		})
	}

	/// Whether this tag introduces any namespace bindings.
	pub fn has_bindings(&self) -> bool {
		!self.namespaces.is_empty()
	}
}

impl<'a> From<&'a str> for Tag<'a> {
	fn from(name: &'a str) -> Tag<'a> {
		Tag::new(name)
	}
}

impl From<String> for Tag<'static> {
	fn from(name: String) -> Tag<'static> {
		Tag::new(name)
	}
}

impl<'a> From<&'a String> for Tag<'a> {
	fn from(name: &'a String) -> Tag<'a> {
		Tag::new(name.as_str())
	}
}

/// A leaf element: a start tag plus (possibly empty) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf<'a> {
	pub tag: Tag<'a>,
	pub text: Cow<'a, str>,
}

impl<'a> Leaf<'a> {
	pub fn new<T: Into<Tag<'a>>, S: Into<Cow<'a, str>>>(tag: T, text: S) -> Leaf<'a> {
		Leaf {
			tag: tag.into(),
			text: text.into(),
		}
	}
}

impl<'a> From<Tag<'a>> for Leaf<'a> {
	fn from(tag: Tag<'a>) -> Leaf<'a> {
		Leaf::new(tag, "")
	}
}

impl<'a> From<&'a str> for Leaf<'a> {
	fn from(name: &'a str) -> Leaf<'a> {
		Leaf::new(name, "")
	}
}

impl From<String> for Leaf<'static> {
	fn from(name: String) -> Leaf<'static> {
		Leaf::new(name, "")
	}
}

impl<'a, T: Into<Tag<'a>>> From<(T, &'a str)> for Leaf<'a> {
	fn from((tag, text): (T, &'a str)) -> Leaf<'a> {
		Leaf::new(tag, text)
	}
}

impl<'a, T: Into<Tag<'a>>> From<(T, String)> for Leaf<'a> {
	fn from((tag, text): (T, String)) -> Leaf<'a> {
		Leaf::new(tag, text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn attributes_keep_insertion_order() {
		let tag = Tag::new("a").attr("z", "1").attr("a", "2").attr("m", "3");
		let names: Vec<_> = tag.attributes().map(|(k, _)| k).collect();
		assert_eq!(names, vec!["z", "a", "m"]);
	}

	#[test]
	fn setting_attribute_twice_replaces_in_place() {
		let tag = Tag::new("a").attr("x", "1").attr("y", "2").attr("x", "3");
		let attrs: Vec<_> = tag.attributes().collect();
		assert_eq!(attrs, vec![("x", "3"), ("y", "2")]);
	}

	#[test]
	fn attrs_accepts_owned_pairs() {
		let tag = Tag::new("a").attrs(vec![("k".to_string(), 1.to_string())]);
		assert_eq!(tag.attributes().collect::<Vec<_>>(), vec![("k", "1")]);
	}

	#[test]
	fn declarations_map_default_and_prefixed() {
		let tag = Tag::new("root").namespaces(vec![("", "urn:n"), ("n1", "urn:n1")]);
		let decls: Vec<_> = tag.declarations().collect();
		assert_eq!(
			decls,
			vec![
				("xmlns".to_string(), "urn:n"),
				("xmlns:n1".to_string(), "urn:n1")
			]
		);
	}

	#[test]
	fn plain_names_convert_into_bare_tags() {
		let tag: Tag = "item".into();
		assert_eq!(tag.name(), "item");
		assert_eq!(tag.attributes().count(), 0);
		assert!(!tag.has_bindings());
	}

	#[test]
	fn leaf_conversions() {
		let leaf: Leaf = "One".into();
		assert_eq!(leaf.tag.name(), "One");
		assert_eq!(leaf.text, "");

		let leaf: Leaf = (Tag::new("item").attr("key", "1"), "One").into();
		assert_eq!(leaf.tag.attributes().collect::<Vec<_>>(), vec![("key", "1")]);
		assert_eq!(leaf.text, "One");

		let leaf: Leaf = ("item", format!("{}", 2)).into();
		assert_eq!(leaf.text, "2");
	}
}
