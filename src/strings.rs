/*!
# Escaping and name helpers

Pure functions which turn caller-supplied literal text into XML-safe forms.

Text content only has `&` and `<` escaped; `>` is written as is. Note that
this means a literal `]]>` in text content is passed through unchanged.
Attribute values additionally have `"` escaped, because they are always
written in double quotes.

None of these functions interpret entity references in their input: a `&amp;`
passed in will be written as `&amp;amp;`.
*/
use std::borrow::Cow;

use bytes::BufMut;

const TEXT_SPECIALS: &'static [u8] = &[b'&', b'<'];

const ATTR_SPECIALS: &'static [u8] = &[b'&', b'<', b'"'];

/// Separator between namespace prefix and local name.
pub const PREFIX_SEPARATOR: char = ':';

fn needs_escaping(data: &str, specials: &'static [u8]) -> bool {
	data.bytes().any(|b| specials.contains(&b))
}

fn escape<B: BufMut>(out: &mut B, data: &[u8], specials: &'static [u8]) {
	let mut last_index = 0;
	for i in 0..data.len() {
		let ch = data[i];
		if !specials.contains(&ch) {
			continue;
		}
		if i > last_index {
			out.put_slice(&data[last_index..i]);
		}
		match ch {
			b'"' => out.put_slice(b"&quot;"),
			b'<' => out.put_slice(b"&lt;"),
			b'&' => out.put_slice(b"&amp;"),
			_ => panic!("unexpected special character?!"),
		}
		last_index = i + 1;
	}
	out.put_slice(&data[last_index..data.len()]);
}

/// Write the escaped form of text content into a buffer.
pub(crate) fn escape_text_into<B: BufMut>(out: &mut B, data: &str) {
	escape(out, data.as_bytes(), TEXT_SPECIALS)
}

/// Write a double-quoted, escaped attribute value into a buffer.
pub(crate) fn quote_attr_into<B: BufMut>(out: &mut B, data: &str) {
	out.put_u8(b'"');
	escape(out, data.as_bytes(), ATTR_SPECIALS);
	out.put_u8(b'"');
}

/// Escape text for use as element content.
///
/// Replaces `&` with `&amp;` and `<` with `&lt;`. Text which contains neither
/// is returned unchanged without copying.
///
/// # Example
///
/// ```
/// use elementflow::escape_text;
/// assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c > d");
/// assert_eq!(escape_text("plain"), "plain");
/// ```
pub fn escape_text(value: &str) -> Cow<'_, str> {
	if !needs_escaping(value, TEXT_SPECIALS) {
		return Cow::Borrowed(value);
	}
	let mut out = Vec::with_capacity(value.len() + 8);
	escape_text_into(&mut out, value);
	// only ASCII was replaced by ASCII, so this is still valid UTF-8
	Cow::Owned(String::from_utf8(out).expect("escaping must preserve UTF-8"))
}

/// Escape and quote an attribute value.
///
/// Replaces `&`, `<` and `"` with their entity references and wraps the
/// result in double quotes.
///
/// # Example
///
/// ```
/// use elementflow::quote_attr;
/// assert_eq!(quote_attr("say \"hi\""), "\"say &quot;hi&quot;\"");
/// ```
pub fn quote_attr(value: &str) -> String {
	let mut out = Vec::with_capacity(value.len() + 2);
	quote_attr_into(&mut out, value);
	String::from_utf8(out).expect("escaping must preserve UTF-8")
}

/// Make a string safe for use as the body of a comment.
///
/// Comments have no escaping mechanism, so every `--` is removed. A trailing
/// `-` is removed as well, since it would merge with the `-->` terminator.
///
/// # Example
///
/// ```
/// use elementflow::comment_body;
/// assert_eq!(comment_body("--comm-->ent--"), "comm>ent");
/// ```
pub fn comment_body(value: &str) -> Cow<'_, str> {
	if !value.contains("--") && !value.ends_with('-') {
		return Cow::Borrowed(value);
	}
	let mut stripped = value.replace("--", "");
	while stripped.ends_with('-') {
		stripped.pop();
	}
	Cow::Owned(stripped)
}

/// Return the namespace prefix of a qualified name, if it has one.
///
/// The prefix is everything before the first colon; it may be empty for
/// malformed names like `:foo`.
pub fn prefix_of(name: &str) -> Option<&str> {
	name.find(PREFIX_SEPARATOR).map(|i| &name[..i])
}
