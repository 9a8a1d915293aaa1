/*!
# Error types

This module holds the error type returned by the generator and its layers.

All errors are fatal to the document being generated: whatever was written
to the sink before the error stays there, and the document is not completed.
It is up to the caller to decide what to do with a partially written,
non-well-formed document.
*/
use std::error;
use std::fmt;
use std::io;
use std::result::Result as StdResult;

use rxml_validation::Error as ValidationError;

/// Error conditions which may be returned from the generator.
#[derive(Debug)]
pub enum Error {
	/// The sink failed to accept data.
	///
	/// The error returned by the sink is passed on unchanged. After a sink
	/// error, the writer is in the [`State::Aborted`](crate::State::Aborted)
	/// state.
	IO(io::Error),

	/// An element or attribute name used a prefix which is not declared in
	/// any visible scope.
	///
	/// Contains the offending prefix.
	UnknownNamespacePrefix(String),

	/// Attempt to bind the `xmlns` prefix, or to bind the `xml` prefix to
	/// anything but the XML namespace.
	///
	/// Contains the offending prefix.
	ReservedNamespacePrefix(String),

	/// An element or attribute name does not match the `Name` production of
	/// XML 1.0.
	InvalidName(String, ValidationError),

	/// Text, an attribute value or a comment contains a codepoint which is
	/// not allowed in XML 1.0 documents.
	InvalidText(ValidationError),

	/// The operation is not allowed in the current state of the generator.
	///
	/// The string indicates the context and should not be interpreted by user
	/// code.
	InvalidState(&'static str),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub(crate) fn invalid_name(name: &str, e: ValidationError) -> Error {
		Error::InvalidName(name.to_string(), e)
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::IO(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::IO(e) => write!(f, "I/O error: {}", e),
			Error::UnknownNamespacePrefix(prefix) => {
				write!(f, "unknown namespace prefix: {:?}", prefix)
			}
			Error::ReservedNamespacePrefix(prefix) => {
				write!(f, "reserved namespace prefix: {:?}", prefix)
			}
			Error::InvalidName(name, e) => write!(f, "invalid name {:?}: {}", name, e),
			Error::InvalidText(e) => write!(f, "invalid character data: {}", e),
			Error::InvalidState(msg) => write!(f, "invalid state: {}", msg),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::IO(e) => Some(e),
			Error::InvalidName(_, e) | Error::InvalidText(e) => Some(e),
			Error::UnknownNamespacePrefix(_)
			| Error::ReservedNamespacePrefix(_)
			| Error::InvalidState(_) => None,
		}
	}
}
