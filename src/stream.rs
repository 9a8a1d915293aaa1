/*!
# Chunked output

A generator bound to a [`BufferQueue`] can be turned into a pull-based
sequence of byte chunks: each step emits one record and hands out the
accumulated bytes once enough have piled up. The consumer drives the pace;
generation only advances when the next chunk is requested.

```
use elementflow::{BufferQueue, Generator, Options, Tag};

let xml = Generator::open(BufferQueue::new(), "people", Options::default()).unwrap();
let chunks = xml.chunks(0..3, 32, |xml, i| {
	xml.element(Tag::new("person").attr("id", i.to_string()), "")
});
let mut doc = Vec::new();
for chunk in chunks {
	doc.extend_from_slice(&chunk.unwrap());
}
assert!(std::str::from_utf8(&doc).unwrap().ends_with(
	"<people><person id=\"0\"/><person id=\"1\"/><person id=\"2\"/></people>"
));
```
*/
use std::fmt;

use bytes::Bytes;

#[cfg(feature = "async")]
use std::{
	cmp, io,
	pin::Pin,
	task::{Context, Poll},
};

#[cfg(all(feature = "stream", not(feature = "async")))]
use std::{
	pin::Pin,
	task::{Context, Poll},
};

#[cfg(feature = "async")]
use tokio::io::{AsyncRead, ReadBuf};

#[cfg(feature = "stream")]
use futures_core::stream::Stream;

use crate::bufq::BufferQueue;
#[cfg(feature = "async")]
use crate::error::Error;
use crate::error::Result;
use crate::generator::Generator;

impl Generator<BufferQueue> {
	/// Emit one record per item and yield the output in chunks.
	///
	/// After each call to `emit`, the buffered output is handed out if it
	/// holds at least `threshold` bytes. Once `items` is exhausted, the root
	/// element is closed and the remaining output is handed out as the final
	/// chunk. The first chunk also contains the XML declaration and the start
	/// tag of the root element.
	pub fn chunks<I, F>(self, items: I, threshold: usize, emit: F) -> Chunks<I::IntoIter, F>
	where
		I: IntoIterator,
		F: FnMut(&mut Generator<BufferQueue>, I::Item) -> Result<()>,
	{
		Chunks {
			generator: Some(self),
			items: items.into_iter(),
			emit,
			threshold,
		}
	}
}

/**
Iterator over the chunks of a document.

Created by [`Generator::chunks`]. Each item is either a non-empty chunk of
output or the error which stopped generation. After an error, or after the
final chunk, the iterator only returns `None`; a consumer which stops early
is left with an incomplete document.
*/
pub struct Chunks<I, F> {
	generator: Option<Generator<BufferQueue>>,
	items: I,
	emit: F,
	threshold: usize,
}

impl<I, F> Chunks<I, F> {
	/// Whether the document has been completed or generation failed.
	pub fn is_done(&self) -> bool {
		self.generator.is_none()
	}

	fn finish(&mut self) -> Option<Result<Bytes>> {
		let mut generator = self.generator.take()?;
		if let Err(e) = generator.close() {
			log::debug!("failed to close chunked document: {}", e);
			return Some(Err(e));
		}
		let rest = generator.into_inner().drain();
		log::trace!("yielding final chunk of {} bytes", rest.len());
		if rest.is_empty() {
			None
		} else {
			Some(Ok(rest))
		}
	}
}

impl<I, F> Iterator for Chunks<I, F>
where
	I: Iterator,
	F: FnMut(&mut Generator<BufferQueue>, I::Item) -> Result<()>,
{
	type Item = Result<Bytes>;

	fn next(&mut self) -> Option<Result<Bytes>> {
		loop {
			let generator = self.generator.as_mut()?;
			let item = match self.items.next() {
				Some(item) => item,
				None => return self.finish(),
			};
			if let Err(e) = (self.emit)(generator, item) {
				log::debug!("chunked generation failed: {}", e);
				self.generator = None;
				return Some(Err(e));
			}
			let queued = generator.get_ref().len();
			if queued > 0 && queued >= self.threshold {
				log::trace!("yielding chunk of {} bytes", queued);
				return Some(Ok(generator.get_mut().drain()));
			}
		}
	}
}

impl<I, F> fmt::Debug for Chunks<I, F> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Chunks")
			.field("threshold", &self.threshold)
			.field("done", &self.is_done())
			.finish()
	}
}

#[cfg(feature = "stream")]
#[cfg_attr(docsrs, doc(cfg(feature = "stream")))]
impl<I, F> Stream for Chunks<I, F>
where
	I: Iterator + Unpin,
	F: FnMut(&mut Generator<BufferQueue>, I::Item) -> Result<()> + Unpin,
{
	type Item = Result<Bytes>;

	fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Bytes>>> {
		Poll::Ready(self.get_mut().next())
	}
}

#[cfg(feature = "async")]
fn into_io_error(e: Error) -> io::Error {
	match e {
		Error::IO(e) => e,
		other => io::Error::new(io::ErrorKind::InvalidData, other),
	}
}

/**
[`tokio::io::AsyncRead`] over the chunks of a document.

This lets a network layer copy a generated document into a socket with
[`tokio::io::copy`]. Generation errors other than sink errors are reported
as [`io::ErrorKind::InvalidData`], wrapping the original [`Error`].

```
use tokio::io::AsyncReadExt;
use elementflow::{BufferQueue, Generator, Options};

# tokio_test::block_on(async {
let xml = Generator::open(BufferQueue::new(), "root", Options::default()).unwrap();
let mut reader = xml.chunks(vec!["a", "b"], 16, |xml, name| xml.element(name, "")).into_reader();
let mut doc = String::new();
reader.read_to_string(&mut doc).await.unwrap();
assert!(doc.ends_with("<root><a/><b/></root>"));
# })
```
*/
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub struct ChunkReader<I, F> {
	chunks: Chunks<I, F>,
	pending: Bytes,
}

#[cfg(feature = "async")]
impl<I, F> Chunks<I, F> {
	/// Convert the chunks into an [`AsyncRead`].
	pub fn into_reader(self) -> ChunkReader<I, F> {
		ChunkReader {
			chunks: self,
			pending: Bytes::new(),
		}
	}
}

#[cfg(feature = "async")]
impl<I, F> AsyncRead for ChunkReader<I, F>
where
	I: Iterator + Unpin,
	F: FnMut(&mut Generator<BufferQueue>, I::Item) -> Result<()> + Unpin,
{
	fn poll_read(
		self: Pin<&mut Self>,
		_cx: &mut Context<'_>,
		buf: &mut ReadBuf<'_>,
	) -> Poll<io::Result<()>> {
		let this = self.get_mut();
		while this.pending.is_empty() {
			match this.chunks.next() {
				None => return Poll::Ready(Ok(())),
				Some(Ok(chunk)) => this.pending = chunk,
				Some(Err(e)) => return Poll::Ready(Err(into_io_error(e))),
			}
		}
		let n = cmp::min(buf.remaining(), this.pending.len());
		buf.put_slice(&this.pending.split_to(n));
		Poll::Ready(Ok(()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::error::Error;
	use crate::generator::Options;
	use crate::tag::Tag;

	fn people(n: usize) -> Vec<String> {
		(0..n).map(|i| format!("person {}", i)).collect()
	}

	fn emit_person(xml: &mut Generator<BufferQueue>, name: String) -> Result<()> {
		xml.with_container(Tag::new("person").attr("id", name.len().to_string()), |p| {
			p.element("name", &name)
		})
	}

	fn open() -> Generator<BufferQueue> {
		Generator::open(BufferQueue::new(), "people", Options::default()).unwrap()
	}

	fn direct(n: usize) -> Vec<u8> {
		let mut xml = Generator::open(Vec::new(), "people", Options::default()).unwrap();
		for name in people(n) {
			xml.with_container(Tag::new("person").attr("id", name.len().to_string()), |p| {
				p.element("name", &name)
			})
			.unwrap();
		}
		xml.close().unwrap();
		xml.into_inner()
	}

	#[test]
	fn chunks_concatenate_to_direct_output() {
		let chunks: Vec<Bytes> = open()
			.chunks(people(50), 100, emit_person)
			.map(|c| c.unwrap())
			.collect();
		assert!(chunks.len() > 1);
		let joined: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
		assert_eq!(joined, direct(50));
	}

	#[test]
	fn chunks_respect_threshold() {
		let chunks: Vec<Bytes> = open()
			.chunks(people(50), 100, emit_person)
			.map(|c| c.unwrap())
			.collect();
		let (last, rest) = chunks.split_last().unwrap();
		for chunk in rest {
			assert!(chunk.len() >= 100);
		}
		assert!(!last.is_empty());
		assert!(last.ends_with(b"</people>"));
	}

	#[test]
	fn large_threshold_yields_single_chunk() {
		let chunks: Vec<Bytes> = open()
			.chunks(people(3), 1 << 20, emit_person)
			.map(|c| c.unwrap())
			.collect();
		assert_eq!(chunks.len(), 1);
		assert_eq!(&chunks[0][..], &direct(3)[..]);
	}

	#[test]
	fn no_items_yields_empty_root() {
		let mut chunks = open().chunks(Vec::<String>::new(), 10, emit_person);
		match chunks.next() {
			Some(Ok(chunk)) => assert!(chunk.ends_with(b"<people></people>")),
			other => panic!("unexpected chunk: {:?}", other),
		}
		assert!(chunks.is_done());
		assert!(chunks.next().is_none());
	}

	#[test]
	fn error_fuses_iterator() {
		let mut chunks = open().chunks(vec!["a", "b:c", "d"], 1, |xml, name| xml.element(name, ""));
		match chunks.next() {
			Some(Ok(chunk)) => assert!(chunk.ends_with(b"<people><a/>")),
			other => panic!("unexpected chunk: {:?}", other),
		}
		match chunks.next() {
			Some(Err(Error::UnknownNamespacePrefix(prefix))) => assert_eq!(prefix, "b"),
			other => panic!("unexpected chunk: {:?}", other),
		}
		assert!(chunks.is_done());
		assert!(chunks.next().is_none());
	}

	#[test]
	fn abandoned_container_fails_final_close() {
		let mut chunks = open().chunks(vec![1], 1 << 20, |xml, _| {
			let mut c = xml.container("open")?;
			c.text("never closed")
		});
		match chunks.next() {
			Some(Err(Error::InvalidState(_))) => (),
			other => panic!("unexpected chunk: {:?}", other),
		}
		assert!(chunks.next().is_none());
	}

	#[cfg(feature = "async")]
	#[tokio::test]
	async fn reader_produces_whole_document() {
		use tokio::io::AsyncReadExt;

		let mut reader = open().chunks(people(20), 64, emit_person).into_reader();
		let mut doc = Vec::new();
		reader.read_to_end(&mut doc).await.unwrap();
		assert_eq!(doc, direct(20));
	}

	#[cfg(feature = "async")]
	#[tokio::test]
	async fn reader_handles_small_reads() {
		use tokio::io::AsyncReadExt;

		let mut reader = open().chunks(people(5), 1 << 20, emit_person).into_reader();
		let mut doc = Vec::new();
		let mut buf = [0u8; 7];
		loop {
			let n = reader.read(&mut buf[..]).await.unwrap();
			if n == 0 {
				break;
			}
			assert!(n <= 7);
			doc.extend_from_slice(&buf[..n]);
		}
		assert_eq!(doc, direct(5));
	}

	#[cfg(feature = "async")]
	#[tokio::test]
	async fn reader_maps_generation_errors() {
		use tokio::io::AsyncReadExt;

		let mut reader = open()
			.chunks(vec!["x:y"], 1, |xml, name| xml.element(name, ""))
			.into_reader();
		let mut doc = Vec::new();
		match reader.read_to_end(&mut doc).await {
			Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
			other => panic!("unexpected read result: {:?}", other),
		}
	}

	#[cfg(feature = "stream")]
	#[test]
	fn stream_yields_same_chunks() {
		use std::task::Poll;

		let expected: Vec<Bytes> = open()
			.chunks(people(30), 80, emit_person)
			.map(|c| c.unwrap())
			.collect();
		let mut stream = tokio_test::task::spawn(open().chunks(people(30), 80, emit_person));
		let mut got = Vec::new();
		loop {
			match stream.poll_next() {
				Poll::Ready(Some(Ok(chunk))) => got.push(chunk),
				Poll::Ready(None) => break,
				other => panic!("unexpected poll result: {:?}", other),
			}
		}
		assert_eq!(got, expected);
	}
}
