use std::io;

use bytes::{BufMut, Bytes, BytesMut};

/**
Append-only byte accumulator for chunked delivery.

A `BufferQueue` is meant to be used as the sink of a
[`Generator`](crate::Generator): the generator appends through
[`io::Write`], and the driver periodically calls [`BufferQueue::drain`] to
take everything accumulated so far and forward it downstream.

```
use std::io::Write;
use elementflow::BufferQueue;

let mut bq = BufferQueue::new();
bq.write_all(b"<root>").unwrap();
assert_eq!(bq.len(), 6);
assert_eq!(&bq.drain()[..], b"<root>");
assert!(bq.is_empty());
```
*/
#[derive(Debug, Default)]
pub struct BufferQueue {
	buf: BytesMut,
}

impl BufferQueue {
	pub fn new() -> BufferQueue {
		BufferQueue { buf: BytesMut::new() }
	}

	/// Create a queue which can hold `capacity` bytes before reallocating.
	pub fn with_capacity(capacity: usize) -> BufferQueue {
		BufferQueue {
			buf: BytesMut::with_capacity(capacity),
		}
	}

	/// Append bytes to the queue.
	pub fn push(&mut self, data: &[u8]) {
		self.buf.put_slice(data);
	}

	/// Number of bytes accumulated since the last drain.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Take all accumulated bytes, leaving the queue empty.
	///
	/// The returned buffer shares the allocation of the queue until the
	/// queue needs to grow; no bytes are copied.
	pub fn drain(&mut self) -> Bytes {
		self.buf.split().freeze()
	}
}

impl io::Write for BufferQueue {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		self.push(data);
		Ok(data.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn bufq_len_grows_with_writes() {
		let mut bq = BufferQueue::new();
		assert_eq!(bq.len(), 0);
		assert!(bq.is_empty());
		bq.write_all(b"foo").unwrap();
		assert_eq!(bq.len(), 3);
		bq.write_all(b"bar").unwrap();
		assert_eq!(bq.len(), 6);
		bq.push(b"2342");
		assert_eq!(bq.len(), 10);
		assert!(!bq.is_empty());
	}

	#[test]
	fn bufq_drain_returns_everything_in_order() {
		let mut bq = BufferQueue::with_capacity(4);
		bq.write_all(b"foo").unwrap();
		bq.write_all(b"bar").unwrap();
		bq.write_all(b"2342").unwrap();
		assert_eq!(&bq.drain()[..], b"foobar2342");
		assert_eq!(bq.len(), 0);
	}

	#[test]
	fn bufq_drain_of_empty_queue_is_empty() {
		let mut bq = BufferQueue::new();
		assert!(bq.drain().is_empty());
	}

	#[test]
	fn bufq_works_with_fillup_after_drain() {
		let mut bq = BufferQueue::new();
		bq.write_all(b"foo").unwrap();
		let first = bq.drain();
		bq.write_all(b"bar").unwrap();
		let second = bq.drain();
		// the first chunk must not see later writes
		assert_eq!(&first[..], b"foo");
		assert_eq!(&second[..], b"bar");
		assert!(bq.is_empty());
	}

	#[test]
	fn bufq_flush_keeps_data() {
		let mut bq = BufferQueue::new();
		bq.write_all(b"foo").unwrap();
		bq.flush().unwrap();
		assert_eq!(bq.len(), 3);
	}
}
