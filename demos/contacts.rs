//! Writes a contact list to stdout.
//!
//! Usage: `contacts [COUNT] [--indent] [--chunked BYTES]`
//!
//! With `--chunked`, the document is produced through a `BufferQueue` and
//! written out in chunks of at least `BYTES` bytes. Set `RUST_LOG=trace` to
//! watch the chunks being handed out.
use std::env;
use std::io;
use std::io::Write;

use elementflow::{BufferQueue, Generator, Options, Result, Tag};

fn person<W: io::Write>(xml: &mut Generator<W>) -> Result<()> {
	xml.with_container("person", |p| {
		p.element("name", "John Smith")?;
		p.element("email", "john.smith@megacorp.com")?;
		p.with_container("phones", |phones| {
			phones.element(Tag::new("phone").attr("type", "work"), "123456")?;
			phones.element(Tag::new("phone").attr("type", "home"), "123456")
		})
	})
}

fn main() {
	env_logger::init();

	let mut count = 40000usize;
	let mut options = Options::default();
	let mut chunked = None;
	let mut args = env::args().skip(1);
	while let Some(arg) = args.next() {
		match arg.as_str() {
			"--indent" => options = options.indent(true),
			"--chunked" => {
				let size = args.next().expect("--chunked needs a size");
				chunked = Some(size.parse::<usize>().expect("invalid chunk size"));
			}
			other => count = other.parse().expect("invalid record count"),
		}
	}

	let stdout = io::stdout();
	let mut stdout = stdout.lock();
	let result = match chunked {
		None => elementflow::xml(&mut stdout, "contacts", options, |xml| -> Result<()> {
			for _ in 0..count {
				person(xml)?;
			}
			Ok(())
		})
		.map(|_| ()),
		Some(threshold) => {
			let xml = Generator::open(BufferQueue::with_capacity(threshold * 2), "contacts", options)
				.expect("failed to open document");
			let mut result = Ok(());
			for chunk in xml.chunks(0..count, threshold, |xml, _| person(xml)) {
				match chunk {
					Ok(chunk) => stdout.write_all(&chunk).expect("failed to write to stdout"),
					Err(e) => {
						result = Err(e);
						break;
					}
				}
			}
			result
		}
	};
	match result {
		Ok(()) => (),
		Err(elementflow::Error::IO(e)) => panic!("I/O error: {}", e),
		Err(e) => panic!("failed to generate document: {}", e),
	}
}
