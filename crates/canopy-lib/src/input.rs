//! The input reader protocol: chunked, seekable byte access over a
//! document.
//!
//! The runtime depends only on [`Input::read`]; implementations may stream
//! from a file, a memory buffer, or a live editor. Two reads starting at
//! the same offset must yield the same bytes unless an edit has occurred,
//! and the reader must already reflect an edit when
//! [`Document::edit`](crate::Document::edit) is called.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

/// Chunked, seekable access to document bytes.
pub trait Input {
    /// Returns the next chunk of bytes starting at `offset`; an empty
    /// slice means end of input. Every call is an implicit seek.
    fn read(&mut self, offset: usize) -> io::Result<&[u8]>;
}

/// In-memory input over a string.
#[derive(Debug, Clone)]
pub struct StringInput {
    bytes: Vec<u8>,
    chunk_size: usize,
}

impl StringInput {
    pub fn new(text: impl Into<String>) -> StringInput {
        StringInput {
            bytes: text.into().into_bytes(),
            chunk_size: 32,
        }
    }

    pub fn with_chunk_size(text: impl Into<String>, chunk_size: usize) -> StringInput {
        assert!(chunk_size > 0, "chunk size must be positive");
        StringInput {
            bytes: text.into().into_bytes(),
            chunk_size,
        }
    }
}

impl Input for StringInput {
    fn read(&mut self, offset: usize) -> io::Result<&[u8]> {
        let start = offset.min(self.bytes.len());
        let end = (start + self.chunk_size).min(self.bytes.len());
        Ok(&self.bytes[start..end])
    }
}

#[derive(Debug, Default)]
struct SpyState {
    bytes: Vec<u8>,
    chunk_size: usize,
    /// Coalesced `(start, end)` ranges of bytes actually read.
    reads: Vec<(usize, usize)>,
}

/// An input that records every byte range actually read.
///
/// Contiguous reads coalesce into one range; a seek starts a new one. The
/// incremental driver's minimal-re-read property is observed through this
/// record. Cloning yields a handle onto the same underlying state, so a
/// test can keep one handle while the document owns the other.
#[derive(Debug, Clone)]
pub struct SpyInput {
    state: Rc<RefCell<SpyState>>,
    chunk_buf: Vec<u8>,
}

impl SpyInput {
    pub fn new(text: impl Into<String>, chunk_size: usize) -> SpyInput {
        assert!(chunk_size > 0, "chunk size must be positive");
        SpyInput {
            state: Rc::new(RefCell::new(SpyState {
                bytes: text.into().into_bytes(),
                chunk_size,
                reads: Vec::new(),
            })),
            chunk_buf: Vec::new(),
        }
    }

    /// Edits the underlying text; call before `Document::edit`.
    pub fn insert(&self, position: usize, text: &str) {
        let mut state = self.state.borrow_mut();
        state.bytes.splice(position..position, text.bytes());
    }

    /// Deletes `len` bytes; call before `Document::edit`.
    pub fn delete(&self, position: usize, len: usize) {
        let mut state = self.state.borrow_mut();
        state.bytes.drain(position..position + len);
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.state.borrow().bytes.clone()).expect("spy text is UTF-8")
    }

    /// The recorded reads, as strings of the bytes each contiguous run
    /// returned.
    pub fn strings_read(&self) -> Vec<String> {
        let state = self.state.borrow();
        state
            .reads
            .iter()
            .map(|&(start, end)| {
                String::from_utf8_lossy(&state.bytes[start..end]).into_owned()
            })
            .collect()
    }

    /// Forgets recorded reads (typically after the initial parse).
    pub fn clear(&self) {
        self.state.borrow_mut().reads.clear();
    }
}

impl Input for SpyInput {
    fn read(&mut self, offset: usize) -> io::Result<&[u8]> {
        let mut state = self.state.borrow_mut();
        let start = offset.min(state.bytes.len());
        let end = (start + state.chunk_size).min(state.bytes.len());
        if end > start {
            match state.reads.last_mut() {
                Some(last) if last.1 == start => last.1 = end,
                _ => state.reads.push((start, end)),
            }
        }
        self.chunk_buf.clear();
        self.chunk_buf.extend_from_slice(&state.bytes[start..end]);
        drop(state);
        Ok(&self.chunk_buf)
    }
}
