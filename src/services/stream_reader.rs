//! Incremental text decoding of a streamed response body.
//!
//! The backend streams raw UTF-8 (`text/plain`) with no framing, and a
//! multi-byte character can be split across two network chunks. The reader
//! holds back an incomplete trailing sequence until the next chunk arrives.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::error::BackendError;

/// Raw body chunks of a streamed backend call
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, BackendError>> + Send>>;

pub struct StreamReader {
    inner: ChunkStream,
    pending: Vec<u8>,
    finished: bool,
}

impl StreamReader {
    pub fn new(inner: ChunkStream) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            finished: false,
        }
    }

    /// Next non-empty text chunk in arrival order, `None` once the body ends.
    pub async fn next_chunk(&mut self) -> Option<Result<String, BackendError>> {
        while !self.finished {
            match self.inner.next().await {
                Some(Ok(bytes)) => {
                    self.pending.extend_from_slice(&bytes);
                    let text = self.decode_available();
                    if !text.is_empty() {
                        return Some(Ok(text));
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    if !self.pending.is_empty() {
                        let rest = String::from_utf8_lossy(&self.pending).into_owned();
                        self.pending.clear();
                        return Some(Ok(rest));
                    }
                }
            }
        }
        None
    }

    fn decode_available(&mut self) -> String {
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Invalid bytes mid-stream: replace and keep going
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }
}
