//! Scripted in-memory printer for tests and dry runs

use crate::bidi::PrinterStream;
use std::collections::VecDeque;

/// A printer that replays queued responses and records every write
#[derive(Debug, Clone, Default)]
pub struct MockPrinter {
    responses: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    accept_limit: Option<usize>,
    reads: usize,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the bytes returned by the next read
    pub fn respond(mut self, data: &[u8]) -> Self {
        self.responses.push_back(data.to_vec());
        self
    }

    /// Accept at most `limit` bytes per write
    pub fn accept_at_most(mut self, limit: usize) -> Self {
        self.accept_limit = Some(limit);
        self
    }

    pub fn push_response(&mut self, data: &[u8]) {
        self.responses.push_back(data.to_vec());
    }

    /// Frames written so far, truncated to what was accepted
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn pending_responses(&self) -> usize {
        self.responses.len()
    }
}

impl PrinterStream for MockPrinter {
    fn write(&mut self, data: &[u8]) -> usize {
        let accepted = self.accept_limit.map_or(data.len(), |limit| data.len().min(limit));
        self.writes.push(data[..accepted].to_vec());
        accepted
    }

    fn read(&mut self, max_len: usize) -> Vec<u8> {
        self.reads += 1;
        let mut data = self.responses.pop_front().unwrap_or_default();
        data.truncate(max_len);
        data
    }
}
