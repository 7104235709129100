// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sparse, ordered set of received byte ranges.
//!
//! Spans are kept sorted by offset and never overlap. Inserting a range only
//! stores the parts not already covered, so duplicates and partial overlaps
//! cost nothing and `covered()` counts each byte once. Memory is bounded by
//! what actually arrived, not by the peer-declared total.

use crate::error::{DecodeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    offset: u32,
    data: Vec<u8>,
}

impl Span {
    fn end(&self) -> u64 {
        self.offset as u64 + self.data.len() as u64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    spans: Vec<Span>,
    covered: u64,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes covered so far.
    pub fn covered(&self) -> u64 {
        self.covered
    }

    /// Number of disjoint spans stored.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Insert `bytes` at `offset`, returning how many bytes were new.
    ///
    /// With `strict`, bytes overlapping existing coverage must match it or
    /// the insert fails with [`DecodeError::ConflictingFragment`] and nothing
    /// is stored. A range ending past `u32::MAX` is rejected with
    /// [`DecodeError::InvalidFragment`].
    pub fn insert(&mut self, offset: u32, bytes: &[u8], strict: bool) -> Result<u64> {
        if bytes.is_empty() {
            return Ok(0);
        }
        let start = offset as u64;
        let end = start + bytes.len() as u64;
        if end > u32::MAX as u64 {
            return Err(DecodeError::InvalidFragment {
                offset,
                len: bytes.len(),
                total: u32::MAX,
                reason: "range ends past the largest representable offset",
            });
        }

        // First span that ends after our start; everything before is disjoint.
        let first = self.spans.partition_point(|s| s.end() <= start);

        let mut pieces: Vec<(u64, u64)> = Vec::new();
        let mut pos = start;
        for span in self.spans[first..].iter().take_while(|s| (s.offset as u64) < end) {
            let span_start = span.offset as u64;
            if span_start > pos {
                pieces.push((pos, span_start));
            }
            if strict {
                let lo = span_start.max(start);
                let hi = span.end().min(end);
                let existing = &span.data[(lo - span_start) as usize..(hi - span_start) as usize];
                let incoming = &bytes[(lo - start) as usize..(hi - start) as usize];
                if existing != incoming {
                    return Err(DecodeError::ConflictingFragment {
                        offset,
                        len: bytes.len(),
                    });
                }
            }
            pos = pos.max(span.end());
        }
        if pos < end {
            pieces.push((pos, end));
        }

        let mut added = 0;
        for (lo, hi) in pieces {
            let span = Span {
                offset: lo as u32,
                data: bytes[(lo - start) as usize..(hi - start) as usize].to_vec(),
            };
            let idx = self.spans.partition_point(|s| s.offset < span.offset);
            self.spans.insert(idx, span);
            added += hi - lo;
        }
        self.covered += added;
        Ok(added)
    }

    /// Concatenate all spans, checking they tile `[0, total)` exactly.
    pub fn concat(&self, total: u32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.covered as usize);
        let mut expected: u64 = 0;
        for span in &self.spans {
            if span.offset as u64 != expected {
                return Err(DecodeError::Gap {
                    expected: expected as u32,
                    found: span.offset,
                });
            }
            out.extend_from_slice(&span.data);
            expected = span.end();
        }
        if expected != total as u64 {
            return Err(DecodeError::Gap {
                expected: expected as u32,
                found: total,
            });
        }
        Ok(out)
    }

    /// Ranges of `[0, total)` not yet covered, as half-open `(start, end)`.
    pub fn missing(&self, total: u32) -> Vec<(u32, u32)> {
        let mut gaps = Vec::new();
        let mut pos: u64 = 0;
        for span in &self.spans {
            if span.offset as u64 > pos {
                gaps.push((pos as u32, span.offset));
            }
            pos = pos.max(span.end());
        }
        if pos < total as u64 {
            gaps.push((pos as u32, total));
        }
        gaps
    }
}
