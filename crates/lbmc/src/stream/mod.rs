// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream and substream correlation.
//!
//! A Stream is one bidirectional conversation between two endpoints, keyed
//! by a [`StreamIdentity`] whose endpoints are stored in canonical order so
//! both directions land on the same Stream. Each Stream is split into
//! Substreams per (source, destination, message stream id), numbered from a
//! per-Stream counter that is never rewound.

use std::collections::HashMap;
use std::net::SocketAddrV4;

use crate::core::FrameMarker;
use crate::protocol::constants::CTXINST_LEN;
use crate::protocol::DomainEndpoint;

/// One side of a conversation.
///
/// Context instances compare byte-lexicographically, address triples in
/// (domain, address, port) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamEndpoint {
    ContextInstance([u8; CTXINST_LEN]),
    Address(DomainEndpoint),
}

/// Canonically ordered endpoint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamIdentity {
    low: StreamEndpoint,
    high: StreamEndpoint,
}

impl StreamIdentity {
    pub fn new(a: StreamEndpoint, b: StreamEndpoint) -> Self {
        if b < a {
            Self { low: b, high: a }
        } else {
            Self { low: a, high: b }
        }
    }

    /// Endpoints, smaller first.
    pub fn endpoints(&self) -> (StreamEndpoint, StreamEndpoint) {
        (self.low, self.high)
    }
}

/// Source of Stream ids.
pub trait IdAllocator {
    fn next_stream_id(&mut self) -> u64;
}

/// Allocates 1, 2, 3, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator for SequentialIds {
    fn next_stream_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

/// Substream key within a Stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubstreamKey {
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
    /// Stream id carried in the message's STREAM header.
    pub stream_id: u32,
}

/// Message/byte counters with first/last seen frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    pub messages: u64,
    pub bytes: u64,
    pub first_frame: FrameMarker,
    pub last_frame: FrameMarker,
}

impl Activity {
    fn new(frame: FrameMarker) -> Self {
        Self {
            messages: 0,
            bytes: 0,
            first_frame: frame,
            last_frame: frame,
        }
    }

    fn record(&mut self, bytes: u64, frame: FrameMarker) {
        self.messages += 1;
        self.bytes += bytes;
        self.first_frame = self.first_frame.min(frame);
        self.last_frame = self.last_frame.max(frame);
    }
}

#[derive(Debug, Clone)]
pub struct Substream {
    pub id: u32,
    pub key: SubstreamKey,
    pub activity: Activity,
}

#[derive(Debug, Clone)]
pub struct Stream {
    pub id: u64,
    pub identity: StreamIdentity,
    pub activity: Activity,
    next_substream_id: u32,
    substreams: HashMap<SubstreamKey, Substream>,
}

impl Stream {
    fn new(id: u64, identity: StreamIdentity, frame: FrameMarker) -> Self {
        Self {
            id,
            identity,
            activity: Activity::new(frame),
            next_substream_id: 0,
            substreams: HashMap::new(),
        }
    }

    /// Substream id for `key`, allocating the next one on first sight.
    /// Returns `(id, created)`.
    pub fn find_or_create_substream(&mut self, key: SubstreamKey, frame: FrameMarker) -> (u32, bool) {
        if let Some(existing) = self.substreams.get(&key) {
            return (existing.id, false);
        }
        let id = self.next_substream_id;
        self.next_substream_id += 1;
        log::debug!(
            "[Streams] stream {} new substream {} ({} -> {}, id {})",
            self.id,
            id,
            key.source,
            key.destination,
            key.stream_id
        );
        self.substreams.insert(
            key,
            Substream {
                id,
                key,
                activity: Activity::new(frame),
            },
        );
        (id, true)
    }

    /// Count one message of `bytes` on the substream and on this Stream.
    /// Unknown keys only update the Stream.
    pub fn record(&mut self, key: &SubstreamKey, bytes: u64, frame: FrameMarker) {
        if let Some(sub) = self.substreams.get_mut(key) {
            sub.activity.record(bytes, frame);
        }
        self.activity.record(bytes, frame);
    }

    pub fn substream(&self, key: &SubstreamKey) -> Option<&Substream> {
        self.substreams.get(key)
    }

    /// Substreams in id order.
    pub fn substreams(&self) -> Vec<&Substream> {
        let mut subs: Vec<&Substream> = self.substreams.values().collect();
        subs.sort_by_key(|s| s.id);
        subs
    }
}

/// All Streams of a session.
pub struct StreamTracker {
    streams: HashMap<StreamIdentity, Stream>,
    allocator: Box<dyn IdAllocator>,
}

impl Default for StreamTracker {
    fn default() -> Self {
        Self::new(Box::new(SequentialIds::default()))
    }
}

impl StreamTracker {
    pub fn new(allocator: Box<dyn IdAllocator>) -> Self {
        Self {
            streams: HashMap::new(),
            allocator,
        }
    }

    /// Stream between `a` and `b` in either direction, created on first
    /// sight. Returns `(stream, created)`.
    pub fn find_or_create_stream(
        &mut self,
        a: StreamEndpoint,
        b: StreamEndpoint,
        frame: FrameMarker,
    ) -> (&mut Stream, bool) {
        let identity = StreamIdentity::new(a, b);
        let created = !self.streams.contains_key(&identity);
        let allocator = &mut self.allocator;
        let stream = self.streams.entry(identity).or_insert_with(|| {
            let id = allocator.next_stream_id();
            log::debug!("[Streams] new stream {} {:?}", id, identity.endpoints());
            Stream::new(id, identity, frame)
        });
        (stream, created)
    }

    pub fn get(&self, a: StreamEndpoint, b: StreamEndpoint) -> Option<&Stream> {
        self.streams.get(&StreamIdentity::new(a, b))
    }

    /// All Streams in id order.
    pub fn streams(&self) -> Vec<&Stream> {
        let mut streams: Vec<&Stream> = self.streams.values().collect();
        streams.sort_by_key(|s| s.id);
        streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Forget every Stream. The allocator keeps counting.
    pub fn clear(&mut self) {
        self.streams.clear();
    }
}
