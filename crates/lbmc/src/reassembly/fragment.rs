// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fragmented message reassembly.
//!
//! A message larger than one frame is sent as several messages, each with a
//! FRAG header carrying `(first_sqn, offset, total_len)`. Fragments can arrive
//! out of order, duplicated, or never. This module keeps:
//!
//! - In-flight assemblies keyed by (channel, destination address, destination
//!   port, first_sqn), in an LRU bounded by `max_pending_assemblies`
//! - Completed assemblies, remembering the frame that completed them so later
//!   fragments of the same message are reported rather than reapplied. The
//!   markers live in an LRU bounded by `max_completed_assemblies`; the
//!   reassembled bytes of the most recent completions are kept in a second
//!   LRU (`max_pending_assemblies` slots) so a redelivered completing frame
//!   reports the same payload
//!
//! Per key: `NoAssembly -> Assembling -> Complete(frame)`. Complete is terminal
//! for as long as the key is remembered.

use std::net::Ipv4Addr;
use std::num::NonZeroUsize;

use lru::LruCache;

use super::ranges::RangeSet;
use crate::config::DecoderConfig;
use crate::core::FrameMarker;
use crate::error::{DecodeError, Result};
use crate::protocol::FragmentInfo;

/// Identity of one fragmented message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub channel: u64,
    pub destination: Ipv4Addr,
    pub port: u16,
    pub first_sqn: u32,
}

/// Accumulated fragments of one message.
#[derive(Debug, Clone)]
pub struct FragmentedMessageAssembly {
    key: FragmentKey,
    total_len: u32,
    msgprop_len: u32,
    ranges: RangeSet,
    first_frame: FrameMarker,
    last_frame: FrameMarker,
}

impl FragmentedMessageAssembly {
    pub fn new(key: FragmentKey, total_len: u32, frame: FrameMarker) -> Self {
        Self {
            key,
            total_len,
            msgprop_len: 0,
            ranges: RangeSet::new(),
            first_frame: frame,
            last_frame: frame,
        }
    }

    pub fn key(&self) -> FragmentKey {
        self.key
    }

    pub fn total_len(&self) -> u32 {
        self.total_len
    }

    pub fn accumulated_len(&self) -> u32 {
        // covered() never exceeds total_len, which is a u32
        self.ranges.covered() as u32
    }

    pub fn first_frame(&self) -> FrameMarker {
        self.first_frame
    }

    pub fn last_frame(&self) -> FrameMarker {
        self.last_frame
    }

    /// Trailing message-properties length announced by any fragment.
    pub fn msgprop_len(&self) -> u32 {
        self.msgprop_len
    }

    pub fn note_msgprop_len(&mut self, len: u32) {
        self.msgprop_len = self.msgprop_len.max(len);
    }

    /// Add one fragment's bytes. Returns the number of newly covered bytes.
    ///
    /// A fragment reaching past `total_len` is rejected without touching the
    /// assembly; an exact duplicate adds nothing.
    pub fn add_fragment(
        &mut self,
        offset: u32,
        bytes: &[u8],
        frame: FrameMarker,
        strict: bool,
    ) -> Result<u32> {
        check_bounds(offset, bytes.len(), self.total_len)?;
        let added = self.ranges.insert(offset, bytes, strict)?;
        self.last_frame = self.last_frame.max(frame);
        Ok(added as u32)
    }

    pub fn is_complete(&self) -> bool {
        self.ranges.covered() == self.total_len as u64
    }

    /// Ranges still missing, as half-open `(start, end)`.
    pub fn missing(&self) -> Vec<(u32, u32)> {
        self.ranges.missing(self.total_len)
    }

    /// Concatenate the fragments and split off the trailing `msgprop_len`
    /// bytes as the message-properties region.
    pub fn materialize(&self, msgprop_len: u32) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut payload = self.ranges.concat(self.total_len)?;
        if msgprop_len > self.total_len {
            return Err(DecodeError::Truncated {
                what: "message properties",
                declared: msgprop_len as usize,
                available: self.total_len as usize,
            });
        }
        let properties = payload.split_off((self.total_len - msgprop_len) as usize);
        Ok((payload, properties))
    }
}

fn check_bounds(offset: u32, len: usize, total: u32) -> Result<()> {
    if offset as u64 + len as u64 > total as u64 {
        return Err(DecodeError::InvalidFragment {
            offset,
            len,
            total,
            reason: "fragment extends past declared total length",
        });
    }
    Ok(())
}

/// Reassembly state reported for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyStatus {
    NotFragmented,
    /// Fragment applied; message still incomplete.
    Pending { accumulated: u32, total: u32 },
    /// Message completed by this frame.
    Completed { frame: FrameMarker },
    /// Message had already been completed by an earlier frame.
    AlreadyCompleted { frame: FrameMarker },
    /// Fragment was not applied.
    Dropped,
}

/// What feeding one fragment produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentOutcome {
    pub status: ReassemblyStatus,
    /// Reassembled payload and properties, when `status` is `Completed`.
    pub reassembled: Option<(Vec<u8>, Vec<u8>)>,
    pub error: Option<DecodeError>,
}

impl FragmentOutcome {
    fn status(status: ReassemblyStatus) -> Self {
        Self {
            status,
            reassembled: None,
            error: None,
        }
    }

    fn dropped(error: DecodeError) -> Self {
        Self {
            status: ReassemblyStatus::Dropped,
            reassembled: None,
            error: Some(error),
        }
    }
}

/// Counters for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FragmentTableStats {
    pub accepted: u64,
    pub rejected: u64,
    pub completed: u64,
    pub evicted: u64,
}

/// All fragment reassembly state of a session.
pub struct FragmentTable {
    pending: LruCache<FragmentKey, FragmentedMessageAssembly>,
    completed: LruCache<FragmentKey, FrameMarker>,
    recent: LruCache<FragmentKey, (Vec<u8>, Vec<u8>)>,
    max_message_len: u32,
    strict_overlap: bool,
    stats: FragmentTableStats,
}

impl FragmentTable {
    pub fn new(config: &DecoderConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_pending_assemblies).unwrap_or(NonZeroUsize::MIN);
        let history =
            NonZeroUsize::new(config.max_completed_assemblies).unwrap_or(NonZeroUsize::MIN);
        Self {
            pending: LruCache::new(cap),
            completed: LruCache::new(history),
            recent: LruCache::new(cap),
            max_message_len: config.max_message_len,
            strict_overlap: config.strict_overlap,
            stats: FragmentTableStats::default(),
        }
    }

    /// Look up the in-flight assembly for `key`, allocating it if needed.
    ///
    /// Fails when `total_len` exceeds the configured ceiling or disagrees
    /// with the total an existing assembly was created with.
    pub fn find_or_create(
        &mut self,
        key: FragmentKey,
        total_len: u32,
        frame: FrameMarker,
    ) -> Result<&mut FragmentedMessageAssembly> {
        if total_len > self.max_message_len {
            log::warn!(
                "[FragTable] sqn={} declares {} bytes, limit is {}",
                key.first_sqn,
                total_len,
                self.max_message_len
            );
            return Err(DecodeError::InvalidFragment {
                offset: 0,
                len: 0,
                total: total_len,
                reason: "declared total length exceeds configured maximum",
            });
        }
        if let Some(existing) = self.pending.peek(&key) {
            if existing.total_len != total_len {
                return Err(DecodeError::InvalidFragment {
                    offset: 0,
                    len: 0,
                    total: total_len,
                    reason: "declared total length differs from earlier fragments",
                });
            }
        } else if self.pending.len() == self.pending.cap().get() {
            if let Some((old_key, old)) = self.pending.pop_lru() {
                log::warn!(
                    "[FragTable] LRU EVICT: channel={} sqn={} ({}/{} bytes, first frame {})",
                    old_key.channel,
                    old_key.first_sqn,
                    old.accumulated_len(),
                    old.total_len,
                    old.first_frame
                );
                self.stats.evicted += 1;
            }
        }
        Ok(self
            .pending
            .get_or_insert_mut(key, || FragmentedMessageAssembly::new(key, total_len, frame)))
    }

    /// Feed one fragment carried by `frame`.
    ///
    /// `bytes` is the fragment's slice of the message, `msgprop_len` the
    /// properties length announced by this fragment's header chain.
    pub fn on_fragment(
        &mut self,
        key: FragmentKey,
        info: FragmentInfo,
        bytes: &[u8],
        msgprop_len: u32,
        frame: FrameMarker,
    ) -> FragmentOutcome {
        crate::trace_fn!("FragmentTable::on_fragment");
        if let Some(&done) = self.completed.get(&key) {
            if done == frame {
                // Same frame delivered again: report the same completion.
                if let Some((payload, properties)) = self.recent.get(&key) {
                    return FragmentOutcome {
                        status: ReassemblyStatus::Completed { frame },
                        reassembled: Some((payload.clone(), properties.clone())),
                        error: None,
                    };
                }
            }
            log::debug!(
                "[FragTable] sqn={} already reassembled in frame {}",
                key.first_sqn,
                done
            );
            return FragmentOutcome::status(ReassemblyStatus::AlreadyCompleted { frame: done });
        }

        // Rejected fragments must not allocate an assembly or evict one.
        if let Err(e) = check_bounds(info.offset, bytes.len(), info.total_len) {
            log::debug!("[FragTable] sqn={} fragment dropped: {}", key.first_sqn, e);
            self.stats.rejected += 1;
            return FragmentOutcome::dropped(e);
        }

        let strict = self.strict_overlap;
        let applied = self.find_or_create(key, info.total_len, frame).and_then(|assembly| {
            assembly.add_fragment(info.offset, bytes, frame, strict)?;
            assembly.note_msgprop_len(msgprop_len);
            Ok((assembly.accumulated_len(), assembly.is_complete()))
        });

        let (accumulated, complete) = match applied {
            Ok(progress) => progress,
            Err(e) => {
                log::debug!("[FragTable] sqn={} fragment dropped: {}", key.first_sqn, e);
                self.stats.rejected += 1;
                return FragmentOutcome::dropped(e);
            }
        };
        self.stats.accepted += 1;
        log::debug!(
            "[FragTable] channel={} sqn={} offset={} len={} ({}/{} bytes)",
            key.channel,
            key.first_sqn,
            info.offset,
            bytes.len(),
            accumulated,
            info.total_len
        );

        if !complete {
            return FragmentOutcome::status(ReassemblyStatus::Pending {
                accumulated,
                total: info.total_len,
            });
        }

        let Some(assembly) = self.pending.pop(&key) else {
            return FragmentOutcome::status(ReassemblyStatus::Pending {
                accumulated,
                total: info.total_len,
            });
        };
        match assembly.materialize(assembly.msgprop_len()) {
            Ok((payload, properties)) => {
                log::debug!(
                    "[FragTable] [OK] COMPLETE sqn={} ({} bytes) in frame {}",
                    key.first_sqn,
                    assembly.total_len(),
                    frame
                );
                self.stats.completed += 1;
                self.completed.put(key, frame);
                self.recent.put(key, (payload.clone(), properties.clone()));
                FragmentOutcome {
                    status: ReassemblyStatus::Completed { frame },
                    reassembled: Some((payload, properties)),
                    error: None,
                }
            }
            Err(e) => {
                log::debug!(
                    "[FragTable] sqn={} discarded after length match: {}",
                    key.first_sqn,
                    e
                );
                FragmentOutcome::dropped(e)
            }
        }
    }

    /// In-flight assembly for `key`, if any.
    pub fn pending(&self, key: &FragmentKey) -> Option<&FragmentedMessageAssembly> {
        self.pending.peek(key)
    }

    /// Frame that completed `key`, if it has been reassembled.
    pub fn completed_in(&self, key: &FragmentKey) -> Option<FrameMarker> {
        self.completed.peek(key).copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Completed messages still remembered.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn stats(&self) -> FragmentTableStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.completed.clear();
        self.recent.clear();
        self.stats = FragmentTableStats::default();
    }
}
