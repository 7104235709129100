// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded message events handed to the display layer.

use std::borrow::Cow;

use crate::core::FrameMarker;
use crate::error::DecodeError;
use crate::protocol::{BasicHeader, ChainStatus, ExtensionHeaderRecord, FragmentInfo};
use crate::reassembly::{ExtendedOption, ReassemblyStatus};

/// Overall decode quality of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Complete,
    /// Ran out of bytes; whatever was decoded is kept.
    Incomplete,
    /// Structurally invalid; decoding stopped at the offending header.
    Malformed,
}

impl MessageStatus {
    /// Keep the worse of two statuses.
    pub fn worsen(self, other: MessageStatus) -> MessageStatus {
        use MessageStatus::*;
        match (self, other) {
            (Malformed, _) | (_, Malformed) => Malformed,
            (Incomplete, _) | (_, Incomplete) => Incomplete,
            _ => Complete,
        }
    }
}

impl From<ChainStatus> for MessageStatus {
    fn from(status: ChainStatus) -> Self {
        match status {
            ChainStatus::Complete => MessageStatus::Complete,
            ChainStatus::Incomplete => MessageStatus::Incomplete,
            ChainStatus::Malformed => MessageStatus::Malformed,
        }
    }
}

/// Stream correlation of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamUpdate {
    pub stream_id: u64,
    pub substream_id: u32,
    pub new_stream: bool,
    pub new_substream: bool,
}

/// Everything decoded from one LBMC message.
#[derive(Debug, Clone)]
pub struct DecodedMessage<'a> {
    pub frame: FrameMarker,
    /// Offset of the message within its frame.
    pub frame_offset: usize,
    /// `None` when the basic header itself could not be read.
    pub header: Option<BasicHeader>,
    pub headers: Vec<ExtensionHeaderRecord<'a>>,
    pub status: MessageStatus,
    pub fragment: Option<FragmentInfo>,
    pub reassembly: ReassemblyStatus,
    /// Application payload: borrowed for unfragmented messages, owned once
    /// a fragmented message has been reassembled.
    pub payload: Option<Cow<'a, [u8]>>,
    /// Trailing message-properties region.
    pub properties: Option<Cow<'a, [u8]>>,
    pub extended_options: Vec<ExtendedOption>,
    pub stream: Option<StreamUpdate>,
    pub topic: Option<String>,
    pub classification: Option<String>,
    pub diagnostics: Vec<DecodeError>,
}

impl<'a> DecodedMessage<'a> {
    pub(crate) fn new(frame: FrameMarker) -> Self {
        Self {
            frame,
            frame_offset: 0,
            header: None,
            headers: Vec::new(),
            status: MessageStatus::Complete,
            fragment: None,
            reassembly: ReassemblyStatus::NotFragmented,
            payload: None,
            properties: None,
            extended_options: Vec::new(),
            stream: None,
            topic: None,
            classification: None,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn fail(&mut self, status: MessageStatus, error: DecodeError) {
        self.status = self.status.worsen(status);
        self.diagnostics.push(error);
    }

    /// Total message length from the basic header.
    pub fn msglen(&self) -> Option<u16> {
        self.header.map(|h| h.msglen)
    }

    /// Payload is whole: either unfragmented and fully captured, or
    /// reassembled by this frame.
    pub fn has_complete_payload(&self) -> bool {
        if self.payload.is_none() {
            return false;
        }
        match self.reassembly {
            ReassemblyStatus::NotFragmented => self.status != MessageStatus::Incomplete,
            ReassemblyStatus::Completed { .. } => true,
            _ => false,
        }
    }
}
