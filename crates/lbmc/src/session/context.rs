// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-frame context supplied by the host.

use std::net::SocketAddrV4;

use crate::core::FrameMarker;

/// Where a message was captured.
///
/// `channel` is the host's id for the transport entity the frame arrived on
/// (for instance one per UDP flow). Fragments only combine within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    pub frame: FrameMarker,
    pub channel: u64,
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
}

impl FrameContext {
    pub fn new(
        frame: impl Into<FrameMarker>,
        channel: u64,
        source: SocketAddrV4,
        destination: SocketAddrV4,
    ) -> Self {
        Self {
            frame: frame.into(),
            channel,
            source,
            destination,
        }
    }

    /// Same endpoints, another frame.
    pub fn at(self, frame: impl Into<FrameMarker>) -> Self {
        Self {
            frame: frame.into(),
            ..self
        }
    }
}
