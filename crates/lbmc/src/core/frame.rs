// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque, totally ordered frame marker supplied by the host.

use std::fmt;

/// Position of a captured frame in arrival order.
///
/// Only compared and displayed; the decoder never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameMarker(pub u64);

impl fmt::Display for FrameMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameMarker {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
