// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LBMC basic header.
//!
//! ```text
//! Data-bearing (Message / ProactiveRetransmission / Retransmission):
//! Offset | Field     | Size
//! -------|-----------|-----
//! 0      | ver_type  | 1    version (high nibble) | kind (low nibble)
//! 1      | next_hdr  | 1    type code of the first extension header
//! 2-3    | msglen    | 2    whole message, basic header included
//! 4-7    | tidx      | 4    topic index
//! 8-11   | sqn       | 4    sequence number
//!
//! Control (EndOfTransmission / Control): only the first 4 bytes.
//! ```

use super::constants::{
    BASIC_HDR_LEN, CNTL_HDR_LEN, TYPE_CONTROL, TYPE_EOT, TYPE_MESSAGE, TYPE_PRORX, TYPE_RETRANS,
};
use crate::core::Cursor;
use crate::error::Result;

/// Message kind from the low nibble of `ver_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Message,
    EndOfTransmission,
    ProactiveRetransmission,
    Control,
    Retransmission,
    /// Unassigned kind; decoded with the short control header.
    Unknown(u8),
}

impl MessageKind {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble {
            TYPE_MESSAGE => MessageKind::Message,
            TYPE_EOT => MessageKind::EndOfTransmission,
            TYPE_PRORX => MessageKind::ProactiveRetransmission,
            TYPE_CONTROL => MessageKind::Control,
            TYPE_RETRANS => MessageKind::Retransmission,
            other => MessageKind::Unknown(other),
        }
    }

    /// Kinds that carry topic index, sequence number and application payload.
    pub fn is_data_bearing(self) -> bool {
        matches!(
            self,
            MessageKind::Message
                | MessageKind::ProactiveRetransmission
                | MessageKind::Retransmission
        )
    }

    /// Size of the basic header for this kind.
    pub fn header_len(self) -> usize {
        if self.is_data_bearing() {
            BASIC_HDR_LEN
        } else {
            CNTL_HDR_LEN
        }
    }
}

/// Decoded basic header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicHeader {
    pub version: u8,
    pub kind: MessageKind,
    pub next_hdr: u8,
    pub msglen: u16,
    pub topic_index: Option<u32>,
    pub sequence: Option<u32>,
}

impl BasicHeader {
    /// Parse the basic header at the cursor position.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let ver_type = cursor.read_u8()?;
        let next_hdr = cursor.read_u8()?;
        let msglen = cursor.read_u16_be()?;
        let kind = MessageKind::from_nibble(ver_type & 0x0F);

        let (topic_index, sequence) = if kind.is_data_bearing() {
            (Some(cursor.read_u32_be()?), Some(cursor.read_u32_be()?))
        } else {
            (None, None)
        };

        Ok(Self {
            version: ver_type >> 4,
            kind,
            next_hdr,
            msglen,
            topic_index,
            sequence,
        })
    }

    pub fn header_len(&self) -> usize {
        self.kind.header_len()
    }
}
