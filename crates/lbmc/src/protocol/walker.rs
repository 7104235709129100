// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extension header chain walker.
//!
//! Extension header layout:
//! ```text
//! Offset | Field     | Size
//! -------|-----------|-----
//! 0      | next_hdr  | 1    type code of the FOLLOWING header
//! 1      | hdr_len   | 1    length of this header, prefix included
//! 2+     | body      | var  interpreted by the HeaderSchema
//! ```
//!
//! The type of a header is the `next_hdr` of its predecessor (the basic
//! header for the first one). The walk stops at `DATA` (payload follows),
//! `NONE`, a zero-length header, or the end of the buffer. Bounds failures
//! keep the records read so far.

use super::constants::{EXT_HDR_PREFIX_LEN, NHDR_DATA, NHDR_NONE};
use super::schema::{
    DestinationInfo, ExtOptFragment, FragmentInfo, HeaderFields, HeaderSchema, StreamInfo,
};
use crate::core::Cursor;
use crate::error::DecodeError;

/// One walked extension header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHeaderRecord<'a> {
    pub type_code: u8,
    pub name: Option<&'static str>,
    /// Offset of the header in the message.
    pub offset: usize,
    pub declared_len: usize,
    /// Type code of the header that follows.
    pub next_hdr: u8,
    /// Raw header bytes, prefix included.
    pub bytes: &'a [u8],
    pub fields: HeaderFields<'a>,
}

impl ExtensionHeaderRecord<'_> {
    pub fn is_unhandled(&self) -> bool {
        matches!(self.fields, HeaderFields::Unhandled)
    }
}

/// How the walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    /// Reached a terminal marker (or cleanly consumed the message).
    Complete,
    /// Ran out of bytes mid-chain.
    Incomplete,
    /// Hit a header the chain cannot advance past.
    Malformed,
}

/// Result of walking one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChain<'a> {
    pub records: Vec<ExtensionHeaderRecord<'a>>,
    /// Terminal marker that ended the walk, if any.
    pub terminal: Option<u8>,
    /// Where the application payload starts (terminal `DATA` only).
    pub payload_offset: Option<usize>,
    pub status: ChainStatus,
    pub diagnostics: Vec<DecodeError>,
}

impl<'a> HeaderChain<'a> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            terminal: None,
            payload_offset: None,
            status: ChainStatus::Complete,
            diagnostics: Vec::new(),
        }
    }

    /// The message's fragment descriptor (first one wins).
    pub fn fragment_info(&self) -> Option<FragmentInfo> {
        self.records.iter().find_map(|r| match r.fields {
            HeaderFields::Fragment(info) => Some(info),
            _ => None,
        })
    }

    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.records.iter().find_map(|r| match r.fields {
            HeaderFields::Stream(info) => Some(info),
            _ => None,
        })
    }

    pub fn destination(&self) -> Option<DestinationInfo> {
        self.records.iter().find_map(|r| match r.fields {
            HeaderFields::Destination(info) => Some(info),
            _ => None,
        })
    }

    /// Sum of all message-properties length contributions.
    pub fn msgprop_len(&self) -> u64 {
        self.records
            .iter()
            .map(|r| match r.fields {
                HeaderFields::MessageProperties { len } => len as u64,
                _ => 0,
            })
            .sum()
    }

    pub fn topic_name(&self) -> Option<&str> {
        self.records.iter().find_map(|r| match &r.fields {
            HeaderFields::TopicName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Extended option fragments in chain order.
    pub fn extended_options(&self) -> impl Iterator<Item = &ExtOptFragment<'a>> + '_ {
        self.records.iter().filter_map(|r| match &r.fields {
            HeaderFields::ExtendedOption(frag) => Some(frag),
            _ => None,
        })
    }

    fn stop(&mut self, status: ChainStatus, error: DecodeError) {
        self.status = status;
        self.diagnostics.push(error);
    }
}

/// Walk the extension header chain of `message` starting at `start`, where
/// the first header has type `first_type`.
pub fn walk<'a>(
    schema: &dyn HeaderSchema,
    message: &'a [u8],
    start: usize,
    first_type: u8,
) -> HeaderChain<'a> {
    crate::trace_fn!("walk");
    let mut chain = HeaderChain::new();
    let mut cursor = Cursor::new(message);
    if let Err(e) = cursor.skip(start) {
        chain.stop(ChainStatus::Incomplete, e);
        return chain;
    }

    let mut type_code = first_type;
    loop {
        if type_code == NHDR_DATA || type_code == NHDR_NONE {
            chain.terminal = Some(type_code);
            if type_code == NHDR_DATA {
                chain.payload_offset = Some(cursor.offset());
            }
            break;
        }

        if cursor.is_eof() {
            // The previous header promised another one.
            chain.stop(
                ChainStatus::Incomplete,
                DecodeError::Truncated {
                    what: "extension header chain",
                    declared: EXT_HDR_PREFIX_LEN,
                    available: 0,
                },
            );
            break;
        }

        let offset = cursor.offset();
        let [next_hdr, hdr_len] = match cursor.clone().read_array::<2>() {
            Ok(prefix) => prefix,
            Err(e) => {
                chain.stop(ChainStatus::Incomplete, e);
                break;
            }
        };

        if hdr_len == 0 {
            log::debug!(
                "[LBMC-WALK] zero-length header 0x{:02x} at offset {}, chain aborted",
                type_code,
                offset
            );
            chain.stop(
                ChainStatus::Malformed,
                DecodeError::ZeroLengthHeader { offset, type_code },
            );
            break;
        }
        if (hdr_len as usize) < EXT_HDR_PREFIX_LEN {
            chain.stop(
                ChainStatus::Malformed,
                DecodeError::MalformedHeader {
                    offset,
                    type_code,
                    reason: "declared length shorter than header prefix",
                },
            );
            break;
        }

        let header = match cursor.sub_view(hdr_len as usize) {
            Ok(view) => view,
            Err(_) => {
                log::debug!(
                    "[LBMC-WALK] header 0x{:02x} at offset {} declares {} bytes, {} left",
                    type_code,
                    offset,
                    hdr_len,
                    cursor.remaining()
                );
                chain.stop(
                    ChainStatus::Incomplete,
                    DecodeError::Truncated {
                        what: "extension header",
                        declared: hdr_len as usize,
                        available: cursor.remaining(),
                    },
                );
                break;
            }
        };

        let bytes = header.rest();
        let fields = match schema.describe(type_code, header) {
            Ok(fields) => fields,
            Err(e) => {
                chain.diagnostics.push(e);
                HeaderFields::Opaque
            }
        };

        log::debug!(
            "[LBMC-WALK] header 0x{:02x} ({}) at offset {} len={} next=0x{:02x}",
            type_code,
            schema.name(type_code).unwrap_or("unhandled"),
            offset,
            hdr_len,
            next_hdr
        );

        chain.records.push(ExtensionHeaderRecord {
            type_code,
            name: schema.name(type_code),
            offset,
            declared_len: hdr_len as usize,
            next_hdr,
            bytes,
            fields,
        });
        type_code = next_hdr;
    }

    chain
}
