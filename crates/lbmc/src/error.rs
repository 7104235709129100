// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for LBMC decoding.
//!
//! Every error is local to the message being decoded: the session attaches it
//! to that message's diagnostics and moves on to the next one.

use thiserror::Error;

/// Decoding error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read went past the end of the current view.
    #[error("read of {wanted} bytes at offset {offset} exceeds buffer ({available} bytes available)")]
    OutOfBounds {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    /// A length field declares more bytes than were captured.
    #[error("{what} truncated: declared {declared} bytes, {available} available")]
    Truncated {
        what: &'static str,
        declared: usize,
        available: usize,
    },

    /// `msglen` smaller than the basic header that carries it.
    #[error("message length {declared} is smaller than its {minimum}-byte basic header")]
    InvalidLength { declared: usize, minimum: usize },

    /// Extension header with `hdr_len == 0`; the chain cannot advance past it.
    #[error("zero-length extension header 0x{type_code:02x} at offset {offset}")]
    ZeroLengthHeader { offset: usize, type_code: u8 },

    /// A known header whose fields do not fit its declared length.
    #[error("malformed header 0x{type_code:02x} at offset {offset}: {reason}")]
    MalformedHeader {
        offset: usize,
        type_code: u8,
        reason: &'static str,
    },

    /// Fragment dropped without touching the assembly.
    #[error("invalid fragment at offset {offset} ({len} bytes, total {total}): {reason}")]
    InvalidFragment {
        offset: u32,
        len: usize,
        total: u32,
        reason: &'static str,
    },

    /// Fragment overlaps received bytes with different content.
    #[error("fragment at offset {offset} ({len} bytes) conflicts with data already received")]
    ConflictingFragment { offset: u32, len: usize },

    /// A new extended option started while another one was still open.
    #[error("extended option 0x{new_subtype:04x} started while 0x{open_subtype:04x} was open")]
    UnexpectedRestart { open_subtype: u16, new_subtype: u16 },

    /// Header chain ended while an extended option still expected fragments.
    #[error("extended option 0x{subtype:04x} unterminated after {buffered} bytes")]
    UnterminatedOption { subtype: u16, buffered: usize },

    /// `append`/`finish` without a prior `begin`.
    #[error("no extended option is being reassembled")]
    NoOpenOption,

    /// Reassembled ranges do not tile the message.
    #[error("reassembly gap: expected offset {expected}, found {found}")]
    Gap { expected: u32, found: u32 },

    /// Basic header carries an unknown protocol version.
    #[error("unsupported LBMC version {version}")]
    UnsupportedVersion { version: u8 },
}

/// Convenience alias for decoding results.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },

    #[cfg(feature = "config-loaders")]
    #[error("failed to parse decoder configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}
