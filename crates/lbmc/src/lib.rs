// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # LBMC - Ultra Messaging transport protocol decoder
//!
//! Stateful decoder for LBMC messages: the extension header chain, fragmented
//! message reassembly, fragmented extended options, and stream/substream
//! correlation across a capture.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::net::{Ipv4Addr, SocketAddrV4};
//! use lbmc::{DecoderConfig, DecodingSession, FrameContext};
//!
//! let mut session = DecodingSession::new(DecoderConfig::default())?;
//! let ctx = FrameContext::new(
//!     1,
//!     0,
//!     SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 2), 5000),
//!     SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 4000),
//! );
//!
//! // Message, next_hdr = DATA, msglen = 14, tidx = 1, sqn = 1, payload "hi"
//! let frame = [0x00, 0x00, 0x00, 0x0E, 0, 0, 0, 1, 0, 0, 0, 1, b'h', b'i'];
//! for message in session.decode_frame(&ctx, &frame) {
//!     assert_eq!(message.payload.as_deref(), Some(b"hi".as_slice()));
//! }
//! # Ok::<(), lbmc::ConfigError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  session    DecodingSession: decode / decode_frame / reset          |
//! +---------------------------------------------------------------------+
//! |  reassembly FragmentTable (LRU) | ExtOptReassembler (single slot)   |
//! |  stream     StreamTracker -> Stream -> Substream                    |
//! +---------------------------------------------------------------------+
//! |  protocol   BasicHeader | walk() | HeaderSchema / DefaultSchema     |
//! +---------------------------------------------------------------------+
//! |  core       Cursor (bounds-checked, big-endian) | FrameMarker       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Features
//!
//! - `trace` - function-entry tracing through `log::trace!`
//! - `config-loaders` - `DecoderConfig::from_yaml_str`
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod reassembly;
pub mod session;
pub mod stream;

pub use crate::config::DecoderConfig;
pub use crate::core::{Cursor, FrameMarker};
pub use crate::error::{ConfigError, DecodeError, Result};
pub use crate::protocol::{
    walk, BasicHeader, ChainStatus, DefaultSchema, ExtensionHeaderRecord, HeaderChain,
    HeaderFields, HeaderSchema, MessageKind,
};
pub use crate::reassembly::{ExtendedOption, ExtendedOptionBody, FragmentKey, ReassemblyStatus};
pub use crate::session::{
    DecodedMessage, DecodingSession, FrameContext, MessageStatus, PayloadClassifier,
    SessionBuilder, SessionStats, StreamUpdate, TopicResolver,
};
pub use crate::stream::{IdAllocator, SequentialIds, StreamEndpoint, StreamIdentity};
