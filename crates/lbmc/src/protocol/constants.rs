// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LBMC wire constants.
//!
//! Single source of truth for header sizes, type codes and flag masks.
//! All multi-byte fields on the wire are big-endian.

// =======================================================================
// Basic header
// =======================================================================

/// Protocol version carried in the high nibble of `ver_type`.
pub const LBMC_VERSION: u8 = 0;

/// Basic header of data-bearing messages: ver_type, next_hdr, msglen, tidx, sqn.
pub const BASIC_HDR_LEN: usize = 12;

/// Basic header of control messages: ver_type, next_hdr, msglen.
pub const CNTL_HDR_LEN: usize = 4;

pub const TYPE_MESSAGE: u8 = 0x00;
pub const TYPE_EOT: u8 = 0x01;
pub const TYPE_PRORX: u8 = 0x02;
pub const TYPE_CONTROL: u8 = 0x08;
pub const TYPE_RETRANS: u8 = 0x0A;

// =======================================================================
// Extension header type codes (the `next_hdr` values)
// =======================================================================

/// Terminal: application payload follows.
pub const NHDR_DATA: u8 = 0x00;
pub const NHDR_FRAG: u8 = 0x01;
pub const NHDR_BATCH: u8 = 0x02;
pub const NHDR_TGIDX: u8 = 0x03;
pub const NHDR_REQUEST: u8 = 0x04;
pub const NHDR_TOPICNAME: u8 = 0x05;
pub const NHDR_APPHDR: u8 = 0x06;
pub const NHDR_APPHDR_CHAIN: u8 = 0x07;
pub const NHDR_UMQ_MSGID: u8 = 0x08;
pub const NHDR_UMQ_SQD_RCV: u8 = 0x09;
pub const NHDR_UMQ_RESUB: u8 = 0x0A;
pub const NHDR_OTID: u8 = 0x0B;
pub const NHDR_CTXINSTD: u8 = 0x0C;
pub const NHDR_CTXINSTR: u8 = 0x0D;
pub const NHDR_SRCIDX: u8 = 0x0E;
pub const NHDR_UMQ_ULB_MSG: u8 = 0x0F;
pub const NHDR_SSF_INIT: u8 = 0x10;
pub const NHDR_SSF_CREQ: u8 = 0x11;
pub const NHDR_UME_PREG: u8 = 0x12;
pub const NHDR_UME_PREG_RESP: u8 = 0x13;
pub const NHDR_UME_ACK: u8 = 0x14;
pub const NHDR_UME_RXREQ: u8 = 0x15;
pub const NHDR_UME_KEEPALIVE: u8 = 0x16;
pub const NHDR_UME_STOREID: u8 = 0x17;
pub const NHDR_UME_RANGED_ACK: u8 = 0x18;
pub const NHDR_UME_ACK_ID: u8 = 0x19;
pub const NHDR_UME_CAPABILITY: u8 = 0x1A;
pub const NHDR_UME_PROXY_SRC: u8 = 0x1B;
pub const NHDR_UME_STORE_GROUP: u8 = 0x1C;
pub const NHDR_UME_STORE_INFO: u8 = 0x1D;
pub const NHDR_UME_LJ_INFO: u8 = 0x1E;
pub const NHDR_TSNI: u8 = 0x20;
pub const NHDR_CTXINST: u8 = 0x21;
pub const NHDR_DESTINATION: u8 = 0x25;
pub const NHDR_STREAM: u8 = 0x26;
pub const NHDR_MSGPROP: u8 = 0x27;
pub const NHDR_UMQ_REG: u8 = 0x30;
pub const NHDR_UMQ_REG_RESP: u8 = 0x31;
pub const NHDR_UMQ_ACK: u8 = 0x32;
pub const NHDR_UMQ_RCR: u8 = 0x33;
pub const NHDR_UMQ_KA: u8 = 0x34;
pub const NHDR_UMQ_RXREQ: u8 = 0x35;
pub const NHDR_TOPIC_INTEREST: u8 = 0x40;
pub const NHDR_PATTERN_INTEREST: u8 = 0x41;
pub const NHDR_ADVERTISEMENT: u8 = 0x42;
/// Extended option (secondary, independently fragmented sub-format).
pub const NHDR_EXTOPT: u8 = 0xFE;
/// Terminal: no more headers.
pub const NHDR_NONE: u8 = 0xFF;

/// `next_hdr` + `hdr_len`, common to every extension header.
pub const EXT_HDR_PREFIX_LEN: usize = 2;

// =======================================================================
// Whitelisted header layouts (total header length, prefix included)
// =======================================================================

/// next_hdr, hdr_len, flags(2), first_sqn(4), offset(4), len(4).
pub const FRAG_HDR_LEN: usize = 16;
/// next_hdr, hdr_len, flags(2).
pub const BATCH_HDR_LEN: usize = 4;
/// Context instance identifier size.
pub const CTXINST_LEN: usize = 16;
/// next_hdr, hdr_len, flags(2), ctxinst(16).
pub const CTXINSTD_HDR_LEN: usize = 20;
/// next_hdr, hdr_len, flags(2), domain(4), addr(4), port(2), hops(2),
/// orig_domain(4), orig_addr(4), orig_port(2), reserved(2).
pub const DESTINATION_HDR_LEN: usize = 28;
/// next_hdr, hdr_len, flags(2), stream_id(4), sqn(4), ctxinst(16).
pub const STREAM_HDR_LEN: usize = 28;
/// next_hdr, hdr_len, flags(2), len(4).
pub const MSGPROP_HDR_LEN: usize = 8;
/// next_hdr, hdr_len, flags(1), id(1), subtype(2), fragment_offset(2).
pub const EXTOPT_HDR_LEN: usize = 8;

// =======================================================================
// Flag masks
// =======================================================================

pub const BATCH_FLAG_START: u16 = 0x8000;
pub const BATCH_FLAG_END: u16 = 0x4000;

pub const EXTOPT_FLAG_IGNORE: u8 = 0x80;
pub const EXTOPT_FLAG_IGNORE_SUBTYPE: u8 = 0x40;
pub const EXTOPT_FLAG_MORE_FRAGMENTS: u8 = 0x20;

// =======================================================================
// Extended option subtypes
// =======================================================================

/// Configuration options: (scope, parent, name\0, value\0)*.
pub const EXTOPT_SUBTYPE_CFGOPT: u16 = 0x0100;
/// Message selector string.
pub const EXTOPT_SUBTYPE_MSGSEL: u16 = 0x0101;
