// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Header schema registry.
//!
//! The walker only knows that every extension header starts with
//! `next_hdr, hdr_len`. Everything about a header's body is asked of a
//! [`HeaderSchema`], which surfaces the handful of fields the decoder acts on
//! ([`HeaderFields`]) and leaves the rest opaque.
//!
//! [`DefaultSchema`] knows the whitelisted LBMC layouts and the names of the
//! other assigned type codes. Hosts with a richer field catalogue plug in
//! their own implementation.

use std::net::Ipv4Addr;

use super::constants::*;
use super::flags::{BatchFlags, ExtOptFlags};
use crate::core::Cursor;
use crate::error::{DecodeError, Result};

/// Fragment descriptor of a message split across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentInfo {
    /// Sequence number of the first fragment; identifies the message.
    pub first_sqn: u32,
    /// Offset of this fragment's bytes in the reassembled message.
    pub offset: u32,
    /// Declared length of the whole message.
    pub total_len: u32,
}

/// Per-message stream identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub stream_id: u32,
    pub sqn: u32,
    /// Context instance of the sending side.
    pub ctxinst: [u8; CTXINST_LEN],
}

/// A (domain, address, port) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainEndpoint {
    pub domain: u32,
    pub addr: Ipv4Addr,
    pub port: u16,
}

/// Where a message is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationInfo {
    /// Receiving context instance (CTXINSTD).
    ContextInstance([u8; CTXINST_LEN]),
    /// Routed destination with the origin it was sent from (DESTINATION).
    Address {
        destination: DomainEndpoint,
        origin: DomainEndpoint,
        hops: u16,
    },
}

/// One fragment of an extended option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtOptFragment<'a> {
    pub flags: ExtOptFlags,
    pub id: u8,
    pub subtype: u16,
    pub fragment_offset: u16,
    pub data: &'a [u8],
}

/// Fields a schema surfaces for one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderFields<'a> {
    /// Type code unknown to the schema.
    Unhandled,
    /// Known header with nothing the decoder acts on.
    Opaque,
    Fragment(FragmentInfo),
    Stream(StreamInfo),
    Destination(DestinationInfo),
    /// Contribution to the trailing message-properties length.
    MessageProperties { len: u32 },
    ExtendedOption(ExtOptFragment<'a>),
    Batch(BatchFlags),
    TopicName(String),
}

/// Interprets extension header bodies.
pub trait HeaderSchema {
    /// Human-readable name of a type code, if assigned.
    fn name(&self, type_code: u8) -> Option<&'static str>;

    /// Interpret one header.
    ///
    /// `header` spans exactly the declared length, `next_hdr`/`hdr_len`
    /// prefix included, and reports absolute message offsets on error.
    fn describe<'a>(&self, type_code: u8, header: Cursor<'a>) -> Result<HeaderFields<'a>>;
}

/// Built-in LBMC layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSchema;

impl DefaultSchema {
    pub fn new() -> Self {
        Self
    }
}

impl HeaderSchema for DefaultSchema {
    fn name(&self, type_code: u8) -> Option<&'static str> {
        header_name(type_code)
    }

    fn describe<'a>(&self, type_code: u8, mut header: Cursor<'a>) -> Result<HeaderFields<'a>> {
        let fixed_len = match type_code {
            NHDR_FRAG => FRAG_HDR_LEN,
            NHDR_BATCH => BATCH_HDR_LEN,
            NHDR_CTXINSTD => CTXINSTD_HDR_LEN,
            NHDR_DESTINATION => DESTINATION_HDR_LEN,
            NHDR_STREAM => STREAM_HDR_LEN,
            NHDR_MSGPROP => MSGPROP_HDR_LEN,
            NHDR_EXTOPT => EXTOPT_HDR_LEN,
            NHDR_TOPICNAME => EXT_HDR_PREFIX_LEN,
            code if header_name(code).is_some() => return Ok(HeaderFields::Opaque),
            _ => return Ok(HeaderFields::Unhandled),
        };

        if header.remaining() < fixed_len {
            return Err(DecodeError::MalformedHeader {
                offset: header.absolute_offset(),
                type_code,
                reason: "declared length shorter than fixed fields",
            });
        }
        header.skip(EXT_HDR_PREFIX_LEN)?;

        let fields = match type_code {
            NHDR_FRAG => {
                let _flags = header.read_u16_be()?;
                HeaderFields::Fragment(FragmentInfo {
                    first_sqn: header.read_u32_be()?,
                    offset: header.read_u32_be()?,
                    total_len: header.read_u32_be()?,
                })
            }
            NHDR_BATCH => HeaderFields::Batch(BatchFlags::from_bits(header.read_u16_be()?)),
            NHDR_CTXINSTD => {
                let _flags = header.read_u16_be()?;
                HeaderFields::Destination(DestinationInfo::ContextInstance(
                    header.read_array::<CTXINST_LEN>()?,
                ))
            }
            NHDR_DESTINATION => {
                let _flags = header.read_u16_be()?;
                let domain = header.read_u32_be()?;
                let addr = Ipv4Addr::from(header.read_u32_be()?);
                let port = header.read_u16_be()?;
                let hops = header.read_u16_be()?;
                let origin = DomainEndpoint {
                    domain: header.read_u32_be()?,
                    addr: Ipv4Addr::from(header.read_u32_be()?),
                    port: header.read_u16_be()?,
                };
                HeaderFields::Destination(DestinationInfo::Address {
                    destination: DomainEndpoint { domain, addr, port },
                    origin,
                    hops,
                })
            }
            NHDR_STREAM => {
                let _flags = header.read_u16_be()?;
                HeaderFields::Stream(StreamInfo {
                    stream_id: header.read_u32_be()?,
                    sqn: header.read_u32_be()?,
                    ctxinst: header.read_array::<CTXINST_LEN>()?,
                })
            }
            NHDR_MSGPROP => {
                let _flags = header.read_u16_be()?;
                HeaderFields::MessageProperties {
                    len: header.read_u32_be()?,
                }
            }
            NHDR_EXTOPT => HeaderFields::ExtendedOption(ExtOptFragment {
                flags: ExtOptFlags::from_bits(header.read_u8()?),
                id: header.read_u8()?,
                subtype: header.read_u16_be()?,
                fragment_offset: header.read_u16_be()?,
                data: header.rest(),
            }),
            NHDR_TOPICNAME => {
                HeaderFields::TopicName(String::from_utf8_lossy(header.read_cstr()).into_owned())
            }
            _ => HeaderFields::Opaque,
        };
        Ok(fields)
    }
}

/// Names of assigned type codes.
pub fn header_name(type_code: u8) -> Option<&'static str> {
    let name = match type_code {
        NHDR_DATA => "DATA",
        NHDR_FRAG => "FRAG",
        NHDR_BATCH => "BATCH",
        NHDR_TGIDX => "TGIDX",
        NHDR_REQUEST => "REQUEST",
        NHDR_TOPICNAME => "TOPICNAME",
        NHDR_APPHDR => "APPHDR",
        NHDR_APPHDR_CHAIN => "APPHDR_CHAIN",
        NHDR_UMQ_MSGID => "UMQ_MSGID",
        NHDR_UMQ_SQD_RCV => "UMQ_SQD_RCV",
        NHDR_UMQ_RESUB => "UMQ_RESUB",
        NHDR_OTID => "OTID",
        NHDR_CTXINSTD => "CTXINSTD",
        NHDR_CTXINSTR => "CTXINSTR",
        NHDR_SRCIDX => "SRCIDX",
        NHDR_UMQ_ULB_MSG => "UMQ_ULB_MSG",
        NHDR_SSF_INIT => "SSF_INIT",
        NHDR_SSF_CREQ => "SSF_CREQ",
        NHDR_UME_PREG => "UME_PREG",
        NHDR_UME_PREG_RESP => "UME_PREG_RESP",
        NHDR_UME_ACK => "UME_ACK",
        NHDR_UME_RXREQ => "UME_RXREQ",
        NHDR_UME_KEEPALIVE => "UME_KEEPALIVE",
        NHDR_UME_STOREID => "UME_STOREID",
        NHDR_UME_RANGED_ACK => "UME_RANGED_ACK",
        NHDR_UME_ACK_ID => "UME_ACK_ID",
        NHDR_UME_CAPABILITY => "UME_CAPABILITY",
        NHDR_UME_PROXY_SRC => "UME_PROXY_SRC",
        NHDR_UME_STORE_GROUP => "UME_STORE_GROUP",
        NHDR_UME_STORE_INFO => "UME_STORE_INFO",
        NHDR_UME_LJ_INFO => "UME_LJ_INFO",
        NHDR_TSNI => "TSNI",
        NHDR_CTXINST => "CTXINST",
        NHDR_DESTINATION => "DESTINATION",
        NHDR_STREAM => "STREAM",
        NHDR_MSGPROP => "MSGPROP",
        NHDR_UMQ_REG => "UMQ_REG",
        NHDR_UMQ_REG_RESP => "UMQ_REG_RESP",
        NHDR_UMQ_ACK => "UMQ_ACK",
        NHDR_UMQ_RCR => "UMQ_RCR",
        NHDR_UMQ_KA => "UMQ_KA",
        NHDR_UMQ_RXREQ => "UMQ_RXREQ",
        NHDR_TOPIC_INTEREST => "TOPIC_INTEREST",
        NHDR_PATTERN_INTEREST => "PATTERN_INTEREST",
        NHDR_ADVERTISEMENT => "ADVERTISEMENT",
        NHDR_EXTOPT => "EXTOPT",
        NHDR_NONE => "NONE",
        _ => return None,
    };
    Some(name)
}
