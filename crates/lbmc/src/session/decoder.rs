// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoding session: owns every piece of cross-message state.
//!
//! Per message, `decode` runs:
//! 1. Basic header
//! 2. Extension header chain walk
//! 3. Extended option reassembly over the chain's EXTOPT headers
//! 4. Fragment reassembly, or payload/properties split when unfragmented
//! 5. Stream/substream correlation
//! 6. Topic label and payload classification
//!
//! Errors never escape: each one is attached to the message it concerns and
//! the session moves on. Frames must be fed in capture order; call
//! [`DecodingSession::reset`] between independent captures.

use std::borrow::Cow;
use std::collections::HashMap;

use super::context::FrameContext;
use super::event::{DecodedMessage, MessageStatus, StreamUpdate};
use super::hooks::{NoClassifier, NoTopicResolver, PayloadClassifier, TopicResolver};
use crate::config::DecoderConfig;
use crate::core::Cursor;
use crate::error::{ConfigError, DecodeError};
use crate::protocol::constants::LBMC_VERSION;
use crate::protocol::{
    walk, BasicHeader, DefaultSchema, DestinationInfo, HeaderChain, HeaderSchema, StreamInfo,
};
use crate::reassembly::{
    ExtOptReassembler, ExtendedOption, FragmentKey, FragmentTable, FragmentTableStats,
    ReassemblyStatus,
};
use crate::stream::{
    IdAllocator, SequentialIds, Stream, StreamEndpoint, StreamTracker, SubstreamKey,
};

/// Session-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub messages: u64,
    pub malformed: u64,
    pub incomplete: u64,
    pub fragments_accepted: u64,
    pub fragments_rejected: u64,
    pub reassembled: u64,
    pub evicted: u64,
    pub extended_options: u64,
}

/// Builder for [`DecodingSession`] with custom collaborators.
pub struct SessionBuilder {
    config: DecoderConfig,
    schema: Box<dyn HeaderSchema>,
    allocator: Box<dyn IdAllocator>,
    resolver: Box<dyn TopicResolver>,
    classifier: Box<dyn PayloadClassifier>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            config: DecoderConfig::default(),
            schema: Box::new(DefaultSchema),
            allocator: Box::new(SequentialIds::default()),
            resolver: Box::new(NoTopicResolver),
            classifier: Box::new(NoClassifier),
        }
    }
}

impl SessionBuilder {
    pub fn config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the built-in header layouts.
    pub fn schema(mut self, schema: impl HeaderSchema + 'static) -> Self {
        self.schema = Box::new(schema);
        self
    }

    pub fn stream_ids(mut self, allocator: impl IdAllocator + 'static) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    pub fn topic_resolver(mut self, resolver: impl TopicResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn classifier(mut self, classifier: impl PayloadClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Validate the configuration and create the session.
    pub fn build(self) -> Result<DecodingSession, ConfigError> {
        DecodingSession::with_collaborators(
            self.config,
            self.schema,
            self.allocator,
            self.resolver,
            self.classifier,
        )
    }
}

/// Stateful LBMC decoder for one capture.
pub struct DecodingSession {
    config: DecoderConfig,
    schema: Box<dyn HeaderSchema>,
    resolver: Box<dyn TopicResolver>,
    classifier: Box<dyn PayloadClassifier>,
    fragments: FragmentTable,
    streams: StreamTracker,
    topics: HashMap<(u64, u32), String>,
    stats: SessionStats,
}

impl DecodingSession {
    /// Session with the default schema and no labelling collaborators.
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn with_collaborators(
        config: DecoderConfig,
        schema: Box<dyn HeaderSchema>,
        allocator: Box<dyn IdAllocator>,
        resolver: Box<dyn TopicResolver>,
        classifier: Box<dyn PayloadClassifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fragments: FragmentTable::new(&config),
            streams: StreamTracker::new(allocator),
            config,
            schema,
            resolver,
            classifier,
            topics: HashMap::new(),
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Drop all reassembly, stream and topic state. Configuration and
    /// collaborators are kept.
    pub fn reset(&mut self) {
        log::debug!(
            "[Session] reset: {} streams, {} pending assemblies dropped",
            self.streams.len(),
            self.fragments.pending_count()
        );
        self.fragments.clear();
        self.streams.clear();
        self.topics.clear();
        self.stats = SessionStats::default();
    }

    /// All Streams seen so far, in id order.
    pub fn streams(&self) -> Vec<&Stream> {
        self.streams.streams()
    }

    pub fn stats(&self) -> SessionStats {
        let FragmentTableStats {
            accepted,
            rejected,
            completed,
            evicted,
        } = self.fragments.stats();
        SessionStats {
            fragments_accepted: accepted,
            fragments_rejected: rejected,
            reassembled: completed,
            evicted,
            ..self.stats
        }
    }

    /// Decode every message of a frame holding concatenated LBMC messages.
    ///
    /// Messages are delimited by `msglen`. Splitting stops at the first
    /// message whose length cannot be trusted; that message is still
    /// decoded best-effort.
    pub fn decode_frame<'a>(
        &mut self,
        ctx: &FrameContext,
        frame: &'a [u8],
    ) -> Vec<DecodedMessage<'a>> {
        crate::trace_fn!("DecodingSession::decode_frame");
        let mut messages = Vec::new();
        let mut offset = 0;

        while offset < frame.len() {
            let rest = &frame[offset..];
            let (msglen, trusted) = match BasicHeader::parse(&mut Cursor::new(rest)) {
                Ok(header) => {
                    let msglen = header.msglen as usize;
                    (msglen, msglen >= header.header_len() && msglen <= rest.len())
                }
                Err(_) => (0, false),
            };

            let bytes = if trusted { &rest[..msglen] } else { rest };
            let mut message = self.decode(ctx, bytes);
            message.frame_offset = offset;
            messages.push(message);

            if !trusted {
                log::debug!(
                    "[Session] frame {}: untrusted msglen {} at offset {} ({} bytes left)",
                    ctx.frame,
                    msglen,
                    offset,
                    rest.len()
                );
                break;
            }
            offset += msglen;
        }
        messages
    }

    /// Decode exactly one message.
    pub fn decode<'a>(&mut self, ctx: &FrameContext, message: &'a [u8]) -> DecodedMessage<'a> {
        crate::trace_fn!("DecodingSession::decode");
        let mut out = DecodedMessage::new(ctx.frame);
        self.stats.messages += 1;

        let header = match BasicHeader::parse(&mut Cursor::new(message)) {
            Ok(header) => header,
            Err(e) => {
                out.fail(MessageStatus::Incomplete, e);
                self.count_status(&out);
                return out;
            }
        };
        out.header = Some(header);

        if header.version != LBMC_VERSION {
            out.diagnostics.push(DecodeError::UnsupportedVersion {
                version: header.version,
            });
        }

        let header_len = header.header_len();
        let msglen = header.msglen as usize;
        if msglen < header_len {
            out.fail(
                MessageStatus::Malformed,
                DecodeError::InvalidLength {
                    declared: msglen,
                    minimum: header_len,
                },
            );
            self.count_status(&out);
            return out;
        }
        let message = if msglen > message.len() {
            out.fail(
                MessageStatus::Incomplete,
                DecodeError::Truncated {
                    what: "message",
                    declared: msglen,
                    available: message.len(),
                },
            );
            message
        } else {
            &message[..msglen]
        };

        let chain = walk(self.schema.as_ref(), message, header_len, header.next_hdr);
        out.status = out.status.worsen(chain.status.into());
        out.diagnostics.extend(chain.diagnostics.iter().cloned());

        self.collect_extended_options(&chain, &mut out);
        self.resolve_payload(ctx, message, &chain, &mut out);
        self.correlate_stream(ctx, &header, &chain, &mut out);
        self.label(ctx, &header, &chain, &mut out);

        out.headers = chain.records;
        self.count_status(&out);
        out
    }

    /// Run extended option reassembly over the chain's EXTOPT headers.
    fn collect_extended_options(&mut self, chain: &HeaderChain<'_>, out: &mut DecodedMessage<'_>) {
        let mut engine = ExtOptReassembler::new();
        let mut ignore = false;

        for frag in chain.extended_options() {
            let restart = engine.is_open()
                && (frag.fragment_offset == 0 || engine.open_subtype() != Some(frag.subtype));
            if restart {
                if let Err(e) = engine.begin(frag.subtype) {
                    out.diagnostics.push(e);
                }
            }

            if !engine.is_open() {
                if !frag.flags.more_fragments && frag.fragment_offset == 0 {
                    out.extended_options.push(ExtendedOption {
                        subtype: frag.subtype,
                        ignore: frag.flags.ignore,
                        data: frag.data.to_vec(),
                    });
                    continue;
                }
                if frag.fragment_offset != 0 {
                    // Leading fragments of this option were not in the chain.
                    out.diagnostics.push(DecodeError::Truncated {
                        what: "extended option",
                        declared: frag.fragment_offset as usize + frag.data.len(),
                        available: frag.data.len(),
                    });
                    continue;
                }
                if let Err(e) = engine.begin(frag.subtype) {
                    out.diagnostics.push(e);
                    continue;
                }
                ignore = false;
            }

            ignore |= frag.flags.ignore;
            if let Err(e) = engine.append(frag.fragment_offset, frag.data) {
                out.diagnostics.push(e);
                continue;
            }
            if !frag.flags.more_fragments {
                match engine.finish() {
                    Ok(mut option) => {
                        option.ignore = ignore;
                        out.extended_options.push(option);
                    }
                    Err(e) => out.diagnostics.push(e),
                }
            }
        }

        if let Some(subtype) = engine.open_subtype() {
            log::debug!(
                "[ExtOpt] option 0x{:04x} still open at end of chain, discarded",
                subtype
            );
            out.diagnostics.push(DecodeError::UnterminatedOption {
                subtype,
                buffered: engine.buffered_len(),
            });
            engine.reset();
        }
        self.stats.extended_options += out.extended_options.len() as u64;
    }

    /// Fragment reassembly, or payload/properties split for whole messages.
    fn resolve_payload<'a>(
        &mut self,
        ctx: &FrameContext,
        message: &'a [u8],
        chain: &HeaderChain<'a>,
        out: &mut DecodedMessage<'a>,
    ) {
        let region = chain.payload_offset.map(|start| &message[start..]);
        let msgprop_len = chain.msgprop_len();
        out.fragment = chain.fragment_info();

        if let Some(info) = out.fragment {
            let Some(region) = region else {
                out.reassembly = ReassemblyStatus::Dropped;
                return;
            };
            if out.status == MessageStatus::Incomplete {
                // Captured bytes do not match what the header claims.
                out.reassembly = ReassemblyStatus::Dropped;
                return;
            }
            let key = FragmentKey {
                channel: ctx.channel,
                destination: *ctx.destination.ip(),
                port: ctx.destination.port(),
                first_sqn: info.first_sqn,
            };
            let msgprop_len = u32::try_from(msgprop_len).unwrap_or(u32::MAX);
            let outcome = self
                .fragments
                .on_fragment(key, info, region, msgprop_len, ctx.frame);
            out.reassembly = outcome.status;
            if let Some(e) = outcome.error {
                out.diagnostics.push(e);
            }
            if let Some((payload, properties)) = outcome.reassembled {
                out.payload = Some(Cow::Owned(payload));
                out.properties = (!properties.is_empty()).then_some(Cow::Owned(properties));
            }
            return;
        }

        let Some(region) = region else {
            return;
        };
        if out.status == MessageStatus::Incomplete {
            out.payload = Some(Cow::Borrowed(region));
            return;
        }
        if msgprop_len > region.len() as u64 {
            out.diagnostics.push(DecodeError::Truncated {
                what: "message properties",
                declared: usize::try_from(msgprop_len).unwrap_or(usize::MAX),
                available: region.len(),
            });
            out.payload = Some(Cow::Borrowed(region));
            return;
        }
        let (payload, properties) = region.split_at(region.len() - msgprop_len as usize);
        out.payload = Some(Cow::Borrowed(payload));
        out.properties = (!properties.is_empty()).then_some(Cow::Borrowed(properties));
    }

    fn correlate_stream(
        &mut self,
        ctx: &FrameContext,
        header: &BasicHeader,
        chain: &HeaderChain<'_>,
        out: &mut DecodedMessage<'_>,
    ) {
        let (Some(info), Some(destination)) = (chain.stream_info(), chain.destination()) else {
            return;
        };
        let (a, b) = stream_endpoints(&info, &destination);
        let (stream, new_stream) = self.streams.find_or_create_stream(a, b, ctx.frame);
        let key = SubstreamKey {
            source: ctx.source,
            destination: ctx.destination,
            stream_id: info.stream_id,
        };
        let (substream_id, new_substream) = stream.find_or_create_substream(key, ctx.frame);
        stream.record(&key, header.msglen as u64, ctx.frame);
        out.stream = Some(StreamUpdate {
            stream_id: stream.id,
            substream_id,
            new_stream,
            new_substream,
        });
    }

    fn label(
        &mut self,
        ctx: &FrameContext,
        header: &BasicHeader,
        chain: &HeaderChain<'_>,
        out: &mut DecodedMessage<'_>,
    ) {
        out.topic = match (chain.topic_name(), header.topic_index) {
            (Some(name), Some(tidx)) => {
                self.topics.insert((ctx.channel, tidx), name.to_string());
                Some(name.to_string())
            }
            (Some(name), None) => Some(name.to_string()),
            (None, Some(tidx)) => self
                .topics
                .get(&(ctx.channel, tidx))
                .cloned()
                .or_else(|| self.resolver.resolve(ctx.channel, tidx)),
            (None, None) => None,
        };

        if self.config.classify_payloads && out.has_complete_payload() {
            if let Some(payload) = out.payload.as_deref() {
                out.classification = self.classifier.classify(payload);
            }
        }
    }

    fn count_status(&mut self, out: &DecodedMessage<'_>) {
        match out.status {
            MessageStatus::Complete => {}
            MessageStatus::Incomplete => self.stats.incomplete += 1,
            MessageStatus::Malformed => self.stats.malformed += 1,
        }
        if !out.diagnostics.is_empty() {
            log::debug!(
                "[Session] frame {}: {:?} message, {} diagnostic(s), first: {}",
                out.frame,
                out.status,
                out.diagnostics.len(),
                out.diagnostics[0]
            );
        }
    }
}

/// The two sides of a conversation as seen by one message.
fn stream_endpoints(
    info: &StreamInfo,
    destination: &DestinationInfo,
) -> (StreamEndpoint, StreamEndpoint) {
    match *destination {
        DestinationInfo::ContextInstance(receiver) => (
            StreamEndpoint::ContextInstance(info.ctxinst),
            StreamEndpoint::ContextInstance(receiver),
        ),
        DestinationInfo::Address {
            destination, origin, ..
        } => (
            StreamEndpoint::Address(origin),
            StreamEndpoint::Address(destination),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::*;
    use std::net::{Ipv4Addr, SocketAddrV4};

    fn ctx(frame: u64) -> FrameContext {
        FrameContext::new(
            frame,
            5,
            SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 2), 5000),
            SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 4000),
        )
    }

    fn message(first: u8, headers: &[u8], payload: &[u8]) -> Vec<u8> {
        let len = BASIC_HDR_LEN + headers.len() + payload.len();
        let mut msg = vec![TYPE_MESSAGE, first];
        msg.extend_from_slice(&(len as u16).to_be_bytes());
        msg.extend_from_slice(&7u32.to_be_bytes());
        msg.extend_from_slice(&42u32.to_be_bytes());
        msg.extend_from_slice(headers);
        msg.extend_from_slice(payload);
        msg
    }

    fn extopt(next: u8, flags: u8, subtype: u16, offset: u16, data: &[u8]) -> Vec<u8> {
        let mut hdr = vec![next, (EXTOPT_HDR_LEN + data.len()) as u8, flags, 0];
        hdr.extend_from_slice(&subtype.to_be_bytes());
        hdr.extend_from_slice(&offset.to_be_bytes());
        hdr.extend_from_slice(data);
        hdr
    }

    #[test]
    fn test_plain_message() {
        let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
        let msg = message(NHDR_DATA, &[], b"hello");
        let out = session.decode(&ctx(1), &msg);
        assert_eq!(out.status, MessageStatus::Complete);
        assert_eq!(out.reassembly, ReassemblyStatus::NotFragmented);
        assert_eq!(out.payload.as_deref(), Some(b"hello".as_slice()));
        assert!(out.properties.is_none());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_msglen_smaller_than_header() {
        let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
        let mut msg = message(NHDR_DATA, &[], b"");
        msg[3] = 8;
        let out = session.decode(&ctx(1), &msg);
        assert_eq!(out.status, MessageStatus::Malformed);
        assert_eq!(
            out.diagnostics,
            vec![DecodeError::InvalidLength {
                declared: 8,
                minimum: BASIC_HDR_LEN
            }]
        );
        assert_eq!(session.stats().malformed, 1);
    }

    #[test]
    fn test_extended_option_across_headers() {
        let mut headers = extopt(NHDR_EXTOPT, EXTOPT_FLAG_MORE_FRAGMENTS, EXTOPT_SUBTYPE_CFGOPT, 0, b"AB");
        headers.extend(extopt(NHDR_DATA, 0, EXTOPT_SUBTYPE_CFGOPT, 2, b"CD"));
        let msg = message(NHDR_EXTOPT, &headers, b"");

        let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
        let out = session.decode(&ctx(1), &msg);
        assert_eq!(out.extended_options.len(), 1);
        assert_eq!(out.extended_options[0].subtype, EXTOPT_SUBTYPE_CFGOPT);
        assert_eq!(out.extended_options[0].data, b"ABCD");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_extended_option_restart_and_dangling() {
        let mut headers = extopt(NHDR_EXTOPT, EXTOPT_FLAG_MORE_FRAGMENTS, 0x0200, 0, b"old");
        headers.extend(extopt(NHDR_EXTOPT, EXTOPT_FLAG_MORE_FRAGMENTS, 0x0300, 0, b"new"));
        headers.extend(extopt(NHDR_DATA, EXTOPT_FLAG_MORE_FRAGMENTS, 0x0300, 3, b"er"));
        let msg = message(NHDR_EXTOPT, &headers, b"");

        let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
        let out = session.decode(&ctx(1), &msg);
        assert!(out.extended_options.is_empty());
        assert_eq!(
            out.diagnostics[0],
            DecodeError::UnexpectedRestart {
                open_subtype: 0x0200,
                new_subtype: 0x0300
            }
        );
        assert_eq!(
            out.diagnostics[1],
            DecodeError::UnterminatedOption {
                subtype: 0x0300,
                buffered: 5
            }
        );
    }

    #[test]
    fn test_topic_name_cached_per_index() {
        let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
        let mut topic = vec![NHDR_DATA, 9];
        topic.extend_from_slice(b"orders\0");
        let first = message(NHDR_TOPICNAME, &topic, b"x");
        assert_eq!(session.decode(&ctx(1), &first).topic.as_deref(), Some("orders"));

        let second = message(NHDR_DATA, &[], b"y");
        assert_eq!(session.decode(&ctx(2), &second).topic.as_deref(), Some("orders"));

        session.reset();
        assert_eq!(session.decode(&ctx(3), &second).topic, None);
    }

    #[test]
    fn test_resolver_and_classifier_hooks() {
        let mut session = DecodingSession::builder()
            .topic_resolver(|channel: u64, tidx: u32| Some(format!("chan{}/topic{}", channel, tidx)))
            .classifier(|payload: &[u8]| payload.starts_with(b"{").then(|| "json".to_string()))
            .build()
            .expect("config");
        let msg = message(NHDR_DATA, &[], b"{}");
        let out = session.decode(&ctx(1), &msg);
        assert_eq!(out.topic.as_deref(), Some("chan5/topic7"));
        assert_eq!(out.classification.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DecoderConfig {
            max_message_len: 0,
            ..DecoderConfig::default()
        };
        assert!(DecodingSession::new(config).is_err());
    }
}
