// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire builders shared by the integration tests.

#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddrV4};

use lbmc::protocol::constants::*;
use lbmc::FrameContext;

/// Builder for one LBMC data message.
pub struct MessageBuilder {
    kind: u8,
    topic_index: u32,
    sequence: u32,
    headers: Vec<(u8, Vec<u8>)>,
    payload: Vec<u8>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            kind: TYPE_MESSAGE,
            topic_index: 1,
            sequence: 1,
            headers: Vec::new(),
            payload: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: u8) -> Self {
        self.kind = kind;
        self
    }

    pub fn topic_index(mut self, tidx: u32) -> Self {
        self.topic_index = tidx;
        self
    }

    pub fn sequence(mut self, sqn: u32) -> Self {
        self.sequence = sqn;
        self
    }

    /// Append an extension header of `type_code` with `body` after the
    /// 2-byte prefix.
    pub fn header(mut self, type_code: u8, body: &[u8]) -> Self {
        self.headers.push((type_code, body.to_vec()));
        self
    }

    pub fn frag(self, first_sqn: u32, offset: u32, total_len: u32) -> Self {
        let mut body = vec![0, 0];
        body.extend_from_slice(&first_sqn.to_be_bytes());
        body.extend_from_slice(&offset.to_be_bytes());
        body.extend_from_slice(&total_len.to_be_bytes());
        self.header(NHDR_FRAG, &body)
    }

    pub fn msgprop(self, len: u32) -> Self {
        let mut body = vec![0, 0];
        body.extend_from_slice(&len.to_be_bytes());
        self.header(NHDR_MSGPROP, &body)
    }

    pub fn stream(self, stream_id: u32, sqn: u32, ctxinst: [u8; CTXINST_LEN]) -> Self {
        let mut body = vec![0, 0];
        body.extend_from_slice(&stream_id.to_be_bytes());
        body.extend_from_slice(&sqn.to_be_bytes());
        body.extend_from_slice(&ctxinst);
        self.header(NHDR_STREAM, &body)
    }

    pub fn ctxinstd(self, ctxinst: [u8; CTXINST_LEN]) -> Self {
        let mut body = vec![0, 0];
        body.extend_from_slice(&ctxinst);
        self.header(NHDR_CTXINSTD, &body)
    }

    pub fn destination(self, dst: (u32, [u8; 4], u16), origin: (u32, [u8; 4], u16)) -> Self {
        let mut body = vec![0, 0];
        body.extend_from_slice(&dst.0.to_be_bytes());
        body.extend_from_slice(&dst.1);
        body.extend_from_slice(&dst.2.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&origin.0.to_be_bytes());
        body.extend_from_slice(&origin.1);
        body.extend_from_slice(&origin.2.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        self.header(NHDR_DESTINATION, &body)
    }

    pub fn extopt(self, flags: u8, subtype: u16, offset: u16, data: &[u8]) -> Self {
        let mut body = vec![flags, 0];
        body.extend_from_slice(&subtype.to_be_bytes());
        body.extend_from_slice(&offset.to_be_bytes());
        body.extend_from_slice(data);
        self.header(NHDR_EXTOPT, &body)
    }

    pub fn topic_name(self, name: &str) -> Self {
        let mut body = name.as_bytes().to_vec();
        body.push(0);
        self.header(NHDR_TOPICNAME, &body)
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let first = self.headers.first().map_or(NHDR_DATA, |(t, _)| *t);
        let mut chain = Vec::new();
        for (i, (_, body)) in self.headers.iter().enumerate() {
            let next = self.headers.get(i + 1).map_or(NHDR_DATA, |(t, _)| *t);
            chain.push(next);
            chain.push((EXT_HDR_PREFIX_LEN + body.len()) as u8);
            chain.extend_from_slice(body);
        }

        let msglen = BASIC_HDR_LEN + chain.len() + self.payload.len();
        let mut msg = vec![self.kind, first];
        msg.extend_from_slice(&(msglen as u16).to_be_bytes());
        msg.extend_from_slice(&self.topic_index.to_be_bytes());
        msg.extend_from_slice(&self.sequence.to_be_bytes());
        msg.extend(chain);
        msg.extend(self.payload);
        msg
    }
}

/// Route `log` output through the test harness (RUST_LOG=debug to see it).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn source() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 2), 5000)
}

pub fn destination() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 4000)
}

/// Frame context on channel 5, 10.0.0.2:5000 -> 10.0.0.1:4000.
pub fn ctx(frame: u64) -> FrameContext {
    FrameContext::new(frame, 5, source(), destination())
}

/// Fragment `data` into pieces of at most `chunk` bytes as FRAG messages.
pub fn fragment_messages(first_sqn: u32, data: &[u8], chunk: usize) -> Vec<Vec<u8>> {
    data.chunks(chunk)
        .enumerate()
        .map(|(i, piece)| {
            MessageBuilder::new()
                .sequence(first_sqn + i as u32)
                .frag(first_sqn, (i * chunk) as u32, data.len() as u32)
                .payload(piece)
                .build()
        })
        .collect()
}
