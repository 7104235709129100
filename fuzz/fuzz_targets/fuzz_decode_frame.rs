// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use std::net::{Ipv4Addr, SocketAddrV4};

use libfuzzer_sys::fuzz_target;
use lbmc::{DecoderConfig, DecodingSession, FrameContext};

fuzz_target!(|data: &[u8]| {
    let Ok(mut session) = DecodingSession::new(DecoderConfig {
        max_pending_assemblies: 8,
        ..DecoderConfig::default()
    }) else {
        return;
    };
    let ctx = FrameContext::new(
        1,
        0,
        SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5000),
        SocketAddrV4::new(Ipv4Addr::LOCALHOST, 4000),
    );

    // Whole input as one frame, then each half as its own frame so
    // reassembly state carries over between calls
    let _ = session.decode_frame(&ctx, data);
    let (a, b) = data.split_at(data.len() / 2);
    let _ = session.decode_frame(&ctx.at(2), a);
    let _ = session.decode_frame(&ctx.at(3), b);
});
