// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Fragmented message reassembly.
//!
//! Covers the engine directly (assembly ordering, idempotence, bounds) and the
//! full path through `DecodingSession` with FRAG headers.

mod common;

use std::net::Ipv4Addr;

use common::{ctx, fragment_messages, MessageBuilder};
use lbmc::reassembly::{FragmentTable, FragmentedMessageAssembly};
use lbmc::{DecodeError, DecoderConfig, DecodingSession, FragmentKey, FrameMarker, ReassemblyStatus};

fn key() -> FragmentKey {
    FragmentKey {
        channel: 5,
        destination: Ipv4Addr::new(10, 0, 0, 1),
        port: 4000,
        first_sqn: 100,
    }
}

/// Deterministic payload of `size` bytes.
fn make_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Split `[0, data.len())` into pieces of random length (1..=max).
fn random_pieces(rng: &mut fastrand::Rng, data: &[u8], max: usize) -> Vec<(u32, Vec<u8>)> {
    let mut pieces = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let len = rng.usize(1..=max).min(data.len() - offset);
        pieces.push((offset as u32, data[offset..offset + len].to_vec()));
        offset += len;
    }
    pieces
}

#[test]
fn test_single_fragment_message() {
    let mut assembly = FragmentedMessageAssembly::new(key(), 10, FrameMarker(1));
    assembly
        .add_fragment(0, b"ABCDEFGHIJ", FrameMarker(1), true)
        .expect("in bounds");
    assert_eq!(assembly.accumulated_len(), 10);
    assert!(assembly.is_complete());
    let (payload, props) = assembly.materialize(0).expect("tiles");
    assert_eq!(payload, b"ABCDEFGHIJ");
    assert!(props.is_empty());
}

#[test]
fn test_two_fragments_reverse_order() {
    let mut assembly = FragmentedMessageAssembly::new(key(), 10, FrameMarker(1));
    assembly
        .add_fragment(6, b"GHIJ", FrameMarker(1), true)
        .expect("in bounds");
    assert!(!assembly.is_complete());
    assembly
        .add_fragment(0, b"ABCDEF", FrameMarker(2), true)
        .expect("in bounds");
    assert!(assembly.is_complete());
    assert_eq!(assembly.materialize(0).expect("tiles").0, b"ABCDEFGHIJ");
}

#[test]
fn test_fragment_past_total_rejected() {
    let mut assembly = FragmentedMessageAssembly::new(key(), 10, FrameMarker(1));
    assembly
        .add_fragment(0, b"AB", FrameMarker(1), true)
        .expect("in bounds");
    let err = assembly
        .add_fragment(8, b"12345", FrameMarker(2), true)
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidFragment {
            offset: 8,
            len: 5,
            total: 10,
            ..
        }
    ));
    assert_eq!(assembly.accumulated_len(), 2);
}

#[test]
fn test_any_arrival_order_materializes_identically() {
    let data = make_payload(997);
    let mut rng = fastrand::Rng::with_seed(0x1B3C);

    for _ in 0..50 {
        let mut pieces = random_pieces(&mut rng, &data, 64);
        rng.shuffle(&mut pieces);

        let mut assembly =
            FragmentedMessageAssembly::new(key(), data.len() as u32, FrameMarker(1));
        for (i, (offset, bytes)) in pieces.iter().enumerate() {
            assert!(!assembly.is_complete());
            assembly
                .add_fragment(*offset, bytes, FrameMarker(i as u64 + 1), true)
                .expect("in bounds");
        }
        assert!(assembly.is_complete());
        assert_eq!(assembly.materialize(0).expect("tiles").0, data);
    }
}

#[test]
fn test_redelivery_is_idempotent() {
    let data = make_payload(300);
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..20 {
        let pieces = random_pieces(&mut rng, &data, 40);
        let mut assembly =
            FragmentedMessageAssembly::new(key(), data.len() as u32, FrameMarker(1));
        for (offset, bytes) in &pieces {
            assembly
                .add_fragment(*offset, bytes, FrameMarker(1), true)
                .expect("in bounds");
        }
        let before = assembly.materialize(0).expect("tiles");

        // Re-add random already-seen ranges
        for _ in 0..10 {
            let (offset, bytes) = &pieces[rng.usize(..pieces.len())];
            let added = assembly
                .add_fragment(*offset, bytes, FrameMarker(2), true)
                .expect("duplicate accepted");
            assert_eq!(added, 0);
            assert_eq!(assembly.accumulated_len(), data.len() as u32);
        }
        assert_eq!(assembly.materialize(0).expect("tiles"), before);
    }
}

#[test]
fn test_out_of_bounds_never_mutates() {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut assembly = FragmentedMessageAssembly::new(key(), 64, FrameMarker(1));
    assembly
        .add_fragment(0, &[1; 16], FrameMarker(1), true)
        .expect("in bounds");

    for _ in 0..100 {
        let offset = rng.u32(0..80);
        let len = rng.usize(1..40);
        if offset as usize + len <= 64 {
            continue;
        }
        assert!(assembly
            .add_fragment(offset, &vec![9; len], FrameMarker(2), true)
            .is_err());
        assert_eq!(assembly.accumulated_len(), 16);
    }
}

#[test]
fn test_session_reassembles_out_of_order() {
    common::init_logging();
    let data = make_payload(250);
    let messages = fragment_messages(100, &data, 64);
    let order = [2, 0, 3, 1];

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    let mut completed_in = None;
    for (i, idx) in order.iter().enumerate() {
        let frame = i as u64 + 1;
        let out = session.decode(&ctx(frame), &messages[*idx]);
        assert!(out.fragment.is_some());
        if i + 1 < order.len() {
            assert!(matches!(out.reassembly, ReassemblyStatus::Pending { .. }));
            assert!(out.payload.is_none());
        } else {
            assert_eq!(
                out.reassembly,
                ReassemblyStatus::Completed {
                    frame: FrameMarker(frame)
                }
            );
            assert_eq!(out.payload.as_deref(), Some(data.as_slice()));
            completed_in = Some(FrameMarker(frame));
        }
    }

    // A late duplicate points back at the completing frame
    let out = session.decode(&ctx(10), &messages[0]);
    assert_eq!(
        out.reassembly,
        ReassemblyStatus::AlreadyCompleted {
            frame: completed_in.expect("completed")
        }
    );
    assert!(out.payload.is_none());

    let stats = session.stats();
    assert_eq!(stats.fragments_accepted, 4);
    assert_eq!(stats.reassembled, 1);
}

#[test]
fn test_session_splits_properties_from_reassembled_message() {
    let data = b"hello worldPROPS";
    let first = MessageBuilder::new()
        .frag(7, 0, data.len() as u32)
        .msgprop(5)
        .payload(&data[..8])
        .build();
    let second = MessageBuilder::new()
        .sequence(8)
        .frag(7, 8, data.len() as u32)
        .payload(&data[8..])
        .build();

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    session.decode(&ctx(1), &first);
    let out = session.decode(&ctx(2), &second);
    assert_eq!(out.payload.as_deref(), Some(b"hello world".as_slice()));
    assert_eq!(out.properties.as_deref(), Some(b"PROPS".as_slice()));
}

#[test]
fn test_fragments_on_other_channel_do_not_mix() {
    let data = make_payload(20);
    let messages = fragment_messages(1, &data, 10);

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    let mut other = ctx(2);
    other.channel = 6;
    session.decode(&ctx(1), &messages[0]);
    let out = session.decode(&other, &messages[1]);
    assert!(matches!(out.reassembly, ReassemblyStatus::Pending { .. }));
}

#[test]
fn test_conflicting_overlap_reported() {
    let first = MessageBuilder::new().frag(1, 0, 8).payload(b"ABCD").build();
    let conflicting = MessageBuilder::new().frag(1, 2, 8).payload(b"xy").build();

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    session.decode(&ctx(1), &first);
    let out = session.decode(&ctx(2), &conflicting);
    assert_eq!(out.reassembly, ReassemblyStatus::Dropped);
    assert_eq!(
        out.diagnostics,
        vec![DecodeError::ConflictingFragment { offset: 2, len: 2 }]
    );
    assert_eq!(session.stats().fragments_rejected, 1);
}

#[test]
fn test_lenient_overlap_keeps_first_bytes() {
    let config = DecoderConfig {
        strict_overlap: false,
        ..DecoderConfig::default()
    };
    let mut table = FragmentTable::new(&config);
    let info = |offset| lbmc::protocol::FragmentInfo {
        first_sqn: 100,
        offset,
        total_len: 6,
    };
    table.on_fragment(key(), info(0), b"ABCD", 0, FrameMarker(1));
    let out = table.on_fragment(key(), info(2), b"xyEF", 0, FrameMarker(2));
    assert_eq!(out.reassembled.expect("complete").0, b"ABCDEF");
}

#[test]
fn test_oversized_total_rejected_by_session() {
    let config = DecoderConfig {
        max_message_len: 1024,
        ..DecoderConfig::default()
    };
    let msg = MessageBuilder::new().frag(1, 0, 4096).payload(b"x").build();

    let mut session = DecodingSession::new(config).expect("config");
    let out = session.decode(&ctx(1), &msg);
    assert_eq!(out.reassembly, ReassemblyStatus::Dropped);
    assert!(matches!(
        out.diagnostics[0],
        DecodeError::InvalidFragment { total: 4096, .. }
    ));
}

#[test]
fn test_reset_forgets_pending_assemblies() {
    let data = make_payload(20);
    let messages = fragment_messages(1, &data, 10);

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    session.decode(&ctx(1), &messages[0]);
    session.reset();
    let out = session.decode(&ctx(2), &messages[1]);
    assert_eq!(
        out.reassembly,
        ReassemblyStatus::Pending {
            accumulated: 10,
            total: 20
        }
    );
}
