// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Session decode path benchmarks.
//!
//! - Unfragmented message with a short header chain
//! - Multi-message frame split by `msglen`
//! - Fragmented message reassembly at several total sizes

use std::net::{Ipv4Addr, SocketAddrV4};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lbmc::protocol::constants::*;
use lbmc::{DecoderConfig, DecodingSession, FrameContext};

fn ctx(frame: u64) -> FrameContext {
    FrameContext::new(
        frame,
        1,
        SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 2), 5000),
        SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 4000),
    )
}

/// Data message with the given (type, body) headers and payload.
fn message(headers: &[(u8, Vec<u8>)], sqn: u32, payload: &[u8]) -> Vec<u8> {
    let first = headers.first().map_or(NHDR_DATA, |(t, _)| *t);
    let mut chain = Vec::new();
    for (i, (_, body)) in headers.iter().enumerate() {
        chain.push(headers.get(i + 1).map_or(NHDR_DATA, |(t, _)| *t));
        chain.push((EXT_HDR_PREFIX_LEN + body.len()) as u8);
        chain.extend_from_slice(body);
    }
    let msglen = (BASIC_HDR_LEN + chain.len() + payload.len()) as u16;
    let mut msg = vec![TYPE_MESSAGE, first];
    msg.extend_from_slice(&msglen.to_be_bytes());
    msg.extend_from_slice(&1u32.to_be_bytes());
    msg.extend_from_slice(&sqn.to_be_bytes());
    msg.extend(chain);
    msg.extend_from_slice(payload);
    msg
}

fn frag_body(first_sqn: u32, offset: u32, total: u32) -> Vec<u8> {
    let mut body = vec![0, 0];
    body.extend_from_slice(&first_sqn.to_be_bytes());
    body.extend_from_slice(&offset.to_be_bytes());
    body.extend_from_slice(&total.to_be_bytes());
    body
}

fn bench_single_message(c: &mut Criterion) {
    let mut stream_body = vec![0, 0];
    stream_body.extend_from_slice(&7u32.to_be_bytes());
    stream_body.extend_from_slice(&1u32.to_be_bytes());
    stream_body.extend_from_slice(&[0xAA; CTXINST_LEN]);
    let mut ctxinstd_body = vec![0, 0];
    ctxinstd_body.extend_from_slice(&[0x11; CTXINST_LEN]);

    let msg = message(
        &[
            (NHDR_STREAM, stream_body),
            (NHDR_CTXINSTD, ctxinstd_body),
            (NHDR_UME_ACK, vec![0; 6]),
        ],
        1,
        &[0x42; 256],
    );

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    let mut group = c.benchmark_group("decode_single");
    group.throughput(Throughput::Bytes(msg.len() as u64));
    group.bench_function("stream_correlated_256b", |b| {
        let mut frame = 0;
        b.iter(|| {
            frame += 1;
            let out = session.decode(&ctx(frame), black_box(&msg));
            black_box(out.payload.is_some())
        })
    });
    group.finish();
}

fn bench_decode_frame(c: &mut Criterion) {
    let mut frame = Vec::new();
    for sqn in 0..16 {
        frame.extend(message(&[], sqn, &[0x5A; 64]));
    }

    let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
    let mut group = c.benchmark_group("decode_frame");
    group.throughput(Throughput::Elements(16));
    group.bench_function("16_messages", |b| {
        b.iter(|| black_box(session.decode_frame(&ctx(1), black_box(&frame)).len()))
    });
    group.finish();
}

fn bench_reassembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassembly");
    for &total in &[4 * 1024usize, 64 * 1024, 256 * 1024] {
        let chunk = 1024;
        let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        let messages: Vec<Vec<u8>> = data
            .chunks(chunk)
            .enumerate()
            .map(|(i, piece)| {
                let body = frag_body(100, (i * chunk) as u32, total as u32);
                message(&[(NHDR_FRAG, body)], 100 + i as u32, piece)
            })
            .collect();

        group.throughput(Throughput::Bytes(total as u64));
        group.bench_with_input(BenchmarkId::from_parameter(total), &messages, |b, messages| {
            b.iter(|| {
                let mut session = DecodingSession::new(DecoderConfig::default()).expect("config");
                // Reverse order exercises out-of-order insertion
                let mut done = false;
                for (i, msg) in messages.iter().rev().enumerate() {
                    done = session.decode(&ctx(i as u64), msg).payload.is_some();
                }
                black_box(done)
            })
        });
    }
    group.finish();
}

criterion_group!(
    decode_benches,
    bench_single_message,
    bench_decode_frame,
    bench_reassembly
);
criterion_main!(decode_benches);
