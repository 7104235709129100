// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use lbmc::{walk, DefaultSchema};

fuzz_target!(|data: &[u8]| {
    let Some((&first_type, chain)) = data.split_first() else {
        return;
    };
    let chain = walk(&DefaultSchema, chain, 0, first_type);
    if let Some(offset) = chain.payload_offset {
        assert!(offset <= data.len() - 1);
    }
});
