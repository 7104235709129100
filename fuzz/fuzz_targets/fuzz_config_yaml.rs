// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use lbmc::DecoderConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        if let Ok(config) = DecoderConfig::from_yaml_str(yaml) {
            assert!(config.validate().is_ok());
        }
    }
});
