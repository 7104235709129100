// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named views of packed flag fields.
//!
//! Raw masks are decoded once here; the rest of the crate only sees booleans.

use super::constants::{
    BATCH_FLAG_END, BATCH_FLAG_START, EXTOPT_FLAG_IGNORE, EXTOPT_FLAG_IGNORE_SUBTYPE,
    EXTOPT_FLAG_MORE_FRAGMENTS,
};

/// BATCH header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchFlags {
    pub start: bool,
    pub end: bool,
}

impl BatchFlags {
    pub fn from_bits(bits: u16) -> Self {
        Self {
            start: bits & BATCH_FLAG_START != 0,
            end: bits & BATCH_FLAG_END != 0,
        }
    }
}

/// EXTOPT header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtOptFlags {
    /// Receivers that do not understand the option may skip it.
    pub ignore: bool,
    /// Receivers that do not understand the subtype may skip it.
    pub ignore_subtype: bool,
    /// More fragments of this option follow in the same chain.
    pub more_fragments: bool,
}

impl ExtOptFlags {
    pub fn from_bits(bits: u8) -> Self {
        Self {
            ignore: bits & EXTOPT_FLAG_IGNORE != 0,
            ignore_subtype: bits & EXTOPT_FLAG_IGNORE_SUBTYPE != 0,
            more_fragments: bits & EXTOPT_FLAG_MORE_FRAGMENTS != 0,
        }
    }
}
