// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reassembly of fragmented messages and fragmented extended options.

pub mod extopt;
pub mod fragment;
pub mod ranges;

pub use extopt::{ConfigOption, ExtOptReassembler, ExtendedOption, ExtendedOptionBody};
pub use fragment::{
    FragmentKey, FragmentOutcome, FragmentTable, FragmentTableStats, FragmentedMessageAssembly,
    ReassemblyStatus,
};
pub use ranges::RangeSet;
