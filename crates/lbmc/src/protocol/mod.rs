// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LBMC wire protocol: basic header, extension header chain, schema registry.

pub mod constants;
pub mod flags;
pub mod header;
pub mod schema;
pub mod walker;

pub use flags::{BatchFlags, ExtOptFlags};
pub use header::{BasicHeader, MessageKind};
pub use schema::{
    header_name, DefaultSchema, DestinationInfo, DomainEndpoint, ExtOptFragment, FragmentInfo,
    HeaderFields, HeaderSchema, StreamInfo,
};
pub use walker::{walk, ChainStatus, ExtensionHeaderRecord, HeaderChain};
