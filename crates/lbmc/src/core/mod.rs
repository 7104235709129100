// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Low-level helpers shared by the protocol, reassembly and stream layers.

pub mod cursor;
pub mod frame;

pub use cursor::Cursor;
pub use frame::FrameMarker;
