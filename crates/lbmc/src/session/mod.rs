// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session orchestration: one [`DecodingSession`] per capture.

pub mod context;
pub mod decoder;
pub mod event;
pub mod hooks;

pub use context::FrameContext;
pub use decoder::{DecodingSession, SessionBuilder, SessionStats};
pub use event::{DecodedMessage, MessageStatus, StreamUpdate};
pub use hooks::{NoClassifier, NoTopicResolver, PayloadClassifier, TopicResolver};
