// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host collaborators used for labelling only.
//!
//! Neither hook can influence reassembly or stream correlation; their output
//! is attached to the decoded message as-is.

/// Names the protocol carried in a complete payload.
pub trait PayloadClassifier {
    fn classify(&self, payload: &[u8]) -> Option<String>;
}

/// Resolves a (channel, topic index) pair to a topic name.
pub trait TopicResolver {
    fn resolve(&self, channel: u64, topic_index: u32) -> Option<String>;
}

impl<F> PayloadClassifier for F
where
    F: Fn(&[u8]) -> Option<String>,
{
    fn classify(&self, payload: &[u8]) -> Option<String> {
        self(payload)
    }
}

impl<F> TopicResolver for F
where
    F: Fn(u64, u32) -> Option<String>,
{
    fn resolve(&self, channel: u64, topic_index: u32) -> Option<String> {
        self(channel, topic_index)
    }
}

/// Classifier that never recognizes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl PayloadClassifier for NoClassifier {
    fn classify(&self, _payload: &[u8]) -> Option<String> {
        None
    }
}

/// Resolver that knows no topics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTopicResolver;

impl TopicResolver for NoTopicResolver {
    fn resolve(&self, _channel: u64, _topic_index: u32) -> Option<String> {
        None
    }
}
