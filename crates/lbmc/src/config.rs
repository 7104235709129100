// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoder configuration.
//!
//! Wire constants live in [`crate::protocol::constants`]; this module only
//! holds the limits and switches a host may tune per session.
//!
//! # Example
//!
//! ```
//! use lbmc::config::DecoderConfig;
//!
//! let config = DecoderConfig {
//!     max_pending_assemblies: 64,
//!     ..DecoderConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::ConfigError;

/// Default ceiling on a fragmented message's declared total length (64 MiB).
pub const DEFAULT_MAX_MESSAGE_LEN: u32 = 64 * 1024 * 1024;

/// Default bound on in-flight fragment assemblies.
pub const DEFAULT_MAX_PENDING_ASSEMBLIES: usize = 1024;

/// Default number of completed messages remembered for already-reassembled
/// reporting.
pub const DEFAULT_MAX_COMPLETED_ASSEMBLIES: usize = 4096;

/// Per-session decoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default, deny_unknown_fields))]
pub struct DecoderConfig {
    /// Fragments declaring a larger total length are rejected.
    pub max_message_len: u32,
    /// Least recently touched assembly is evicted beyond this many.
    pub max_pending_assemblies: usize,
    /// Completed messages remembered so late fragments are reported as
    /// already reassembled. Oldest completions are forgotten first.
    pub max_completed_assemblies: usize,
    /// Reject fragments whose overlapping bytes differ from those already
    /// received. When off, the first bytes received win.
    pub strict_overlap: bool,
    /// Invoke the payload classifier on complete payloads.
    pub classify_payloads: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_pending_assemblies: DEFAULT_MAX_PENDING_ASSEMBLIES,
            max_completed_assemblies: DEFAULT_MAX_COMPLETED_ASSEMBLIES,
            strict_overlap: true,
            classify_payloads: true,
        }
    }
}

impl DecoderConfig {
    /// Reject settings that would make the decoder unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_message_len",
                reason: "must be greater than zero",
            });
        }
        if self.max_pending_assemblies == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_pending_assemblies",
                reason: "must be greater than zero",
            });
        }
        if self.max_completed_assemblies == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_completed_assemblies",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Parse and validate a YAML document. Missing keys keep their defaults.
    ///
    /// ```yaml
    /// max_message_len: 1048576
    /// strict_overlap: false
    /// ```
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}
