// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extended option reassembly.
//!
//! EXTOPT headers carry a secondary sub-format that is fragmented on its own
//! within a single message's header chain. At most one option is open at a
//! time, so the engine is a single slot:
//!
//! ```text
//! Idle --begin--> Open(subtype, buffer) --append*--> Open --finish--> Idle
//! ```
//!
//! A `begin` while an option is open discards the stale buffer and returns
//! to Idle with [`DecodeError::UnexpectedRestart`] rather than getting stuck.

use crate::core::Cursor;
use crate::error::{DecodeError, Result};
use crate::protocol::constants::{EXTOPT_SUBTYPE_CFGOPT, EXTOPT_SUBTYPE_MSGSEL};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Slot {
    #[default]
    Idle,
    Open { subtype: u16, buffer: Vec<u8> },
}

/// Single-slot reassembly state for extended options.
#[derive(Debug, Clone, Default)]
pub struct ExtOptReassembler {
    slot: Slot,
}

impl ExtOptReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.slot, Slot::Open { .. })
    }

    /// Subtype of the open option, if any.
    pub fn open_subtype(&self) -> Option<u16> {
        match &self.slot {
            Slot::Open { subtype, .. } => Some(*subtype),
            Slot::Idle => None,
        }
    }

    /// Bytes buffered for the open option (0 when Idle).
    pub fn buffered_len(&self) -> usize {
        match &self.slot {
            Slot::Open { buffer, .. } => buffer.len(),
            Slot::Idle => 0,
        }
    }

    /// Open a new option of `subtype`.
    ///
    /// Fails with `UnexpectedRestart` if one is already open; the engine is
    /// left Idle in that case.
    pub fn begin(&mut self, subtype: u16) -> Result<()> {
        if let Slot::Open {
            subtype: open_subtype,
            buffer,
        } = std::mem::take(&mut self.slot)
        {
            log::debug!(
                "[ExtOpt] restart: subtype 0x{:04x} open with {} bytes, new subtype 0x{:04x}",
                open_subtype,
                buffer.len(),
                subtype
            );
            return Err(DecodeError::UnexpectedRestart {
                open_subtype,
                new_subtype: subtype,
            });
        }
        self.slot = Slot::Open {
            subtype,
            buffer: Vec::new(),
        };
        Ok(())
    }

    /// Write `bytes` at `offset` within the open option's buffer.
    pub fn append(&mut self, offset: u16, bytes: &[u8]) -> Result<()> {
        let Slot::Open { buffer, .. } = &mut self.slot else {
            return Err(DecodeError::NoOpenOption);
        };
        let start = offset as usize;
        let end = start + bytes.len();
        if buffer.len() < end {
            buffer.resize(end, 0);
        }
        buffer[start..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Close the open option and hand back its contents.
    pub fn finish(&mut self) -> Result<ExtendedOption> {
        match std::mem::take(&mut self.slot) {
            Slot::Open { subtype, buffer } => {
                log::debug!(
                    "[ExtOpt] option 0x{:04x} complete ({} bytes)",
                    subtype,
                    buffer.len()
                );
                Ok(ExtendedOption {
                    subtype,
                    ignore: false,
                    data: buffer,
                })
            }
            Slot::Idle => Err(DecodeError::NoOpenOption),
        }
    }

    /// Drop any open option.
    pub fn reset(&mut self) {
        self.slot = Slot::Idle;
    }
}

/// A fully reassembled extended option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedOption {
    pub subtype: u16,
    /// Sender marked the option as safe to ignore.
    pub ignore: bool,
    pub data: Vec<u8>,
}

/// One `(scope, parent, name, value)` configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOption {
    pub scope: u8,
    pub parent: u8,
    pub name: String,
    pub value: String,
}

/// Interpreted option body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedOptionBody<'a> {
    ConfigOptions(Vec<ConfigOption>),
    MessageSelector(String),
    Raw(&'a [u8]),
}

impl ExtendedOption {
    /// Interpret the data according to the subtype.
    pub fn body(&self) -> Result<ExtendedOptionBody<'_>> {
        match self.subtype {
            EXTOPT_SUBTYPE_CFGOPT => {
                let mut cursor = Cursor::new(&self.data);
                let mut options = Vec::new();
                while !cursor.is_eof() {
                    let scope = cursor.read_u8()?;
                    let parent = cursor.read_u8()?;
                    let name = String::from_utf8_lossy(cursor.read_cstr()).into_owned();
                    let value = String::from_utf8_lossy(cursor.read_cstr()).into_owned();
                    options.push(ConfigOption {
                        scope,
                        parent,
                        name,
                        value,
                    });
                }
                Ok(ExtendedOptionBody::ConfigOptions(options))
            }
            EXTOPT_SUBTYPE_MSGSEL => {
                let selector = Cursor::new(&self.data).read_cstr();
                Ok(ExtendedOptionBody::MessageSelector(
                    String::from_utf8_lossy(selector).into_owned(),
                ))
            }
            _ => Ok(ExtendedOptionBody::Raw(&self.data)),
        }
    }
}
