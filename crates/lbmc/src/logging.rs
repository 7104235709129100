// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Function-entry tracing.
//!
//! Regular diagnostics go straight through the `log` facade with a bracketed
//! component tag (`[LBMC-WALK]`, `[FragTable]`, ...). The `trace_fn!` macro is
//! reserved for hot-path entry points and compiles to nothing unless the
//! `trace` feature is enabled.
//!
//! ```ignore
//! fn walk(...) {
//!     crate::trace_fn!("walk");
//! }
//! ```

/// Trace function entry (when `trace` feature enabled).
#[macro_export]
#[cfg(feature = "trace")]
macro_rules! trace_fn {
    ($fn_name:expr) => {
        log::trace!("[TRACE] -> {}", $fn_name);
    };
}

/// No-op trace macro (when `trace` feature disabled).
#[macro_export]
#[cfg(not(feature = "trace"))]
macro_rules! trace_fn {
    ($fn_name:expr) => {};
}
