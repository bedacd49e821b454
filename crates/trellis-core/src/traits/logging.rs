// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging plugin contract.

use crate::traits::plugin::Plugin;

/// Application log sink with four severities.
///
/// Sinks are synchronous; implementations that ship logs over the network
/// buffer internally.
pub trait LoggingPlugin: Plugin {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, error: &(dyn std::error::Error + 'static));
}
