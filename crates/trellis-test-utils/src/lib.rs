// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Trellis integration tests.
//!
//! Provides in-memory plugins and configuration sources for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`Probe`] - Embeddable lifecycle with counters, injected failures and delays
//! - [`ProbePlugin`] - A plugin of any kind built on a probe (doubles as a hook)
//! - [`MockInit`] - Bootstrap plugin backed by a string map
//! - [`MockCache`] - In-memory cache honoring expiry on tokio time
//! - [`RecordingLogger`] - Logging plugin that captures every entry
//! - [`MemorySource`] - Scripted configuration source

pub mod memory_source;
pub mod mock_cache;
pub mod mock_init;
pub mod probe;
pub mod recording_logger;

pub use memory_source::MemorySource;
pub use mock_cache::MockCache;
pub use mock_init::MockInit;
pub use probe::{Journal, Probe, ProbePlugin};
pub use recording_logger::{LogLevel, RecordingLogger};
