// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted configuration source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use trellis_config::ConfigSource;
use trellis_core::TrellisError;

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<Result<Value, String>>,
    steady: Value,
}

/// A configuration source that replays queued reads.
///
/// Each read takes the next queued tree or error; once the queue is empty,
/// reads return the last tree handed out (initially `null`). Clones share
/// the same script, so a test can keep a handle after moving the source
/// into a store.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    script: Arc<Mutex<Script>>,
    reads: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `tree` as the steady value.
    pub fn with_tree(tree: Value) -> Self {
        let source = Self::new();
        source.script().steady = tree;
        source
    }

    /// Queues a tree for an upcoming read.
    pub fn push(&self, tree: Value) {
        self.script().queued.push_back(Ok(tree));
    }

    /// Queues a failing read.
    pub fn push_error(&self, message: impl Into<String>) {
        self.script().queued.push_back(Err(message.into()));
    }

    /// Number of reads so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConfigSource for MemorySource {
    fn describe(&self) -> String {
        "memory".into()
    }

    async fn read(&self) -> Result<Value, TrellisError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script();
        match script.queued.pop_front() {
            Some(Ok(tree)) => {
                script.steady = tree.clone();
                Ok(tree)
            }
            Some(Err(message)) => Err(TrellisError::Unavailable {
                message,
                source: None,
            }),
            None => Ok(script.steady.clone()),
        }
    }
}
