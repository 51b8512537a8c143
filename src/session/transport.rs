// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Transport seam between the session state machine and the ssh client.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::hostlist::Host;

/// Ctrl+C as seen by a terminal line discipline.
pub const INTERRUPT: u8 = 0x03;

/// Result of waiting for subprocess output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Data(Vec<u8>),
    /// The subprocess closed its terminal.
    Eof,
    /// Nothing arrived within the wait bound.
    TimedOut,
}

/// A live interactive session with one host.
#[async_trait]
pub trait SessionIo: Send {
    /// Wait up to `timeout` for the next chunk of output.
    async fn read_chunk(&mut self, timeout: Duration) -> Result<ReadEvent>;

    /// Write raw bytes to the session's terminal.
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Send the interrupt character.
    async fn interrupt(&mut self) -> Result<()> {
        self.send(&[INTERRUPT]).await
    }

    /// Tear the session down, killing the subprocess if it is still alive.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Starts sessions. One call per host.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, host: &Host, username: &str) -> Result<Box<dyn SessionIo>>;
}
