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

//! Interactive ssh/sudo sessions, one host at a time.
//!
//! - [`classifier`]: ordered prompt rules per session stage
//! - [`machine`]: the state machine that answers those prompts
//! - [`transport`]: the seam to the ssh client process
//! - [`pty`]: the real ssh client, spawned on a pseudo-terminal

pub mod classifier;
mod decode;
pub mod machine;
mod outcome;
pub mod pty;
pub mod transport;

pub use classifier::{Action, Classification, Context, PromptClassifier, Reply, Rule};
pub use machine::{SessionState, SessionStateMachine, DEFAULT_TIMEOUT};
pub use outcome::{FailureReason, SessionOutcome, SessionReport};
pub use pty::{PtySession, SshLauncher};
pub use transport::{ReadEvent, SessionIo, SessionLauncher, INTERRUPT};
