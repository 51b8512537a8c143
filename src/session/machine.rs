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

//! Per-host session state machine.
//!
//! ```text
//! Spawning -> Authenticating -> [PasswordPending] -> Executing -> [SudoPending] -> Closing -> Done
//! ```
//!
//! Every state between `Spawning` and `Done` waits for output and asks the
//! [`PromptClassifier`] what it means. Each wait is bounded by the session
//! timeout, re-armed whenever a rule matches. A timeout or an early exit of
//! the ssh client fails the host with the outcome of the stage it happened
//! in, except that the client exiting while closing is a clean finish.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::classifier::{Action, Context, PromptClassifier, Reply};
use super::decode::OutputDecoder;
use super::outcome::{FailureReason, SessionOutcome, SessionReport};
use super::transport::{ReadEvent, SessionIo, SessionLauncher};
use crate::hostlist::Host;
use crate::security::Credentials;

/// Default bound on every wait for a prompt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(900);

/// Pending output is trimmed from the front beyond this size.
const MAX_PENDING_OUTPUT: usize = 128 * 1024;

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Spawning,
    Authenticating,
    PasswordPending,
    Executing,
    SudoPending,
    Closing,
    Done(SessionOutcome),
}

impl SessionState {
    /// The classifier context for states that wait on output.
    pub fn context(&self) -> Option<Context> {
        match self {
            Self::Authenticating => Some(Context::Login),
            Self::PasswordPending => Some(Context::Password),
            Self::Executing => Some(Context::Command),
            Self::SudoPending => Some(Context::Sudo),
            Self::Closing => Some(Context::Closing),
            Self::Spawning | Self::Done(_) => None,
        }
    }

    fn entering(context: Context) -> Self {
        match context {
            Context::Login => Self::Authenticating,
            Context::Password => Self::PasswordPending,
            Context::Command => Self::Executing,
            Context::Sudo => Self::SudoPending,
            Context::Closing => Self::Closing,
        }
    }
}

/// Drives one host from spawn to a [`SessionOutcome`].
pub struct SessionStateMachine<'a> {
    host: &'a Host,
    credentials: &'a Credentials,
    command: &'a str,
    timeout: Duration,
    state: SessionState,
    reason: Option<FailureReason>,
}

impl<'a> SessionStateMachine<'a> {
    pub fn new(host: &'a Host, credentials: &'a Credentials, command: &'a str) -> Self {
        Self {
            host,
            credentials,
            command,
            timeout: DEFAULT_TIMEOUT,
            state: SessionState::Spawning,
            reason: None,
        }
    }

    /// Set the bound on each wait for a prompt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Launch the ssh client and drive the session to completion.
    pub async fn run(mut self, launcher: &dyn SessionLauncher) -> SessionReport {
        let started = Instant::now();

        match launcher.launch(self.host, self.credentials.username()).await {
            Ok(mut io) => {
                self.drive(io.as_mut()).await;
                if let Err(e) = io.shutdown().await {
                    debug!("[{}] shutdown failed: {e:#}", self.host);
                }
            }
            Err(e) => {
                self.finish(
                    SessionOutcome::LoginFailure,
                    Some(FailureReason::Spawn(format!("{e:#}"))),
                );
            }
        }

        let outcome = match self.state {
            SessionState::Done(outcome) => outcome,
            // drive() only returns once a terminal state is reached
            other => SessionOutcome::failure_for(other.context().unwrap_or(Context::Login)),
        };

        SessionReport {
            host: self.host.clone(),
            outcome,
            reason: self.reason,
            elapsed: started.elapsed(),
        }
    }

    /// Drive an already-launched session until it reaches `Done`.
    pub async fn drive(&mut self, io: &mut dyn SessionIo) {
        if self.state == SessionState::Spawning {
            self.state = SessionState::Authenticating;
        }

        let classifier = match PromptClassifier::new(self.credentials.username(), self.host) {
            Ok(classifier) => classifier,
            Err(e) => {
                self.finish(
                    SessionOutcome::LoginFailure,
                    Some(FailureReason::Io(format!("{e:#}"))),
                );
                return;
            }
        };

        let mut decoder = OutputDecoder::new();
        let mut pending = String::new();
        let mut deadline = Instant::now() + self.timeout;

        while let Some(context) = self.state.context() {
            if let Some(hit) = classifier.classify(&pending, context) {
                trace!("[{}] {} matched rule '{}'", self.host, context, hit.rule);
                pending.drain(..hit.end);
                deadline = Instant::now() + self.timeout;
                if let Err(e) = self.apply(hit.action, io).await {
                    self.finish(
                        SessionOutcome::failure_for(context),
                        Some(FailureReason::Io(format!("{e:#}"))),
                    );
                }
                continue;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.timed_out(context);
                continue;
            }

            match io.read_chunk(remaining).await {
                Ok(ReadEvent::Data(bytes)) => match decoder.push(&bytes) {
                    Ok(text) => {
                        pending.push_str(&text);
                        trim_front(&mut pending, MAX_PENDING_OUTPUT);
                    }
                    Err(e) => self.finish(
                        SessionOutcome::failure_for(context),
                        Some(FailureReason::Io(e.to_string())),
                    ),
                },
                Ok(ReadEvent::TimedOut) => self.timed_out(context),
                Ok(ReadEvent::Eof) if context == Context::Closing => {
                    debug!("[{}] ssh client exited while closing", self.host);
                    self.finish(SessionOutcome::Success, None);
                }
                Ok(ReadEvent::Eof) => {
                    debug!("[{}] ssh client exited during {} stage", self.host, context);
                    self.finish(
                        SessionOutcome::failure_for(context),
                        Some(FailureReason::Eof(context)),
                    );
                }
                Err(e) => self.finish(
                    SessionOutcome::failure_for(context),
                    Some(FailureReason::Io(format!("{e:#}"))),
                ),
            }
        }
    }

    async fn apply(&mut self, action: Action, io: &mut dyn SessionIo) -> anyhow::Result<()> {
        match action {
            Action::Retry(reply) => self.send_reply(reply, io).await,
            Action::Advance(reply, next) => {
                self.send_reply(reply, io).await?;
                self.state = SessionState::entering(next);
                Ok(())
            }
            Action::Complete => {
                self.finish(SessionOutcome::Success, None);
                Ok(())
            }
            Action::Fail {
                outcome,
                reason,
                interrupt,
            } => {
                self.finish(outcome, Some(reason));
                if interrupt {
                    io.interrupt().await?;
                }
                Ok(())
            }
        }
    }

    async fn send_reply(&self, reply: Reply, io: &mut dyn SessionIo) -> anyhow::Result<()> {
        match reply {
            Reply::Yes => io.send(b"yes\n").await,
            Reply::Password => io.send(&self.credentials.password_line()).await,
            Reply::Command => io.send(format!("{}\n", self.command).as_bytes()).await,
            Reply::Exit => io.send(b"exit\n").await,
        }
    }

    fn timed_out(&mut self, context: Context) {
        debug!(
            "[{}] no prompt within {:?} during {} stage",
            self.host, self.timeout, context
        );
        self.finish(
            SessionOutcome::failure_for(context),
            Some(FailureReason::Timeout(context)),
        );
    }

    fn finish(&mut self, outcome: SessionOutcome, reason: Option<FailureReason>) {
        if matches!(self.state, SessionState::Done(_)) {
            return;
        }
        self.state = SessionState::Done(outcome);
        self.reason = reason;
    }
}

/// Drop the oldest output so `pending` stays within `max` bytes.
fn trim_front(pending: &mut String, max: usize) {
    if pending.len() <= max {
        return;
    }
    let mut cut = pending.len() - max;
    while !pending.is_char_boundary(cut) {
        cut += 1;
    }
    pending.drain(..cut);
}
