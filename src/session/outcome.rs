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

//! Result types for a single host session.

use std::fmt;
use std::time::Duration;

use super::classifier::Context;
use crate::hostlist::Host;

/// How a host session ended. Exactly one is produced per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Success,
    LoginFailure,
    SudoFailure,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure outcome charged to a wait that breaks down in `context`.
    ///
    /// Waits before the command was sent count against the login; waits
    /// after it count against the privileged command.
    pub fn failure_for(context: Context) -> Self {
        match context {
            Context::Login | Context::Password => Self::LoginFailure,
            Context::Command | Context::Sudo | Context::Closing => Self::SudoFailure,
        }
    }
}

/// Why a session failed. Observational only; counting uses the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The ssh client could not be started.
    Spawn(String),
    DnsResolution,
    ConnectionTimeout,
    HostKeyMismatch,
    /// Public key authentication was rejected and no password was offered.
    KeyAuthRejected,
    PasswordRejected,
    SudoRejected,
    /// No rule matched before the wait bound expired.
    Timeout(Context),
    /// The ssh client exited before a rule matched.
    Eof(Context),
    /// Reading from or writing to the ssh client failed.
    Io(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to start ssh client: {e}"),
            Self::DnsResolution => f.write_str("could not resolve hostname"),
            Self::ConnectionTimeout => f.write_str("connection timed out"),
            Self::HostKeyMismatch => f.write_str("host key verification failed"),
            Self::KeyAuthRejected => f.write_str("public key authentication rejected"),
            Self::PasswordRejected => f.write_str("password rejected"),
            Self::SudoRejected => f.write_str("sudo password rejected"),
            Self::Timeout(context) => write!(f, "timed out waiting in {context} stage"),
            Self::Eof(context) => write!(f, "ssh exited during {context} stage"),
            Self::Io(e) => write!(f, "session I/O error: {e}"),
        }
    }
}

/// Everything the controller learns about one host.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub host: Host,
    pub outcome: SessionOutcome,
    pub reason: Option<FailureReason>,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_for_context() {
        assert_eq!(
            SessionOutcome::failure_for(Context::Login),
            SessionOutcome::LoginFailure
        );
        assert_eq!(
            SessionOutcome::failure_for(Context::Password),
            SessionOutcome::LoginFailure
        );
        assert_eq!(
            SessionOutcome::failure_for(Context::Command),
            SessionOutcome::SudoFailure
        );
        assert_eq!(
            SessionOutcome::failure_for(Context::Sudo),
            SessionOutcome::SudoFailure
        );
        assert_eq!(
            SessionOutcome::failure_for(Context::Closing),
            SessionOutcome::SudoFailure
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            FailureReason::Timeout(Context::Sudo).to_string(),
            "timed out waiting in sudo stage"
        );
        assert_eq!(
            FailureReason::DnsResolution.to_string(),
            "could not resolve hostname"
        );
    }
}
