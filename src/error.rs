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

//! Process-fatal error types.
//!
//! Everything in here is raised before the first host is contacted. Failures
//! that happen while a host is being driven never surface as a [`RunError`];
//! they are folded into that host's
//! [`SessionOutcome`](crate::session::SessionOutcome) instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::hostlist::HostListError;

/// Exit code for a run where every host succeeded.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for a run where at least one host failed.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for usage and argument errors.
pub const EXIT_USAGE: u8 = 2;

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Bad or missing command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// The configuration file could not be read or parsed.
    #[error("failed to load configuration from {}: {source:#}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Username or password was empty.
    #[error("missing {0}")]
    MissingCredential(&'static str),

    /// The username cannot be safely passed to the ssh client.
    #[error("invalid username '{0}': must not start with '-' or contain whitespace")]
    InvalidUsername(String),

    /// Reading from the controlling terminal failed.
    #[error("failed to read {what} from terminal: {source}")]
    Terminal {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The server list could not be opened or read.
    #[error(transparent)]
    ServerList(#[from] HostListError),
}

impl RunError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) | Self::Config { .. } => EXIT_USAGE,
            Self::MissingCredential(_)
            | Self::InvalidUsername(_)
            | Self::Terminal { .. }
            | Self::ServerList(_) => EXIT_FAILURE,
        }
    }
}
