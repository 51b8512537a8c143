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

//! Prompt classification for interactive ssh and sudo sessions.
//!
//! The ssh client and the remote shell talk to us in free-form text. This
//! module turns that text into decisions using one ordered rule table per
//! [`Context`]. The first rule of the current table that matches anywhere
//! in the pending output wins, so rule order is significant:
//!
//! | Context    | Rules, in priority order                                                   |
//! |------------|-----------------------------------------------------------------------------|
//! | `Login`    | host key confirmation, DNS failure, connect timeout, host key mismatch, password prompt, key auth rejected, shell prompt |
//! | `Password` | password rejected, shell prompt                                             |
//! | `Command`  | sudo password prompt, shell prompt                                         |
//! | `Sudo`     | sudo rejected, shell prompt                                                 |
//! | `Closing`  | connection closed                                                           |
//!
//! Every pattern that can collide across hosts (prompts, the close banner)
//! interpolates the username, host, or host basename, regex-escaped.
//!
//! Classification is a pure function of the output and the context; the
//! classifier holds no state beyond its compiled tables.

use anyhow::{Context as _, Result};
use regex::Regex;
use std::fmt;

use super::outcome::{FailureReason, SessionOutcome};
use crate::hostlist::Host;

/// The stage of a session a piece of output is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Waiting for the ssh client to authenticate.
    Login,
    /// A login password was sent.
    Password,
    /// The remote command was sent.
    Command,
    /// A sudo password was sent.
    Sudo,
    /// `exit` was sent.
    Closing,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::Password => "password",
            Self::Command => "command",
            Self::Sudo => "sudo",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Input written back to the ssh client when a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// `yes` to the host key confirmation.
    Yes,
    /// The shared password.
    Password,
    /// The configured remote command.
    Command,
    /// `exit` to close the remote shell.
    Exit,
}

/// What the session does when a rule matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send the reply and keep waiting in the same context.
    Retry(Reply),
    /// Send the reply and switch to another context.
    Advance(Reply, Context),
    /// The remote session is closed and the host succeeded.
    Complete,
    /// The host failed. `interrupt` sends Ctrl+C before giving up.
    Fail {
        outcome: SessionOutcome,
        reason: FailureReason,
        interrupt: bool,
    },
}

/// One pattern → action entry of a rule table.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub action: Action,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, action: Action) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid pattern for rule '{name}': {pattern}"))?;
        Ok(Self {
            name,
            pattern,
            action,
        })
    }
}

/// The winning rule for a piece of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub rule: &'static str,
    pub action: Action,
    /// Byte offset just past the matched text.
    pub end: usize,
}

/// Ordered rule tables for one user on one host.
#[derive(Debug)]
pub struct PromptClassifier {
    login: Vec<Rule>,
    password: Vec<Rule>,
    command: Vec<Rule>,
    sudo: Vec<Rule>,
    closing: Vec<Rule>,
}

fn fail(outcome: SessionOutcome, reason: FailureReason, interrupt: bool) -> Action {
    Action::Fail {
        outcome,
        reason,
        interrupt,
    }
}

impl PromptClassifier {
    /// Compile the rule tables for `username` on `host`.
    pub fn new(username: &str, host: &Host) -> Result<Self> {
        let user = regex::escape(username);
        let raw_host = regex::escape(host.raw());
        let shell_prompt = format!("{user}@{}:~\\$", regex::escape(host.basename()));

        use SessionOutcome::{LoginFailure, SudoFailure};

        let login = vec![
            Rule::new(
                "host-key-confirmation",
                r"Are you sure you want to continue connecting \(yes/no",
                Action::Retry(Reply::Yes),
            )?,
            Rule::new(
                "dns-failure",
                r"Could not resolve hostname",
                fail(LoginFailure, FailureReason::DnsResolution, false),
            )?,
            Rule::new(
                "connection-timeout",
                r"Connection timed out|Operation timed out",
                fail(LoginFailure, FailureReason::ConnectionTimeout, false),
            )?,
            Rule::new(
                "host-key-mismatch",
                r"REMOTE HOST IDENTIFICATION HAS CHANGED|Host key verification failed",
                fail(LoginFailure, FailureReason::HostKeyMismatch, true),
            )?,
            Rule::new(
                "password-prompt",
                &format!("{user}@{raw_host}'s password:"),
                Action::Advance(Reply::Password, Context::Password),
            )?,
            Rule::new(
                "key-auth-rejected",
                r"Permission denied \(",
                fail(LoginFailure, FailureReason::KeyAuthRejected, false),
            )?,
            Rule::new(
                "shell-prompt",
                &shell_prompt,
                Action::Advance(Reply::Command, Context::Command),
            )?,
        ];

        let password = vec![
            Rule::new(
                "password-rejected",
                r"Permission denied, please try again\.",
                fail(LoginFailure, FailureReason::PasswordRejected, true),
            )?,
            Rule::new(
                "shell-prompt",
                &shell_prompt,
                Action::Advance(Reply::Command, Context::Command),
            )?,
        ];

        let command = vec![
            Rule::new(
                "sudo-prompt",
                &format!(r"\[sudo\] password for {user}:"),
                Action::Advance(Reply::Password, Context::Sudo),
            )?,
            Rule::new(
                "shell-prompt",
                &shell_prompt,
                Action::Advance(Reply::Exit, Context::Closing),
            )?,
        ];

        let sudo = vec![
            Rule::new(
                "sudo-rejected",
                r"Sorry, try again\.",
                fail(SudoFailure, FailureReason::SudoRejected, true),
            )?,
            Rule::new(
                "shell-prompt",
                &shell_prompt,
                Action::Advance(Reply::Exit, Context::Closing),
            )?,
        ];

        let closing = vec![Rule::new(
            "connection-closed",
            &format!(r"Connection to {raw_host} closed\."),
            Action::Complete,
        )?];

        Ok(Self {
            login,
            password,
            command,
            sudo,
            closing,
        })
    }

    /// The rule table for a context, in priority order.
    pub fn rules(&self, context: Context) -> &[Rule] {
        match context {
            Context::Login => &self.login,
            Context::Password => &self.password,
            Context::Command => &self.command,
            Context::Sudo => &self.sudo,
            Context::Closing => &self.closing,
        }
    }

    /// Find the first rule of `context` that matches `output`.
    pub fn classify(&self, output: &str, context: Context) -> Option<Classification> {
        self.rules(context).iter().find_map(|rule| {
            rule.pattern.find(output).map(|m| Classification {
                rule: rule.name,
                action: rule.action.clone(),
                end: m.end(),
            })
        })
    }
}
