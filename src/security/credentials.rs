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

//! Shared login credentials with automatic memory clearing.
//!
//! The same username and password are used for the ssh login and for the
//! sudo prompt on every host, so they are captured once and then shared
//! read-only by all sessions.
//!
//! # Security Considerations
//! - The password lives in a `SecretString` and is zeroized on drop
//! - `Debug` output never reveals the password
//! - Never log or print the password
//! - The environment variable source is meant for automation only

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::io::{self, BufRead, Write};
use zeroize::Zeroizing;

use crate::error::RunError;

/// Environment variable consulted before prompting for the password.
pub const PASSWORD_ENV_VAR: &str = "SSHSUDO_PASSWORD";

/// Username and password shared by every host session.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Build credentials, rejecting empty values.
    ///
    /// A single trailing line terminator is stripped from both values first.
    pub fn new(username: String, password: String) -> Result<Self, RunError> {
        let username = strip_line_terminator(&username).to_string();
        if username.is_empty() {
            return Err(RunError::MissingCredential("username"));
        }
        validate_username(&username)?;

        let password = Zeroizing::new(password);
        let password = strip_line_terminator(&password);
        if password.is_empty() {
            return Err(RunError::MissingCredential("password"));
        }

        Ok(Self {
            username,
            password: SecretString::from(password.to_string()),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password followed by a newline, ready to be written to a prompt.
    ///
    /// The copy is cleared from memory when dropped.
    pub fn password_line(&self) -> Zeroizing<Vec<u8>> {
        let mut bytes = self.password.expose_secret().as_bytes().to_vec();
        bytes.push(b'\n');
        Zeroizing::new(bytes)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn strip_line_terminator(value: &str) -> &str {
    value
        .strip_suffix("\r\n")
        .or_else(|| value.strip_suffix('\n'))
        .unwrap_or(value)
}

/// The username becomes part of the ssh destination argument, so it must
/// not be mistaken for an option or split into several words.
fn validate_username(username: &str) -> Result<(), RunError> {
    if username.starts_with('-') || username.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(RunError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Get the password from `SSHSUDO_PASSWORD` if it is set.
///
/// # Security Warning
/// Environment variables can leak through process listings and shell
/// history. Prefer the interactive prompt.
///
/// # Returns
/// * `Ok(Some(_))` if the variable is set and non-empty
/// * `Ok(None)` if the variable is not set
/// * `Err` if the variable is set but empty
pub fn password_from_env() -> Result<Option<Zeroizing<String>>, RunError> {
    match std::env::var(PASSWORD_ENV_VAR) {
        Ok(password) if !password.is_empty() => Ok(Some(Zeroizing::new(password))),
        Ok(_) => Err(RunError::MissingCredential("password")),
        Err(_) => Ok(None),
    }
}

/// Collect credentials from the controlling terminal.
///
/// The username prompt is skipped when `username` is already known. The
/// password is read with echo disabled; `rpassword` restores the terminal
/// mode on every exit path, including read errors.
pub fn prompt_credentials(username: Option<String>) -> Result<Credentials, RunError> {
    let username = match username {
        Some(username) => username,
        None => read_username()?,
    };

    let password = match password_from_env()? {
        Some(password) => {
            eprintln!(
                "Warning: Using password from {PASSWORD_ENV_VAR} environment variable. \
                 This is not recommended for security reasons."
            );
            password
        }
        None => Zeroizing::new(
            rpassword::prompt_password("Password: ").map_err(|source| RunError::Terminal {
                what: "password",
                source,
            })?,
        ),
    };

    Credentials::new(username, password.to_string())
}

fn read_username() -> Result<String, RunError> {
    let terminal_error = |source: io::Error| RunError::Terminal {
        what: "username",
        source,
    };

    print!("Username: ");
    io::stdout().flush().map_err(terminal_error)?;

    let mut username = String::new();
    io::stdin()
        .lock()
        .read_line(&mut username)
        .map_err(terminal_error)?;
    Ok(username)
}
