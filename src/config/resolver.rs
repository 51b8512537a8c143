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

//! Merge command-line flags over configuration defaults.

use std::path::PathBuf;
use std::time::Duration;

use super::types::Config;
use crate::cli::{Cli, USAGE};
use crate::error::RunError;
use crate::session::DEFAULT_TIMEOUT;

/// Fully resolved settings for one run. CLI flags win over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_list: PathBuf,
    pub command: String,
    pub user: Option<String>,
    pub timeout: Duration,
    pub parallel: usize,
    pub ssh_program: String,
    pub ssh_options: Vec<String>,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self, RunError> {
        let defaults = &config.defaults;

        let server_list = cli
            .server_list
            .clone()
            .ok_or_else(|| RunError::Usage(format!("No server list specified.\n{USAGE}")))?;

        let command = cli
            .command
            .clone()
            .or_else(|| defaults.command.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                RunError::Usage(format!(
                    "No command specified. Use --command or set defaults.command in the configuration file.\n{USAGE}"
                ))
            })?;

        let timeout = match cli.timeout.or(defaults.timeout) {
            Some(0) => return Err(RunError::Usage("Timeout must be at least 1 second".to_string())),
            Some(seconds) => Duration::from_secs(seconds),
            None => DEFAULT_TIMEOUT,
        };

        let parallel = match cli.parallel.or(defaults.parallel) {
            Some(0) => return Err(RunError::Usage("Parallelism must be at least 1".to_string())),
            Some(n) => n,
            None => 1,
        };

        let ssh_options = if cli.ssh_options.is_empty() {
            defaults.ssh_options.clone()
        } else {
            cli.ssh_options.clone()
        };

        Ok(Self {
            server_list,
            command,
            user: cli.user.clone().or_else(|| defaults.user.clone()),
            timeout,
            parallel,
            ssh_program: cli
                .ssh_program
                .clone()
                .or_else(|| defaults.ssh_program.clone())
                .unwrap_or_else(|| "ssh".to_string()),
            ssh_options,
        })
    }
}
