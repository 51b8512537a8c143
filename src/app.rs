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
//! Top-level flow of one sshsudo invocation.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::config::{Config, Settings};
use crate::error::RunError;
use crate::hostlist::HostListReader;
use crate::runner::{RunController, RunOptions};
use crate::security::prompt_credentials;
use crate::session::SshLauncher;
use crate::ui::OutputFormatter;

/// Resolve settings, collect credentials and drive every host.
///
/// Returns the process exit code for a run that got as far as processing
/// the server list. Errors raised before that point carry their own code
/// through [`RunError::exit_code`].
pub async fn run(cli: Cli) -> Result<u8, RunError> {
    let config = Config::load_with_priority(cli.config.as_deref()).await?;
    let settings = Settings::resolve(&cli, &config)?;
    debug!("Resolved settings: {:?}", settings);

    // Open the list before asking for a password so a typo fails fast.
    let hosts = HostListReader::open(&settings.server_list)?;
    let credentials = Arc::new(prompt_credentials(settings.user.clone())?);

    println!(
        "{}",
        OutputFormatter::format_command_header(
            &settings.command,
            &settings.server_list.display().to_string()
        )
    );

    let launcher = Arc::new(SshLauncher::new(
        settings.ssh_program.clone(),
        settings.ssh_options.clone(),
    ));
    let options = RunOptions {
        command: settings.command.clone(),
        timeout: settings.timeout,
        parallel: settings.parallel,
    };

    let controller = RunController::new(launcher, credentials, options);
    let summary = controller.run_until(hosts, shutdown_signal()).await?;
    Ok(summary.exit_code())
}

/// Resolves on the first Ctrl+C.
fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received SIGINT (Ctrl+C)");
    }
}
