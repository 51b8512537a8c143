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

//! Run controller: every host in the list, one session each.

mod tally;

pub use tally::{RunSummary, RunTally};

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::RunError;
use crate::hostlist::{Host, HostListError};
use crate::security::Credentials;
use crate::session::{SessionLauncher, SessionReport, SessionStateMachine, DEFAULT_TIMEOUT};
use crate::ui::OutputFormatter;

/// Settings shared by every host session of a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Command line sent to the remote shell.
    pub command: String,
    /// Bound on each wait for a prompt.
    pub timeout: Duration,
    /// Maximum number of hosts driven at once.
    pub parallel: usize,
}

impl RunOptions {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: DEFAULT_TIMEOUT,
            parallel: 1,
        }
    }
}

/// Drives every host of a server list and accumulates the tally.
///
/// A failing host never stops the run. With `parallel == 1` each host is
/// finished before the next one is started. With more, up to `parallel`
/// sessions run at once, each owning its own ssh client; tally updates stay
/// in this task, which consumes finished sessions one at a time.
pub struct RunController {
    launcher: Arc<dyn SessionLauncher>,
    credentials: Arc<Credentials>,
    options: RunOptions,
}

impl RunController {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        credentials: Arc<Credentials>,
        options: RunOptions,
    ) -> Self {
        Self {
            launcher,
            credentials,
            options,
        }
    }

    /// Process every host.
    pub async fn run<I>(&self, hosts: I) -> Result<RunSummary, RunError>
    where
        I: IntoIterator<Item = Result<Host, HostListError>>,
    {
        self.run_until(hosts, std::future::pending()).await
    }

    /// Process hosts until the list is exhausted or `shutdown` resolves.
    ///
    /// On shutdown, sessions still in flight are dropped, which kills their
    /// ssh clients, and the summary covers completed hosts only.
    pub async fn run_until<I, S>(&self, hosts: I, shutdown: S) -> Result<RunSummary, RunError>
    where
        I: IntoIterator<Item = Result<Host, HostListError>>,
        S: Future<Output = ()>,
    {
        let parallel = self.options.parallel.max(1);
        debug!("Running with up to {} concurrent sessions", parallel);

        let sessions = stream::iter(hosts)
            .map(|entry| async move {
                let host = entry?;
                Ok::<SessionReport, HostListError>(self.run_host(host).await)
            })
            .buffer_unordered(parallel);
        tokio::pin!(sessions);
        tokio::pin!(shutdown);

        let mut tally = RunTally::default();
        let mut interrupted = false;

        loop {
            tokio::select! {
                next = sessions.next() => match next {
                    Some(Ok(report)) => {
                        Self::print_report(&report);
                        tally.record(report.outcome);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                _ = &mut shutdown => {
                    warn!("Interrupted, aborting sessions in flight");
                    interrupted = true;
                    break;
                }
            }
        }

        let summary = RunSummary { tally, interrupted };
        info!(
            "Run finished: {} succeeded, {} failed{}",
            tally.successes(),
            tally.failures(),
            if interrupted { " (interrupted)" } else { "" }
        );
        Self::print_summary(&summary);
        Ok(summary)
    }

    async fn run_host(&self, host: Host) -> SessionReport {
        println!("{}", OutputFormatter::format_host_start(&host));
        SessionStateMachine::new(&host, &self.credentials, &self.options.command)
            .with_timeout(self.options.timeout)
            .run(self.launcher.as_ref())
            .await
    }

    fn print_report(report: &SessionReport) {
        if report.is_success() {
            println!("{}", OutputFormatter::format_host_success(report));
        } else {
            if let Some(reason) = &report.reason {
                debug!("[{}] {:?}: {}", report.host, report.outcome, reason);
            }
            eprintln!("{}", OutputFormatter::format_host_failure(report));
        }
    }

    fn print_summary(summary: &RunSummary) {
        let line = OutputFormatter::format_summary(&summary.tally, summary.interrupted);
        if summary.tally.failures() == 0 && !summary.interrupted {
            println!("{line}");
        } else {
            eprintln!("{line}");
        }
    }
}
