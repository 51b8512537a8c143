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
//! Scripted transport for driving sessions without a real ssh client.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sshsudo::hostlist::Host;
use sshsudo::security::Credentials;
use sshsudo::session::{ReadEvent, SessionIo, SessionLauncher};

pub const USER: &str = "admin";
pub const PASSWORD: &str = "s3cret";

/// One scripted reaction of the fake ssh client.
#[derive(Debug, Clone)]
pub enum Step {
    /// Produce this output on the next read.
    Output(String),
    /// Report that the client exited.
    Eof,
    /// Report that nothing arrived within the wait bound.
    Hang,
    /// Never produce anything.
    Stall,
    /// Wait this long before the next step, or time out if the read bound
    /// is shorter.
    Delay(Duration),
}

pub fn out(text: &str) -> Step {
    Step::Output(text.to_string())
}

pub fn credentials() -> Credentials {
    Credentials::new(USER.to_string(), PASSWORD.to_string()).unwrap()
}

pub fn password_prompt(host: &str) -> String {
    format!("{USER}@{host}'s password: ")
}

pub fn shell_prompt(basename: &str) -> String {
    format!("\r\n{USER}@{basename}:~$ ")
}

pub fn closed(host: &str) -> String {
    format!("exit\r\nlogout\r\nConnection to {host} closed.\r\n")
}

/// Everything a scripted session wrote.
pub type SendLog = Arc<Mutex<Vec<Vec<u8>>>>;

pub struct ScriptedIo {
    steps: VecDeque<Step>,
    sent: SendLog,
    active: Option<Arc<AtomicUsize>>,
}

impl ScriptedIo {
    pub fn new(steps: Vec<Step>) -> (Self, SendLog) {
        let sent = SendLog::default();
        (
            Self {
                steps: steps.into(),
                sent: Arc::clone(&sent),
                active: None,
            },
            sent,
        )
    }
}

#[async_trait]
impl SessionIo for ScriptedIo {
    async fn read_chunk(&mut self, timeout: Duration) -> Result<ReadEvent> {
        loop {
            match self.steps.pop_front() {
                Some(Step::Output(text)) => return Ok(ReadEvent::Data(text.into_bytes())),
                Some(Step::Eof) | None => return Ok(ReadEvent::Eof),
                Some(Step::Hang) => return Ok(ReadEvent::TimedOut),
                Some(Step::Stall) => std::future::pending::<()>().await,
                Some(Step::Delay(delay)) if delay > timeout => {
                    tokio::time::sleep(timeout).await;
                    self.steps.push_front(Step::Delay(delay - timeout));
                    return Ok(ReadEvent::TimedOut);
                }
                Some(Step::Delay(delay)) => tokio::time::sleep(delay).await,
            }
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.sent.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(active) = self.active.take() {
            active.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for ScriptedIo {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Hands out one scripted session per host. Unknown hosts fail to spawn.
#[derive(Default)]
pub struct ScriptedLauncher {
    scripts: HashMap<String, Vec<Step>>,
    logs: Mutex<HashMap<String, SendLog>>,
    launched: Mutex<Vec<String>>,
    active: Arc<AtomicUsize>,
    max_active: AtomicUsize,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, steps: Vec<Step>) -> Self {
        self.scripts.insert(host.to_string(), steps);
        self
    }

    /// Bytes written to a host's session, if it was launched.
    pub fn sent(&self, host: &str) -> Vec<Vec<u8>> {
        self.logs
            .lock()
            .unwrap()
            .get(host)
            .map(|log| log.lock().unwrap().clone())
            .unwrap_or_default()
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }

    /// Highest number of sessions that were alive at once.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self, host: &Host, username: &str) -> Result<Box<dyn SessionIo>> {
        assert_eq!(username, USER);
        self.launched.lock().unwrap().push(host.raw().to_string());

        let Some(steps) = self.scripts.get(host.raw()) else {
            bail!("No such file or directory (os error 2)");
        };

        let (mut io, sent) = ScriptedIo::new(steps.clone());
        self.logs
            .lock()
            .unwrap()
            .insert(host.raw().to_string(), sent);

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        io.active = Some(Arc::clone(&self.active));

        Ok(Box::new(io))
    }
}

/// Script for a host that logs in with a password and runs sudo.
pub fn password_and_sudo(host: &str) -> Vec<Step> {
    let basename = host.split('.').next().unwrap_or(host);
    vec![
        Step::Output(password_prompt(host)),
        Step::Output(format!("\r\nLast login: Mon Oct 12 09:14:01 2026{}", shell_prompt(basename))),
        out("sudo true\r\n[sudo] password for admin: "),
        Step::Output(shell_prompt(basename)),
        Step::Output(closed(host)),
    ]
}

/// Script for a host that accepts public key authentication and cached sudo.
pub fn key_auth(host: &str) -> Vec<Step> {
    let basename = host.split('.').next().unwrap_or(host);
    vec![
        Step::Output(shell_prompt(basename)),
        Step::Output(format!("sudo true{}", shell_prompt(basename))),
        Step::Output(closed(host)),
    ]
}
