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

//! ssh client sessions backed by a pseudo-terminal.
//!
//! The ssh client only asks for passwords and host key confirmations on a
//! terminal, so it is spawned on the slave side of a pty. A dedicated OS
//! thread drains the master side into a channel so blocking reads never
//! stall the Tokio runtime.

use anyhow::{Context, Result};
use async_trait::async_trait;
use portable_pty::{native_pty_system, Child, ChildKiller, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::transport::{ReadEvent, SessionIo, SessionLauncher};
use crate::hostlist::Host;

/// Wide enough that prompts are not wrapped by the remote terminal.
const PTY_SIZE: PtySize = PtySize {
    rows: 24,
    cols: 250,
    pixel_width: 0,
    pixel_height: 0,
};

const READ_BUF_SIZE: usize = 4096;
const OUTPUT_CHANNEL_DEPTH: usize = 64;

/// Launches `ssh [-o option]... user@host` on a fresh pty.
#[derive(Debug, Clone)]
pub struct SshLauncher {
    program: String,
    options: Vec<String>,
}

impl SshLauncher {
    pub fn new(program: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    /// The argument vector passed to the ssh client, program excluded.
    pub fn args(&self, host: &Host, username: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() * 2 + 1);
        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        args.push(host.destination(username));
        args
    }

    fn command(&self, host: &Host, username: &str) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(self.args(host, username));
        // Prompts are matched against English text.
        cmd.env("LC_ALL", "C");
        cmd
    }
}

impl Default for SshLauncher {
    fn default() -> Self {
        Self::new("ssh", Vec::new())
    }
}

#[async_trait]
impl SessionLauncher for SshLauncher {
    async fn launch(&self, host: &Host, username: &str) -> Result<Box<dyn SessionIo>> {
        let cmd = self.command(host, username);
        let program = self.program.clone();
        debug!("Spawning {} for {}", program, host);

        let session = tokio::task::spawn_blocking(move || PtySession::spawn(cmd))
            .await
            .context("ssh spawn task panicked")?
            .with_context(|| format!("Failed to spawn '{program}' for {host}"))?;
        Ok(Box::new(session))
    }
}

/// A running ssh client attached to a pty.
pub struct PtySession {
    // Taken when the client is reaped.
    child: Option<Box<dyn Child + Send + Sync>>,
    writer: Box<dyn Write + Send>,
    output: mpsc::Receiver<Vec<u8>>,
    // Dropping the master closes the terminal.
    _master: Box<dyn MasterPty + Send>,
}

impl PtySession {
    /// Open a pty, spawn `cmd` on it and start draining its output.
    pub fn spawn(cmd: CommandBuilder) -> Result<Self> {
        let pair = native_pty_system()
            .openpty(PTY_SIZE)
            .context("Failed to open pseudo-terminal")?;

        let child = pair
            .slave
            .spawn_command(cmd)
            .context("Failed to spawn command on pseudo-terminal")?;
        // Only the child may hold the slave, otherwise EOF is never observed.
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .context("Failed to open pseudo-terminal writer")?;
        let mut reader = pair
            .master
            .try_clone_reader()
            .context("Failed to open pseudo-terminal reader")?;

        let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_DEPTH);
        std::thread::Builder::new()
            .name("pty-reader".to_string())
            .spawn(move || {
                let mut buf = [0u8; READ_BUF_SIZE];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.blocking_send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        // Linux reports EIO on the master once the child is gone.
                        Err(e) => {
                            trace!("pty reader stopped: {e}");
                            break;
                        }
                    }
                }
                trace!("pty reader thread exited");
            })
            .context("Failed to start pty reader thread")?;

        Ok(Self {
            child: Some(child),
            writer,
            output: rx,
            _master: pair.master,
        })
    }

    /// OS process id of the ssh client while it has not been reaped.
    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(|child| child.process_id())
    }
}

/// Kill the client if it is still running, then wait for it so it does not
/// linger as a zombie. Blocks: portable-pty escalates from SIGHUP to SIGKILL
/// with short sleeps in between.
fn reap(mut child: Box<dyn Child + Send + Sync>) {
    match child.try_wait() {
        Ok(Some(status)) => {
            trace!("ssh client already exited: {status:?}");
            return;
        }
        Ok(None) => {
            if let Err(e) = child.kill() {
                warn!("Failed to kill ssh client: {e}");
            }
        }
        Err(e) => warn!("Failed to query ssh client status: {e}"),
    }
    match child.wait() {
        Ok(status) => trace!("ssh client reaped: {status:?}"),
        Err(e) => warn!("Failed to reap ssh client: {e}"),
    }
}

#[async_trait]
impl SessionIo for PtySession {
    async fn read_chunk(&mut self, timeout: Duration) -> Result<ReadEvent> {
        match tokio::time::timeout(timeout, self.output.recv()).await {
            Ok(Some(bytes)) => Ok(ReadEvent::Data(bytes)),
            Ok(None) => Ok(ReadEvent::Eof),
            Err(_) => Ok(ReadEvent::TimedOut),
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .context("Failed to write to ssh client")?;
        self.writer.flush().context("Failed to flush ssh client input")
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.output.close();
        if let Some(child) = self.child.take() {
            tokio::task::spawn_blocking(move || reap(child))
                .await
                .context("ssh reap task panicked")?;
        }
        Ok(())
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        let Some(child) = self.child.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || reap(child));
            }
            Err(_) => reap(child),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_args() {
        let launcher = SshLauncher::new(
            "ssh",
            vec![
                "StrictHostKeyChecking=yes".to_string(),
                "ConnectTimeout=10".to_string(),
            ],
        );
        let host = Host::parse("web1.example.com");
        assert_eq!(
            launcher.args(&host, "admin"),
            vec![
                "-o",
                "StrictHostKeyChecking=yes",
                "-o",
                "ConnectTimeout=10",
                "admin@web1.example.com"
            ]
        );
    }

    #[test]
    fn test_default_launcher_args() {
        let host = Host::parse("db1");
        assert_eq!(SshLauncher::default().args(&host, "ops"), vec!["ops@db1"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pty_session_echo_and_eof() {
        let mut cmd = CommandBuilder::new("sh");
        cmd.args(["-c", "printf 'ready> '; read line; echo \"got:$line\""]);
        let mut session = PtySession::spawn(cmd).unwrap();

        let mut transcript = String::new();
        while !transcript.contains("ready> ") {
            match session.read_chunk(Duration::from_secs(10)).await.unwrap() {
                ReadEvent::Data(bytes) => transcript.push_str(&String::from_utf8_lossy(&bytes)),
                other => panic!("unexpected {other:?} before prompt"),
            }
        }

        session.send(b"hello\n").await.unwrap();
        loop {
            match session.read_chunk(Duration::from_secs(10)).await.unwrap() {
                ReadEvent::Data(bytes) => transcript.push_str(&String::from_utf8_lossy(&bytes)),
                ReadEvent::Eof => break,
                ReadEvent::TimedOut => panic!("child never exited"),
            }
        }
        assert!(transcript.contains("got:hello"));
        session.shutdown().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pty_session_read_times_out() {
        let mut cmd = CommandBuilder::new("sleep");
        cmd.arg("30");
        let mut session = PtySession::spawn(cmd).unwrap();

        let event = session
            .read_chunk(Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(event, ReadEvent::TimedOut);
        session.shutdown().await.unwrap();
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_shutdown_kills_and_reaps_client() {
        let mut cmd = CommandBuilder::new("sleep");
        cmd.arg("30");
        let mut session = PtySession::spawn(cmd).unwrap();
        let pid = session.process_id().unwrap();
        let proc_entry = std::path::PathBuf::from(format!("/proc/{pid}"));
        assert!(proc_entry.exists());

        session.shutdown().await.unwrap();

        // A zombie keeps its /proc entry until it is waited for.
        assert!(!proc_entry.exists());
        assert!(session.process_id().is_none());
        session.shutdown().await.unwrap();
    }
}
