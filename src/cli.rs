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

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Short usage line shown when required arguments are missing.
pub const USAGE: &str = "usage: sshsudo [-c command] [-l user] [-t seconds] [-p N] [-o option] [--config file] <server-list>";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sshsudo",
    version,
    about = "Run one privileged command on every host of a server list over ssh",
    long_about = "sshsudo logs in to each host listed in a server list with a shared username and password,\nruns a command that may ask for the sudo password, and reports how many hosts succeeded.\nHosts that accept public key authentication are handled without a password prompt.\nThe exit status is 0 when every host succeeded, 1 when any host failed and 2 on usage errors.",
    after_help = "EXAMPLES:\n  Run on every host in servers.txt:   sshsudo -c 'sudo apt-get -y upgrade' servers.txt\n  Four hosts at a time:               sshsudo -p 4 -c 'sudo systemctl restart nginx' servers.txt\n  Command from config file:           sshsudo --config ./patch.yaml servers.txt\n\nThe password can be supplied through SSHSUDO_PASSWORD for unattended runs (not recommended)."
)]
pub struct Cli {
    #[arg(value_name = "SERVER_LIST", help = "File with one hostname per line")]
    pub server_list: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        help = "Command line to run on every host\nFalls back to defaults.command in the configuration file"
    )]
    pub command: Option<String>,

    #[arg(
        short = 'l',
        long,
        help = "Login name for every host (skips the username prompt)"
    )]
    pub user: Option<String>,

    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help = "Maximum wait for each prompt [default: 900]"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long,
        value_name = "N",
        help = "Number of hosts processed at once [default: 1]"
    )]
    pub parallel: Option<usize>,

    #[arg(long, value_name = "PATH", help = "ssh client binary [default: ssh]")]
    pub ssh_program: Option<String>,

    #[arg(
        short = 'o',
        long = "ssh-option",
        value_name = "OPTION",
        help = "Extra option passed to the ssh client as -o OPTION (repeatable)\nExample: -o ConnectTimeout=10"
    )]
    pub ssh_options: Vec<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Configuration file path\nWhen omitted: $XDG_CONFIG_HOME/sshsudo/config.yaml, then ~/.config/sshsudo/config.yaml"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, action = ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,
}
