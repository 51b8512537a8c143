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

//! Configuration type definitions.

use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Default settings, each overridable on the command line.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Defaults {
    /// Login name; skips the username prompt when set.
    pub user: Option<String>,
    /// Remote command line to run on every host.
    pub command: Option<String>,
    /// Bound in seconds on each wait for a prompt.
    pub timeout: Option<u64>,
    /// Number of hosts driven at once.
    pub parallel: Option<usize>,
    /// ssh client binary.
    pub ssh_program: Option<String>,
    /// Extra `-o` options passed to the ssh client.
    #[serde(default)]
    pub ssh_options: Vec<String>,
}
