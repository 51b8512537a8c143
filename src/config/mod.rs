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

//! Configuration management for sshsudo.
//!
//! ```yaml
//! defaults:
//!   user: ops
//!   command: sudo apt-get -y upgrade
//!   timeout: 600
//!   parallel: 4
//!   ssh_program: /usr/bin/ssh
//!   ssh_options:
//!     - ConnectTimeout=10
//! ```

mod loader;
mod resolver;
mod types;

pub use resolver::Settings;
pub use types::{Config, Defaults};
