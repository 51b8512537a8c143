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

//! Server list support
//!
//! A server list is a plain text file with one hostname per line:
//!
//! ```text
//! web1.example.com
//! web2.example.com
//!
//! db1
//! ```
//!
//! Blank lines are skipped with a notice on stdout and every other line
//! becomes a [`Host`], so each non-blank line is counted exactly once in the
//! run summary. Hosts are produced lazily, so a huge list is never held in
//! memory at once.
//!
//! # Examples
//!
//! ```rust
//! use sshsudo::hostlist::Host;
//!
//! let host = Host::parse("web1.example.com");
//! assert_eq!(host.raw(), "web1.example.com");
//! assert_eq!(host.basename(), "web1");
//! ```

mod error;
mod host;
mod reader;

pub use error::HostListError;
pub use host::Host;
pub use reader::HostListReader;
