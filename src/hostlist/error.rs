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

//! Error types for server list reading

use std::io;
use thiserror::Error;

/// Errors that can occur while reading a server list
#[derive(Debug, Error)]
pub enum HostListError {
    /// The server list could not be opened
    #[error("server list '{path}' is unreadable: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A line could not be read after the file was opened
    #[error("failed to read line {line} of server list '{path}': {source}")]
    ReadFailed {
        path: String,
        line: usize,
        #[source]
        source: io::Error,
    },
}
