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

use std::fmt;

/// A single target host as written in the server list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    raw: String,
    basename: String,
}

impl Host {
    /// Build a host from one server list entry.
    ///
    /// The basename is everything before the first `.`, which is what a
    /// default bash prompt shows for `\h`.
    pub fn parse(entry: &str) -> Self {
        let raw = entry.trim().to_string();
        let basename = raw.split('.').next().unwrap_or_default().to_string();
        Self { raw, basename }
    }

    /// The hostname exactly as listed (bare or fully qualified).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The portion of the hostname before the first `.`.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// The ssh destination for this host, `user@host`.
    pub fn destination(&self, username: &str) -> String {
        format!("{}@{}", username, self.raw)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_host() {
        let host = Host::parse("server01");
        assert_eq!(host.raw(), "server01");
        assert_eq!(host.basename(), "server01");
    }

    #[test]
    fn test_parse_fqdn() {
        let host = Host::parse("db2.prod.example.com");
        assert_eq!(host.raw(), "db2.prod.example.com");
        assert_eq!(host.basename(), "db2");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let host = Host::parse("  web1.example.com\t");
        assert_eq!(host.raw(), "web1.example.com");
        assert_eq!(host.basename(), "web1");
    }

    #[test]
    fn test_ip_address_basename() {
        // Prompts show the hostname, not the address, so this will rarely
        // match; the basename is still derived the same way.
        let host = Host::parse("10.0.0.5");
        assert_eq!(host.basename(), "10");
    }

    #[test]
    fn test_destination() {
        let host = Host::parse("web1.example.com");
        assert_eq!(host.destination("admin"), "admin@web1.example.com");
        assert_eq!(host.to_string(), "web1.example.com");
    }
}
