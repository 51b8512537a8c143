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

//! Lazy server list reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::error::HostListError;
use super::host::Host;

/// Iterator over the hosts of a server list, in file order.
///
/// The reader is consumed as it goes; it cannot be restarted. After the
/// first read error it yields that error once and then stops.
pub struct HostListReader<R = BufReader<File>> {
    lines: std::io::Lines<R>,
    path: String,
    line_no: usize,
    finished: bool,
}

impl HostListReader<BufReader<File>> {
    /// Open a server list file.
    pub fn open(path: &Path) -> Result<Self, HostListError> {
        let file = File::open(path).map_err(|source| HostListError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> HostListReader<R> {
    /// Read hosts from any buffered source. `path` is only used in messages.
    pub fn from_reader(reader: R, path: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            line_no: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for HostListReader<R> {
    type Item = Result<Host, HostListError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    self.finished = true;
                    return Some(Err(HostListError::ReadFailed {
                        path: self.path.clone(),
                        line: self.line_no + 1,
                        source,
                    }));
                }
            };
            self.line_no += 1;

            let entry = line.trim();
            if entry.is_empty() {
                println!("Skipping blank line {} in {}", self.line_no, self.path);
                continue;
            }

            return Some(Ok(Host::parse(entry)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};
    use std::io::Write;

    fn raw_hosts<R: BufRead>(reader: HostListReader<R>) -> Vec<String> {
        reader
            .map(|h| h.unwrap().raw().to_string())
            .collect()
    }

    #[test]
    fn test_reads_hosts_in_order() {
        let input = "web1.example.com\nweb2.example.com\ndb1\n";
        let reader = HostListReader::from_reader(Cursor::new(input), "servers");
        assert_eq!(
            raw_hosts(reader),
            vec!["web1.example.com", "web2.example.com", "db1"]
        );
    }

    #[test]
    fn test_skips_blank_and_whitespace_lines() {
        let input = "\nweb1\n   \n\t\nweb2\n\n";
        let reader = HostListReader::from_reader(Cursor::new(input), "servers");
        assert_eq!(raw_hosts(reader), vec!["web1", "web2"]);
    }

    #[test]
    fn test_every_non_blank_line_is_a_host() {
        let input = "#web1\nweb2\n  # web3\n";
        let reader = HostListReader::from_reader(Cursor::new(input), "servers");
        assert_eq!(raw_hosts(reader), vec!["#web1", "web2", "# web3"]);
    }

    #[test]
    fn test_trims_entries_and_crlf() {
        let input = "  web1  \r\nweb2\r\n";
        let reader = HostListReader::from_reader(Cursor::new(input), "servers");
        assert_eq!(raw_hosts(reader), vec!["web1", "web2"]);
    }

    #[test]
    fn test_empty_input() {
        let reader = HostListReader::from_reader(Cursor::new(""), "servers");
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let err = HostListReader::open(Path::new("/nonexistent/servers.txt"))
            .err()
            .expect("missing file must fail");
        assert!(matches!(err, HostListError::Unreadable { .. }));
        assert!(err.to_string().contains("/nonexistent/servers.txt"));
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha.example.com").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "beta").unwrap();

        let reader = HostListReader::open(file.path()).unwrap();
        let hosts: Vec<Host> = reader.map(Result::unwrap).collect();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].basename(), "alpha");
        assert_eq!(hosts[1].raw(), "beta");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_read_error_is_yielded_once() {
        let mut reader =
            HostListReader::from_reader(BufReader::new(FailingReader), "servers");
        match reader.next() {
            Some(Err(HostListError::ReadFailed { line, .. })) => assert_eq!(line, 1),
            other => panic!("expected read failure, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }
}
