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
//! Turns raw terminal output into plain text for prompt matching.
//!
//! The ssh client's output arrives in arbitrary chunks, so an escape
//! sequence or a multi-byte character may be split across two reads. One
//! decoder lives for the whole session and keeps the escape parser state
//! between chunks.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Plain text produced by the escape parser, drained after every chunk.
#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    fn take(&self) -> io::Result<Vec<u8>> {
        let mut buf = self
            .0
            .lock()
            .map_err(|_| io::Error::other("decoder buffer poisoned"))?;
        Ok(std::mem::take(&mut *buf))
    }
}

impl Write for Sink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("decoder buffer poisoned"))?
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stateful ANSI stripper and UTF-8 decoder for one session.
pub(crate) struct OutputDecoder {
    parser: strip_ansi_escapes::Writer<Sink>,
    sink: Sink,
}

impl OutputDecoder {
    pub(crate) fn new() -> Self {
        let sink = Sink::default();
        Self {
            parser: strip_ansi_escapes::Writer::new(sink.clone()),
            sink,
        }
    }

    /// Feed one chunk and return the text it completes.
    ///
    /// Bytes belonging to an unfinished escape sequence or character are
    /// held back until a later chunk completes them.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> io::Result<String> {
        self.parser.write_all(bytes)?;
        // The parser line-buffers; prompts do not end in a newline.
        self.parser.flush()?;
        let text = self.sink.take()?;
        Ok(String::from_utf8_lossy(&text).into_owned())
    }
}
