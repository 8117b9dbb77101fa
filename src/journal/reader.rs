//! Forward-only journal reader.

use super::event::ActivityEvent;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use tracing::warn;

/// Lazy iterator over the events in a journal file.
///
/// Lines that fail to parse (including a torn final line from a writer that
/// crashed mid-append) are skipped with a warning. The reader never holds
/// more than one line in memory.
pub struct JournalReader {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
}

impl JournalReader {
    pub(super) fn new(path: PathBuf, file: Option<File>) -> Self {
        Self {
            path,
            lines: file.map(|f| BufReader::new(f).lines()),
            line_no: 0,
        }
    }
}

impl Iterator for JournalReader {
    type Item = ActivityEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;

        loop {
            let line = match lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "stopping journal read");
                    self.lines = None;
                    return None;
                }
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            match ActivityEvent::from_ndjson_line(&line) {
                Ok(event) => return Some(event),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = self.line_no,
                    error = %e,
                    "skipping malformed journal line"
                ),
            }
        }
    }
}
