//! Builder status stream decoding
//!
//! While it runs, the builder writes one JSON record per line to its
//! monitor descriptor, each optionally prefixed by an ASCII record
//! separator (`0x1e`, RFC 7464 JSON text sequences). A record may carry a
//! chain of nested progress, a user-facing message and diagnostic trace
//! text:
//!
//! ```json
//! {"progress": {"message": "pipelines", "done": 1, "total": 4,
//!               "progress": {"message": "stages", "done": 0, "total": 9}},
//!  "message": "Starting pipeline build",
//!  "trace": "..."}
//! ```

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::error::StatusError;

/// RFC 7464 record separator
const RECORD_SEPARATOR: char = '\x1e';

/// One link of a progress chain, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Progress {
    #[serde(default, alias = "name")]
    pub message: String,
    #[serde(default)]
    pub done: u64,
    #[serde(default)]
    pub total: u64,
    /// Next, more deeply nested level
    #[serde(default, rename = "progress", alias = "sub_progress")]
    pub sub_progress: Option<Box<Progress>>,
}

impl Progress {
    /// Walk the chain from this level inward
    pub fn chain(&self) -> impl Iterator<Item = &Progress> {
        std::iter::successors(Some(self), |p| p.sub_progress.as_deref())
    }
}

/// One decoded status record
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub trace: String,
}

/// A single thing the builder reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Counters for nesting depth `level`
    Progress {
        level: usize,
        message: String,
        done: u64,
        total: u64,
    },
    /// User-facing message
    Message(String),
    /// Diagnostic text, only shown on failure
    Trace(String),
}

impl Status {
    /// Split the record into events: progress levels outer to inner, then
    /// the message, then the trace. Empty texts produce no event.
    pub fn into_events(self) -> Vec<StatusEvent> {
        let mut events: Vec<StatusEvent> = self
            .progress
            .iter()
            .flat_map(Progress::chain)
            .enumerate()
            .map(|(level, p)| StatusEvent::Progress {
                level,
                message: p.message.clone(),
                done: p.done,
                total: p.total,
            })
            .collect();
        if !self.message.is_empty() {
            events.push(StatusEvent::Message(self.message));
        }
        if !self.trace.is_empty() {
            events.push(StatusEvent::Trace(self.trace));
        }
        events
    }
}

/// Reads status records one at a time from the monitor channel
pub struct StatusScanner<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> StatusScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next record, or `None` once the writer closed the channel.
    ///
    /// Blank lines are skipped. A malformed record is an error; no attempt
    /// is made to resynchronise after it.
    pub async fn next_status(&mut self) -> Result<Option<Status>, StatusError> {
        while let Some(line) = self.lines.next_line().await? {
            let record = line.trim_matches(RECORD_SEPARATOR).trim();
            if record.is_empty() {
                continue;
            }
            let status = serde_json::from_str(record).map_err(|source| StatusError::Decode {
                record: record.to_string(),
                source,
            })?;
            return Ok(Some(status));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scan_all(input: &[u8]) -> Result<Vec<Status>, StatusError> {
        let mut scanner = StatusScanner::new(input);
        let mut records = Vec::new();
        while let Some(status) = scanner.next_status().await? {
            records.push(status);
        }
        Ok(records)
    }

    #[tokio::test]
    async fn test_empty_stream_ends_cleanly() {
        assert!(scan_all(b"").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_separator_framing() {
        let input = b"\x1e{\"message\": \"one\"}\n\x1e{\"trace\": \"two\"}\n";
        let records = scan_all(input).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "one");
        assert_eq!(records[1].trace, "two");
    }

    #[tokio::test]
    async fn test_plain_lines_and_blank_lines() {
        let input = b"{\"message\": \"one\"}\n\n\x1e\n{\"message\": \"two\"}";
        let records = scan_all(input).await.unwrap();
        let messages: Vec<_> = records.iter().map(|s| s.message.as_str()).collect();
        assert_eq!(messages, ["one", "two"]);
    }

    #[tokio::test]
    async fn test_nested_progress_chain() {
        let input = br#"{"progress": {"message": "pipelines", "done": 1, "total": 4, "progress": {"name": "stages", "done": 0, "total": 9}}, "message": "hello", "trace": "dbg"}"#;
        let records = scan_all(input).await.unwrap();

        assert_eq!(
            records[0].clone().into_events(),
            [
                StatusEvent::Progress {
                    level: 0,
                    message: "pipelines".to_string(),
                    done: 1,
                    total: 4,
                },
                StatusEvent::Progress {
                    level: 1,
                    message: "stages".to_string(),
                    done: 0,
                    total: 9,
                },
                StatusEvent::Message("hello".to_string()),
                StatusEvent::Trace("dbg".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_fields_are_ignored() {
        let input = br#"{"message": "m", "timestamp": 1712.5, "context": {"origin": "x"}}"#;
        let records = scan_all(input).await.unwrap();
        assert_eq!(records[0].message, "m");
    }

    #[tokio::test]
    async fn test_malformed_record_is_fatal() {
        let input = b"{\"message\": \"ok\"}\n{not json\n{\"message\": \"never\"}\n";
        let mut scanner = StatusScanner::new(&input[..]);

        assert!(scanner.next_status().await.unwrap().is_some());
        let err = scanner.next_status().await.unwrap_err();
        match err {
            StatusError::Decode { record, .. } => assert_eq!(record, "{not json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_record_has_no_events() {
        assert!(Status::default().into_events().is_empty());
    }
}
