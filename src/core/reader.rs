//! Prompt synchronization over an unframed console stream.
//!
//! The device shell has no message framing: the only signal that a command
//! finished is a known prompt substring showing up in the output. The reader
//! polls the transport, accumulates everything it sees and stops as soon as
//! any of the target patterns is contained in the accumulated bytes.

use crate::core::transport::Transport;
use crate::domain::error::{GwError, GwResult};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Text shown in place of an empty read
pub const NO_OUTPUT: &str = "No output received";

/// Result of a `read_until` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Everything received during the call, lossily decoded as UTF-8
    pub text: String,
    /// The pattern that ended the read, if any
    pub matched: Option<String>,
}

impl ReadOutcome {
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The received text, or [`NO_OUTPUT`] when nothing arrived
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() {
            NO_OUTPUT
        } else {
            &self.text
        }
    }
}

/// Polling reader with a fixed interval between non-blocking reads
#[derive(Debug, Clone, Copy)]
pub struct PatternReader {
    poll_interval: Duration,
}

impl PatternReader {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Read until any of `patterns` appears in the accumulated output.
    ///
    /// Patterns are trimmed of trailing whitespace before matching. Each
    /// attempt waits up to `timeout`; a timed-out attempt is retried until
    /// `max_retries` attempts have been made (at least one). After the budget
    /// is spent the accumulated text is returned with `matched == None`.
    ///
    /// # Errors
    ///
    /// Fails when no usable pattern is given or the transport reports an
    /// error other than the peer closing the connection.
    pub async fn read_until(
        &self,
        transport: &mut dyn Transport,
        patterns: &[&str],
        timeout: Duration,
        max_retries: u32,
    ) -> GwResult<ReadOutcome> {
        let targets: Vec<&str> = patterns
            .iter()
            .map(|p| p.trim_end())
            .filter(|p| !p.is_empty())
            .collect();
        if targets.is_empty() {
            return Err(GwError::InvalidInput(
                "read_until needs at least one non-empty pattern".to_string(),
            ));
        }

        let attempts = max_retries.max(1);
        let mut buffer: Vec<u8> = Vec::with_capacity(4096);

        'attempts: for attempt in 1..=attempts {
            let deadline = Instant::now() + timeout;
            loop {
                match transport.receive_nonblocking().await {
                    Ok(chunk) if !chunk.is_empty() => {
                        trace!(bytes = %hex::encode(&chunk), "received chunk");
                        buffer.extend_from_slice(&chunk);
                        if let Some(found) = find_any(&buffer, &targets) {
                            debug!(pattern = found, attempt, "pattern matched");
                            return Ok(ReadOutcome {
                                text: String::from_utf8_lossy(&buffer).into_owned(),
                                matched: Some(found.to_string()),
                            });
                        }
                    }
                    Ok(_) => {}
                    Err(GwError::ConnectionClosed) => {
                        debug!("peer closed the connection while waiting for a prompt");
                        break 'attempts;
                    }
                    Err(e) => return Err(e),
                }

                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(self.poll_interval).await;
            }
            debug!(attempt, attempts, ?targets, "read attempt timed out");
        }

        Ok(ReadOutcome {
            text: String::from_utf8_lossy(&buffer).into_owned(),
            matched: None,
        })
    }
}

fn find_any<'a>(haystack: &[u8], patterns: &[&'a str]) -> Option<&'a str> {
    patterns
        .iter()
        .copied()
        .find(|p| memchr::memmem::find(haystack, p.as_bytes()).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::TransportKind;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Yields one queued chunk per poll
    struct Drip {
        chunks: VecDeque<Vec<u8>>,
        closed_when_drained: bool,
    }

    #[async_trait]
    impl Transport for Drip {
        fn kind(&self) -> TransportKind {
            TransportKind::Telnet
        }

        fn describe(&self) -> String {
            "drip".to_string()
        }

        fn is_open(&self) -> bool {
            true
        }

        async fn connect(&mut self) -> GwResult<()> {
            Ok(())
        }

        async fn send(&mut self, _data: &[u8]) -> GwResult<()> {
            Ok(())
        }

        async fn receive_nonblocking(&mut self) -> GwResult<Vec<u8>> {
            match self.chunks.pop_front() {
                Some(chunk) => Ok(chunk),
                None if self.closed_when_drained => Err(GwError::ConnectionClosed),
                None => Ok(Vec::new()),
            }
        }

        async fn close(&mut self) -> GwResult<()> {
            Ok(())
        }
    }

    fn drip(chunks: &[&str]) -> Drip {
        Drip {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            closed_when_drained: false,
        }
    }

    #[tokio::test]
    async fn test_match_on_first_poll() {
        let reader = PatternReader::new(Duration::from_millis(100));
        let mut transport = drip(&["uptime\r\nUP\r\n/cfg/system/root #"]);

        let started = Instant::now();
        let outcome = reader
            .read_until(&mut transport, &["/cfg/system/root #"], Duration::from_secs(5), 3)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(outcome.matched.as_deref(), Some("/cfg/system/root #"));
        assert!(outcome.text.contains("UP"));
    }

    #[tokio::test]
    async fn test_pattern_split_across_chunks() {
        let reader = PatternReader::new(Duration::from_millis(1));
        let mut transport = drip(&["log", "in:"]);

        let outcome = reader
            .read_until(&mut transport, &["login:"], Duration::from_secs(1), 1)
            .await
            .unwrap();

        assert!(outcome.is_match());
        assert_eq!(outcome.text, "login:");
    }

    #[tokio::test]
    async fn test_patterns_are_trimmed() {
        let reader = PatternReader::new(Duration::from_millis(1));
        let mut transport = drip(&["Password:"]);

        let outcome = reader
            .read_until(&mut transport, &["Password: \r\n"], Duration::from_secs(1), 1)
            .await
            .unwrap();

        assert_eq!(outcome.matched.as_deref(), Some("Password:"));
    }

    #[tokio::test]
    async fn test_first_listed_pattern_wins_when_both_present() {
        let reader = PatternReader::new(Duration::from_millis(1));
        let mut transport = drip(&["login: #"]);

        let outcome = reader
            .read_until(&mut transport, &["login:", "#"], Duration::from_secs(1), 1)
            .await
            .unwrap();

        assert_eq!(outcome.matched.as_deref(), Some("login:"));
    }

    #[tokio::test]
    async fn test_timeout_spends_whole_budget() {
        let reader = PatternReader::new(Duration::from_millis(10));
        let mut transport = drip(&[]);

        let started = Instant::now();
        let outcome = reader
            .read_until(&mut transport, &["#"], Duration::from_millis(50), 3)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_millis(150 + 3 * 10 + 200));
        assert!(!outcome.is_match());
        assert!(outcome.is_empty());
        assert_eq!(outcome.display_text(), NO_OUTPUT);
    }

    #[tokio::test]
    async fn test_zero_retries_still_makes_one_attempt() {
        let reader = PatternReader::new(Duration::from_millis(1));
        let mut transport = drip(&["#"]);

        let outcome = reader
            .read_until(&mut transport, &["#"], Duration::from_millis(50), 0)
            .await
            .unwrap();

        assert!(outcome.is_match());
    }

    #[tokio::test]
    async fn test_partial_output_kept_on_timeout() {
        let reader = PatternReader::new(Duration::from_millis(1));
        let mut transport = drip(&["still booting"]);

        let outcome = reader
            .read_until(&mut transport, &["login:"], Duration::from_millis(20), 1)
            .await
            .unwrap();

        assert!(!outcome.is_match());
        assert_eq!(outcome.display_text(), "still booting");
    }

    #[tokio::test]
    async fn test_peer_close_ends_read_early() {
        let reader = PatternReader::new(Duration::from_millis(10));
        let mut transport = drip(&["bye"]);
        transport.closed_when_drained = true;

        let started = Instant::now();
        let outcome = reader
            .read_until(&mut transport, &["#"], Duration::from_secs(5), 3)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(outcome.text, "bye");
        assert!(!outcome.is_match());
    }

    #[tokio::test]
    async fn test_blank_patterns_rejected() {
        let reader = PatternReader::new(Duration::from_millis(1));
        let mut transport = drip(&[]);

        let result = reader
            .read_until(&mut transport, &["  ", ""], Duration::from_millis(10), 1)
            .await;

        assert!(matches!(result, Err(GwError::InvalidInput(_))));
    }
}
