use crate::core::reader::{PatternReader, ReadOutcome};
use crate::core::session::clean::clean_output;
use crate::core::session::state::SessionState;
use crate::core::session::transcript::Transcript;
use crate::core::transport::{LineEnding, Transport};
use crate::domain::config::{Credentials, TimingConfig};
use crate::domain::error::{GwError, GwResult};
use indexmap::IndexMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Cleaned output per command, in batch order. A command repeated within one
/// batch keeps its first position but holds the result of its last run.
/// `None` marks a command that failed.
pub type CommandResults = IndexMap<String, Option<String>>;

/// Result recorded for a `reboot` command
pub const REBOOT_SENT: &str = "Reboot command sent";

/// Ctrl-C
const INTERRUPT: u8 = 0x03;

/// Interactive console session over one transport
pub struct ConsoleSession {
    transport: Box<dyn Transport>,
    reader: PatternReader,
    timing: TimingConfig,
    state: SessionState,
}

impl ConsoleSession {
    /// Create a disconnected session
    pub fn new(transport: Box<dyn Transport>, timing: TimingConfig) -> Self {
        Self {
            reader: PatternReader::new(timing.poll_interval()),
            transport,
            timing,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Open the transport. Failures are logged and reported as `false`.
    pub async fn connect(&mut self) -> bool {
        if self.state.is_connected() {
            debug!("Session already connected to {}", self.transport.describe());
            return true;
        }

        info!("Connecting to {} ({})", self.transport.describe(), self.transport.kind());
        match self.transport.connect().await {
            Ok(()) => {
                self.state = SessionState::Connected;
                info!("Connected to {}", self.transport.describe());
                true
            }
            Err(e) => {
                self.state = SessionState::Disconnected;
                error!("Connection to {} failed: {}", self.transport.describe(), e);
                false
            }
        }
    }

    /// Authenticate against the device shell.
    ///
    /// Succeeds without sending credentials when the shell prompt shows up
    /// instead of the login prompt. Any failure closes the transport.
    pub async fn login(&mut self, credentials: &Credentials) -> bool {
        if !self.state.is_connected() {
            warn!("Login requested on a disconnected session");
            return false;
        }

        match self.try_login(credentials).await {
            Ok(()) => {
                self.state = SessionState::Ready;
                info!("Logged in as '{}'", credentials.username);
                true
            }
            Err(e) => {
                error!("Login failed in state {}: {}", self.state, e);
                self.disconnect().await;
                false
            }
        }
    }

    async fn try_login(&mut self, credentials: &Credentials) -> GwResult<()> {
        self.state = SessionState::AuthenticatingLogin;
        self.send_line("", LineEnding::CrLf).await?;

        let greeting = self
            .read_until(
                &[credentials.login_prompt.as_str(), credentials.prompt.as_str()],
                self.timing.login_timeout(),
            )
            .await?;
        if greeting.text.contains(credentials.prompt.trim_end()) {
            debug!("Shell prompt already present, skipping credentials");
            return Ok(());
        }
        if !greeting.is_match() {
            return Err(GwError::PromptNotFound {
                pattern: credentials.login_prompt.clone(),
            });
        }

        self.state = SessionState::AuthenticatingPassword;
        self.send_line(&credentials.username, LineEnding::CrLf).await?;
        let password_prompt = self
            .read_until(&[credentials.password_prompt.as_str()], self.timing.read_timeout())
            .await?;
        if !password_prompt.is_match() {
            return Err(GwError::PromptNotFound {
                pattern: credentials.password_prompt.clone(),
            });
        }

        // Some firmware drops a password written together with its newline.
        self.send_line(&credentials.password, LineEnding::None).await?;
        pause(self.timing.password_delay()).await;
        self.send_line("", LineEnding::CrLf).await?;

        let shell = self
            .read_until(&[credentials.prompt.as_str()], self.timing.login_timeout())
            .await?;
        if shell.is_match() {
            Ok(())
        } else {
            Err(GwError::PromptNotFound {
                pattern: credentials.prompt.clone(),
            })
        }
    }

    /// Run `commands` in order, each synchronized on `prompt`.
    ///
    /// Failures are isolated per command and recorded as `None`. With
    /// `output` set, every successful result is appended to that transcript.
    pub async fn execute_commands<S: AsRef<str>>(
        &mut self,
        commands: &[S],
        prompt: &str,
        output: Option<&Path>,
    ) -> CommandResults {
        let mut transcript = output.and_then(|path| {
            match Transcript::open(path).and_then(|mut t| t.write_session_header().map(|()| t)) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("Continuing without transcript: {}", e);
                    None
                }
            }
        });

        let mut results = CommandResults::new();
        for command in commands {
            let command = command.as_ref();
            info!("Executing: {}", command);

            let result = match self.run_command(command, prompt).await {
                Ok(cleaned) => Some(cleaned),
                Err(e) => {
                    error!("Error executing '{}': {}", command, e);
                    None
                }
            };

            if let (Some(t), Some(cleaned)) = (transcript.as_mut(), result.as_deref()) {
                if let Err(e) = t.write_command(command, cleaned) {
                    warn!("{}", e);
                }
            }
            results.insert(command.to_string(), result);
        }

        if let Some(t) = transcript {
            debug!("Transcript written to {}", t.path().display());
        }
        results
    }

    async fn run_command(&mut self, command: &str, prompt: &str) -> GwResult<String> {
        if !self.state.accepts_commands() {
            return Err(GwError::NotConnected);
        }

        self.send_line(command, LineEnding::CrLf).await?;

        if command.trim() == "reboot" {
            pause(self.timing.reboot_delay()).await;
            return Ok(REBOOT_SENT.to_string());
        }

        let outcome = self.read_until(&[prompt], self.timing.read_timeout()).await?;
        if !outcome.is_match() {
            debug!("Partial output before giving up: {:?}", outcome.display_text());
            return Err(GwError::PromptNotFound {
                pattern: prompt.to_string(),
            });
        }
        Ok(clean_output(&outcome.text, command, prompt))
    }

    /// Send `command` once and forward device output until `cancel` resolves.
    ///
    /// Each chunk goes to `on_chunk` and, with `output` set, to the
    /// transcript. Cancellation is checked once per poll interval; on
    /// cancellation a single Ctrl-C is sent best-effort and the session stays
    /// connected. Returns `false` if the stream could not start or the
    /// transport failed mid-stream.
    pub async fn stream_command<F, C>(
        &mut self,
        command: &str,
        prompt: &str,
        output: Option<&Path>,
        mut on_chunk: F,
        cancel: C,
    ) -> bool
    where
        F: FnMut(&str),
        C: Future<Output = ()>,
    {
        if !self.state.accepts_commands() {
            warn!("Stream requested on a session in state {}", self.state);
            return false;
        }
        if let Err(e) = self.send_line(command, LineEnding::CrLf).await {
            error!("Stream error: {}", e);
            return false;
        }

        let mut transcript = output.and_then(|path| {
            match Transcript::open(path).and_then(|mut t| t.write_stream_header(command).map(|()| t)) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("Continuing without transcript: {}", e);
                    None
                }
            }
        });

        info!("Streaming '{}' until cancelled", command);
        debug!("Stream prompt marker: {:?}", prompt);

        tokio::pin!(cancel);
        let cancelled = loop {
            tokio::select! {
                biased;
                () = &mut cancel => break true,
                () = tokio::time::sleep(self.reader.poll_interval()) => {}
            }

            match self.transport.receive_nonblocking().await {
                Ok(chunk) if !chunk.is_empty() => {
                    let text = String::from_utf8_lossy(&chunk);
                    on_chunk(text.as_ref());
                    if let Some(t) = transcript.as_mut() {
                        if let Err(e) = t.append(&text) {
                            warn!("{}", e);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Stream error: {}", e);
                    break false;
                }
            }
        };

        if cancelled {
            info!("Stopping stream");
            if let Err(e) = self.transport.send(&[INTERRUPT]).await {
                warn!("Failed to send interrupt: {}", e);
            }
        }
        cancelled
    }

    /// Close the transport. Safe to call repeatedly; failures are only logged.
    pub async fn disconnect(&mut self) {
        let was_connected = self.state.is_connected();
        self.state = SessionState::Disconnected;

        match self.transport.close().await {
            Ok(()) if was_connected => info!("{} connection closed", self.transport.kind()),
            Ok(()) => {}
            Err(e) => warn!("Error closing {}: {}", self.transport.describe(), e),
        }
    }

    async fn send_line(&mut self, text: &str, ending: LineEnding) -> GwResult<()> {
        let line = format!("{}{}", text, ending.as_str());
        self.transport.send(line.as_bytes()).await?;
        debug!("Sent {} bytes", line.len());
        Ok(())
    }

    async fn read_until(&mut self, patterns: &[&str], timeout: Duration) -> GwResult<ReadOutcome> {
        self.reader
            .read_until(self.transport.as_mut(), patterns, timeout, self.timing.max_retries)
            .await
    }
}

impl std::fmt::Debug for ConsoleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSession")
            .field("transport", &self.transport.describe())
            .field("state", &self.state)
            .finish()
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
