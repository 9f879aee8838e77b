use crate::core::session::{CommandResults, ConsoleSession};
use crate::core::transport::Transport;
use crate::domain::config::{Credentials, GatewayConfig, TimingConfig};
use crate::domain::error::GwResult;
use crate::infrastructure::build_transport;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

/// Gateway operations over one console session.
///
/// Holds the credentials and prompt markers so callers only deal with
/// command text.
#[derive(Debug)]
pub struct Gateway {
    session: ConsoleSession,
    credentials: Credentials,
    system_info: Vec<String>,
}

impl Gateway {
    /// Build the session for the transport named in `config.connection`.
    ///
    /// # Errors
    ///
    /// Fails when the connection parameters are invalid.
    pub fn from_config(config: &GatewayConfig) -> GwResult<Self> {
        let transport = build_transport(&config.connection, &config.timing)?;
        info!("Initializing gateway with {} connection", transport.kind());
        Ok(Self::with_transport(
            transport,
            config.credentials.clone(),
            config.timing.clone(),
            config.commands.system_info.clone(),
        ))
    }

    /// Build a gateway over an already constructed transport
    pub fn with_transport(
        transport: Box<dyn Transport>,
        credentials: Credentials,
        timing: TimingConfig,
        system_info: Vec<String>,
    ) -> Self {
        Self {
            session: ConsoleSession::new(transport, timing),
            credentials,
            system_info,
        }
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    /// Connect and log in; `false` on any failure
    pub async fn connect_and_login(&mut self) -> bool {
        info!("Attempting to connect and login");
        if !self.session.connect().await {
            return false;
        }

        debug!("Connection established, attempting login");
        let result = self.session.login(&self.credentials).await;
        info!("Login {}", if result { "successful" } else { "failed" });
        result
    }

    /// Run a batch against the main shell prompt
    pub async fn execute_commands<S: AsRef<str>>(
        &mut self,
        commands: &[S],
        output_file: Option<&Path>,
    ) -> CommandResults {
        self.session
            .execute_commands(commands, &self.credentials.prompt, output_file)
            .await
    }

    /// Run the configured system information batch
    pub async fn system_info(&mut self, output_file: Option<&Path>) -> CommandResults {
        info!("Getting system information");
        debug!("System info commands: {:?}", self.system_info);
        self.session
            .execute_commands(self.system_info.as_slice(), &self.credentials.prompt, output_file)
            .await
    }

    /// Stream a long-running command until `cancel` resolves
    pub async fn stream_command<F, C>(
        &mut self,
        command: &str,
        output_file: Option<&Path>,
        on_chunk: F,
        cancel: C,
    ) -> bool
    where
        F: FnMut(&str),
        C: Future<Output = ()>,
    {
        info!("Streaming command: {}", command);
        self.session
            .stream_command(command, &self.credentials.prompt, output_file, on_chunk, cancel)
            .await
    }

    /// Close the connection
    pub async fn close(&mut self) {
        info!("Closing connection");
        self.session.disconnect().await;
    }
}
