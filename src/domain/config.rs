use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Gateway console configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Log file configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Transport selection and parameters
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Login credentials and prompt markers
    #[serde(default)]
    pub credentials: Credentials,
    /// Timeouts and settle delays
    #[serde(default)]
    pub timing: TimingConfig,
    /// Command batches
    #[serde(default)]
    pub commands: CommandSets,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Optional file logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for per-run log files; console only when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// strftime pattern for the log file name
    #[serde(default = "default_log_file_pattern")]
    pub file_pattern: String,
    /// Level for the log file, independent of the console level
    #[serde(default = "default_log_file_level")]
    pub file_level: String,
}

/// Transport kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Serial,
    Telnet,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Serial => write!(f, "serial"),
            TransportKind::Telnet => write!(f, "telnet"),
        }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Which transport the session is built on
    #[serde(default = "default_transport_kind")]
    pub kind: TransportKind,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub telnet: TelnetConfig,
}

/// Serial line parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port path; auto-detected when unset
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default = "default_parity")]
    pub parity: ParityConfig,
    #[serde(default = "default_flow_control")]
    pub flow_control: FlowControlConfig,
}

/// Telnet endpoint parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelnetConfig {
    #[serde(default = "default_telnet_host")]
    pub host: String,
    #[serde(default = "default_telnet_port")]
    pub port: u16,
    /// Connect timeout in milliseconds
    #[serde(default = "default_telnet_timeout")]
    pub timeout_ms: u64,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    None,
    Hardware,
    Software,
}

/// Login credentials and the prompt markers the device shell prints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Main shell prompt
    #[serde(default = "default_main_prompt")]
    pub prompt: String,
    #[serde(default = "default_login_prompt")]
    pub login_prompt: String,
    #[serde(default = "default_password_prompt")]
    pub password_prompt: String,
}

/// Timeouts, retry budget and device settle delays, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_login_timeout")]
    pub login_timeout_ms: u64,
    #[serde(default = "default_serial_settle")]
    pub serial_settle_ms: u64,
    /// Wait after each Telnet write; serial writes go out without one
    #[serde(default = "default_send_settle")]
    pub send_settle_ms: u64,
    #[serde(default = "default_password_delay")]
    pub password_delay_ms: u64,
    #[serde(default = "default_reboot_delay")]
    pub reboot_delay_ms: u64,
}

/// Named command batches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSets {
    #[serde(default = "default_system_info")]
    pub system_info: Vec<String>,
}

impl TimingConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    pub fn serial_settle(&self) -> Duration {
        Duration::from_millis(self.serial_settle_ms)
    }

    pub fn send_settle(&self) -> Duration {
        Duration::from_millis(self.send_settle_ms)
    }

    pub fn password_delay(&self) -> Duration {
        Duration::from_millis(self.password_delay_ms)
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_millis(self.reboot_delay_ms)
    }

    /// Zero delays and short timeouts, for driving sessions against fakes.
    pub fn immediate() -> Self {
        Self {
            read_timeout_ms: 200,
            max_retries: 1,
            poll_interval_ms: 10,
            login_timeout_ms: 200,
            serial_settle_ms: 0,
            send_settle_ms: 0,
            password_delay_ms: 0,
            reboot_delay_ms: 0,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_pattern() -> String {
    "gateway_ops_%Y%m%d_%H%M%S.log".to_string()
}

fn default_log_file_level() -> String {
    "debug".to_string()
}

fn default_transport_kind() -> TransportKind {
    TransportKind::Serial
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_parity() -> ParityConfig {
    ParityConfig::None
}

fn default_flow_control() -> FlowControlConfig {
    FlowControlConfig::None
}

fn default_telnet_host() -> String {
    "192.168.1.1".to_string()
}

fn default_telnet_port() -> u16 {
    23
}

fn default_telnet_timeout() -> u64 {
    3000
}

fn default_username() -> String {
    "root".to_string()
}

fn default_password() -> String {
    "sah".to_string()
}

fn default_main_prompt() -> String {
    "/cfg/system/root #".to_string()
}

fn default_login_prompt() -> String {
    "login:".to_string()
}

fn default_password_prompt() -> String {
    "Password:".to_string()
}

fn default_read_timeout() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_poll_interval() -> u64 {
    100
}

fn default_login_timeout() -> u64 {
    5000
}

fn default_serial_settle() -> u64 {
    2000
}

fn default_send_settle() -> u64 {
    500
}

fn default_password_delay() -> u64 {
    500
}

fn default_reboot_delay() -> u64 {
    1000
}

fn default_system_info() -> Vec<String> {
    vec![
        "date \"+%Y-%m-%d %H:%M:%S\"".to_string(),
        "uptime".to_string(),
        "uname -a".to_string(),
        "free -m".to_string(),
        "df -h".to_string(),
        "ifconfig bridge".to_string(),
    ]
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_pattern: default_log_file_pattern(),
            file_level: default_log_file_level(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            kind: default_transport_kind(),
            serial: SerialConfig::default(),
            telnet: TelnetConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: default_parity(),
            flow_control: default_flow_control(),
        }
    }
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            host: default_telnet_host(),
            port: default_telnet_port(),
            timeout_ms: default_telnet_timeout(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            prompt: default_main_prompt(),
            login_prompt: default_login_prompt(),
            password_prompt: default_password_prompt(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout(),
            max_retries: default_max_retries(),
            poll_interval_ms: default_poll_interval(),
            login_timeout_ms: default_login_timeout(),
            serial_settle_ms: default_serial_settle(),
            send_settle_ms: default_send_settle(),
            password_delay_ms: default_password_delay(),
            reboot_delay_ms: default_reboot_delay(),
        }
    }
}

impl Default for CommandSets {
    fn default() -> Self {
        Self {
            system_info: default_system_info(),
        }
    }
}

impl Default for ParityConfig {
    fn default() -> Self {
        default_parity()
    }
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        default_flow_control()
    }
}
