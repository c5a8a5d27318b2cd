use std::time::Duration;

use serde::Deserialize;

use crate::error::ConsumerError;

/// Root configuration — parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// Consumer instance name, used for log/identity correlation.
    #[serde(default = "default_name")]
    pub name: String,

    /// Broker address list.
    pub brokers: Vec<String>,

    /// Consumer group id.
    pub group_id: String,

    /// Topics to subscribe to.
    pub topics: Vec<String>,

    /// Maximum records per fetch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum wait per fetch, and the idle-sleep duration on an empty
    /// fetch result.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Transport security. The loop never interprets this — it is handed
    /// to the broker adapter as-is.
    #[serde(default)]
    pub security: SecurityConfig,
}

fn default_name() -> String {
    "points-consumer".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_poll_timeout_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityProtocol {
    #[default]
    Plaintext,
    SaslPlaintext,
    SaslSsl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub protocol: SecurityProtocol,
    #[serde(default = "default_sasl_mechanism")]
    pub sasl_mechanism: String,
    #[serde(default)]
    pub sasl_username: String,
    #[serde(default)]
    pub sasl_password: String,
}

fn default_sasl_mechanism() -> String {
    "PLAIN".to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            protocol: SecurityProtocol::Plaintext,
            sasl_mechanism: default_sasl_mechanism(),
            sasl_username: String::new(),
            sasl_password: String::new(),
        }
    }
}

impl ConsumerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConsumerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsumerError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConsumerError> {
        let config: ConsumerConfig =
            toml::from_str(toml_str).map_err(|e| ConsumerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConsumerError> {
        if self.brokers.is_empty() {
            return Err(ConsumerError::Config("no brokers configured".to_string()));
        }
        if self.topics.is_empty() {
            return Err(ConsumerError::Config("no topics configured".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ConsumerError::Config("batch_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}
