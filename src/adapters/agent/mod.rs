mod client;
pub mod mib;

use std::time::Duration;

pub use client::SnmpAgentAdapter;

/// Connection parameters of the polled agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub timeout: Duration,
    pub retries: u32,
}

impl AgentConfig {
    pub fn new(host: impl Into<String>, port: u16, community: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            community: community.into(),
            timeout: Duration::from_secs(1),
            retries: 1,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new("localhost", 161, "public")
    }
}
