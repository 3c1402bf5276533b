use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::AgentConfig;
use crate::application::SamplingGap;
use crate::domain::{default_table, MetricDefinition, MetricId, DEFAULT_HISTORY_SIZE};

const DEFAULT_SAMPLING_GAP_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read metric table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metric table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("metric id {0} is defined more than once")]
    DuplicateId(MetricId),

    #[error("metric table is empty")]
    Empty,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub agent_host: String,
    pub agent_port: u16,
    pub community: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub if_index: u32,
    pub history_size: usize,
    pub sampling_gap_ms: u64,
    pub poll_interval: u64,
    pub refresh_interval: u64,
    pub metrics_file: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("SNMPMON_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            agent_host: env::var("SNMPMON_AGENT_HOST").unwrap_or_else(|_| "localhost".to_string()),
            agent_port: env::var("SNMPMON_AGENT_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(161),
            community: env::var("SNMPMON_COMMUNITY").unwrap_or_else(|_| "public".to_string()),
            timeout_ms: env::var("SNMPMON_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
            retries: env::var("SNMPMON_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            if_index: env::var("SNMPMON_IF_INDEX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            history_size: env::var("SNMPMON_HISTORY_SIZE")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_HISTORY_SIZE),
            sampling_gap_ms: env::var("SNMPMON_SAMPLING_GAP_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&ms| ms > 0)
                .unwrap_or(DEFAULT_SAMPLING_GAP_MS),
            poll_interval: env::var("SNMPMON_POLL_INTERVAL")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&s| s > 0)
                .unwrap_or(5),
            refresh_interval: env::var("SNMPMON_REFRESH_INTERVAL")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&s| s > 0)
                .unwrap_or(5),
            metrics_file: env::var("SNMPMON_METRICS_FILE").ok().map(PathBuf::from),
            log_level: env::var("SNMPMON_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn agent(&self) -> AgentConfig {
        AgentConfig::new(self.agent_host.clone(), self.agent_port, self.community.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retries(self.retries)
    }

    pub fn sampling_gap(&self) -> SamplingGap {
        SamplingGap::from_millis(self.sampling_gap_ms).unwrap_or_default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Metric table from `metrics_file`, or the built-in one
    pub fn metric_table(&self) -> Result<Vec<MetricDefinition>, ConfigError> {
        let table = match &self.metrics_file {
            Some(path) => load_metric_table(path)?,
            None => default_table(self.if_index),
        };
        validate(&table)?;
        Ok(table)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[derive(Debug, Deserialize)]
struct MetricTableFile {
    #[serde(default)]
    metric: Vec<MetricDefinition>,
}

pub fn parse_metric_table(content: &str) -> Result<Vec<MetricDefinition>, ConfigError> {
    let file: MetricTableFile = toml::from_str(content)?;
    Ok(file.metric)
}

fn load_metric_table(path: &Path) -> Result<Vec<MetricDefinition>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_metric_table(&content)
}

fn validate(table: &[MetricDefinition]) -> Result<(), ConfigError> {
    if table.is_empty() {
        return Err(ConfigError::Empty);
    }

    let mut seen = HashSet::new();
    for definition in table {
        if !seen.insert(&definition.id) {
            return Err(ConfigError::DuplicateId(definition.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricKind;

    #[test]
    fn test_parse_metric_table() {
        let table = parse_metric_table(
            r#"
            [[metric]]
            id = "uplink_rate"
            kind = "byte_rate"
            in_octets = { group = "IF-MIB", name = "ifInOctets", index = 2 }
            out_octets = { group = "IF-MIB", name = "ifOutOctets", index = 2 }

            [[metric]]
            id = "uptime"
            title = "Heartbeat"
            kind = "uptime"
            ticks = { group = "DISMAN-EVENT-MIB", name = "sysUpTimeInstance" }
            "#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].kind(), MetricKind::ByteRate);
        assert_eq!(table[1].title(), "Heartbeat");
        assert!(validate(&table).is_ok());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = parse_metric_table(
            r#"
            [[metric]]
            id = "x"
            kind = "jitter"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut table = default_table(1);
        table.push(table[0].clone());
        assert!(matches!(validate(&table), Err(ConfigError::DuplicateId(_))));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let table = parse_metric_table("").unwrap();
        assert!(matches!(validate(&table), Err(ConfigError::Empty)));
    }

    #[test]
    fn test_missing_file() {
        let result = load_metric_table(Path::new("/nonexistent/snmpmon-metrics.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
