use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ObjectRef;

/// Failure of a single SNMP GET
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnmpError {
    #[error("agent {agent} unreachable: {reason}")]
    TransportUnreachable { agent: String, reason: String },

    #[error("agent returned error status {status} at index {index}")]
    ProtocolError { status: u32, index: u32 },

    #[error("no such object: {0}")]
    NoSuchObject(ObjectRef),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SnmpError {
    /// Transport failures may succeed on retry; everything else is an answer from the agent
    pub fn is_transient(&self) -> bool {
        matches!(self, SnmpError::TransportUnreachable { .. })
    }
}

/// Port for reading counters from the polled agent
#[async_trait]
pub trait SnmpSource: Send + Sync {
    /// Read one object as a non-negative integer
    async fn fetch(&self, object: &ObjectRef) -> Result<u64, SnmpError>;
}
