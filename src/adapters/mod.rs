pub mod agent;
pub mod store;

pub use agent::{AgentConfig, SnmpAgentAdapter};
pub use store::MemoryHistoryStore;
