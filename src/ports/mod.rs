pub mod metric_store;
pub mod snmp_source;

pub use metric_store::MetricStore;
pub use snmp_source::{SnmpError, SnmpSource};
