pub mod calculators;
pub mod history;
pub mod metrics;
pub mod object;
pub mod registry;
pub mod sample;

pub use history::{HistoryBuffer, DEFAULT_HISTORY_SIZE};
pub use metrics::{MetricId, MetricKind, MetricSample};
pub use object::ObjectRef;
pub use registry::{default_table, MetricDefinition, MetricInputs};
pub use sample::RawSample;
