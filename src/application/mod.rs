pub mod export;
pub mod sampler;

pub use export::{MetricExporter, MetricHistory};
pub use sampler::{Sampler, SamplingGap};
