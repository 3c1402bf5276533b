use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::domain::calculators;
use crate::domain::{MetricDefinition, MetricInputs, MetricSample, ObjectRef, RawSample};
use crate::ports::{MetricStore, SnmpSource};

/// Delay between the two sampling passes of a rate metric. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingGap(Duration);

impl SamplingGap {
    pub fn new(gap: Duration) -> Option<Self> {
        (!gap.is_zero()).then_some(Self(gap))
    }

    pub fn from_millis(ms: u64) -> Option<Self> {
        Self::new(Duration::from_millis(ms))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for SamplingGap {
    fn default() -> Self {
        Self(Duration::from_secs(1))
    }
}

/// Drives the sampling cycle of every registered series
pub struct Sampler {
    source: Arc<dyn SnmpSource>,
    store: Arc<dyn MetricStore>,
    definitions: Vec<MetricDefinition>,
    gap: SamplingGap,
    interval: Duration,
}

impl Sampler {
    pub fn new(
        source: Arc<dyn SnmpSource>,
        store: Arc<dyn MetricStore>,
        definitions: Vec<MetricDefinition>,
        gap: SamplingGap,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            definitions,
            gap,
            interval,
        }
    }

    /// Start one periodic task per series. The first tick fires immediately.
    pub fn spawn(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        self.definitions
            .iter()
            .cloned()
            .map(|definition| {
                let sampler = Arc::clone(&self);
                tokio::spawn(async move { sampler.run(definition).await })
            })
            .collect()
    }

    async fn run(&self, definition: MetricDefinition) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Sampling {} ({:?}) every {:?}",
            definition.id,
            definition.kind(),
            self.interval
        );
        if definition.kind().is_rate() {
            debug!(
                "{} takes two passes {:?} apart",
                definition.id,
                self.gap.duration()
            );
        }

        loop {
            ticker.tick().await;
            self.tick(&definition).await;
        }
    }

    /// Run one cycle for a series and append the result to its history
    pub async fn tick(&self, definition: &MetricDefinition) -> MetricSample {
        let sample = self.sample(&definition.inputs).await;
        debug!("{} = {} at {}", definition.id, sample.value, sample.timestamp);
        self.store.append(&definition.id, sample.clone());
        sample
    }

    /// Read the inputs of a metric and compute its value
    pub async fn sample(&self, inputs: &MetricInputs) -> MetricSample {
        match inputs {
            MetricInputs::ByteRate {
                in_octets,
                out_octets,
            } => {
                let in_t0 = self.read(in_octets).await;
                let out_t0 = self.read(out_octets).await;
                self.wait_gap().await;
                let in_t1 = self.read(in_octets).await;
                let out_t1 = self.read(out_octets).await;
                calculators::byte_rate(&in_t0, &out_t0, &in_t1, &out_t1)
            }
            MetricInputs::PacketErrorRatio {
                in_errors,
                in_ucast_pkts,
                in_nucast_pkts,
            } => {
                let errors = self.read(in_errors).await;
                let ucast = self.read(in_ucast_pkts).await;
                let nucast = self.read(in_nucast_pkts).await;
                calculators::packet_error_ratio(&errors, &ucast, &nucast)
            }
            MetricInputs::DatagramErrorRatio {
                in_hdr_errors,
                in_addr_errors,
                in_unknown_protos,
                in_receives,
            } => {
                let hdr = self.read(in_hdr_errors).await;
                let addr = self.read(in_addr_errors).await;
                let unknown = self.read(in_unknown_protos).await;
                let receives = self.read(in_receives).await;
                calculators::datagram_error_ratio(&hdr, &addr, &unknown, &receives)
            }
            MetricInputs::LinkUtilization {
                in_octets,
                out_octets,
                speed,
            } => {
                let in_t0 = self.read(in_octets).await;
                let out_t0 = self.read(out_octets).await;
                self.wait_gap().await;
                let in_t1 = self.read(in_octets).await;
                let out_t1 = self.read(out_octets).await;
                let speed = self.read(speed).await;
                calculators::link_utilization(&in_t0, &out_t0, &in_t1, &out_t1, &speed)
            }
            MetricInputs::ForwardingRate { forwarded } => {
                let first = self.read(forwarded).await;
                self.wait_gap().await;
                let second = self.read(forwarded).await;
                calculators::forwarding_rate(&first, &second)
            }
            MetricInputs::Uptime { ticks } => calculators::uptime(&self.read(ticks).await),
            MetricInputs::CounterSnapshot { counter } => {
                calculators::counter_snapshot(&self.read(counter).await)
            }
        }
    }

    async fn read(&self, object: &ObjectRef) -> RawSample {
        let taken_at = Utc::now();
        match self.source.fetch(object).await {
            Ok(value) => RawSample::present(object.clone(), value, taken_at),
            Err(e) => {
                warn!("Failed to read {}: {}", object, e);
                RawSample::absent(object.clone(), taken_at)
            }
        }
    }

    async fn wait_gap(&self) {
        trace!("Waiting {:?} before second pass", self.gap.duration());
        tokio::time::sleep(self.gap.duration()).await;
    }
}
