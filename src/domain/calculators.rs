//! Derived metric calculators.
//!
//! Every calculator is a pure function over raw samples. A calculation that cannot be
//! carried out (an operand is absent, a denominator is zero, a counter went backwards)
//! produces a value of 0; calculators never fail and never yield NaN or infinity.
//! The output is stamped with the time of the latest operand read.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::trace;

use super::{MetricKind, MetricSample, ObjectRef, RawSample};

/// Reasons a calculation falls back to the zero sentinel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputationUndefined {
    #[error("operand {0} is unavailable")]
    MissingOperand(ObjectRef),

    #[error("division by zero")]
    ZeroDenominator,

    #[error("counter {0} decreased between samples")]
    CounterWentBackwards(ObjectRef),
}

type Outcome = Result<f64, ComputationUndefined>;

/// (in + out octets at t1 − in + out octets at t0) / (t1 − t0), in bytes per second
pub fn byte_rate(
    in_t0: &RawSample,
    out_t0: &RawSample,
    in_t1: &RawSample,
    out_t1: &RawSample,
) -> MetricSample {
    settle(
        MetricKind::ByteRate,
        octet_rate(in_t0, out_t0, in_t1, out_t1),
        &[in_t0, out_t0, in_t1, out_t1],
    )
}

/// inErrors / (inUcastPkts + inNUcastPkts)
pub fn packet_error_ratio(
    in_errors: &RawSample,
    in_ucast: &RawSample,
    in_nucast: &RawSample,
) -> MetricSample {
    settle(
        MetricKind::PacketErrorRatio,
        try_packet_error_ratio(in_errors, in_ucast, in_nucast),
        &[in_errors, in_ucast, in_nucast],
    )
}

/// (inHdrErrors + inAddrErrors + inUnknownProtos) / inReceives, as a percentage
pub fn datagram_error_ratio(
    hdr_errors: &RawSample,
    addr_errors: &RawSample,
    unknown_protos: &RawSample,
    receives: &RawSample,
) -> MetricSample {
    settle(
        MetricKind::DatagramErrorRatio,
        try_datagram_error_ratio(hdr_errors, addr_errors, unknown_protos, receives),
        &[hdr_errors, addr_errors, unknown_protos, receives],
    )
}

/// (byte rate × 8) / ifSpeed
pub fn link_utilization(
    in_t0: &RawSample,
    out_t0: &RawSample,
    in_t1: &RawSample,
    out_t1: &RawSample,
    speed: &RawSample,
) -> MetricSample {
    let outcome = octet_rate(in_t0, out_t0, in_t1, out_t1)
        .and_then(|bytes_per_second| ratio(bytes_per_second * 8.0, value(speed)? as f64));

    settle(
        MetricKind::LinkUtilization,
        outcome,
        &[in_t0, out_t0, in_t1, out_t1, speed],
    )
}

/// (forwarded at t1 − forwarded at t0) / (t1 − t0), in datagrams per second
pub fn forwarding_rate(forwarded_t0: &RawSample, forwarded_t1: &RawSample) -> MetricSample {
    settle(
        MetricKind::ForwardingRate,
        try_forwarding_rate(forwarded_t0, forwarded_t1),
        &[forwarded_t0, forwarded_t1],
    )
}

/// Agent uptime in TimeTicks
pub fn uptime(ticks: &RawSample) -> MetricSample {
    settle(MetricKind::Uptime, value(ticks).map(|v| v as f64), &[ticks])
}

/// Raw counter passthrough
pub fn counter_snapshot(counter: &RawSample) -> MetricSample {
    settle(
        MetricKind::CounterSnapshot,
        value(counter).map(|v| v as f64),
        &[counter],
    )
}

fn try_packet_error_ratio(
    in_errors: &RawSample,
    in_ucast: &RawSample,
    in_nucast: &RawSample,
) -> Outcome {
    let errors = value(in_errors)?;
    let packets = value(in_ucast)?.saturating_add(value(in_nucast)?);
    ratio(errors as f64, packets as f64)
}

fn try_datagram_error_ratio(
    hdr_errors: &RawSample,
    addr_errors: &RawSample,
    unknown_protos: &RawSample,
    receives: &RawSample,
) -> Outcome {
    let errors = value(hdr_errors)?
        .saturating_add(value(addr_errors)?)
        .saturating_add(value(unknown_protos)?);
    let received = value(receives)?;
    ratio(errors as f64, received as f64).map(|r| r * 100.0)
}

fn try_forwarding_rate(forwarded_t0: &RawSample, forwarded_t1: &RawSample) -> Outcome {
    let delta = counter_delta(forwarded_t0, value(forwarded_t0)?, value(forwarded_t1)?)?;
    ratio(delta, elapsed_secs(forwarded_t0.taken_at, forwarded_t1.taken_at))
}

fn octet_rate(
    in_t0: &RawSample,
    out_t0: &RawSample,
    in_t1: &RawSample,
    out_t1: &RawSample,
) -> Outcome {
    let total_t0 = value(in_t0)?.saturating_add(value(out_t0)?);
    let total_t1 = value(in_t1)?.saturating_add(value(out_t1)?);
    let delta = counter_delta(in_t0, total_t0, total_t1)?;
    ratio(delta, elapsed_secs(in_t0.taken_at, in_t1.taken_at))
}

fn value(sample: &RawSample) -> Result<u64, ComputationUndefined> {
    sample
        .value
        .ok_or_else(|| ComputationUndefined::MissingOperand(sample.object.clone()))
}

fn counter_delta(counter: &RawSample, first: u64, second: u64) -> Outcome {
    if second < first {
        return Err(ComputationUndefined::CounterWentBackwards(
            counter.object.clone(),
        ));
    }
    Ok((second - first) as f64)
}

fn ratio(numerator: f64, denominator: f64) -> Outcome {
    if denominator <= 0.0 {
        return Err(ComputationUndefined::ZeroDenominator);
    }
    let result = numerator / denominator;
    if result.is_finite() {
        Ok(result)
    } else {
        Err(ComputationUndefined::ZeroDenominator)
    }
}

fn elapsed_secs(first: DateTime<Utc>, second: DateTime<Utc>) -> f64 {
    (second - first)
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}

fn settle(kind: MetricKind, outcome: Outcome, operands: &[&RawSample]) -> MetricSample {
    let timestamp = operands
        .iter()
        .map(|s| s.taken_at)
        .max()
        .unwrap_or_else(Utc::now);

    match outcome {
        Ok(value) => MetricSample::new(kind, value, timestamp),
        Err(reason) => {
            trace!("{:?} falls back to 0: {}", kind, reason);
            MetricSample::zero(kind, timestamp)
        }
    }
}
