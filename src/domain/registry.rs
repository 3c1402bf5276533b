use serde::{Deserialize, Serialize};

use super::{MetricId, MetricKind, ObjectRef};

/// Input objects of a metric, one variant per calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricInputs {
    ByteRate {
        in_octets: ObjectRef,
        out_octets: ObjectRef,
    },
    PacketErrorRatio {
        in_errors: ObjectRef,
        in_ucast_pkts: ObjectRef,
        in_nucast_pkts: ObjectRef,
    },
    DatagramErrorRatio {
        in_hdr_errors: ObjectRef,
        in_addr_errors: ObjectRef,
        in_unknown_protos: ObjectRef,
        in_receives: ObjectRef,
    },
    LinkUtilization {
        in_octets: ObjectRef,
        out_octets: ObjectRef,
        speed: ObjectRef,
    },
    ForwardingRate {
        forwarded: ObjectRef,
    },
    Uptime {
        ticks: ObjectRef,
    },
    CounterSnapshot {
        counter: ObjectRef,
    },
}

impl MetricInputs {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricInputs::ByteRate { .. } => MetricKind::ByteRate,
            MetricInputs::PacketErrorRatio { .. } => MetricKind::PacketErrorRatio,
            MetricInputs::DatagramErrorRatio { .. } => MetricKind::DatagramErrorRatio,
            MetricInputs::LinkUtilization { .. } => MetricKind::LinkUtilization,
            MetricInputs::ForwardingRate { .. } => MetricKind::ForwardingRate,
            MetricInputs::Uptime { .. } => MetricKind::Uptime,
            MetricInputs::CounterSnapshot { .. } => MetricKind::CounterSnapshot,
        }
    }
}

/// One row of the metric table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: MetricId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub inputs: MetricInputs,
}

impl MetricDefinition {
    pub fn new(id: impl Into<MetricId>, inputs: MetricInputs) -> Self {
        Self {
            id: id.into(),
            title: None,
            inputs,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn kind(&self) -> MetricKind {
        self.inputs.kind()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.kind().title())
    }
}

/// The series polled when no metric table file is configured
pub fn default_table(if_index: u32) -> Vec<MetricDefinition> {
    let if_mib = |name: &str| ObjectRef::new("IF-MIB", name).with_index(if_index);
    let ip_mib = |name: &str| ObjectRef::new("IP-MIB", name).with_index(0);

    vec![
        MetricDefinition::new(
            "byte_rate",
            MetricInputs::ByteRate {
                in_octets: if_mib("ifInOctets"),
                out_octets: if_mib("ifOutOctets"),
            },
        ),
        MetricDefinition::new(
            "packet_error_ratio",
            MetricInputs::PacketErrorRatio {
                in_errors: if_mib("ifInErrors"),
                in_ucast_pkts: if_mib("ifInUcastPkts"),
                in_nucast_pkts: if_mib("ifInNUcastPkts"),
            },
        ),
        MetricDefinition::new(
            "datagram_error_ratio",
            MetricInputs::DatagramErrorRatio {
                in_hdr_errors: ip_mib("ipInHdrErrors"),
                in_addr_errors: ip_mib("ipInAddrErrors"),
                in_unknown_protos: ip_mib("ipInUnknownProtos"),
                in_receives: ip_mib("ipInReceives"),
            },
        ),
        MetricDefinition::new(
            "link_utilization",
            MetricInputs::LinkUtilization {
                in_octets: if_mib("ifInOctets"),
                out_octets: if_mib("ifOutOctets"),
                speed: if_mib("ifSpeed"),
            },
        ),
        MetricDefinition::new(
            "forwarding_rate",
            MetricInputs::ForwardingRate {
                forwarded: ip_mib("ipForwDatagrams"),
            },
        ),
        MetricDefinition::new(
            "uptime",
            MetricInputs::Uptime {
                ticks: ObjectRef::new("DISMAN-EVENT-MIB", "sysUpTimeInstance"),
            },
        ),
        MetricDefinition::new(
            "ip_out_requests",
            MetricInputs::CounterSnapshot {
                counter: ip_mib("ipOutRequests"),
            },
        )
        .with_title("IP packets sent"),
        MetricDefinition::new(
            "tcp_attempt_fails",
            MetricInputs::CounterSnapshot {
                counter: ObjectRef::new("TCP-MIB", "tcpAttemptFails").with_index(0),
            },
        )
        .with_title("Failed connection attempts"),
        MetricDefinition::new(
            "icmp_in_echos",
            MetricInputs::CounterSnapshot {
                counter: ip_mib("icmpInEchos"),
            },
        )
        .with_title("ICMP echo requests received"),
    ]
}
