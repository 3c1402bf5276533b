use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use snmp::{SnmpPdu, SyncSession, Value};
use tracing::debug;

use crate::domain::ObjectRef;
use crate::ports::{SnmpError, SnmpSource};

use super::{mib, AgentConfig};

/// SNMP v2c reader backed by the `snmp` crate's blocking session
pub struct SnmpAgentAdapter {
    config: Arc<AgentConfig>,
}

impl SnmpAgentAdapter {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    async fn get_once(&self, object: &ObjectRef, oid: &[u32]) -> Result<u64, SnmpError> {
        let config = Arc::clone(&self.config);
        let object = object.clone();
        let oid = oid.to_vec();

        tokio::task::spawn_blocking(move || get_blocking(&config, &object, &oid))
            .await
            .map_err(|e| SnmpError::TransportUnreachable {
                agent: self.config.address(),
                reason: format!("request task failed: {}", e),
            })?
    }
}

#[async_trait]
impl SnmpSource for SnmpAgentAdapter {
    async fn fetch(&self, object: &ObjectRef) -> Result<u64, SnmpError> {
        let oid = mib::resolve(object).ok_or_else(|| SnmpError::NoSuchObject(object.clone()))?;
        let oid = oid.as_slice();

        with_retries(object, self.config.retries, move || self.get_once(object, oid)).await
    }
}

/// Run `attempt` once, then up to `retries` more times while it fails on transport
async fn with_retries<F, Fut>(
    object: &ObjectRef,
    retries: u32,
    mut attempt: F,
) -> Result<u64, SnmpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u64, SnmpError>>,
{
    let mut retried = 0;
    loop {
        match attempt().await {
            Err(e) if e.is_transient() && retried < retries => {
                retried += 1;
                debug!("Retrying {} (attempt {}): {}", object, retried + 1, e);
            }
            result => return result,
        }
    }
}

fn get_blocking(config: &AgentConfig, object: &ObjectRef, oid: &[u32]) -> Result<u64, SnmpError> {
    let transport = |reason: String| SnmpError::TransportUnreachable {
        agent: config.address(),
        reason,
    };

    let mut session = SyncSession::new(
        (config.host.as_str(), config.port),
        config.community.as_bytes(),
        Some(config.timeout),
        0,
    )
    .map_err(|e| transport(e.to_string()))?;

    let response = session.get(oid).map_err(|e| match e {
        snmp::SnmpError::SendError => transport("send failed".to_string()),
        snmp::SnmpError::ReceiveError => transport("no response before timeout".to_string()),
        other => SnmpError::InvalidResponse(format!("{:?}", other)),
    })?;

    decode_response(object, response)
}

fn decode_response(object: &ObjectRef, mut response: SnmpPdu<'_>) -> Result<u64, SnmpError> {
    if response.error_status != 0 {
        return Err(SnmpError::ProtocolError {
            status: response.error_status,
            index: response.error_index,
        });
    }

    // noSuchObject, noSuchInstance and endOfMibView carry tags the decoder
    // skips, so a clean reply with no readable varbind is an exception
    match response.varbinds.next() {
        Some((_name, value)) => counter_value(object, value),
        None => Err(SnmpError::NoSuchObject(object.clone())),
    }
}

fn counter_value(object: &ObjectRef, value: Value<'_>) -> Result<u64, SnmpError> {
    match value {
        Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => Ok(u64::from(v)),
        Value::Counter64(v) => Ok(v),
        Value::Integer(v) => u64::try_from(v).map_err(|_| {
            SnmpError::InvalidResponse(format!("negative value {} for {}", v, object))
        }),
        _ => Err(SnmpError::InvalidResponse(format!(
            "{} is not an integer counter",
            object
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn object() -> ObjectRef {
        ObjectRef::new("SNMPv2-MIB", "sysUpTime").with_index(0)
    }

    fn tlv(tag: u8, body: &[u8]) -> Vec<u8> {
        let mut encoded = vec![tag, body.len() as u8];
        encoded.extend_from_slice(body);
        encoded
    }

    /// v2c GetResponse for 1.3.6.1.2.1.1.3.0 with the given status and encoded value
    fn get_response(status: u8, index: u8, value: &[u8]) -> Vec<u8> {
        let oid = tlv(0x06, &[0x2b, 0x06, 0x01, 0x02, 0x01, 0x01, 0x03, 0x00]);
        let varbind = tlv(0x30, &[oid, value.to_vec()].concat());
        let pdu = tlv(
            0xa2,
            &[
                tlv(0x02, &[0x01]),
                tlv(0x02, &[status]),
                tlv(0x02, &[index]),
                tlv(0x30, &varbind),
            ]
            .concat(),
        );
        tlv(0x30, &[tlv(0x02, &[0x01]), tlv(0x04, b"public"), pdu].concat())
    }

    fn decode(bytes: &[u8]) -> Result<u64, SnmpError> {
        let pdu = SnmpPdu::from_bytes(bytes).unwrap();
        decode_response(&object(), pdu)
    }

    fn transport() -> SnmpError {
        SnmpError::TransportUnreachable {
            agent: "localhost:161".to_string(),
            reason: "no response before timeout".to_string(),
        }
    }

    #[test]
    fn test_counter_value_accepts_integer_types() {
        assert_eq!(counter_value(&object(), Value::Counter32(7)), Ok(7));
        assert_eq!(counter_value(&object(), Value::Counter64(u64::MAX)), Ok(u64::MAX));
        assert_eq!(counter_value(&object(), Value::Unsigned32(1_000_000_000)), Ok(1_000_000_000));
        assert_eq!(counter_value(&object(), Value::Timeticks(360_000)), Ok(360_000));
        assert_eq!(counter_value(&object(), Value::Integer(12)), Ok(12));
    }

    #[test]
    fn test_counter_value_rejects_negative_and_text() {
        assert!(matches!(
            counter_value(&object(), Value::Integer(-1)),
            Err(SnmpError::InvalidResponse(_))
        ));
        assert!(matches!(
            counter_value(&object(), Value::OctetString(b"eth0")),
            Err(SnmpError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_decode_timeticks_reply() {
        assert_eq!(decode(&get_response(0, 0, &tlv(0x43, &[0x01, 0x00]))), Ok(256));
    }

    #[test]
    fn test_decode_no_such_instance_reply() {
        assert_eq!(
            decode(&get_response(0, 0, &[0x81, 0x00])),
            Err(SnmpError::NoSuchObject(object()))
        );
        assert_eq!(
            decode(&get_response(0, 0, &[0x80, 0x00])),
            Err(SnmpError::NoSuchObject(object()))
        );
    }

    #[test]
    fn test_decode_error_status() {
        // noSuchName on the first varbind
        assert_eq!(
            decode(&get_response(2, 1, &[0x05, 0x00])),
            Err(SnmpError::ProtocolError { status: 2, index: 1 })
        );
    }

    #[tokio::test]
    async fn test_transport_failures_are_retried() {
        let attempts = AtomicUsize::new(0);
        let result = with_retries(&object(), 2, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(transport()) }
        })
        .await;

        assert_eq!(result, Err(transport()));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_stops_on_success() {
        let attempts = AtomicUsize::new(0);
        let result = with_retries(&object(), 3, || {
            let first = attempts.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    Err(transport())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_agent_answers_are_not_retried() {
        for answer in [
            SnmpError::ProtocolError { status: 2, index: 1 },
            SnmpError::NoSuchObject(object()),
        ] {
            let attempts = AtomicUsize::new(0);
            let result = with_retries(&object(), 3, || {
                attempts.fetch_add(1, Ordering::SeqCst);
                let answer = answer.clone();
                async move { Err(answer) }
            })
            .await;

            assert_eq!(result, Err(answer));
            assert_eq!(attempts.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_unknown_object_is_not_sent() {
        let adapter = SnmpAgentAdapter::new(AgentConfig::default());
        let result = adapter.fetch(&ObjectRef::new("IF-MIB", "ifBogus")).await;
        assert_eq!(
            result,
            Err(SnmpError::NoSuchObject(ObjectRef::new("IF-MIB", "ifBogus")))
        );
    }
}
