use crate::domain::ObjectRef;

/// Legacy MIB-II module that defines the same objects under one name
const MIB_II: &str = "RFC1213-MIB";

/// Known objects: (module, name, base OID)
const OBJECTS: &[(&str, &str, &[u32])] = &[
    // System group
    ("SNMPv2-MIB", "sysUpTime", &[1, 3, 6, 1, 2, 1, 1, 3]),
    ("DISMAN-EVENT-MIB", "sysUpTimeInstance", &[1, 3, 6, 1, 2, 1, 1, 3, 0]),
    // Interfaces table
    ("IF-MIB", "ifSpeed", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5]),
    ("IF-MIB", "ifInOctets", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 10]),
    ("IF-MIB", "ifInUcastPkts", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 11]),
    ("IF-MIB", "ifInNUcastPkts", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 12]),
    ("IF-MIB", "ifInDiscards", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 13]),
    ("IF-MIB", "ifInErrors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 14]),
    ("IF-MIB", "ifOutOctets", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 16]),
    ("IF-MIB", "ifOutErrors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 20]),
    ("IF-MIB", "ifHCInOctets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6]),
    ("IF-MIB", "ifHCOutOctets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10]),
    // IP group
    ("IP-MIB", "ipInReceives", &[1, 3, 6, 1, 2, 1, 4, 3]),
    ("IP-MIB", "ipInHdrErrors", &[1, 3, 6, 1, 2, 1, 4, 4]),
    ("IP-MIB", "ipInAddrErrors", &[1, 3, 6, 1, 2, 1, 4, 5]),
    ("IP-MIB", "ipForwDatagrams", &[1, 3, 6, 1, 2, 1, 4, 6]),
    ("IP-MIB", "ipInUnknownProtos", &[1, 3, 6, 1, 2, 1, 4, 7]),
    ("IP-MIB", "ipInDelivers", &[1, 3, 6, 1, 2, 1, 4, 9]),
    ("IP-MIB", "ipOutRequests", &[1, 3, 6, 1, 2, 1, 4, 10]),
    // ICMP group
    ("IP-MIB", "icmpInMsgs", &[1, 3, 6, 1, 2, 1, 5, 1]),
    ("IP-MIB", "icmpInEchos", &[1, 3, 6, 1, 2, 1, 5, 8]),
    // TCP group
    ("TCP-MIB", "tcpActiveOpens", &[1, 3, 6, 1, 2, 1, 6, 5]),
    ("TCP-MIB", "tcpPassiveOpens", &[1, 3, 6, 1, 2, 1, 6, 6]),
    ("TCP-MIB", "tcpAttemptFails", &[1, 3, 6, 1, 2, 1, 6, 7]),
    ("TCP-MIB", "tcpCurrEstab", &[1, 3, 6, 1, 2, 1, 6, 9]),
];

/// Resolve an object to its numeric OID, instance index appended.
///
/// A dotted numeric name (`1.3.6.1.2.1.1.3.0`) is taken as-is and the group ignored.
pub fn resolve(object: &ObjectRef) -> Option<Vec<u32>> {
    let mut oid = parse_numeric(&object.name).or_else(|| {
        OBJECTS
            .iter()
            .find(|(group, name, _)| {
                *name == object.name && (*group == object.group || object.group == MIB_II)
            })
            .map(|(_, _, oid)| oid.to_vec())
    })?;

    if let Some(index) = object.index {
        oid.push(index);
    }
    Some(oid)
}

fn parse_numeric(name: &str) -> Option<Vec<u32>> {
    let trimmed = name.trim_start_matches('.');
    if trimmed.is_empty() || !trimmed.contains('.') {
        return None;
    }
    trimmed.split('.').map(|arc| arc.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_index() {
        let oid = resolve(&ObjectRef::new("IF-MIB", "ifInOctets").with_index(1)).unwrap();
        assert_eq!(oid, vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 1]);
    }

    #[test]
    fn test_resolve_scalar_instance() {
        let oid = resolve(&ObjectRef::new("IP-MIB", "ipForwDatagrams").with_index(0)).unwrap();
        assert_eq!(oid, vec![1, 3, 6, 1, 2, 1, 4, 6, 0]);

        let uptime = resolve(&ObjectRef::new("DISMAN-EVENT-MIB", "sysUpTimeInstance")).unwrap();
        assert_eq!(uptime, vec![1, 3, 6, 1, 2, 1, 1, 3, 0]);
    }

    #[test]
    fn test_resolve_legacy_module_name() {
        let oid = resolve(&ObjectRef::new("RFC1213-MIB", "tcpAttemptFails").with_index(0));
        assert_eq!(oid, Some(vec![1, 3, 6, 1, 2, 1, 6, 7, 0]));
    }

    #[test]
    fn test_resolve_numeric_name() {
        let oid = resolve(&ObjectRef::new("", "1.3.6.1.2.1.1.3.0")).unwrap();
        assert_eq!(oid, vec![1, 3, 6, 1, 2, 1, 1, 3, 0]);
        assert!(resolve(&ObjectRef::new("", "1.3.x.1")).is_none());
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(resolve(&ObjectRef::new("IF-MIB", "ifBogus")).is_none());
        assert!(resolve(&ObjectRef::new("TCP-MIB", "ifInOctets")).is_none());
    }
}
