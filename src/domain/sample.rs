use chrono::{DateTime, Utc};

use super::ObjectRef;

/// One raw counter read. `value` is `None` when the read failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub object: ObjectRef,
    pub value: Option<u64>,
    pub taken_at: DateTime<Utc>,
}

impl RawSample {
    pub fn new(object: ObjectRef, value: Option<u64>, taken_at: DateTime<Utc>) -> Self {
        Self {
            object,
            value,
            taken_at,
        }
    }

    pub fn present(object: ObjectRef, value: u64, taken_at: DateTime<Utc>) -> Self {
        Self::new(object, Some(value), taken_at)
    }

    pub fn absent(object: ObjectRef, taken_at: DateTime<Utc>) -> Self {
        Self::new(object, None, taken_at)
    }
}
