// SPDX-License-Identifier: MIT

//! `#[serde(with = "...")]` adapters serializing [`Duration`] as a single
//! integer-nanosecond value, per §6's wire format.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// For plain (non-`Option`) `Duration` fields.
pub mod nanos {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (value.as_nanos() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(d)?;
        Ok(Duration::from_nanos(nanos))
    }
}

/// For `Option<Duration>` fields.
pub mod nanos_opt {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_nanos() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let nanos: Option<u64> = Option::deserialize(d)?;
        Ok(nanos.map(Duration::from_nanos))
    }
}
