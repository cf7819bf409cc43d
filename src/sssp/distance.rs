//! Tentative shortest-path distance.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::graph::Weight;

const UNREACHED: &str = "unreached";

/// A tentative distance: a finite integer or "not reached yet".
///
/// Ordering puts every finite value below `Unreached`, so `min` merges work
/// without special cases. Serialized as a JSON number or the string
/// `"unreached"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Distance {
    Finite(u64),
    #[default]
    Unreached,
}

impl Distance {
    pub const ZERO: Distance = Distance::Finite(0);

    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn finite(self) -> Option<u64> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Unreached => None,
        }
    }

    /// `self + w`, saturating at `u64::MAX`; unreached stays unreached.
    pub fn plus(self, w: Weight) -> Distance {
        match self {
            Distance::Finite(d) => Distance::Finite(d.saturating_add(w)),
            Distance::Unreached => Distance::Unreached,
        }
    }
}

impl From<u64> for Distance {
    fn from(d: u64) -> Self {
        Distance::Finite(d)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{d}"),
            Distance::Unreached => f.write_str(UNREACHED),
        }
    }
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Distance::Finite(d) => serializer.serialize_u64(*d),
            Distance::Unreached => serializer.serialize_str(UNREACHED),
        }
    }
}

struct DistanceVisitor;

impl<'de> Visitor<'de> for DistanceVisitor {
    type Value = Distance;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative integer or \"{UNREACHED}\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Distance, E> {
        Ok(Distance::Finite(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Distance, E> {
        u64::try_from(v)
            .map(Distance::Finite)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Distance, E> {
        if v == UNREACHED {
            Ok(Distance::Unreached)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Distance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DistanceVisitor)
    }
}
