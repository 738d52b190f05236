//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Synthetic devices carry an opaque [`SyntheticId`] that stands in for a
//! hardware address. It is never derived from a real identifier and has no
//! meaning across ticks.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::{Builder, Uuid};

/// Opaque identifier for a synthetic device, unique within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SyntheticId(pub Uuid);

impl SyntheticId {
    /// Build an identifier from 16 caller-supplied random bytes.
    ///
    /// The bytes are stamped as a version 4 UUID. The generator draws them
    /// from its seedable random source so that tests can reproduce exact
    /// identifier sequences.
    pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Return the raw identifier bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Short display label in the `syn_xxxx:xxxx` form used by log output.
    pub fn short_label(&self) -> String {
        let [.., a, b, _, _, c, d] = *self.0.as_bytes();
        format!("syn_{a:02x}{b:02x}:{c:02x}{d:02x}")
    }
}

impl core::fmt::Display for SyntheticId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SyntheticId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<SyntheticId> for Uuid {
    fn from(id: SyntheticId) -> Self {
        id.0
    }
}
