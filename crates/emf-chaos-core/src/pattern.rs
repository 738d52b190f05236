//! Pattern selection and reflection tagging.
//!
//! The pattern is a pure function of intensity, re-evaluated every tick
//! with no hysteresis:
//!
//! | Intensity   | Pattern                    |
//! |-------------|----------------------------|
//! | `[0, 25)`   | `ambient_monitoring`       |
//! | `[25, 50)`  | `dynamic_chaos`            |
//! | `[50, 75)`  | `quad_reflection`          |
//! | `[75, 100]` | `swiss_energy_disruption`  |
//!
//! Reflection tags are implementation-defined: an FNV-1a hash of the
//! synthetic identifier, mixed with the pattern ordinal, selects one of
//! the six values. The mapping is deterministic for a given identifier and
//! pattern and carries no further meaning.

use emf_chaos_types::{PatternType, ReflectionType, SyntheticId};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Select the pattern for an intensity.
pub const fn select(intensity_percent: u8) -> PatternType {
    match intensity_percent {
        0..=24 => PatternType::AmbientMonitoring,
        25..=49 => PatternType::DynamicChaos,
        50..=74 => PatternType::QuadReflection,
        _ => PatternType::SwissEnergyDisruption,
    }
}

fn fnv1a(bytes: &[u8], seed: u8) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes.iter().chain(core::iter::once(&seed)) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Assign a reflection tag to one device.
pub fn reflection_for(synthetic_id: &SyntheticId, pattern: PatternType) -> ReflectionType {
    let hash = fnv1a(synthetic_id.as_bytes(), pattern.ordinal());
    let len = u64::try_from(ReflectionType::ALL.len()).unwrap_or(1);
    let index = usize::try_from(hash.checked_rem(len).unwrap_or(0)).unwrap_or(0);
    ReflectionType::ALL
        .get(index)
        .copied()
        .unwrap_or(ReflectionType::Ambient)
}

/// Most frequent reflection tag in a batch.
///
/// Ties go to the tag listed first in [`ReflectionType::ALL`]. An empty
/// batch reports [`ReflectionType::Ambient`].
pub fn dominant_reflection<I>(tags: I) -> ReflectionType
where
    I: IntoIterator<Item = ReflectionType>,
{
    let mut counts = [0_u32; 6];
    for tag in tags {
        let position = ReflectionType::ALL.iter().position(|&t| t == tag);
        if let Some(slot) = position.and_then(|p| counts.get_mut(p)) {
            *slot = slot.saturating_add(1);
        }
    }

    let mut best: Option<(ReflectionType, u32)> = None;
    for (&tag, &count) in ReflectionType::ALL.iter().zip(counts.iter()) {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((tag, count));
        }
    }
    best.map_or(ReflectionType::Ambient, |(tag, _)| tag)
}
