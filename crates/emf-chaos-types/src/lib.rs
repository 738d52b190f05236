//! Shared type definitions for the EMF chaos simulation.
//!
//! This crate holds every value that crosses a crate boundary: device
//! records, the per-tick classification and amplification results, the
//! environmental inputs, and the published [`ChaosSnapshot`]. Types flow to
//! `TypeScript` via `ts-rs` for dashboard consumers.
//!
//! # Modules
//!
//! - [`ids`] -- Opaque synthetic device identifiers
//! - [`enums`] -- Zones, threat levels, patterns, reflection tags, statuses
//! - [`structs`] -- Device records, state structs, and the snapshot

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{
    AmplificationMode, DeviceType, EnvironmentStatus, IntensityTrend, PatternType,
    ReflectionType, ThreatLevel, Zone,
};
pub use ids::SyntheticId;
pub use structs::{
    AmplificationState, ChaosSnapshot, ChaosState, DeviceRecord, EnvironmentalInfluence,
    EnvironmentalReading, EnvironmentalSnapshot, HistoryEntry,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::SyntheticId::export_all();
        let _ = crate::enums::Zone::export_all();
        let _ = crate::enums::ThreatLevel::export_all();
        let _ = crate::enums::DeviceType::export_all();
        let _ = crate::enums::PatternType::export_all();
        let _ = crate::enums::ReflectionType::export_all();
        let _ = crate::enums::AmplificationMode::export_all();
        let _ = crate::enums::EnvironmentStatus::export_all();
        let _ = crate::enums::IntensityTrend::export_all();
        let _ = crate::structs::DeviceRecord::export_all();
        let _ = crate::structs::ChaosState::export_all();
        let _ = crate::structs::AmplificationState::export_all();
        let _ = crate::structs::EnvironmentalSnapshot::export_all();
        let _ = crate::structs::EnvironmentalReading::export_all();
        let _ = crate::structs::EnvironmentalInfluence::export_all();
        let _ = crate::structs::HistoryEntry::export_all();
        let _ = crate::structs::ChaosSnapshot::export_all();
    }
}
