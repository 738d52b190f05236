//! Device synthesis, classification, amplification, and the tick scheduler
//! for the EMF chaos simulation.
//!
//! Each tick draws a fresh batch of synthetic devices, classifies them into
//! zones, reduces them to a chaos intensity and pattern, estimates relay
//! amplification (adjusted by the latest environmental reading) and
//! publishes one immutable snapshot.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `emf-chaos-config.yaml`.
//! - [`generator`] -- Seedable synthetic device batches.
//! - [`zone`] -- Bearing/distance to zone classification.
//! - [`intensity`] -- Batch to 0-100 chaos intensity.
//! - [`pattern`] -- Intensity to pattern, per-device reflection tags.
//! - [`amplification`] -- Carrier counting and range extension.
//! - [`environment`] -- Weather-driven `rf_factor` and optimal bearing.
//! - [`weather`] -- Simulated coastal weather source.
//! - [`history`] -- Rolling tick history and intensity trend.
//! - [`publish`] -- The most-recent-snapshot slot.
//! - [`control`] -- Pause, resume, speed, and stop.
//! - [`tick`] -- One tick of the pipeline.
//! - [`runner`] -- The scheduler loop.

pub mod amplification;
pub mod config;
pub mod control;
pub mod environment;
pub mod generator;
pub mod history;
pub mod intensity;
pub mod pattern;
pub mod publish;
pub mod runner;
pub mod tick;
pub mod weather;
pub mod zone;
