//! Status API server for the EMF chaos simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/snapshots`) streaming every published
//!   snapshot as JSON
//! - **REST endpoints** for the latest snapshot and its parts (devices,
//!   amplification, environment, history)
//! - **Operator REST endpoints** for runtime control (pause, resume,
//!   speed, status, stop)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The observer never calls into the scheduler's pipeline. It holds a
//! [`SnapshotReader`] and serves whatever snapshot was last published, so
//! every response is built from a single tick.
//!
//! [`SnapshotReader`]: emf_chaos_core::publish::SnapshotReader

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
