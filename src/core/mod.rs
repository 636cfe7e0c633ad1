//! Core components of the `fundwatch-rs` engine.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`FwEngine`] and its builder.
//! - The primary [`FwError`] type.
//! - Shared data models like [`Snapshot`], [`Filing`] and [`Delta`].
//! - The collaborator traits the engine reads from and writes to.

/// The main engine (`FwEngine`) and its builder.
pub mod client;
/// Engine thresholds (`EngineConfig`).
pub mod config;
/// Numeric helpers for percentages and averages.
pub mod conversions;
/// The primary error type (`FwError`) for the crate.
pub mod error;
/// Shared data models used across multiple modules (e.g., `Snapshot`, `Delta`).
pub mod models;
/// Service traits for the snapshot store and delta persistence collaborators.
pub mod services;

// convenient re-exports so most code can just `use crate::core::FwEngine`
pub use client::{FwEngine, FwEngineBuilder};
pub use config::EngineConfig;
pub use error::FwError;
pub use models::{
    Delta, DeltaAction, DeltaSet, Filing, FilingStatus, HoldingRow, PutCall, SectorRef, Snapshot,
};
pub use services::{DeltaSink, ServiceFuture, SnapshotStore};
