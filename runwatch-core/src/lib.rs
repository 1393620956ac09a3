//! Runwatch Core
//!
//! Core types and abstractions shared by the runwatch crates.
//!
//! This crate contains:
//! - Domain types: runs, run status and log entries as reported by the run service
//! - DTOs: request and summary payloads exchanged with the service
//! - Status classification: deciding when a run has stopped changing

pub mod domain;
pub mod dto;
pub mod status;

pub use status::{Snapshot, StatusClass};
