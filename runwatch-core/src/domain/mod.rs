//! Core domain types
//!
//! This module contains the structures the run service reports back to
//! clients. They are shared between the HTTP client (deserializes them) and
//! the poller (inspects their status).

pub mod log;
pub mod run;
