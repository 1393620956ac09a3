//! Data Transfer Objects for talking to the run service
//!
//! Requests sent by the client and lightweight listing payloads returned by
//! the service.

pub mod run;
