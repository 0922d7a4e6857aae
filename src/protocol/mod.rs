//! Verification service protocol.

pub mod models;
