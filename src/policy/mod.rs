//! License policy: deciding what a verification result means locally.

pub mod reconcile;
