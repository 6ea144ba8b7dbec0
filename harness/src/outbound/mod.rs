//! Outbound adapters.

pub mod persistence;
