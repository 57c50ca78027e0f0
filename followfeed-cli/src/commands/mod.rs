//! CLI command implementations.

pub mod activity;
