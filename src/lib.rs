// ABOUTME: Library root for trackctl - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod gateway;
pub mod output;
pub mod publish;
pub mod types;
