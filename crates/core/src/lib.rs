//! Shared configuration and helpers for courier.
//!
//! This crate contains the process configuration and the env parsing
//! helper used by every other crate.

mod config;
mod env_config;

pub use config::Config;
pub use env_config::env_parse_with_default;
