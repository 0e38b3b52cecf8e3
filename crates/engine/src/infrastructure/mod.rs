//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod cache;
pub mod clock;
pub mod config;
pub mod generator;
pub mod messages_api;
pub mod ports;
pub mod resilient_llm;
pub mod save_store;
