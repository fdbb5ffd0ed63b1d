//! Shared types for melframes: configuration, errors and signal/frame data.

pub mod config;
pub mod error;
pub mod frame;
pub mod signal;
