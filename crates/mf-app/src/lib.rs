//! Command-line front end for melframes.

pub mod cli;
pub mod pipeline;
