//! CLI command implementations.

pub mod diff;
pub mod list;
pub mod run;
