//! Command line interface

pub mod commands;
pub mod display;
pub mod export;
pub mod fleet;
pub mod images;
pub mod workloads;

pub use commands::CliArgs;
