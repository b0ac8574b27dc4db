//! Application layer
//!
//! Ports for the external systems, the strategies built on top of them and
//! the command handlers the CLI dispatches to.

pub mod commands;
pub mod ports;
pub mod strategies;
pub mod universe;
