//! Fund Disclosure Adapters
//!
//! Implementations of `FundDataPort`.

pub mod ark;

pub use ark::{ARK_BASE_URL, ArkClient, ArkError};
