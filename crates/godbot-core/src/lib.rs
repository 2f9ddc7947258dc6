//! Core domain + application logic for godbot, a Compiler Explorer front end
//! for Telegram.
//!
//! This crate is intentionally framework-agnostic. Telegram / Compiler
//! Explorer / carbonara live behind ports (traits) implemented in adapter
//! crates.

pub mod ansi;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod explorer;
pub mod logging;
pub mod render;
pub mod result;
pub mod store;
pub mod version;
pub mod writer;

pub use errors::{Error, Result};
