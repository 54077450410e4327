//! HomeMesh firmware library.
//!
//! Exposes the pure-logic modules (frame codec, peer table, fusion,
//! hysteresis, node services) and the `embedded-hal` adapters for
//! integration testing.  Nothing here depends on ESP-IDF; the platform is
//! wired up in `main.rs` behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod esp_link_shims;
pub mod protocol;
pub mod sensors;
pub mod sources;

pub use error::{Error, Result};
