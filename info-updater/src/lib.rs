//! info-updater library crate.
//!
//! Watches the Dopelives topic and mirrors the current stream onto the
//! Twitch and Hitbox channels.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod monitor;

pub use error::{Error, Result};
