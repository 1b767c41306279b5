#![cfg_attr(not(test), no_std)]

//! ESP32-S3 board support for the Skywave radio.
//!
//! The async network workers in the firmware binary and the sync core
//! never share state directly: workers publish into the lock-free
//! handles here, and the core-facing adapters read them back through
//! the `skywave-core` collaborator traits.

pub mod clock;
pub mod network;
pub mod platform;
pub mod render;
pub mod stream;
