#![cfg_attr(not(test), no_std)]

//! Board-agnostic core for the Skywave internet radio controller.
//!
//! Owns the boot → connect → sync → ready sequencing, steady-state
//! stream supervision, and screen selection. Hardware collaborators are
//! injected through the traits in [`link`], [`clock`], and [`stream`];
//! the board loop presents the [`render::Screen`] view models.

pub mod app;
pub mod clock;
pub mod link;
pub mod render;
pub mod stream;
