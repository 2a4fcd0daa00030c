//! Hardware Abstraction Layer (HAL) for the Thymio sound peripheral
//!
//! This crate provides trait-based abstractions for the sound codec,
//! enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware / scripts)
//!         ↓
//! Feature Layers (sound-events)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Codec driver (play / record / completion flags)
//! ```
//!
//! # Abstraction Levels
//!
//! - [`SoundStatus`] - the two completion-flag queries
//! - [`SoundDevice`] - play and record commands on top of the status flags
//! - [`sound_types`] - newtypes for clip indices and recording durations
//!
//! # Features
//!
//! - `std`: Enable standard library support and export [`mocks`] (for testing)
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{ClipId, SoundDevice};
//!
//! fn chime<D: SoundDevice>(sound: &mut D) -> Result<(), D::Error> {
//!     sound.play_wav(ClipId::new(3))
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod sound;
pub mod sound_types;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use sound::{FlagMode, SoundDevice, SoundStatus};
pub use sound_types::{AudioFileFormat, ClipId, OutOfRangeError, RecordSeconds};
