//! Application configuration and constants
//!
//! Central configuration values for the sound event layer. Everything here
//! is compile-time; there is no runtime configuration store on the robot.

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Interval between two samples of the codec completion flags (20 Hz).
pub const SOUND_POLL_INTERVAL_MS: u64 = 50;

/// Longest recording the codec accepts, in seconds.
pub const MAX_RECORD_SECONDS: u16 = 60;

