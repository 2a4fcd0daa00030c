//! Sound completion events — polls the codec flags, dispatches callbacks
//!
//! The codec reports finished playbacks and recordings only through two
//! boolean flags. [`EventPoller`] samples both at 20 Hz from a single
//! cooperative task and calls whatever is registered for the matching
//! [`EventKind`].
//!
//! ```text
//! executor → EventPoller::run → SoundStatus query → CallbackRegistry → callback
//! ```
//!
//! # Usage
//!
//! Embassy tasks cannot be generic, so the firmware declares the task for
//! its concrete driver and hands it a `'static` poller:
//!
//! ```rust,ignore
//! static SOUND_EVENTS: EventPoller<ClipId> = EventPoller::new(PollerConfig::DEFAULT);
//!
//! #[embassy_executor::task]
//! async fn sound_events_task(sound: CodecSound) {
//!     let _ = SOUND_EVENTS.run(sound).await;
//! }
//!
//! fn on_played(clip: &ClipId) -> CallbackResult { /* ... */ Ok(()) }
//!
//! SOUND_EVENTS.register_play_completed(Some(Callback::with_args(on_played, ClipId::new(1))));
//! spawner.spawn(sound_events_task(sound)).ok();
//! ```
//!
//! # Features
//!
//! - `std`: host builds (forwards to `platform/std`)
//! - `defmt`: log through defmt on hardware
//! - `tracing`: log through tracing on desktop

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod event;
pub mod poller;
pub mod registry;

pub use callback::{Callback, CallbackError, CallbackResult};
pub use event::EventKind;
pub use poller::{AlreadyRunning, EventPoller, FailureHook, PollReport, PollStats, PollerConfig};
pub use registry::{CallbackRegistry, Outcome};
