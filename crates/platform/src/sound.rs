//! Sound codec abstraction

use crate::sound_types::{ClipId, RecordSeconds};

/// Completion flags exposed by the sound codec.
///
/// Both queries are synchronous and must not block: they run inside the
/// cooperative poll task, so a slow query stalls every other task on the
/// executor.
///
/// Whether a `true` reading clears the flag is a property of the driver,
/// declared through [`SoundStatus::flag_mode`]. Consumers that poll these
/// flags rely on that contract for single versus repeated notification.
pub trait SoundStatus {
    /// Returns `true` if a playback has finished since the flag was last cleared.
    fn play_completed(&mut self) -> bool;

    /// Returns `true` if a recording has finished since the flag was last cleared.
    fn record_completed(&mut self) -> bool;

    /// Clearing contract of the two completion flags.
    fn flag_mode(&self) -> FlagMode {
        FlagMode::ClearOnRead
    }
}

/// How a completion flag returns to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlagMode {
    /// A `true` reading clears the flag (one notification per completion).
    #[default]
    ClearOnRead,
    /// The flag stays `true` until the driver clears it by other means.
    Level,
}

impl FlagMode {
    /// Short name for log output.
    pub const fn name(self) -> &'static str {
        match self {
            FlagMode::ClearOnRead => "clear-on-read",
            FlagMode::Level => "level",
        }
    }
}

/// Sound codec commands.
///
/// Clips are stored in internal flash as `<index>.mp3` / `<index>.wav`
/// (see [`ClipId::file_name`]). Commands start the operation and return;
/// completion is reported later through [`SoundStatus`].
pub trait SoundDevice: SoundStatus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Start playing `<clip>.mp3`
    fn play_mp3(&mut self, clip: ClipId) -> Result<(), Self::Error>;

    /// Start playing `<clip>.wav`
    fn play_wav(&mut self, clip: ClipId) -> Result<(), Self::Error>;

    /// Start recording `duration` seconds into `<clip>.wav`
    fn record_wav(&mut self, clip: ClipId, duration: RecordSeconds) -> Result<(), Self::Error>;
}
