//! Sound domain newtypes.
//!
//! - `ClipId`: index of a clip in internal storage, maps to `<index>.<ext>`
//! - `AudioFileFormat`: the two container formats the codec understands
//! - `RecordSeconds`: recording length, validated against the codec limit

use core::fmt::Write;

use crate::config::MAX_RECORD_SECONDS;

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "value {} outside {}..={}",
            self.value, self.min, self.max
        )
    }
}

// ── AudioFileFormat ──────────────────────────────────────────────────────────

/// Audio container stored on the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioFileFormat {
    /// MPEG-1 Layer III (playback only)
    Mp3,
    /// RIFF WAVE (playback and recording)
    Wav,
}

impl AudioFileFormat {
    /// File extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            AudioFileFormat::Mp3 => "mp3",
            AudioFileFormat::Wav => "wav",
        }
    }
}

// ── ClipId ───────────────────────────────────────────────────────────────────

/// Longest file name [`ClipId::file_name`] can produce: `"65535.wav"`.
pub const CLIP_FILE_NAME_LEN: usize = 12;

/// Index of a clip in internal storage.
///
/// The codec addresses clips by number only; the file on flash is named
/// `<index>.mp3` or `<index>.wav`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ClipId(u16);

impl ClipId {
    /// Wrap a storage index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Return the storage index.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Storage file name for this clip, e.g. `"3.wav"`.
    #[must_use]
    pub fn file_name(self, format: AudioFileFormat) -> heapless::String<CLIP_FILE_NAME_LEN> {
        let mut name = heapless::String::new();
        // ok: five digits + '.' + three-letter extension always fits in CLIP_FILE_NAME_LEN
        let _ = write!(name, "{}.{}", self.0, format.extension());
        name
    }
}

impl From<u16> for ClipId {
    fn from(index: u16) -> Self {
        Self(index)
    }
}

// ── RecordSeconds ────────────────────────────────────────────────────────────

/// Recording duration in whole seconds, `1..=MAX_RECORD_SECONDS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct RecordSeconds(u16);

impl RecordSeconds {
    /// Shortest accepted recording.
    pub const MIN: u16 = 1;
    /// Longest accepted recording.
    pub const MAX: u16 = MAX_RECORD_SECONDS;

    /// Create a duration, clamping into `MIN..=MAX`.
    #[must_use]
    pub fn new(seconds: u16) -> Self {
        Self(seconds.clamp(Self::MIN, Self::MAX))
    }

    /// Create a duration, returning an error if it falls outside `MIN..=MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] for `0` or anything above [`MAX_RECORD_SECONDS`].
    pub fn try_new(seconds: u16) -> Result<Self, OutOfRangeError> {
        if (Self::MIN..=Self::MAX).contains(&seconds) {
            Ok(Self(seconds))
        } else {
            Err(OutOfRangeError {
                value: u32::from(seconds),
                min: u32::from(Self::MIN),
                max: u32::from(Self::MAX),
            })
        }
    }

    /// Return the duration in seconds.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}
