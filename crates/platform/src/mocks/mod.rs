//! Mock implementations for testing
//!
//! This module provides a mock sound codec for use in unit and
//! integration tests of the event layers.

use crate::sound::{FlagMode, SoundDevice, SoundStatus};
use crate::sound_types::{ClipId, RecordSeconds};

/// Number of scripted readings each mock flag can hold.
pub const SCRIPT_DEPTH: usize = 32;

/// Number of commands [`MockSound`] remembers.
pub const COMMAND_LOG_DEPTH: usize = 16;

/// Command issued to the mock codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCommand {
    /// `play_mp3`
    PlayMp3(ClipId),
    /// `play_wav`
    PlayWav(ClipId),
    /// `record_wav`
    RecordWav(ClipId, RecordSeconds),
}

/// Mock codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSoundError {
    /// Codec refused the command (see [`MockSound::set_busy`])
    Busy,
}

/// One completion flag: a script of readings, then a latch.
#[derive(Default)]
struct MockFlag {
    script: heapless::Deque<bool, SCRIPT_DEPTH>,
    latched: bool,
    reads: u32,
}

impl MockFlag {
    fn read(&mut self, mode: FlagMode) -> bool {
        self.reads = self.reads.saturating_add(1);
        if let Some(reading) = self.script.pop_front() {
            return reading;
        }
        let value = self.latched;
        if value && mode == FlagMode::ClearOnRead {
            self.latched = false;
        }
        value
    }

    fn script(&mut self, readings: &[bool]) -> Result<(), bool> {
        for &reading in readings {
            self.script.push_back(reading)?;
        }
        Ok(())
    }
}

/// Mock sound codec
///
/// Each completion flag first replays its scripted readings (one per query),
/// then reports its latch. `finish_*` sets the latch; in
/// [`FlagMode::ClearOnRead`] a `true` read clears it, in [`FlagMode::Level`]
/// it stays set until `clear_*`.
pub struct MockSound {
    mode: FlagMode,
    play: MockFlag,
    record: MockFlag,
    commands: heapless::Vec<SoundCommand, COMMAND_LOG_DEPTH>,
    busy: bool,
}

impl MockSound {
    /// Create a clear-on-read mock with both flags down
    pub fn new() -> Self {
        Self::with_mode(FlagMode::ClearOnRead)
    }

    /// Create a mock with the given clearing contract
    pub fn with_mode(mode: FlagMode) -> Self {
        Self {
            mode,
            play: MockFlag::default(),
            record: MockFlag::default(),
            commands: heapless::Vec::new(),
            busy: false,
        }
    }

    /// Queue readings returned by successive `play_completed` calls
    pub fn script_play(&mut self, readings: &[bool]) -> Result<(), bool> {
        self.play.script(readings)
    }

    /// Queue readings returned by successive `record_completed` calls
    pub fn script_record(&mut self, readings: &[bool]) -> Result<(), bool> {
        self.record.script(readings)
    }

    /// Raise the playback completion flag
    pub fn finish_playback(&mut self) {
        self.play.latched = true;
    }

    /// Raise the recording completion flag
    pub fn finish_recording(&mut self) {
        self.record.latched = true;
    }

    /// Lower the playback completion flag
    pub fn clear_play(&mut self) {
        self.play.latched = false;
    }

    /// Lower the recording completion flag
    pub fn clear_record(&mut self) {
        self.record.latched = false;
    }

    /// Make every subsequent command fail with [`MockSoundError::Busy`]
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Number of `play_completed` queries so far
    pub fn play_reads(&self) -> u32 {
        self.play.reads
    }

    /// Number of `record_completed` queries so far
    pub fn record_reads(&self) -> u32 {
        self.record.reads
    }

    /// Commands accepted so far, oldest first
    pub fn commands(&self) -> &[SoundCommand] {
        &self.commands
    }

    fn accept(&mut self, command: SoundCommand) -> Result<(), MockSoundError> {
        if self.busy {
            return Err(MockSoundError::Busy);
        }
        // Log is bounded; later commands are still accepted, just not recorded.
        let _ = self.commands.push(command);
        Ok(())
    }
}

impl Default for MockSound {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundStatus for MockSound {
    fn play_completed(&mut self) -> bool {
        self.play.read(self.mode)
    }

    fn record_completed(&mut self) -> bool {
        self.record.read(self.mode)
    }

    fn flag_mode(&self) -> FlagMode {
        self.mode
    }
}

impl SoundDevice for MockSound {
    type Error = MockSoundError;

    fn play_mp3(&mut self, clip: ClipId) -> Result<(), Self::Error> {
        self.accept(SoundCommand::PlayMp3(clip))
    }

    fn play_wav(&mut self, clip: ClipId) -> Result<(), Self::Error> {
        self.accept(SoundCommand::PlayWav(clip))
    }

    fn record_wav(&mut self, clip: ClipId, duration: RecordSeconds) -> Result<(), Self::Error> {
        self.accept(SoundCommand::RecordWav(clip, duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_low() {
        let mut sound = MockSound::new();
        assert!(!sound.play_completed());
        assert!(!sound.record_completed());
        assert_eq!(sound.play_reads(), 1);
        assert_eq!(sound.record_reads(), 1);
    }

    #[test]
    fn test_script_replays_in_order_then_falls_back_to_latch() {
        let mut sound = MockSound::new();
        sound.script_record(&[true, false, true]).unwrap();

        assert!(sound.record_completed());
        assert!(!sound.record_completed());
        assert!(sound.record_completed());
        assert!(!sound.record_completed());
    }

    #[test]
    fn test_clear_on_read_reports_completion_once() {
        let mut sound = MockSound::new();
        sound.finish_playback();

        assert!(sound.play_completed());
        assert!(!sound.play_completed());
    }

    #[test]
    fn test_level_flag_stays_up_until_cleared() {
        let mut sound = MockSound::with_mode(FlagMode::Level);
        sound.finish_recording();

        assert!(sound.record_completed());
        assert!(sound.record_completed());
        sound.clear_record();
        assert!(!sound.record_completed());
        assert_eq!(sound.flag_mode(), FlagMode::Level);
    }

    #[test]
    fn test_script_overflow_returns_rejected_reading() {
        let mut sound = MockSound::new();
        let full = [true; SCRIPT_DEPTH];
        sound.script_play(&full).unwrap();
        assert_eq!(sound.script_play(&[false]), Err(false));
    }

    #[test]
    fn test_commands_are_logged() {
        let mut sound = MockSound::new();
        sound.play_mp3(ClipId::new(1)).unwrap();
        sound.play_wav(ClipId::new(2)).unwrap();
        sound.record_wav(ClipId::new(3), RecordSeconds::new(5)).unwrap();

        assert_eq!(
            sound.commands(),
            &[
                SoundCommand::PlayMp3(ClipId::new(1)),
                SoundCommand::PlayWav(ClipId::new(2)),
                SoundCommand::RecordWav(ClipId::new(3), RecordSeconds::new(5)),
            ]
        );
    }

    #[test]
    fn test_busy_codec_rejects_commands() {
        let mut sound = MockSound::new();
        sound.set_busy(true);
        assert_eq!(sound.play_wav(ClipId::new(0)), Err(MockSoundError::Busy));
        assert!(sound.commands().is_empty());
    }
}
