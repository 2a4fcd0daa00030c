//! Notifiable codec conditions

/// Completion conditions the poller can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// A playback finished
    PlayCompleted,
    /// A recording finished
    RecordCompleted,
}

impl EventKind {
    /// Every kind, in the order one poll iteration checks them.
    pub const ALL: [EventKind; 2] = [EventKind::PlayCompleted, EventKind::RecordCompleted];

    /// Short name for log output.
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::PlayCompleted => "play-completed",
            EventKind::RecordCompleted => "record-completed",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
