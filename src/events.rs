/// Notifications the core hands to the presentation layer.
///
/// `Fire` comes from the scheduler's background worker through a queue; the
/// countdown variants are produced on the UI thread by the countdown
/// controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderEvent {
    /// A full interval elapsed.
    Fire { message: String },
    /// One second of the hold period passed. `progress` is `remaining / total`.
    Tick { remaining: u32, progress: f32 },
    /// The hold period reached zero; the done button is now enabled.
    Complete,
    /// The countdown session ended and its resources were released.
    Closed,
}
