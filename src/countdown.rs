use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::DEFAULT_COUNTDOWN_SECONDS;
use crate::events::ReminderEvent;

/// Seconds a completed countdown stays on screen before closing itself.
pub const COMPLETION_GRACE_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Counting,
    Complete,
    Closed,
}

/// One hold period, advanced by one-second ticks.
#[derive(Debug, Clone)]
pub struct CountdownSession {
    id: Uuid,
    total: u32,
    remaining: u32,
    phase: CountdownPhase,
    grace_remaining: u32,
}

impl CountdownSession {
    fn new(total: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            total,
            remaining: total,
            phase: CountdownPhase::Counting,
            grace_remaining: COMPLETION_GRACE_SECS,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    /// `remaining / total`, within `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.remaining as f32 / self.total as f32
    }

    pub fn display_text(&self) -> String {
        match self.phase {
            CountdownPhase::Counting => format!("Hold: {} s", self.remaining),
            CountdownPhase::Complete | CountdownPhase::Closed => {
                "Done! Back to work".to_string()
            }
        }
    }

    pub fn done_enabled(&self) -> bool {
        self.phase == CountdownPhase::Complete
    }

    fn snapshot(&self) -> ReminderEvent {
        ReminderEvent::Tick {
            remaining: self.remaining,
            progress: self.progress(),
        }
    }

    fn tick(&mut self) -> Vec<ReminderEvent> {
        match self.phase {
            CountdownPhase::Counting => {
                self.remaining = self.remaining.saturating_sub(1);
                let mut events = vec![self.snapshot()];
                if self.remaining == 0 {
                    self.phase = CountdownPhase::Complete;
                    events.push(ReminderEvent::Complete);
                }
                events
            }
            CountdownPhase::Complete => {
                self.grace_remaining = self.grace_remaining.saturating_sub(1);
                if self.grace_remaining == 0 {
                    self.phase = CountdownPhase::Closed;
                    vec![ReminderEvent::Closed]
                } else {
                    Vec::new()
                }
            }
            CountdownPhase::Closed => Vec::new(),
        }
    }

    fn close(&mut self) -> Option<ReminderEvent> {
        match self.phase {
            CountdownPhase::Counting | CountdownPhase::Complete => {
                self.phase = CountdownPhase::Closed;
                Some(ReminderEvent::Closed)
            }
            CountdownPhase::Closed => None,
        }
    }
}

/// Holds the single active countdown. Beginning a new one closes the old.
#[derive(Debug, Default)]
pub struct CountdownController {
    current: Option<CountdownSession>,
}

impl CountdownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CountdownSession> {
        self.current.as_ref()
    }

    pub fn is_current(&self, id: Uuid) -> bool {
        self.current.as_ref().is_some_and(|s| s.id == id)
    }

    /// Starts a fresh session. A zero length becomes the default.
    ///
    /// Returned events are in order: `Closed` for a replaced session (if one
    /// was still open), then the new session's initial `Tick`.
    pub fn begin(&mut self, total_seconds: u32) -> (Uuid, Vec<ReminderEvent>) {
        let total = if total_seconds == 0 {
            warn!(
                "hold duration must be positive, using {} seconds",
                DEFAULT_COUNTDOWN_SECONDS
            );
            DEFAULT_COUNTDOWN_SECONDS
        } else {
            total_seconds
        };

        let mut events = Vec::new();
        if let Some(closed) = self.dismiss() {
            debug!("replacing active countdown");
            events.push(closed);
        }

        let session = CountdownSession::new(total);
        let id = session.id;
        events.push(session.snapshot());
        debug!(%id, total, "countdown started");
        self.current = Some(session);
        (id, events)
    }

    /// Advances session `id` by one second. Ticks for a replaced or finished
    /// session produce nothing.
    pub fn tick(&mut self, id: Uuid) -> Vec<ReminderEvent> {
        let Some(session) = self.current.as_mut().filter(|s| s.id == id) else {
            return Vec::new();
        };
        let events = session.tick();
        if session.phase == CountdownPhase::Closed {
            debug!(%id, "countdown closed after grace period");
            self.current = None;
        }
        events
    }

    pub fn dismiss(&mut self) -> Option<ReminderEvent> {
        let mut session = self.current.take()?;
        session.close()
    }
}
