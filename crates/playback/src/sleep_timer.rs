//! Sleep timer
//!
//! [`SleepTimer`] is the countdown state machine. It is only ever driven by
//! the core's owner thread, so ticks and cancels never interleave; every
//! start or cancel bumps a generation number and a tick scheduled for an
//! older generation is reported as [`TickOutcome::Stale`].
//!
//! [`SleepCountdown`] is the readable side shared with handles: atomic
//! snapshots of the remaining time and a stream of remaining milliseconds.

use crate::observer::{Publisher, Subscription};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepTimerState {
    #[default]
    Inactive,
    Active { remaining_ms: u64 },
}

impl SleepTimerState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn remaining_ms(self) -> u64 {
        match self {
            Self::Active { remaining_ms } => remaining_ms,
            Self::Inactive => 0,
        }
    }
}

/// Result of [`SleepTimer::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Started { remaining_ms: u64, generation: u64 },
    Cancelled,
}

/// Result of [`SleepTimer::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a timer that was cancelled or already fired
    Stale,
    Running { remaining_ms: u64 },
    /// Countdown reached zero; the timer is inactive again
    Fired,
}

#[derive(Debug, Default)]
pub struct SleepTimer {
    state: SleepTimerState,
    generation: u64,
}

impl SleepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SleepTimerState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts the countdown from `duration`, or cancels a running one
    pub fn toggle(&mut self, duration: Duration) -> Toggle {
        if self.state.is_active() {
            self.cancel();
            Toggle::Cancelled
        } else {
            let generation = self.start(duration);
            Toggle::Started {
                remaining_ms: self.state.remaining_ms(),
                generation,
            }
        }
    }

    /// Starts (or restarts) the countdown and returns its generation
    pub fn start(&mut self, duration: Duration) -> u64 {
        self.generation += 1;
        self.state = SleepTimerState::Active {
            remaining_ms: duration_ms(duration),
        };
        self.generation
    }

    /// Cancels the countdown without firing; returns whether it was running
    pub fn cancel(&mut self) -> bool {
        let was_active = self.state.is_active();
        self.generation += 1;
        self.state = SleepTimerState::Inactive;
        was_active
    }

    pub fn tick(&mut self, generation: u64, interval: Duration) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }

        let SleepTimerState::Active { remaining_ms } = self.state else {
            return TickOutcome::Stale;
        };

        let remaining_ms = remaining_ms.saturating_sub(duration_ms(interval));
        if remaining_ms == 0 {
            self.generation += 1;
            self.state = SleepTimerState::Inactive;
            TickOutcome::Fired
        } else {
            self.state = SleepTimerState::Active { remaining_ms };
            TickOutcome::Running { remaining_ms }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Snapshot and change stream of the sleep timer's remaining time
pub struct SleepCountdown {
    active: AtomicBool,
    remaining_ms: AtomicU64,
    publisher: Publisher<u64>,
}

impl SleepCountdown {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            remaining_ms: AtomicU64::new(0),
            publisher: Publisher::new(),
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Streams remaining milliseconds; `0` means the timer went inactive
    pub fn subscribe(&self) -> Subscription<u64> {
        self.publisher.subscribe()
    }

    pub fn publish(&self, state: SleepTimerState) {
        let remaining_ms = state.remaining_ms();
        self.remaining_ms.store(remaining_ms, Ordering::Release);
        self.active.store(state.is_active(), Ordering::Release);
        self.publisher.publish(&remaining_ms);
    }
}

impl Default for SleepCountdown {
    fn default() -> Self {
        Self::new()
    }
}
