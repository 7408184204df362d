//! Per-player time budget.
//!
//! The clock never ticks on its own: the caller reports how long each move
//! took and later asks whether a side has run out. Expiry is only acted on
//! when the caller flags a timeout on the session.

use std::time::Duration;

use crate::engine::types::Color;

/// Remaining time for both sides plus a per-move increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    remaining: [Duration; 2],
    increment: Duration,
}

impl Clock {
    /// Both sides start with `initial`; `increment` is added after each
    /// move that finishes with time left.
    pub fn new(initial: Duration, increment: Duration) -> Self {
        Clock {
            remaining: [initial; 2],
            increment,
        }
    }

    /// Charge `elapsed` to `color` and add the increment if time remains.
    ///
    /// Remaining time saturates at zero.
    pub fn on_move_committed(&mut self, color: Color, elapsed: Duration) {
        let left = self.remaining[color.index()].saturating_sub(elapsed);
        self.remaining[color.index()] = if left.is_zero() {
            left
        } else {
            left + self.increment
        };
    }

    pub fn is_expired(&self, color: Color) -> bool {
        self.remaining[color.index()].is_zero()
    }

    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[color.index()]
    }

    pub fn increment(&self) -> Duration {
        self.increment
    }
}
