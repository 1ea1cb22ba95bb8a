//! Approval countdown of a created order.

use std::time::Duration;

/// Result of advancing a [`Countdown`] by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Time is left; carries the remaining budget.
    Running(Duration),
    /// The budget ran out on this tick.
    Expired,
}

/// Remaining time the payer has to approve an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    budget: Duration,
    remaining: Duration,
    step: Duration,
}

impl Countdown {
    /// A full countdown of `budget`, decremented by `step` per tick.
    pub fn new(budget: Duration, step: Duration) -> Self {
        Self {
            budget,
            remaining: budget,
            step,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Advance by one step.
    ///
    /// Reports [`CountdownTick::Expired`] on every tick once the budget is
    /// exhausted; callers leave the `created` state on the first one.
    pub fn tick(&mut self) -> CountdownTick {
        self.remaining = self.remaining.saturating_sub(self.step);
        if self.remaining.is_zero() {
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }

    /// Share of the budget still left, in `0.0..=1.0` (progress bar).
    pub fn fraction_remaining(&self) -> f64 {
        if self.budget.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f64() / self.budget.as_secs_f64()
    }

    /// Remaining time as `m:ss`.
    pub fn format_remaining(&self) -> String {
        let secs = self.remaining.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}
