//! Cooperative timer table.
//!
//! The whole subsystem is single-threaded: handlers and timer callbacks run
//! to completion without preemption, and the only suspension points are the
//! registered timers. Registrations are tagged records `{id, interval,
//! enabled, closure}`; they are matched and canceled by id. Time is advanced
//! explicitly by the embedder (or a test), which keeps every transition
//! deterministic.

/// Opaque handle for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a callback wants to happen to its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFate {
    /// Keep firing every interval.
    Continue,
    /// Cancel the registration; a one-shot returns this on its first firing.
    Stop,
}

type TimerCallback<Ctx> = Box<dyn FnMut(&mut Ctx) -> TimerFate>;

struct TimerEntry<Ctx> {
    id: TimerId,
    interval_ms: u64,
    enabled: bool,
    remaining_ms: u64,
    callback: TimerCallback<Ctx>,
}

/// Table of timer registrations, fired in registration order.
pub struct Scheduler<Ctx> {
    next_id: u64,
    entries: Vec<TimerEntry<Ctx>>,
}

impl<Ctx> Default for Scheduler<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> Scheduler<Ctx> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a callback to fire every `interval_ms`. The registration
    /// starts enabled; a zero interval is clamped to one millisecond.
    pub fn schedule<F>(&mut self, interval_ms: u64, callback: F) -> TimerId
    where
        F: FnMut(&mut Ctx) -> TimerFate + 'static,
    {
        let interval_ms = interval_ms.max(1);
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            interval_ms,
            enabled: true,
            remaining_ms: interval_ms,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a registration. Returns false if the id is unknown.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Enable or disable a registration without removing it. Enabling
    /// re-arms the full interval. Returns false if the id is unknown.
    pub fn set_enabled(&mut self, id: TimerId, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                if enabled && !entry.enabled {
                    entry.remaining_ms = entry.interval_ms;
                }
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether a registration exists and is enabled.
    pub fn is_enabled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.enabled)
    }

    /// Advance time by `elapsed_ms`, firing every due callback. A callback
    /// fires once per elapsed interval; returning [`TimerFate::Stop`] cancels
    /// its registration immediately.
    pub fn advance(&mut self, ctx: &mut Ctx, elapsed_ms: u64) {
        let mut index = 0;
        while index < self.entries.len() {
            let entry = &mut self.entries[index];
            if !entry.enabled {
                index += 1;
                continue;
            }

            let mut budget = elapsed_ms;
            let mut stopped = false;
            while budget >= entry.remaining_ms {
                budget -= entry.remaining_ms;
                entry.remaining_ms = entry.interval_ms;
                if (entry.callback)(ctx) == TimerFate::Stop {
                    stopped = true;
                    break;
                }
            }

            if stopped {
                self.entries.remove(index);
            } else {
                self.entries[index].remaining_ms -= budget;
                index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurring_timer_fires_every_interval() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.schedule(100, |count| {
            *count += 1;
            TimerFate::Continue
        });

        let mut fired = 0;
        scheduler.advance(&mut fired, 99);
        assert_eq!(fired, 0);
        scheduler.advance(&mut fired, 1);
        assert_eq!(fired, 1);
        scheduler.advance(&mut fired, 250);
        assert_eq!(fired, 3);
    }

    #[test]
    fn one_shot_is_removed_after_first_firing() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let id = scheduler.schedule(50, |count| {
            *count += 1;
            TimerFate::Stop
        });

        let mut fired = 0;
        scheduler.advance(&mut fired, 500);
        assert_eq!(fired, 1);
        assert!(!scheduler.cancel(id));
    }

    #[test]
    fn cancel_by_id() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let id = scheduler.schedule(10, |count| {
            *count += 1;
            TimerFate::Continue
        });
        assert!(scheduler.cancel(id));

        let mut fired = 0;
        scheduler.advance(&mut fired, 100);
        assert_eq!(fired, 0);
    }

    #[test]
    fn disabled_timer_does_not_fire_and_rearms_on_enable() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let id = scheduler.schedule(100, |count| {
            *count += 1;
            TimerFate::Continue
        });

        let mut fired = 0;
        scheduler.advance(&mut fired, 90);
        scheduler.set_enabled(id, false);
        scheduler.advance(&mut fired, 1000);
        assert_eq!(fired, 0);

        // Re-enabling starts a fresh interval, not the 10ms remainder.
        scheduler.set_enabled(id, true);
        scheduler.advance(&mut fired, 50);
        assert_eq!(fired, 0);
        scheduler.advance(&mut fired, 50);
        assert_eq!(fired, 1);
    }

    #[test]
    fn timers_fire_in_registration_order() {
        let mut scheduler: Scheduler<Vec<&'static str>> = Scheduler::new();
        scheduler.schedule(10, |order| {
            order.push("first");
            TimerFate::Continue
        });
        scheduler.schedule(10, |order| {
            order.push("second");
            TimerFate::Continue
        });

        let mut order = Vec::new();
        scheduler.advance(&mut order, 10);
        assert_eq!(order, vec!["first", "second"]);
    }
}
