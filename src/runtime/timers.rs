use std::collections::BTreeMap;

use crate::script::Value;

/// Upper bound on timer firings delivered by a single `tick`.
pub(crate) const MAX_FIRINGS_PER_TICK: usize = 4096;

/// A pending timer registered by app logic.
#[derive(Clone, Debug, PartialEq)]
pub struct Timer {
    pub id: u64,
    /// Simulated time the timer is due at.
    pub due_ms: u64,
    /// Reschedule period for interval timers.
    pub period_ms: Option<u64>,
    pub handler: String,
    /// Extra argument passed to the handler.
    pub arg: Option<Value>,
    seq: u64,
}

/// Timers ordered by `(due, registration order)`.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    pending: BTreeMap<(u64, u64), Timer>,
    next_id: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub(crate) fn schedule(
        &mut self,
        now_ms: u64,
        delay_ms: u64,
        period_ms: Option<u64>,
        handler: String,
        arg: Option<Value>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let seq = self.next_seq;
        self.next_seq += 1;
        let due_ms = now_ms.saturating_add(delay_ms);
        self.pending.insert(
            (due_ms, seq),
            Timer {
                id,
                due_ms,
                period_ms: period_ms.map(|p| p.max(1)),
                handler,
                arg,
                seq,
            },
        );
        id
    }

    pub(crate) fn cancel(&mut self, id: u64) -> bool {
        let key = self
            .pending
            .iter()
            .find_map(|(k, t)| (t.id == id).then_some(*k));
        key.and_then(|k| self.pending.remove(&k)).is_some()
    }

    /// Remove the earliest timer due at or before `now_ms`.
    ///
    /// Interval timers are re-queued one period later, keeping their registration order, before
    /// being returned, so a handler may cancel its own interval.
    pub(crate) fn pop_due(&mut self, now_ms: u64) -> Option<Timer> {
        let (&key, _) = self.pending.first_key_value()?;
        if key.0 > now_ms {
            return None;
        }
        let timer = self.pending.remove(&key)?;
        if let Some(period) = timer.period_ms {
            let mut next = timer.clone();
            next.due_ms = timer.due_ms.saturating_add(period);
            self.pending.insert((next.due_ms, next.seq), next);
        }
        Some(timer)
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn next_due(&self) -> Option<u64> {
        self.pending.first_key_value().map(|(k, _)| k.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/timers.rs"]
mod tests;
