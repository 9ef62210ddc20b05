// One-shot timers for the cooperative event loop
//
// The host loop asks `next_due()` how long it may sleep, then drains due
// timers with `pop_due()`. Cancelled timers are removed, never just flagged.

/// Handle of a scheduled wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    id: TimerId,
    due_ms: f64,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    pending: Vec<PendingTimer<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `payload` to become due `delay_ms` after `now_ms`
    /// Negative or NaN delays are treated as zero
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, payload: T) -> TimerId {
        let delay_ms = if delay_ms > 0.0 { delay_ms } else { 0.0 };
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.pending.push(PendingTimer {
            id,
            due_ms: now_ms + delay_ms,
            payload,
        });
        id
    }

    /// Remove a pending timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() < before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    /// Earliest due time, if any timer is pending
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|timer| timer.due_ms)
            .min_by(f64::total_cmp)
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    /// Ties fire in scheduling order
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerId, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(index, _)| index)?;

        let timer = self.pending.remove(index);
        Some((timer.id, timer.payload))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
