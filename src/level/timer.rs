//! Owned timer registry
//!
//! Countdown steps, hazard spawn loops and strike telegraphs all run off
//! one inspectable queue advanced by the level tick. Entries are removed
//! explicitly at teardown, so a torn-down level can never receive a late
//! callback.

/// Opaque handle to a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u32);

#[derive(Debug)]
struct TimerEntry {
    handle: TimerHandle,
    tag: u32,
    fire_at_ms: u64,
    interval_ms: Option<u64>,
}

/// Timer queue driven by the attempt clock.
///
/// Time never advances while the level is paused, so every entry freezes
/// with it.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
    now_ms: u64,
    next_handle: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current queue clock in ms
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule a one-shot timer `delay_ms` from now.
    pub fn schedule(&mut self, tag: u32, delay_ms: u64) -> TimerHandle {
        self.push(tag, delay_ms, None)
    }

    /// Schedule a repeating timer firing every `interval_ms` from now.
    /// Zero intervals are bumped to 1 ms.
    pub fn schedule_repeating(&mut self, tag: u32, interval_ms: u64) -> TimerHandle {
        let interval = interval_ms.max(1);
        self.push(tag, interval, Some(interval))
    }

    fn push(&mut self, tag: u32, delay_ms: u64, interval_ms: Option<u64>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(TimerEntry {
            handle,
            tag,
            fire_at_ms: self.now_ms + delay_ms,
            interval_ms,
        });
        handle
    }

    /// Cancel a single timer. Unknown handles are ignored.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|entry| entry.handle != handle);
    }

    /// Drop every pending timer. Called at level teardown.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Advance the clock and append the tag of every timer that fired, in
    /// firing order. Repeating timers that fall multiple intervals behind
    /// fire once per missed interval.
    pub fn advance(&mut self, delta_ms: u64, fired: &mut Vec<u32>) {
        self.now_ms += delta_ms;

        loop {
            let due = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.fire_at_ms <= self.now_ms)
                .min_by_key(|(_, entry)| entry.fire_at_ms)
                .map(|(index, _)| index);

            let Some(index) = due else {
                break;
            };

            fired.push(self.entries[index].tag);
            match self.entries[index].interval_ms {
                Some(interval) => self.entries[index].fire_at_ms += interval,
                None => {
                    let _ = self.entries.swap_remove(index);
                }
            }
        }
    }
}
