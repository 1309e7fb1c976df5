//! Timed rule mutations
//!
//! A fixed catalog of gameplay overrides rotates round-robin on a timer:
//! every `interval_ms` one mutation activates for `duration_ms`, then the
//! field returns to neutral. Scheduling accumulates from level start, so
//! trigger points never drift with tick jitter.

use super::state::MutationEffects;

/// Default trigger cadence
pub const MUTATION_INTERVAL_MS: u64 = 10_000;

/// Default active window per mutation
pub const MUTATION_WINDOW_MS: u64 = 6_000;

/// One named rule override with idempotent enter/exit actions.
#[derive(Debug, Clone, Copy)]
pub struct RuleMutation {
    pub id: &'static str,
    pub label: &'static str,
    pub duration_ms: u64,
    pub apply: fn(&mut MutationEffects),
    pub clear: fn(&mut MutationEffects),
}

/// Round-robin mutation scheduler driven by attempt-relative time.
#[derive(Debug)]
pub struct MutationScheduler {
    catalog: Vec<RuleMutation>,
    interval_ms: u64,
    duration_ms: u64,
    next_trigger_ms: u64,
    cursor: usize,
    active: Option<usize>,
    active_until_ms: u64,
}

impl MutationScheduler {
    pub fn new(catalog: Vec<RuleMutation>, interval_ms: u64, duration_ms: u64) -> Self {
        Self {
            catalog,
            interval_ms,
            duration_ms,
            next_trigger_ms: interval_ms,
            cursor: 0,
            active: None,
            active_until_ms: 0,
        }
    }

    /// Advance to `elapsed_ms` (attempt-relative, excludes pause) and apply
    /// or clear mutations as their windows open and close. Returns the
    /// mutation active after this step.
    pub fn update(
        &mut self,
        elapsed_ms: u64,
        effects: &mut MutationEffects,
    ) -> Option<&RuleMutation> {
        if let Some(index) = self.active
            && elapsed_ms >= self.active_until_ms
        {
            (self.catalog[index].clear)(effects);
            self.active = None;
        }

        if elapsed_ms >= self.next_trigger_ms && !self.catalog.is_empty() {
            // Coarse clocks can reach the next trigger before the previous
            // window was observed as expired. Close it first.
            if let Some(index) = self.active {
                (self.catalog[index].clear)(effects);
            }

            let index = self.cursor % self.catalog.len();
            self.cursor += 1;
            (self.catalog[index].apply)(effects);
            self.active = Some(index);
            self.active_until_ms = elapsed_ms + self.duration_ms;
            self.next_trigger_ms += self.interval_ms;
        }

        self.active.map(|index| &self.catalog[index])
    }

    pub fn active(&self) -> Option<&RuleMutation> {
        self.active.map(|index| &self.catalog[index])
    }

    /// Force-clear whatever is active. Called at level end so no effect
    /// leaks into the next scene.
    pub fn clear_all(&mut self, effects: &mut MutationEffects) {
        if let Some(index) = self.active.take() {
            (self.catalog[index].clear)(effects);
        }
    }
}

/// One planned mutation window in a timeline preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationWindow {
    pub mutation_id: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Enumerate every trigger up to `total_duration_ms`. A window still open
/// when the run ends is truncated, not dropped.
pub fn build_mutation_timeline(
    mutation_ids: &[&str],
    total_duration_ms: u64,
    interval_ms: u64,
    duration_ms: u64,
) -> Vec<MutationWindow> {
    if mutation_ids.is_empty() || total_duration_ms == 0 || interval_ms == 0 {
        return Vec::new();
    }

    let mut timeline = Vec::new();
    let mut cursor = 0usize;
    let mut start = interval_ms;
    while start <= total_duration_ms {
        let id = mutation_ids[cursor % mutation_ids.len()];
        cursor += 1;
        timeline.push(MutationWindow {
            mutation_id: id.to_owned(),
            start_ms: start,
            end_ms: total_duration_ms.min(start + duration_ms),
        });
        start += interval_ms;
    }
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle_mutation(id: &'static str, label: &'static str) -> RuleMutation {
        // Reuses the darkness flag as a visible marker and the label as the
        // identity check.
        RuleMutation {
            id,
            label,
            duration_ms: 6_000,
            apply: |effects| {
                effects.darkness_mask = true;
            },
            clear: |effects| {
                effects.darkness_mask = false;
                effects.active_label = "None";
            },
        }
    }

    fn catalog_ab() -> Vec<RuleMutation> {
        let mut a = toggle_mutation("a", "A");
        a.apply = |effects| {
            effects.darkness_mask = true;
            effects.active_label = "A";
        };
        let mut b = toggle_mutation("b", "B");
        b.apply = |effects| {
            effects.darkness_mask = true;
            effects.active_label = "B";
        };
        vec![a, b]
    }

    #[test]
    fn rotates_through_catalog_on_schedule() {
        let mut scheduler = MutationScheduler::new(catalog_ab(), 10_000, 6_000);
        let mut effects = MutationEffects::default();

        assert!(scheduler.update(9_999, &mut effects).is_none());
        assert!(!effects.darkness_mask);

        let active = scheduler.update(10_000, &mut effects).unwrap();
        assert_eq!(active.id, "a");
        assert_eq!(effects.active_label, "A");

        assert!(scheduler.update(16_001, &mut effects).is_none());
        assert!(!effects.darkness_mask);
        assert_eq!(effects.active_label, "None");

        let active = scheduler.update(20_000, &mut effects).unwrap();
        assert_eq!(active.id, "b");
        assert_eq!(effects.active_label, "B");
    }

    #[test]
    fn trigger_during_open_window_closes_it_first() {
        // Window longer than the interval: the second trigger lands while
        // the first window is still open.
        let mut scheduler = MutationScheduler::new(catalog_ab(), 10_000, 12_000);
        let mut effects = MutationEffects::default();

        assert_eq!(scheduler.update(10_000, &mut effects).unwrap().id, "a");
        let active = scheduler.update(20_000, &mut effects).unwrap();
        assert_eq!(active.id, "b");
        assert_eq!(effects.active_label, "B");
    }

    #[test]
    fn clear_all_drops_the_active_window() {
        let mut scheduler = MutationScheduler::new(catalog_ab(), 10_000, 6_000);
        let mut effects = MutationEffects::default();

        let _ = scheduler.update(10_000, &mut effects);
        scheduler.clear_all(&mut effects);
        assert!(scheduler.active().is_none());
        assert!(!effects.darkness_mask);

        // Idempotent on repeat.
        scheduler.clear_all(&mut effects);
        assert!(scheduler.active().is_none());
    }

    #[test]
    fn empty_catalog_never_activates() {
        let mut scheduler = MutationScheduler::new(Vec::new(), 10_000, 6_000);
        let mut effects = MutationEffects::default();
        assert!(scheduler.update(100_000, &mut effects).is_none());
        assert_eq!(effects, MutationEffects::default());
    }

    #[test]
    fn timeline_truncates_the_trailing_window() {
        let timeline = build_mutation_timeline(&["a", "b"], 25_000, 10_000, 6_000);
        assert_eq!(
            timeline,
            vec![
                MutationWindow {
                    mutation_id: "a".into(),
                    start_ms: 10_000,
                    end_ms: 16_000,
                },
                MutationWindow {
                    mutation_id: "b".into(),
                    start_ms: 20_000,
                    end_ms: 25_000,
                },
            ]
        );
    }

    #[test]
    fn timeline_wraps_the_rotation() {
        let timeline = build_mutation_timeline(
            &["gravity_flip", "reverse_controls", "darkness_mask", "speed_shift"],
            30_000,
            10_000,
            6_000,
        );

        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[2].mutation_id, "darkness_mask");
        assert_eq!(timeline[2].start_ms, 30_000);
        assert_eq!(timeline[2].end_ms, 30_000);
    }

    #[test]
    fn timeline_is_empty_without_ids_or_time() {
        assert!(build_mutation_timeline(&[], 30_000, 10_000, 6_000).is_empty());
        assert!(build_mutation_timeline(&["a"], 0, 10_000, 6_000).is_empty());
    }
}
