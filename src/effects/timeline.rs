//! Timeline of registered animations

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::animation::{Animation, Step};
use super::target::{AnimationTarget, TargetRef};

/// Handle returned by [`Timeline::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(u64);

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Targets written during one tick
pub type ChangeSet = BTreeSet<TargetRef>;

/// Active animations, advanced in registration order.
///
/// When two animations write the same target in one tick the later
/// registration wins.
#[derive(Debug, Default)]
pub struct Timeline {
    animations: BTreeMap<AnimationId, Animation>,
    next_id: u64,
    clock: Duration,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animation; it starts on the next tick
    pub fn register(&mut self, animation: Animation) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        trace!(%id, target = %animation.target(), "animation registered");
        self.animations.insert(id, animation);
        id
    }

    /// Remove an animation without writing its end value.
    /// Returns false for unknown or already finished ids.
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        let removed = self.animations.remove(&id).is_some();
        if removed {
            trace!(%id, "animation cancelled");
        }
        removed
    }

    /// Advance every animation by `elapsed` and write the new values.
    ///
    /// Finished animations write their exact end value and are removed.
    /// Writes the target rejects are reported once per animation and
    /// otherwise ignored.
    pub fn tick(&mut self, elapsed: Duration, target: &mut dyn AnimationTarget) -> ChangeSet {
        self.clock += elapsed;
        let mut changed = ChangeSet::new();
        let mut finished = Vec::new();

        for (id, animation) in self.animations.iter_mut() {
            let (value, done) = match animation.advance(elapsed) {
                Step::Waiting => continue,
                Step::Write { value, finished } => (value, finished),
            };

            match target.apply(animation.target(), value) {
                Ok(()) => {
                    changed.insert(animation.target().clone());
                },
                Err(e) => {
                    if !animation.target_failed {
                        warn!(%id, "animation write failed: {}", e);
                        animation.target_failed = true;
                    }
                },
            }

            if done {
                finished.push(*id);
            }
        }

        for id in &finished {
            self.animations.remove(id);
        }

        trace!(
            elapsed_us = elapsed.as_micros() as u64,
            changed = changed.len(),
            finished = finished.len(),
            active = self.animations.len(),
            "timeline tick"
        );
        changed
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.animations.contains_key(&id)
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(&id)
    }

    /// Progress of an active animation
    pub fn progress(&self, id: AnimationId) -> Option<f32> {
        self.get(id).map(Animation::progress)
    }

    /// Total time ticked so far
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Drop every animation without writing
    pub fn clear(&mut self) {
        self.animations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{AnimValue, Easing, PropertyStore, Repeat};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn store_with(name: &'static str, value: f32) -> PropertyStore {
        let mut store = PropertyStore::new();
        store.declare(name, AnimValue::Scalar(value));
        store
    }

    #[test]
    fn test_overshoot_lands_on_end_value() {
        let mut store = store_with("opacity", 0.0);
        let mut timeline = Timeline::new();
        let id = timeline.register(Animation::scalar("opacity", 0.0, 1.0, ms(1000)));

        let changed = timeline.tick(ms(1500), &mut store);

        assert!(changed.contains(&TargetRef::new("opacity")));
        assert_eq!(store.scalar(&TargetRef::new("opacity")), Some(1.0));
        assert!(!timeline.contains(id));
        assert_eq!(timeline.progress(id), None);
    }

    #[test]
    fn test_progress_mid_flight() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        let id = timeline.register(Animation::scalar("x", 0.0, 4.0, ms(400)));

        timeline.tick(ms(100), &mut store);
        assert_eq!(timeline.progress(id), Some(0.25));
        assert_eq!(store.scalar(&TargetRef::new("x")), Some(1.0));
    }

    #[test]
    fn test_many_small_ticks_reach_end() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        timeline.register(Animation::scalar("x", 0.3, 0.7, ms(100)).easing(Easing::CubicInOut));

        for _ in 0..7 {
            timeline.tick(Duration::from_micros(16_667), &mut store);
        }
        assert!(timeline.is_empty());
        assert_eq!(store.scalar(&TargetRef::new("x")), Some(0.7));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        timeline.register(Animation::scalar("x", 0.0, 10.0, ms(100)));
        timeline.register(Animation::scalar("x", 0.0, 20.0, ms(100)));

        let changed = timeline.tick(ms(50), &mut store);
        assert_eq!(changed.len(), 1);
        assert_eq!(store.scalar(&TargetRef::new("x")), Some(10.0));
    }

    #[test]
    fn test_cancel_does_not_write() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        let id = timeline.register(Animation::scalar("x", 0.0, 1.0, ms(100)));
        timeline.tick(ms(50), &mut store);

        assert!(timeline.cancel(id));
        assert!(!timeline.cancel(id));
        let changed = timeline.tick(ms(100), &mut store);
        assert!(changed.is_empty());
        assert_eq!(store.scalar(&TargetRef::new("x")), Some(0.5));
    }

    #[test]
    fn test_unknown_target_is_skipped() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        timeline.register(Animation::scalar("missing", 0.0, 1.0, ms(100)));
        timeline.register(Animation::scalar("x", 0.0, 1.0, ms(100)));

        let changed = timeline.tick(ms(100), &mut store);
        assert_eq!(changed.len(), 1);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_delayed_animation_writes_nothing_while_waiting() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        let id = timeline.register(Animation::scalar("x", 5.0, 1.0, ms(100)).delay(ms(200)));

        assert!(timeline.tick(ms(100), &mut store).is_empty());
        assert_eq!(store.scalar(&TargetRef::new("x")), Some(0.0));
        assert!(timeline.contains(id));
    }

    #[test]
    fn test_repeating_animation_stays() {
        let mut store = store_with("x", 0.0);
        let mut timeline = Timeline::new();
        let id = timeline.register(Animation::scalar("x", 0.0, 1.0, ms(100)).repeat(Repeat::Forever));

        timeline.tick(ms(250), &mut store);
        assert!(timeline.contains(id));
        assert_eq!(timeline.clock(), ms(250));
        timeline.clear();
        assert!(timeline.is_empty());
    }
}
