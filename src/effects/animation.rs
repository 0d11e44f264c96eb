//! A single timed interpolation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::easing::Easing;
use super::target::TargetRef;
use super::value::AnimValue;
use crate::core::Color;

/// How many times an animation plays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repeat {
    /// Play once, then remove
    #[default]
    Never,
    /// Play this many cycles in total, then remove
    Times(u32),
    /// Restart forever until cancelled
    Forever,
}

/// Result of advancing an animation by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Step {
    /// Still inside the start delay; nothing to write
    Waiting,
    /// Write `value` to the target; `finished` animations are removed after
    /// the write
    Write { value: AnimValue, finished: bool },
}

/// Interpolates a target property from a start to an end value
#[derive(Debug, Clone)]
pub struct Animation {
    target: TargetRef,
    from: AnimValue,
    to: AnimValue,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    repeat: Repeat,
    /// Delay consumed so far
    waited: Duration,
    /// Time into the current cycle
    elapsed: Duration,
    /// Completed cycles
    cycles: u32,
    progress: f32,
    /// A failed write has already been reported
    pub(crate) target_failed: bool,
}

impl Animation {
    fn new(target: TargetRef, from: AnimValue, to: AnimValue, duration: Duration) -> Self {
        Self {
            target,
            from,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::default(),
            repeat: Repeat::default(),
            waited: Duration::ZERO,
            elapsed: Duration::ZERO,
            cycles: 0,
            progress: 0.0,
            target_failed: false,
        }
    }

    /// Animate a number
    pub fn scalar(target: impl Into<TargetRef>, from: f32, to: f32, duration: Duration) -> Self {
        Self::new(
            target.into(),
            AnimValue::Scalar(from),
            AnimValue::Scalar(to),
            duration,
        )
    }

    /// Animate a color
    pub fn color(target: impl Into<TargetRef>, from: Color, to: Color, duration: Duration) -> Self {
        Self::new(
            target.into(),
            AnimValue::Color(from),
            AnimValue::Color(to),
            duration,
        )
    }

    /// Animate a cell position
    pub fn position(
        target: impl Into<TargetRef>,
        from: (i32, i32),
        to: (i32, i32),
        duration: Duration,
    ) -> Self {
        Self::new(
            target.into(),
            AnimValue::Position {
                x: from.0,
                y: from.1,
            },
            AnimValue::Position { x: to.0, y: to.1 },
            duration,
        )
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Wait this long after registration before starting
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    pub fn start_value(&self) -> AnimValue {
        self.from
    }

    pub fn end_value(&self) -> AnimValue {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress of the current cycle, in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles
    }

    /// Whether the start delay has passed
    pub fn is_started(&self) -> bool {
        self.waited >= self.delay
    }

    /// Eased value at the current progress
    pub fn value(&self) -> AnimValue {
        self.from.lerp(&self.to, self.easing.apply(self.progress))
    }

    /// Advance by `dt`. Pure: depends only on `dt` and the current state.
    pub(crate) fn advance(&mut self, dt: Duration) -> Step {
        let mut dt = dt;
        if self.waited < self.delay {
            let pending = self.delay - self.waited;
            if dt < pending {
                self.waited += dt;
                return Step::Waiting;
            }
            self.waited = self.delay;
            dt -= pending;
        }

        if self.duration.is_zero() {
            self.progress = 1.0;
            self.cycles += 1;
            return Step::Write {
                value: self.to,
                finished: true,
            };
        }

        self.elapsed += dt;
        if self.elapsed < self.duration {
            self.progress = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64())
                .clamp(0.0, 1.0) as f32;
            return Step::Write {
                value: self.value(),
                finished: false,
            };
        }

        // At least one cycle completed during this tick
        let cycle = self.duration.as_nanos();
        let total = self.elapsed.as_nanos();
        let wraps = u32::try_from(total / cycle).unwrap_or(u32::MAX);
        let rest = Duration::from_nanos(u64::try_from(total % cycle).unwrap_or(0));

        self.progress = 1.0;
        let finished = match self.repeat {
            Repeat::Never => true,
            Repeat::Times(n) => self.cycles.saturating_add(wraps) >= n.max(1),
            Repeat::Forever => false,
        };

        if finished {
            self.cycles = match self.repeat {
                Repeat::Times(n) => n.max(1),
                _ => self.cycles + 1,
            };
            self.elapsed = self.duration;
        } else {
            self.cycles = self.cycles.saturating_add(wraps);
            self.elapsed = rest;
        }

        Step::Write {
            value: self.to,
            finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_advance_linear() {
        let mut anim = Animation::scalar("x", 0.0, 10.0, ms(100));
        assert_eq!(
            anim.advance(ms(50)),
            Step::Write {
                value: AnimValue::Scalar(5.0),
                finished: false
            }
        );
        assert_eq!(anim.progress(), 0.5);
        assert_eq!(
            anim.advance(ms(50)),
            Step::Write {
                value: AnimValue::Scalar(10.0),
                finished: true
            }
        );
        assert_eq!(anim.progress(), 1.0);
    }

    #[test]
    fn test_delay() {
        let mut anim = Animation::scalar("x", 0.0, 1.0, ms(100)).delay(ms(30));
        assert_eq!(anim.advance(ms(20)), Step::Waiting);
        assert!(!anim.is_started());
        // 10ms finishes the delay, 50ms advance the animation
        assert_eq!(
            anim.advance(ms(60)),
            Step::Write {
                value: AnimValue::Scalar(0.5),
                finished: false
            }
        );
        assert!(anim.is_started());
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut anim = Animation::scalar("x", 0.0, 1.0, Duration::ZERO).repeat(Repeat::Forever);
        assert_eq!(
            anim.advance(Duration::ZERO),
            Step::Write {
                value: AnimValue::Scalar(1.0),
                finished: true
            }
        );
    }

    #[test]
    fn test_repeat_times() {
        let mut anim = Animation::scalar("x", 0.0, 1.0, ms(100)).repeat(Repeat::Times(2));
        assert!(matches!(
            anim.advance(ms(120)),
            Step::Write { finished: false, value } if value == AnimValue::Scalar(1.0)
        ));
        assert_eq!(anim.cycles_completed(), 1);
        assert!(matches!(anim.advance(ms(30)), Step::Write { finished: false, .. }));
        assert!((anim.progress() - 0.5).abs() < 1e-6);
        assert!(matches!(anim.advance(ms(50)), Step::Write { finished: true, .. }));
        assert_eq!(anim.cycles_completed(), 2);
    }

    #[test]
    fn test_repeat_forever_carries_overflow() {
        let mut anim = Animation::scalar("x", 0.0, 1.0, ms(100)).repeat(Repeat::Forever);
        assert!(matches!(anim.advance(ms(350)), Step::Write { finished: false, .. }));
        assert_eq!(anim.cycles_completed(), 3);
        anim.advance(ms(0));
        assert!((anim.progress() - 0.5).abs() < 1e-6);
    }
}
