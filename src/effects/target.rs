//! Animation targets
//!
//! Animations write their values through [`AnimationTarget`], addressing a
//! property by [`TargetRef`]. Applications usually keep their animated state
//! in a [`PropertyStore`] and read it back when building the widget tree.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::value::{AnimValue, ValueKind};
use crate::core::Color;

/// Name of an animated property, e.g. `"banner.opacity"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetRef(Cow<'static, str>);

impl TargetRef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TargetRef {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TargetRef {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Failure to write an animated value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    #[error("Unknown animation target: {0}")]
    Unknown(TargetRef),

    #[error("Animation target {target} holds a {expected:?}, got a {actual:?}")]
    KindMismatch {
        target: TargetRef,
        expected: ValueKind,
        actual: ValueKind,
    },
}

/// Receiver of animated values
pub trait AnimationTarget {
    fn apply(&mut self, target: &TargetRef, value: AnimValue) -> Result<(), TargetError>;
}

/// Map of declared properties and their current values
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: HashMap<TargetRef, AnimValue>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property with its initial value; redeclaring overwrites
    pub fn declare(&mut self, target: impl Into<TargetRef>, value: AnimValue) {
        self.values.insert(target.into(), value);
    }

    /// Forget a property; animations still targeting it start failing
    pub fn remove(&mut self, target: &TargetRef) -> Option<AnimValue> {
        self.values.remove(target)
    }

    pub fn get(&self, target: &TargetRef) -> Option<AnimValue> {
        self.values.get(target).copied()
    }

    pub fn scalar(&self, target: &TargetRef) -> Option<f32> {
        self.get(target).and_then(|v| v.as_scalar())
    }

    pub fn color(&self, target: &TargetRef) -> Option<Color> {
        self.get(target).and_then(|v| v.as_color())
    }

    pub fn position(&self, target: &TargetRef) -> Option<(i32, i32)> {
        self.get(target).and_then(|v| v.as_position())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AnimationTarget for PropertyStore {
    fn apply(&mut self, target: &TargetRef, value: AnimValue) -> Result<(), TargetError> {
        let slot = self
            .values
            .get_mut(target)
            .ok_or_else(|| TargetError::Unknown(target.clone()))?;
        if slot.kind() != value.kind() {
            return Err(TargetError::KindMismatch {
                target: target.clone(),
                expected: slot.kind(),
                actual: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_apply() {
        let mut store = PropertyStore::new();
        let opacity = TargetRef::new("opacity");
        store.declare(opacity.clone(), AnimValue::Scalar(0.0));

        store.apply(&opacity, AnimValue::Scalar(0.5)).unwrap();
        assert_eq!(store.scalar(&opacity), Some(0.5));
        assert_eq!(store.color(&opacity), None);
    }

    #[test]
    fn test_store_unknown_target() {
        let mut store = PropertyStore::new();
        let err = store
            .apply(&TargetRef::new("missing"), AnimValue::Scalar(1.0))
            .unwrap_err();
        assert_eq!(err, TargetError::Unknown(TargetRef::new("missing")));
    }

    #[test]
    fn test_store_kind_mismatch() {
        let mut store = PropertyStore::new();
        store.declare("pos", AnimValue::Position { x: 0, y: 0 });
        let err = store
            .apply(&TargetRef::new("pos"), AnimValue::Scalar(1.0))
            .unwrap_err();
        assert!(matches!(err, TargetError::KindMismatch { .. }));
        assert_eq!(store.position(&TargetRef::new("pos")), Some((0, 0)));
    }
}
