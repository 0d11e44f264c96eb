//! Effects: animations driven by an explicit timeline, plus post-render
//! overlays
//!
//! The [`Timeline`] is owned by the run loop and advanced once per frame with
//! the measured frame time. Animations write interpolated values into an
//! [`AnimationTarget`]; the application reads them back when it builds the
//! next widget tree or its overlays.

pub mod animation;
pub mod easing;
pub mod overlay;
pub mod target;
pub mod timeline;
pub mod value;

pub use animation::{Animation, Repeat};
pub use easing::Easing;
pub use overlay::{Overlay, OverlayKind};
pub use target::{AnimationTarget, PropertyStore, TargetError, TargetRef};
pub use timeline::{AnimationId, ChangeSet, Timeline};
pub use value::{AnimValue, ValueKind};
