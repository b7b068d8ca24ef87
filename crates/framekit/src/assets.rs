//! One-shot asset slots.
//!
//! Images and similar assets load once, outside the tick loop. A slot starts
//! pending, accepts exactly one result, and never blocks rendering: until a
//! value arrives, or if loading failed, the caller draws a placeholder.

use tracing::{debug, warn};

use crate::error::AssetError;

#[derive(Debug, Clone, PartialEq)]
enum Slot<T> {
    Pending,
    Ready(T),
    Failed(AssetError),
}

/// A named asset that resolves at most once.
///
/// ```
/// use framekit::assets::AssetSlot;
/// use framekit::error::AssetError;
///
/// let mut sprite: AssetSlot<u32> = AssetSlot::new("coin.png");
/// assert_eq!(*sprite.get_or(&0), 0);
///
/// sprite.resolve(Err(AssetError::NotFound("coin.png".into())));
/// assert!(sprite.is_failed());
///
/// // Already resolved: ignored
/// assert!(!sprite.resolve(Ok(7)));
/// assert_eq!(*sprite.get_or(&0), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSlot<T> {
    name: String,
    slot: Slot<T>,
}

impl<T> AssetSlot<T> {
    /// Creates a pending slot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: Slot::Pending,
        }
    }

    /// Asset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores the load result. Returns `false` and changes nothing if the
    /// slot was already resolved. Failures are logged, never propagated.
    pub fn resolve(&mut self, result: Result<T, AssetError>) -> bool {
        if !matches!(self.slot, Slot::Pending) {
            debug!(name = %self.name, "asset already resolved; ignoring");
            return false;
        }
        self.slot = match result {
            Ok(value) => {
                debug!(name = %self.name, "asset loaded");
                Slot::Ready(value)
            }
            Err(err) => {
                warn!(name = %self.name, error = %err, "asset failed to load; using placeholder");
                Slot::Failed(err)
            }
        };
        true
    }

    /// The loaded value, if any.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match &self.slot {
            Slot::Ready(value) => Some(value),
            Slot::Pending | Slot::Failed(_) => None,
        }
    }

    /// The loaded value, or `placeholder` while pending or after failure.
    #[must_use]
    pub fn get_or<'a>(&'a self, placeholder: &'a T) -> &'a T {
        self.get().unwrap_or(placeholder)
    }

    /// The load error, if loading failed.
    #[must_use]
    pub fn error(&self) -> Option<&AssetError> {
        match &self.slot {
            Slot::Failed(err) => Some(err),
            Slot::Pending | Slot::Ready(_) => None,
        }
    }

    /// Returns `true` once a result has arrived.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self.slot, Slot::Pending)
    }

    /// Returns `true` if loading failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.slot, Slot::Failed(_))
    }
}
