use serde::{Deserialize, Serialize};

/// Net count of completion events. Not tied to calendar continuity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Streak(u64);

impl Streak {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Floors at zero.
    pub fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}
