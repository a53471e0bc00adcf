use std::sync::atomic::{AtomicU8, Ordering};

use tracing::debug;

/// Attach/detach progress of the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Unattached = 0,
    CapabilitiesRequested = 1,
    EventsRegistered = 2,
    Active = 3,
    Unloading = 4,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LifecycleState::CapabilitiesRequested,
            2 => LifecycleState::EventsRegistered,
            3 => LifecycleState::Active,
            4 => LifecycleState::Unloading,
            _ => LifecycleState::Unattached,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Unattached => write!(f, "unattached"),
            LifecycleState::CapabilitiesRequested => write!(f, "capabilities requested"),
            LifecycleState::EventsRegistered => write!(f, "events registered"),
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Unloading => write!(f, "unloading"),
        }
    }
}

/// Observable lifecycle state, readable from any host thread
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Unattached as u8),
        }
    }

    pub fn current(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.current() == LifecycleState::Active
    }

    /// Move `from -> to`; false if the current state is not `from`
    pub fn transition(&self, from: LifecycleState, to: LifecycleState) -> bool {
        let moved = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if moved {
            debug!("Probe lifecycle: {} -> {}", from, to);
        }
        moved
    }

    /// Unconditional move, used to roll back a failed attach
    pub fn reset(&self) {
        let previous = self.state.swap(LifecycleState::Unattached as u8, Ordering::AcqRel);
        debug!(
            "Probe lifecycle: {} -> {}",
            LifecycleState::from_u8(previous),
            LifecycleState::Unattached
        );
    }
}
