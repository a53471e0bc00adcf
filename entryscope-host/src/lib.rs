//! Host introspection boundary.
//!
//! The probe talks to its runtime only through [`HostEnv`]; the runtime talks
//! back through [`EventSink`]. `jvmti` adapts a live JVM, `mock` scripts one
//! in memory.

pub mod allocation;
pub mod capabilities;
pub mod env;
pub mod error;
pub mod handles;

#[cfg(feature = "jvmti")]
pub mod jvmti;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use allocation::{LocalVariableEntry, LocalVariableTable, Scoped};
pub use capabilities::CapabilitySet;
pub use env::{EventKind, EventSink, FrameLocation, HostEnv, HostEvent};
pub use error::{HostError, HostResult, HostStatus, Result};
pub use handles::{BufferId, ClassHandle, MethodHandle, ThreadHandle};
