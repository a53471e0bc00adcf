//! entryscope: method-entry tracing probe.
//!
//! Loaded into a JVM with `-agentpath:libentryscope.so=<options>`, it prints
//! the declaring class, name and reference-typed parameters of every method
//! the VM enters. The pipeline itself is written against
//! [`entryscope_host::HostEnv`] and runs unchanged against the mock host.

pub mod agent;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod probe;

#[cfg(feature = "jvmti")]
pub mod entrypoint;

pub use agent::Agent;
pub use config::AgentConfig;
pub use dispatcher::Dispatcher;
pub use error::{AttachError, Result};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use probe::{OutputTarget, Probe, TraceEmitter};
