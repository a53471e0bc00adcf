use crate::allocation::{LocalVariableTable, Scoped};
use crate::capabilities::CapabilitySet;
use crate::error::{HostResult, HostStatus};
use crate::handles::{BufferId, ClassHandle, MethodHandle, ThreadHandle};
use entryscope_protocol::Location;

/// Event classes the probe subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    MethodEntry,
    VmInit,
    VmDeath,
}

impl EventKind {
    /// Every event class, in registration order
    pub const ALL: [EventKind; 3] = [EventKind::MethodEntry, EventKind::VmInit, EventKind::VmDeath];
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::MethodEntry => write!(f, "MethodEntry"),
            EventKind::VmInit => write!(f, "VMInit"),
            EventKind::VmDeath => write!(f, "VMDeath"),
        }
    }
}

/// A notification delivered by the host on one of its own threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    MethodEntry {
        method: MethodHandle,
        thread: ThreadHandle,
    },
    VmInit {
        thread: ThreadHandle,
    },
    VmDeath,
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::MethodEntry { .. } => EventKind::MethodEntry,
            HostEvent::VmInit { .. } => EventKind::VmInit,
            HostEvent::VmDeath => EventKind::VmDeath,
        }
    }
}

/// Method and instruction offset of an active frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLocation {
    pub method: MethodHandle,
    pub location: Location,
}

/// The host's introspection interface.
///
/// Every query is fallible and synchronous. Values backed by host memory come
/// back as [`Scoped`] so the caller releases them exactly once.
pub trait HostEnv: Send + Sync {
    /// Label of the introspection interface, used as diagnostic prefix (`JVMTI`)
    fn interface_name(&self) -> &str;

    /// Label of the runtime being traced (`JVM`)
    fn runtime_name(&self) -> &str;

    /// Host-provided symbolic name of a status code
    fn error_name(&self, status: HostStatus) -> HostResult<Scoped<'_, String>>;

    /// Request the whole set atomically
    fn add_capabilities(&self, capabilities: &CapabilitySet) -> HostResult<()>;

    /// Route deliveries of `kind` to the installed event sink
    fn bind_event(&self, kind: EventKind) -> HostResult<()>;

    /// Turn delivery of `kind` on or off
    fn set_event_enabled(&self, kind: EventKind, enabled: bool) -> HostResult<()>;

    fn method_declaring_class(&self, method: MethodHandle) -> HostResult<ClassHandle>;

    fn class_signature(&self, class: ClassHandle) -> HostResult<Scoped<'_, String>>;

    fn method_name(&self, method: MethodHandle) -> HostResult<Scoped<'_, String>>;

    /// Number of local slots taken by the method's arguments
    fn arguments_size(&self, method: MethodHandle) -> HostResult<i32>;

    /// `Err(HostStatus::ABSENT_INFORMATION)` when compiled without debug tables
    fn local_variable_table(&self, method: MethodHandle) -> HostResult<LocalVariableTable<'_>>;

    /// Location of the frame `depth` levels below the top of `thread`'s stack
    fn frame_location(&self, thread: ThreadHandle, depth: i32) -> HostResult<FrameLocation>;

    /// Give a buffer back to the host
    fn deallocate(&self, buffer: BufferId) -> HostResult<()>;
}

/// Inbound interface the host calls for every delivered event
pub trait EventSink: Send + Sync {
    fn deliver(&self, env: &dyn HostEnv, event: HostEvent);
}
