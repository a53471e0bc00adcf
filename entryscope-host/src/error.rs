use crate::env::EventKind;

/// Status code returned by a host introspection query.
///
/// Codes follow the JVM Tool Interface numbering; `0` is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostStatus(pub u32);

impl HostStatus {
    pub const NONE: Self = Self(0);
    pub const INVALID_THREAD: Self = Self(10);
    pub const INVALID_CLASS: Self = Self(21);
    pub const INVALID_METHODID: Self = Self(23);
    pub const INVALID_LOCATION: Self = Self(24);
    pub const NO_MORE_FRAMES: Self = Self(31);
    pub const OPAQUE_FRAME: Self = Self(32);
    pub const NOT_AVAILABLE: Self = Self(98);
    pub const MUST_POSSESS_CAPABILITY: Self = Self(99);
    pub const NULL_POINTER: Self = Self(100);
    pub const ABSENT_INFORMATION: Self = Self(101);
    pub const INVALID_EVENT_TYPE: Self = Self(102);
    pub const ILLEGAL_ARGUMENT: Self = Self(103);
    pub const NATIVE_METHOD: Self = Self(104);
    pub const OUT_OF_MEMORY: Self = Self(110);
    pub const ACCESS_DENIED: Self = Self(111);
    pub const WRONG_PHASE: Self = Self(112);
    pub const INTERNAL: Self = Self(113);
    pub const UNATTACHED_THREAD: Self = Self(115);
    pub const INVALID_ENVIRONMENT: Self = Self(116);

    pub fn code(self) -> u32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self == Self::NONE
    }

    /// Convert a raw status into a query result
    pub fn into_result(self) -> HostResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Symbolic name for the codes this crate knows about
    pub fn well_known_name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "NONE",
            10 => "INVALID_THREAD",
            21 => "INVALID_CLASS",
            23 => "INVALID_METHODID",
            24 => "INVALID_LOCATION",
            31 => "NO_MORE_FRAMES",
            32 => "OPAQUE_FRAME",
            98 => "NOT_AVAILABLE",
            99 => "MUST_POSSESS_CAPABILITY",
            100 => "NULL_POINTER",
            101 => "ABSENT_INFORMATION",
            102 => "INVALID_EVENT_TYPE",
            103 => "ILLEGAL_ARGUMENT",
            104 => "NATIVE_METHOD",
            110 => "OUT_OF_MEMORY",
            111 => "ACCESS_DENIED",
            112 => "WRONG_PHASE",
            113 => "INTERNAL",
            115 => "UNATTACHED_THREAD",
            116 => "INVALID_ENVIRONMENT",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for HostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.well_known_name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Result of a single host query
pub type HostResult<T> = std::result::Result<T, HostStatus>;

/// Host boundary error types
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Host environment unavailable (status {0})")]
    EnvUnavailable(i32),

    #[error("Host rejected capabilities [{capabilities}]: {status}")]
    CapabilitiesRejected {
        capabilities: String,
        status: HostStatus,
    },

    #[error("Failed to bind {event} callback: {status}")]
    BindFailed { event: EventKind, status: HostStatus },

    #[error("Failed to enable {event} notification: {status}")]
    EnableFailed { event: EventKind, status: HostStatus },

    #[error("Event sink already installed")]
    SinkAlreadyInstalled,
}

pub type Result<T> = std::result::Result<T, HostError>;
