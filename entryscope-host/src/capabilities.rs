/// Capabilities the probe asks the host to grant before any event can be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    /// Read local variables (and the local-variable table) of a live frame
    pub can_access_local_variables: bool,
    /// Receive a notification on every method entry
    pub can_generate_method_entry_events: bool,
}

impl CapabilitySet {
    /// Minimal set required by the method-entry tracer
    pub const fn tracing_minimum() -> Self {
        Self {
            can_access_local_variables: true,
            can_generate_method_entry_events: true,
        }
    }

    /// Names of the requested capabilities, in a stable order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.can_access_local_variables {
            names.push("can_access_local_variables");
        }
        if self.can_generate_method_entry_events {
            names.push("can_generate_method_entry_events");
        }
        names
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}
