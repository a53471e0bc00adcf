use crate::signature::SignatureKind;
use serde::{Deserialize, Serialize};

/// Instruction offset inside a method body, as reported by the host
pub type Location = i64;

/// One formal parameter resolved from the method's local-variable table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub slot: i32,
    pub type_signature: String,
    pub name: String,
    /// First location at which the binding is live
    pub start_location: Location,
    /// Location of the active frame when the parameter was read
    pub current_location: Location,
}

impl ParameterDescriptor {
    pub fn kind(&self) -> SignatureKind {
        SignatureKind::classify(&self.type_signature)
    }
}

/// Trace record for a single method-entry event.
///
/// Built once inside the event handler, emitted, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Declaring class signature (`LFoo;`); empty if the host could not resolve it
    pub class_signature: String,
    /// Method name; empty if the host could not resolve it
    pub method_name: String,
    /// Declared argument size reported by the host (`None` if unavailable)
    pub param_count: Option<i32>,
    pub parameters: Vec<ParameterDescriptor>,
}

impl TraceRecord {
    pub fn new(class_signature: String, method_name: String) -> Self {
        Self {
            class_signature,
            method_name,
            param_count: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(
        mut self,
        param_count: Option<i32>,
        parameters: Vec<ParameterDescriptor>,
    ) -> Self {
        self.param_count = param_count;
        self.parameters = parameters;
        self
    }
}

/// VM lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    VmInit,
    VmDeath,
}

/// Diagnostic produced when a host query returns a non-success status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Interface label shown in the line prefix (e.g. `JVMTI`)
    pub interface: String,
    pub code: u32,
    /// Host-provided name of the status code, `Unknown` when unavailable
    pub name: String,
    pub context: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = TraceRecord::new("LFoo;".to_string(), "bar".to_string()).with_parameters(
            Some(3),
            vec![ParameterDescriptor {
                slot: 1,
                type_signature: "Ljava/lang/String;".to_string(),
                name: "s".to_string(),
                start_location: 0,
                current_location: 0,
            }],
        );

        assert_eq!(record.param_count, Some(3));
        assert_eq!(record.parameters.len(), 1);
        assert_eq!(record.parameters[0].kind(), SignatureKind::Object);
    }

    #[test]
    fn test_lifecycle_serde_names() {
        let json = serde_json::to_string(&LifecycleEvent::VmDeath).unwrap();
        assert_eq!(json, "\"vm_death\"");
    }
}
