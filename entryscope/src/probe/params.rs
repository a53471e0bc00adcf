//! Formal parameter enumeration from the local-variable debug table.
//!
//! The table lists locals in slot order with the live range of each binding.
//! Parameters occupy the leading slots and are live from location 0, so the
//! inspector walks at most `argument size` rows and stops at the first row
//! whose binding starts after the frame's current location. Only reference
//! typed parameters (objects and arrays) are reported; primitives are walked
//! but skipped.

use entryscope_host::{HostEnv, LocalVariableTable, MethodHandle, ThreadHandle};
use entryscope_protocol::{ParameterDescriptor, SignatureKind};

use super::error_reporter::ErrorReporter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterInspection {
    /// Declared argument size; `None` when the host could not report it
    pub param_count: Option<i32>,
    pub parameters: Vec<ParameterDescriptor>,
}

pub struct ParameterInspector<'a> {
    env: &'a dyn HostEnv,
    reporter: &'a ErrorReporter<'a>,
}

impl<'a> ParameterInspector<'a> {
    pub fn new(env: &'a dyn HostEnv, reporter: &'a ErrorReporter<'a>) -> Self {
        Self { env, reporter }
    }

    pub fn inspect(&self, method: MethodHandle, thread: ThreadHandle) -> ParameterInspection {
        let Some(param_count) = self
            .reporter
            .check(self.env.arguments_size(method), "Cannot load argument size")
        else {
            return ParameterInspection::default();
        };

        let mut inspection = ParameterInspection {
            param_count: Some(param_count),
            parameters: Vec::new(),
        };
        if param_count <= 0 {
            return inspection;
        }

        // ABSENT_INFORMATION here just means no debug tables
        let Some(table) = self.reporter.check(
            self.env.local_variable_table(method),
            "Failed to load LocalVariableTable",
        ) else {
            return inspection;
        };

        let Some(frame) = self
            .reporter
            .check(self.env.frame_location(thread, 0), "Cannot load frame location")
        else {
            self.release(table);
            return inspection;
        };
        let current = frame.location;

        let limit = (param_count as usize).min(table.len());
        for entry in &table.entries()[..limit] {
            if entry.start_location > current {
                break;
            }
            if !SignatureKind::classify(&entry.signature).is_reference() {
                continue;
            }
            inspection.parameters.push(ParameterDescriptor {
                slot: entry.slot,
                type_signature: entry.signature.to_string(),
                name: entry.name.to_string(),
                start_location: entry.start_location,
                current_location: current,
            });
        }

        self.release(table);
        inspection
    }

    fn release(&self, table: LocalVariableTable<'_>) {
        if let Err(status) = table.release() {
            self.reporter.report(status, "Deallocating resources");
        }
    }
}
