//! Format printer for trace records
//!
//! Turns records, lifecycle notifications and status reports into the exact
//! bytes written to the diagnostic stream. Every returned string is a complete
//! unit (one or more full lines) so the emitter can write it in one call.

use std::fmt::Write as _;

use crate::signature::class_display_name;
use crate::trace_event::{LifecycleEvent, StatusReport, TraceRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Output encoding for the diagnostic stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable, line oriented
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid output format: {s}. Valid options: text, json"
            )),
        }
    }
}

/// Stateless formatter for everything the probe emits
pub struct FormatPrinter;

impl FormatPrinter {
    /// Format a method-entry record
    pub fn format_record(record: &TraceRecord, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => Self::format_record_text(record),
            OutputFormat::Json => Self::format_record_json(record),
        }
    }

    /// Format a VM lifecycle notification; `vm` names the runtime (e.g. `JVM`)
    pub fn format_lifecycle(vm: &str, event: LifecycleEvent, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => match event {
                LifecycleEvent::VmInit => format!("{vm} is ready\n"),
                LifecycleEvent::VmDeath => format!("{vm} finished the code execution\n"),
            },
            OutputFormat::Json => {
                let value = json!({ "event": event, "vm": vm });
                format!("{value}\n")
            }
        }
    }

    /// Format a host status diagnostic
    pub fn format_status_report(report: &StatusReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => format!(
                "ERROR: {}: {}({}): {}\n",
                report.interface, report.code, report.name, report.context
            ),
            OutputFormat::Json => {
                let value = json!({
                    "event": "error",
                    "interface": report.interface,
                    "code": report.code,
                    "name": report.name,
                    "context": report.context,
                });
                format!("{value}\n")
            }
        }
    }

    fn format_record_text(record: &TraceRecord) -> String {
        let mut out = String::with_capacity(96 + record.parameters.len() * 64);

        // Writing into a String cannot fail
        let _ = write!(
            out,
            "\nSignature(ClassName): '{}'\n\t Method: '{}'\n",
            record.class_signature, record.method_name
        );
        if let Some(count) = record.param_count {
            let _ = writeln!(out, "\t\tparam_size: {count}");
        }
        for param in &record.parameters {
            let _ = writeln!(
                out,
                "\t\tslot:{}, start:{}, cur:{}, param:{} {}",
                param.slot,
                param.start_location,
                param.current_location,
                param.type_signature,
                param.name
            );
        }

        out
    }

    fn format_record_json(record: &TraceRecord) -> String {
        let value = json!({
            "event": "method_entry",
            "class_signature": record.class_signature,
            "class_name": class_display_name(&record.class_signature),
            "method_name": record.method_name,
            "param_count": record.param_count,
            "parameters": record.parameters,
        });
        format!("{value}\n")
    }
}
