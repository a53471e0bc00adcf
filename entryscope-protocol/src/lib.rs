//! entryscope Protocol Library
//!
//! Data model and formatting for the records the method-entry probe emits.

// Core modules
pub mod format_printer;
pub mod signature;
pub mod trace_event;

pub use signature::{class_display_name, SignatureKind};

pub use trace_event::{LifecycleEvent, Location, ParameterDescriptor, StatusReport, TraceRecord};

pub use format_printer::{FormatPrinter, OutputFormat};
