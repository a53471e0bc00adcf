//! Serialized writer for the diagnostic stream.
//!
//! Handlers run concurrently on host threads. Each unit (a record, a lifecycle
//! line, an error line) is formatted up front and written with a single
//! `write_all` under one lock, so units never interleave.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{AttachError, Result};
use entryscope_protocol::{FormatPrinter, LifecycleEvent, OutputFormat, StatusReport, TraceRecord};
use tracing::warn;

/// Where trace output goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

impl OutputTarget {
    /// `stdout` and `stderr` name the standard streams, anything else is a path
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "stdout" => OutputTarget::Stdout,
            "stderr" => OutputTarget::Stderr,
            path => OutputTarget::File(PathBuf::from(path)),
        }
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "stdout"),
            OutputTarget::Stderr => write!(f, "stderr"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub struct TraceEmitter {
    format: OutputFormat,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl TraceEmitter {
    pub fn new(writer: Box<dyn Write + Send>, format: OutputFormat) -> Self {
        Self {
            format,
            writer: Mutex::new(writer),
        }
    }

    /// Open `target`; a file is created or truncated
    pub fn open(target: &OutputTarget, format: OutputFormat) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match target {
            OutputTarget::Stdout => Box::new(std::io::stdout()),
            OutputTarget::Stderr => Box::new(std::io::stderr()),
            OutputTarget::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|source| AttachError::Output {
                        path: path.clone(),
                        source,
                    })?;
                Box::new(file)
            }
        };
        Ok(Self::new(writer, format))
    }

    pub fn emit(&self, record: &TraceRecord) {
        self.write_unit(&FormatPrinter::format_record(record, self.format));
    }

    pub fn emit_lifecycle(&self, vm: &str, event: LifecycleEvent) {
        self.write_unit(&FormatPrinter::format_lifecycle(vm, event, self.format));
    }

    pub fn emit_status(&self, report: &StatusReport) {
        self.write_unit(&FormatPrinter::format_status_report(report, self.format));
    }

    fn write_unit(&self, unit: &str) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writer.write_all(unit.as_bytes()).and_then(|_| writer.flush()) {
            warn!("Failed to write trace output: {}", e);
        }
    }
}

impl std::fmt::Debug for TraceEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceEmitter")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::capture_emitter;

    #[test]
    fn test_output_target_parse() {
        assert_eq!(OutputTarget::parse("stdout"), OutputTarget::Stdout);
        assert_eq!(OutputTarget::parse(""), OutputTarget::Stdout);
        assert_eq!(OutputTarget::parse("stderr"), OutputTarget::Stderr);
        assert_eq!(
            OutputTarget::parse("/tmp/trace.log"),
            OutputTarget::File(PathBuf::from("/tmp/trace.log"))
        );
        assert_eq!(OutputTarget::parse("/tmp/trace.log").to_string(), "/tmp/trace.log");
    }

    #[test]
    fn test_emit_record_and_lifecycle() {
        let (emitter, capture) = capture_emitter(OutputFormat::Text);

        emitter.emit_lifecycle("JVM", LifecycleEvent::VmInit);
        emitter.emit(&TraceRecord::new("LFoo;".to_string(), "bar".to_string()));

        assert_eq!(
            capture.text(),
            "JVM is ready\n\nSignature(ClassName): 'LFoo;'\n\t Method: 'bar'\n"
        );
    }

    #[test]
    fn test_open_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.out");
        let emitter = TraceEmitter::open(&OutputTarget::File(path.clone()), OutputFormat::Text).unwrap();

        emitter.emit_lifecycle("JVM", LifecycleEvent::VmDeath);
        drop(emitter);

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, "JVM finished the code execution\n");
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.out");
        let err = TraceEmitter::open(&OutputTarget::File(path), OutputFormat::Text).unwrap_err();
        assert!(matches!(err, AttachError::Output { .. }));
    }
}
