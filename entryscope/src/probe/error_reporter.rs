use entryscope_host::{HostEnv, HostResult, HostStatus, Scoped};
use entryscope_protocol::StatusReport;
use tracing::debug;

use super::emitter::TraceEmitter;

/// Shown when the host cannot name a status code
pub const UNKNOWN_STATUS_NAME: &str = "Unknown";

/// Turns failed host queries into one diagnostic line each.
///
/// Reporting never fails: a failed name lookup falls back to
/// [`UNKNOWN_STATUS_NAME`] and write errors are logged by the emitter.
pub struct ErrorReporter<'a> {
    env: &'a dyn HostEnv,
    emitter: &'a TraceEmitter,
}

impl<'a> ErrorReporter<'a> {
    pub fn new(env: &'a dyn HostEnv, emitter: &'a TraceEmitter) -> Self {
        Self { env, emitter }
    }

    pub fn report(&self, status: HostStatus, context: &str) {
        if status.is_success() {
            return;
        }

        let name = self
            .env
            .error_name(status)
            .map(Scoped::into_value)
            .unwrap_or_else(|_| UNKNOWN_STATUS_NAME.to_string());

        debug!(
            "{} query failed with {}({}): {}",
            self.env.interface_name(),
            status.code(),
            name,
            context
        );

        self.emitter.emit_status(&StatusReport {
            interface: self.env.interface_name().to_string(),
            code: status.code(),
            name,
            context: context.to_string(),
        });
    }

    /// Report an `Err` and yield `None`; pass `Ok` through
    pub fn check<T>(&self, result: HostResult<T>, context: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(status) => {
                self.report(status, context);
                None
            }
        }
    }
}
