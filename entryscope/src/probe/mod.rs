//! Per-event tracing pipeline: resolve, inspect, emit.

pub mod emitter;
pub mod error_reporter;
pub mod params;
pub mod symbol;

pub use emitter::{OutputTarget, TraceEmitter};
pub use error_reporter::{ErrorReporter, UNKNOWN_STATUS_NAME};
pub use params::{ParameterInspection, ParameterInspector};
pub use symbol::{ResolvedSymbol, SymbolResolver};

use entryscope_host::{HostEnv, MethodHandle, ThreadHandle};
use entryscope_protocol::{LifecycleEvent, TraceRecord};

/// Owns the output stream; everything else is built per event
#[derive(Debug)]
pub struct Probe {
    emitter: TraceEmitter,
}

impl Probe {
    pub fn new(emitter: TraceEmitter) -> Self {
        Self { emitter }
    }

    /// Build and emit the record for one method entry.
    ///
    /// Diagnostics for failed queries are written as they happen, so they
    /// precede the record they belong to.
    pub fn trace_method_entry(
        &self,
        env: &dyn HostEnv,
        method: MethodHandle,
        thread: ThreadHandle,
    ) -> TraceRecord {
        let reporter = ErrorReporter::new(env, &self.emitter);
        let symbol = SymbolResolver::new(env, &reporter).resolve(method);
        let inspection = ParameterInspector::new(env, &reporter).inspect(method, thread);

        let record = TraceRecord::new(symbol.class_signature, symbol.method_name)
            .with_parameters(inspection.param_count, inspection.parameters);
        self.emitter.emit(&record);
        record
    }

    pub fn announce(&self, env: &dyn HostEnv, event: LifecycleEvent) {
        self.emitter.emit_lifecycle(env.runtime_name(), event);
    }
}
