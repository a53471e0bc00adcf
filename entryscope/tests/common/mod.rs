#![allow(dead_code)]

//! Common test utilities shared across integration tests

use std::io::Write;
use std::sync::{Arc, Mutex, Once};

use entryscope::{Agent, AgentConfig, TraceEmitter};
use entryscope_host::mock::{MockHost, MockLocalVariable, MockMethod};
use entryscope_host::{MethodHandle, ThreadHandle};
use entryscope_protocol::OutputFormat;

static INIT: Once = Once::new();

/// Initialize logging for tests (call once per test)
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("off")
            .try_init()
            .ok();
    });
}

/// In-memory writer handed to the emitter
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Method-entry records, split on their header line
    pub fn records(&self) -> Vec<String> {
        self.contents()
            .split("\nSignature(ClassName): ")
            .skip(1)
            .map(|chunk| format!("Signature(ClassName): {chunk}"))
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn agent(format: OutputFormat) -> (Agent, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let emitter = TraceEmitter::new(Box::new(buffer.clone()), format);
    (Agent::with_emitter(AgentConfig::default(), emitter), buffer)
}

/// `Foo.bar(String s, int x)` compiled with debug tables, entered on a fresh thread
pub fn foo_bar(host: &MockHost) -> (MethodHandle, ThreadHandle) {
    let method = host.add_method(
        MockMethod::new("LFoo;", "bar")
            .with_arguments_size(3)
            .with_local_variables(vec![
                MockLocalVariable::new(0, "this", "LFoo;", 0),
                MockLocalVariable::new(1, "s", "Ljava/lang/String;", 0),
                MockLocalVariable::new(2, "x", "I", 0),
            ]),
    );
    let thread = host.add_thread(method, Ok(0));
    (method, thread)
}

/// Static `Foo.bar(String s, int x)`: no receiver slot
pub fn static_foo_bar(host: &MockHost) -> (MethodHandle, ThreadHandle) {
    let method = host.add_method(
        MockMethod::new("LFoo;", "bar")
            .with_arguments_size(2)
            .with_local_variables(vec![
                MockLocalVariable::new(0, "s", "Ljava/lang/String;", 0),
                MockLocalVariable::new(1, "x", "I", 0),
            ]),
    );
    let thread = host.add_thread(method, Ok(0));
    (method, thread)
}
