//! In-memory host for exercising the probe without a runtime.
//!
//! `MockHost` answers every introspection query from a table of registered
//! methods and threads, hands out numbered buffers for every string and table
//! it returns, and records every call so tests can assert on ordering and on
//! exact-once release.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::allocation::{LocalVariableEntry, LocalVariableTable, Scoped};
use crate::capabilities::CapabilitySet;
use crate::env::{EventKind, EventSink, FrameLocation, HostEnv, HostEvent};
use crate::error::{HostResult, HostStatus};
use crate::handles::{BufferId, ClassHandle, MethodHandle, ThreadHandle};
use entryscope_protocol::Location;

pub const MOCK_INTERFACE: &str = "MOCKTI";
pub const MOCK_RUNTIME: &str = "MockVM";

const FIRST_BUFFER: usize = 0x1000;
const BUFFER_STRIDE: usize = 0x10;

/// A row of a mock local-variable table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockLocalVariable {
    pub start_location: Location,
    pub length: i32,
    pub slot: i32,
    pub name: String,
    pub signature: String,
    pub generic_signature: Option<String>,
}

impl MockLocalVariable {
    pub fn new(slot: i32, name: &str, signature: &str, start_location: Location) -> Self {
        Self {
            start_location,
            length: 16,
            slot,
            name: name.to_string(),
            signature: signature.to_string(),
            generic_signature: None,
        }
    }

    pub fn with_generic_signature(mut self, generic: &str) -> Self {
        self.generic_signature = Some(generic.to_string());
        self
    }
}

/// Queries a mock method can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockQuery {
    DeclaringClass,
    ClassSignature,
    MethodName,
}

/// Everything the mock knows about one method
#[derive(Debug, Clone)]
pub struct MockMethod {
    pub class_signature: String,
    pub name: String,
    pub arguments_size: HostResult<i32>,
    /// `Err` stands for a method compiled without debug tables
    pub local_variables: HostResult<Vec<MockLocalVariable>>,
    pub failures: HashMap<MockQuery, HostStatus>,
}

impl MockMethod {
    pub fn new(class_signature: &str, name: &str) -> Self {
        Self {
            class_signature: class_signature.to_string(),
            name: name.to_string(),
            arguments_size: Ok(0),
            local_variables: Ok(Vec::new()),
            failures: HashMap::new(),
        }
    }

    pub fn with_arguments_size(mut self, size: i32) -> Self {
        self.arguments_size = Ok(size);
        self
    }

    pub fn with_local_variables(mut self, variables: Vec<MockLocalVariable>) -> Self {
        self.local_variables = Ok(variables);
        self
    }

    /// Local-variable table reports absent information
    pub fn without_debug_info(mut self) -> Self {
        self.local_variables = Err(HostStatus::ABSENT_INFORMATION);
        self
    }

    pub fn failing(mut self, query: MockQuery, status: HostStatus) -> Self {
        self.failures.insert(query, status);
        self
    }

    pub fn failing_arguments_size(mut self, status: HostStatus) -> Self {
        self.arguments_size = Err(status);
        self
    }
}

/// One recorded call into the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    ErrorName(HostStatus),
    AddCapabilities,
    BindEvent(EventKind),
    SetEventEnabled(EventKind, bool),
    MethodDeclaringClass(MethodHandle),
    ClassSignature(ClassHandle),
    MethodName(MethodHandle),
    ArgumentsSize(MethodHandle),
    LocalVariableTable(MethodHandle),
    FrameLocation(ThreadHandle),
    Deallocate(BufferId),
}

#[derive(Debug, Default)]
struct MockState {
    methods: HashMap<MethodHandle, MockMethod>,
    classes: HashMap<ClassHandle, MethodHandle>,
    threads: HashMap<ThreadHandle, (MethodHandle, HostResult<Location>)>,
    next_handle: usize,

    capability_status: Option<HostStatus>,
    granted: Option<CapabilitySet>,
    bind_failures: HashMap<EventKind, HostStatus>,
    enable_failures: HashMap<EventKind, HostStatus>,
    bound: HashSet<EventKind>,
    enabled: HashSet<EventKind>,
    error_names_unavailable: bool,
    deallocate_status: Option<HostStatus>,

    next_buffer: usize,
    live: BTreeMap<BufferId, String>,
    released: HashMap<BufferId, u32>,
    invalid_releases: Vec<BufferId>,
    allocated: usize,

    calls: Vec<HostCall>,
}

/// Thread-safe scripted host
#[derive(Debug, Default)]
pub struct MockHost {
    state: Mutex<MockState>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ----- scripting -----

    /// Register a method; its declaring class gets a handle of its own
    pub fn add_method(&self, method: MockMethod) -> MethodHandle {
        let mut state = self.state();
        state.next_handle += 1;
        let handle = MethodHandle(0x100 + state.next_handle);
        let class = ClassHandle(0x8000 + state.next_handle);
        state.classes.insert(class, handle);
        state.methods.insert(handle, method);
        handle
    }

    /// Register a thread whose top frame sits at `location` inside `method`
    pub fn add_thread(&self, method: MethodHandle, location: HostResult<Location>) -> ThreadHandle {
        let mut state = self.state();
        state.next_handle += 1;
        let handle = ThreadHandle(0x100 + state.next_handle);
        state.threads.insert(handle, (method, location));
        handle
    }

    pub fn reject_capabilities(&self, status: HostStatus) {
        self.state().capability_status = Some(status);
    }

    pub fn fail_bind(&self, kind: EventKind, status: HostStatus) {
        self.state().bind_failures.insert(kind, status);
    }

    pub fn fail_enable(&self, kind: EventKind, status: HostStatus) {
        self.state().enable_failures.insert(kind, status);
    }

    pub fn disable_error_names(&self) {
        self.state().error_names_unavailable = true;
    }

    /// Make every release report `status` (the buffer still counts as released)
    pub fn fail_deallocate(&self, status: HostStatus) {
        self.state().deallocate_status = Some(status);
    }

    /// Deliver `event` to `sink` the way the host would: only if the event
    /// class is both bound and enabled. Returns whether it was delivered.
    pub fn deliver(&self, sink: &dyn EventSink, event: HostEvent) -> bool {
        let deliverable = {
            let state = self.state();
            state.bound.contains(&event.kind()) && state.enabled.contains(&event.kind())
        };
        if deliverable {
            sink.deliver(self, event);
        }
        deliverable
    }

    // ----- inspection -----

    pub fn calls(&self) -> Vec<HostCall> {
        self.state().calls.clone()
    }

    pub fn granted_capabilities(&self) -> Option<CapabilitySet> {
        self.state().granted
    }

    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.state().bound.contains(&kind)
    }

    pub fn is_enabled(&self, kind: EventKind) -> bool {
        self.state().enabled.contains(&kind)
    }

    /// Number of buffers handed out so far
    pub fn allocated_count(&self) -> usize {
        self.state().allocated
    }

    /// Buffers handed out and not yet released, with what they held
    pub fn live_buffers(&self) -> Vec<(BufferId, String)> {
        self.state()
            .live
            .iter()
            .map(|(id, label)| (*id, label.clone()))
            .collect()
    }

    /// How many times each released buffer was released
    pub fn release_counts(&self) -> HashMap<BufferId, u32> {
        self.state().released.clone()
    }

    /// Releases of buffers that were never handed out or already released
    pub fn invalid_releases(&self) -> Vec<BufferId> {
        self.state().invalid_releases.clone()
    }

    // ----- internals -----

    fn allocate(state: &mut MockState, label: String) -> BufferId {
        if state.next_buffer == 0 {
            state.next_buffer = FIRST_BUFFER;
        }
        let addr = state.next_buffer;
        state.next_buffer += BUFFER_STRIDE;
        state.allocated += 1;

        // FIRST_BUFFER is non-zero and only grows
        let id = BufferId::new(addr).unwrap_or_else(|| unreachable!("buffer addresses start above zero"));
        state.live.insert(id, label);
        id
    }

    fn method_failure(state: &MockState, method: MethodHandle, query: MockQuery) -> HostResult<&MockMethod> {
        let entry = state
            .methods
            .get(&method)
            .ok_or(HostStatus::INVALID_METHODID)?;
        match entry.failures.get(&query) {
            Some(status) => Err(*status),
            None => Ok(entry),
        }
    }
}

impl HostEnv for MockHost {
    fn interface_name(&self) -> &str {
        MOCK_INTERFACE
    }

    fn runtime_name(&self) -> &str {
        MOCK_RUNTIME
    }

    fn error_name(&self, status: HostStatus) -> HostResult<Scoped<'_, String>> {
        let (name, buffer) = {
            let mut state = self.state();
            state.calls.push(HostCall::ErrorName(status));
            if state.error_names_unavailable {
                return Err(HostStatus::INTERNAL);
            }
            let name = format!(
                "{}_ERROR_{}",
                MOCK_INTERFACE,
                status.well_known_name().ok_or(HostStatus::ILLEGAL_ARGUMENT)?
            );
            let buffer = Self::allocate(&mut state, format!("error name {}", status.code()));
            (name, buffer)
        };
        Ok(Scoped::new(self, name, Some(buffer)))
    }

    fn add_capabilities(&self, capabilities: &CapabilitySet) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(HostCall::AddCapabilities);
        if let Some(status) = state.capability_status {
            return Err(status);
        }
        state.granted = Some(*capabilities);
        Ok(())
    }

    fn bind_event(&self, kind: EventKind) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(HostCall::BindEvent(kind));
        if let Some(status) = state.bind_failures.get(&kind) {
            return Err(*status);
        }
        state.bound.insert(kind);
        Ok(())
    }

    fn set_event_enabled(&self, kind: EventKind, enabled: bool) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(HostCall::SetEventEnabled(kind, enabled));
        if let Some(status) = state.enable_failures.get(&kind) {
            return Err(*status);
        }
        let granted = state.granted.unwrap_or_default();
        if kind == EventKind::MethodEntry && enabled && !granted.can_generate_method_entry_events {
            return Err(HostStatus::MUST_POSSESS_CAPABILITY);
        }
        if enabled {
            state.enabled.insert(kind);
        } else {
            state.enabled.remove(&kind);
        }
        Ok(())
    }

    fn method_declaring_class(&self, method: MethodHandle) -> HostResult<ClassHandle> {
        let mut state = self.state();
        state.calls.push(HostCall::MethodDeclaringClass(method));
        Self::method_failure(&state, method, MockQuery::DeclaringClass)?;
        state
            .classes
            .iter()
            .find(|(_, owner)| **owner == method)
            .map(|(class, _)| *class)
            .ok_or(HostStatus::INVALID_CLASS)
    }

    fn class_signature(&self, class: ClassHandle) -> HostResult<Scoped<'_, String>> {
        let (signature, buffer) = {
            let mut state = self.state();
            state.calls.push(HostCall::ClassSignature(class));
            let method = *state.classes.get(&class).ok_or(HostStatus::INVALID_CLASS)?;
            let signature = Self::method_failure(&state, method, MockQuery::ClassSignature)?
                .class_signature
                .clone();
            let buffer = Self::allocate(&mut state, format!("class signature {signature}"));
            (signature, buffer)
        };
        Ok(Scoped::new(self, signature, Some(buffer)))
    }

    fn method_name(&self, method: MethodHandle) -> HostResult<Scoped<'_, String>> {
        let (name, buffer) = {
            let mut state = self.state();
            state.calls.push(HostCall::MethodName(method));
            let name = Self::method_failure(&state, method, MockQuery::MethodName)?
                .name
                .clone();
            let buffer = Self::allocate(&mut state, format!("method name {name}"));
            (name, buffer)
        };
        Ok(Scoped::new(self, name, Some(buffer)))
    }

    fn arguments_size(&self, method: MethodHandle) -> HostResult<i32> {
        let mut state = self.state();
        state.calls.push(HostCall::ArgumentsSize(method));
        state
            .methods
            .get(&method)
            .ok_or(HostStatus::INVALID_METHODID)?
            .arguments_size
    }

    fn local_variable_table(&self, method: MethodHandle) -> HostResult<LocalVariableTable<'_>> {
        // Allocate under the lock, build the scoped values after dropping it:
        // a Scoped dropped while the lock is held would deadlock in deallocate.
        let (rows, table_buffer) = {
            let mut state = self.state();
            state.calls.push(HostCall::LocalVariableTable(method));
            let variables = state
                .methods
                .get(&method)
                .ok_or(HostStatus::INVALID_METHODID)?
                .local_variables
                .clone()?;

            let table_buffer = Self::allocate(&mut state, "local variable table".to_string());
            let rows: Vec<_> = variables
                .into_iter()
                .map(|var| {
                    let name_buf = Self::allocate(&mut state, format!("name {}", var.name));
                    let sig_buf = Self::allocate(&mut state, format!("signature {}", var.name));
                    let generic_buf = var
                        .generic_signature
                        .as_ref()
                        .map(|_| Self::allocate(&mut state, format!("generic {}", var.name)));
                    (var, name_buf, sig_buf, generic_buf)
                })
                .collect();
            (rows, table_buffer)
        };

        let entries = rows
            .into_iter()
            .map(|(var, name_buf, sig_buf, generic_buf)| LocalVariableEntry {
                start_location: var.start_location,
                length: var.length,
                slot: var.slot,
                name: Scoped::new(self as &dyn HostEnv, var.name, Some(name_buf)),
                signature: Scoped::new(self as &dyn HostEnv, var.signature, Some(sig_buf)),
                generic_signature: Scoped::new(self as &dyn HostEnv, var.generic_signature, generic_buf),
            })
            .collect();

        Ok(LocalVariableTable::new(self, entries, Some(table_buffer)))
    }

    fn frame_location(&self, thread: ThreadHandle, depth: i32) -> HostResult<FrameLocation> {
        let mut state = self.state();
        state.calls.push(HostCall::FrameLocation(thread));
        if depth != 0 {
            return Err(HostStatus::NO_MORE_FRAMES);
        }
        let (method, location) = state
            .threads
            .get(&thread)
            .ok_or(HostStatus::INVALID_THREAD)?;
        Ok(FrameLocation {
            method: *method,
            location: (*location)?,
        })
    }

    fn deallocate(&self, buffer: BufferId) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(HostCall::Deallocate(buffer));
        if state.live.remove(&buffer).is_none() {
            state.invalid_releases.push(buffer);
            return Err(HostStatus::ILLEGAL_ARGUMENT);
        }
        *state.released.entry(buffer).or_insert(0) += 1;
        match state.deallocate_status {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}
