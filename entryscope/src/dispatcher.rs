//! Routing of host events to their handlers.
//!
//! The table is filled once during attach and only read afterwards, so
//! handlers on any number of host threads share it without locking.

use entryscope_host::{EventKind, HostEnv, HostEvent};
use entryscope_protocol::LifecycleEvent;
use tracing::debug;

use crate::probe::Probe;

pub type Handler = fn(&Probe, &dyn HostEnv, HostEvent);

#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<(EventKind, Handler)>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for method entry, VM init and VM death
    pub fn standard() -> Self {
        let mut dispatcher = Self::new();
        dispatcher
            .register(EventKind::MethodEntry, handle_method_entry)
            .register(EventKind::VmInit, handle_vm_init)
            .register(EventKind::VmDeath, handle_vm_death);
        dispatcher
    }

    /// Bind `handler` to `kind`. Re-registering a kind replaces its handler
    /// and keeps its original position.
    pub fn register(&mut self, kind: EventKind, handler: Handler) -> &mut Self {
        match self.handlers.iter_mut().find(|(bound, _)| *bound == kind) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((kind, handler)),
        }
        self
    }

    /// Registered kinds in registration order; attach binds them in this order
    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.handlers.iter().map(|(kind, _)| *kind)
    }

    fn handler(&self, kind: EventKind) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(bound, _)| *bound == kind)
            .map(|(_, handler)| *handler)
    }

    /// Run the handler for `event`; false when none is bound
    pub fn dispatch(&self, probe: &Probe, env: &dyn HostEnv, event: HostEvent) -> bool {
        match self.handler(event.kind()) {
            Some(handler) => {
                handler(probe, env, event);
                true
            }
            None => {
                debug!("Ignoring {} delivery: no handler bound", event.kind());
                false
            }
        }
    }
}

fn handle_method_entry(probe: &Probe, env: &dyn HostEnv, event: HostEvent) {
    if let HostEvent::MethodEntry { method, thread } = event {
        probe.trace_method_entry(env, method, thread);
    }
}

fn handle_vm_init(probe: &Probe, env: &dyn HostEnv, _event: HostEvent) {
    probe.announce(env, LifecycleEvent::VmInit);
}

fn handle_vm_death(probe: &Probe, env: &dyn HostEnv, _event: HostEvent) {
    probe.announce(env, LifecycleEvent::VmDeath);
}
