//! Attach/detach sequencing and the inbound event sink.

use entryscope_host::{CapabilitySet, EventSink, HostEnv, HostError, HostEvent};
use tracing::{debug, error, warn};

use crate::config::AgentConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{AttachError, Result};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::probe::{Probe, TraceEmitter};

/// The probe as seen by the host: configuration, dispatch map and output,
/// all fixed at construction
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    capabilities: CapabilitySet,
    dispatcher: Dispatcher,
    probe: Probe,
    lifecycle: Lifecycle,
}

impl Agent {
    /// Build an agent writing to the configured output target
    pub fn new(config: AgentConfig) -> Result<Self> {
        let emitter = TraceEmitter::open(&config.output, config.format)?;
        Ok(Self::with_emitter(config, emitter))
    }

    pub fn with_emitter(config: AgentConfig, emitter: TraceEmitter) -> Self {
        Self::with_dispatcher(config, emitter, Dispatcher::standard())
    }

    pub fn with_dispatcher(config: AgentConfig, emitter: TraceEmitter, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            capabilities: CapabilitySet::tracing_minimum(),
            dispatcher,
            probe: Probe::new(emitter),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    /// Request capabilities, then bind and enable every dispatched event
    /// kind. Any failure leaves the agent unattached.
    pub fn attach(&self, env: &dyn HostEnv) -> Result<()> {
        if !self
            .lifecycle
            .transition(LifecycleState::Unattached, LifecycleState::CapabilitiesRequested)
        {
            return Err(AttachError::AlreadyAttached);
        }

        if let Err(e) = self.register(env) {
            error!("❌ Failed to attach to {}: {}", env.runtime_name(), e);
            self.lifecycle.reset();
            return Err(e);
        }

        self.lifecycle
            .transition(LifecycleState::EventsRegistered, LifecycleState::Active);
        warn!("✓ Agent has been loaded ({} output to {})", self.config.format, self.config.output);
        Ok(())
    }

    fn register(&self, env: &dyn HostEnv) -> Result<()> {
        env.add_capabilities(&self.capabilities)
            .map_err(|status| HostError::CapabilitiesRejected {
                capabilities: self.capabilities.to_string(),
                status,
            })?;
        debug!("Capabilities granted: {}", self.capabilities);

        for kind in self.dispatcher.kinds() {
            env.bind_event(kind)
                .map_err(|status| HostError::BindFailed { event: kind, status })?;
            env.set_event_enabled(kind, true)
                .map_err(|status| HostError::EnableFailed { event: kind, status })?;
            debug!("{} events bound and enabled", kind);
        }

        self.lifecycle
            .transition(LifecycleState::CapabilitiesRequested, LifecycleState::EventsRegistered);
        Ok(())
    }

    /// No unregistration: the host stops delivering on unload
    pub fn detach(&self) {
        warn!("Unloading");
        if !self
            .lifecycle
            .transition(LifecycleState::Active, LifecycleState::Unloading)
        {
            warn!("Detach requested while {}", self.lifecycle.current());
        }
        self.lifecycle.reset();
        warn!("Agent has been unloaded");
    }
}

impl EventSink for Agent {
    fn deliver(&self, env: &dyn HostEnv, event: HostEvent) {
        if !self.lifecycle.is_active() {
            debug!(
                "Dropping {} delivery while {}",
                event.kind(),
                self.lifecycle.current()
            );
            return;
        }
        self.dispatcher.dispatch(&self.probe, env, event);
    }
}
