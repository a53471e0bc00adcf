//! Exported `Agent_OnLoad` / `Agent_OnUnload`.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::sync::OnceLock;

use entryscope_host::jvmti::{self, sys, JvmtiHost};
use tracing::error;

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::error::{AttachError, Result};
use crate::logging;

static AGENT: OnceLock<Agent> = OnceLock::new();

/// Called by the VM to load the agent; non-zero aborts VM startup
///
/// # Safety
/// Must only be called by the VM with the arguments of the agent load protocol.
#[no_mangle]
pub unsafe extern "system" fn Agent_OnLoad(
    vm: *mut sys::JavaVM,
    options: *mut c_char,
    _reserved: *mut c_void,
) -> sys::jint {
    let options = if options.is_null() {
        None
    } else {
        Some(CStr::from_ptr(options).to_string_lossy().into_owned())
    };

    match load(vm, options.as_deref()) {
        Ok(()) => sys::JNI_OK,
        Err(e) => {
            error!("Agent load failed: {}", e);
            // Logging may not be up yet, or may be switched off
            eprintln!("entryscope: {}", e);
            1
        }
    }
}

/// Called by the VM once the agent is about to unload
///
/// # Safety
/// Must only be called by the VM.
#[no_mangle]
pub unsafe extern "system" fn Agent_OnUnload(_vm: *mut sys::JavaVM) {
    if let Some(agent) = AGENT.get() {
        agent.detach();
    }
}

unsafe fn load(vm: *mut sys::JavaVM, options: Option<&str>) -> Result<()> {
    let config = AgentConfig::resolve(options).map_err(AttachError::Config)?;

    if let Err(e) = logging::initialize_logging(
        config.enable_logging,
        config.log_level,
        config.log_file.as_deref(),
    ) {
        eprintln!("entryscope: failed to initialize logging: {}", e);
    }
    config.log_resolution();

    let host = JvmtiHost::from_vm(vm)?;

    let agent = Agent::new(config)?;
    if AGENT.set(agent).is_err() {
        return Err(AttachError::AlreadyAttached);
    }
    let agent = AGENT.get().ok_or(AttachError::AlreadyAttached)?;

    jvmti::install_event_sink(agent)?;
    agent.attach(&host)
}
